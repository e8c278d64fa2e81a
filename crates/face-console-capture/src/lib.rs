#![warn(missing_docs)]
//! # face-console-capture
//!
//! ## Purpose
//! Bridges a live camera feed into submittable [`ImageHandle`]s.
//!
//! ## Responsibilities
//! - Define a backend-agnostic camera capability trait.
//! - Manage the transient capture session state machine per slot.
//! - Encode grabbed frames as JPEG with a fixed synthetic file name.
//! - Expose deterministic synthetic capture for CI and unit tests.
//! - Expose still-snapshot acquisition from HTTP cameras.
//!
//! ## Data flow
//! Operator activates a [`CaptureController`] -> backend grabs one
//! [`CameraFrame`] -> frame is JPEG-encoded into an [`ImageHandle`] consumed
//! by the owning acquisition slot.
//!
//! ## Ownership and lifetimes
//! Grabbed frames are owned values with independent buffers; no borrowed
//! frame memory escapes backend boundaries.
//!
//! ## Error model
//! Unavailable devices, unready feeds, geometry violations, and encode
//! failures are reported as [`CaptureError`] values. A failed grab leaves the
//! session active so the operator may retry.
//!
//! ## Security and privacy notes
//! Capture never persists frame bytes to disk; handles live only as long as
//! the owning slot.

use std::io::Read;
use std::sync::{Arc, Mutex};

use face_console_core::ImageHandle;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;
use url::Url;

/// Fixed file name attached to every captured handle.
pub const CAPTURE_FILE_NAME: &str = "webcam-capture.jpg";

/// MIME type of encoded capture output.
pub const CAPTURE_MIME_TYPE: &str = "image/jpeg";

/// JPEG quality used for captured stills.
pub const CAPTURE_JPEG_QUALITY: u8 = 85;

/// One still frame grabbed from a camera backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Raw RGBA pixel buffer (`width * height * 4` bytes).
    pub rgba: Vec<u8>,
}

impl CameraFrame {
    /// Constructs a validated frame.
    ///
    /// # Errors
    /// Returns [`CaptureError::InvalidFrameShape`] when the pixel buffer
    /// length is not exactly `width * height * 4`.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CaptureError> {
        let expected = required_rgba_len(width, height)?;
        if rgba.len() != expected {
            return Err(CaptureError::InvalidFrameShape {
                expected,
                actual: rgba.len(),
            });
        }

        Ok(Self {
            width,
            height,
            rgba,
        })
    }
}

/// Capability trait implemented by concrete camera providers.
///
/// Backends are engaged on demand and asked to produce one still frame at a
/// time. Session bookkeeping lives in [`CaptureController`]; backends only
/// talk to the device.
pub trait CameraBackend: Send + Sync {
    /// Engages the camera device.
    ///
    /// # Errors
    /// Returns [`CaptureError::DeviceUnavailable`] when no device or
    /// permission is available.
    fn activate(&self) -> Result<(), CaptureError>;

    /// Produces one still frame from the engaged device.
    ///
    /// # Errors
    /// Returns [`CaptureError::FrameUnavailable`] when the feed cannot supply
    /// a frame yet; the caller may retry.
    fn grab_frame(&self) -> Result<CameraFrame, CaptureError>;

    /// Disengages the camera device. Idempotent.
    fn release(&self);
}

/// State of one live-capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSessionState {
    /// No camera engaged for this slot.
    Inactive,
    /// Camera engaged, awaiting a capture command or cancellation.
    Active,
}

/// Manages the transient live-capture session for one acquisition slot.
///
/// Exactly one controller exists per slot that supports live capture. The
/// session machine is `Inactive -> Active` on [`CaptureController::activate`]
/// and back to `Inactive` on a successful grab or on
/// [`CaptureController::cancel`].
pub struct CaptureController {
    backend: Arc<dyn CameraBackend>,
    state: CaptureSessionState,
}

impl CaptureController {
    /// Creates an inactive controller over the given backend.
    pub fn new(backend: Arc<dyn CameraBackend>) -> Self {
        Self {
            backend,
            state: CaptureSessionState::Inactive,
        }
    }

    /// Returns the current session state.
    pub fn state(&self) -> CaptureSessionState {
        self.state
    }

    /// Returns `true` while the camera is engaged.
    pub fn is_active(&self) -> bool {
        self.state == CaptureSessionState::Active
    }

    /// Engages the camera, transitioning `Inactive -> Active`.
    ///
    /// Calling while already `Active` is a no-op.
    ///
    /// # Errors
    /// Returns [`CaptureError::DeviceUnavailable`] when the backend cannot be
    /// engaged; the session remains `Inactive`.
    pub fn activate(&mut self) -> Result<(), CaptureError> {
        if self.is_active() {
            return Ok(());
        }

        self.backend.activate()?;
        self.state = CaptureSessionState::Active;
        Ok(())
    }

    /// Produces one still image handle from the engaged camera.
    ///
    /// # Returns
    /// - `Ok(None)` while `Inactive`: the call is a no-op with no state
    ///   change and no handle produced.
    /// - `Ok(Some(handle))` on success; the session transitions back to
    ///   `Inactive` and the backend is released.
    ///
    /// # Errors
    /// Grab and encode failures leave the session `Active` so the operator
    /// may retry.
    pub fn capture_frame(&mut self) -> Result<Option<ImageHandle>, CaptureError> {
        if !self.is_active() {
            return Ok(None);
        }

        let frame = self.backend.grab_frame().inspect_err(|error| {
            log::warn!("frame grab failed, session stays active: {error}");
        })?;
        let handle = encode_capture_handle(&frame)?;

        self.backend.release();
        self.state = CaptureSessionState::Inactive;
        log::debug!(
            "captured {}x{} frame into {} ({} bytes)",
            frame.width,
            frame.height,
            handle.file_name,
            handle.len()
        );
        Ok(Some(handle))
    }

    /// Abandons the session without producing a handle.
    ///
    /// Transitions `Active -> Inactive` and releases the backend; no-op while
    /// `Inactive`. Never touches any acquisition slot.
    pub fn cancel(&mut self) {
        if self.is_active() {
            self.backend.release();
            self.state = CaptureSessionState::Inactive;
        }
    }
}

/// Encodes one frame into a submittable JPEG handle.
///
/// # Errors
/// Returns [`CaptureError::Encode`] when JPEG encoding fails.
pub fn encode_capture_handle(frame: &CameraFrame) -> Result<ImageHandle, CaptureError> {
    // The jpeg encoder rejects alpha; drop it up front.
    let mut rgb = Vec::with_capacity(frame.rgba.len() / 4 * 3);
    for pixel in frame.rgba.chunks_exact(4) {
        rgb.extend_from_slice(&pixel[..3]);
    }

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, CAPTURE_JPEG_QUALITY)
        .write_image(&rgb, frame.width, frame.height, ExtendedColorType::Rgb8)
        .map_err(|error| CaptureError::Encode(error.to_string()))?;

    ImageHandle::new(CAPTURE_FILE_NAME, CAPTURE_MIME_TYPE, jpeg)
        .map_err(|error| CaptureError::Encode(error.to_string()))
}

/// Deterministic synthetic backend for test and CI usage.
///
/// Frames are sequence-numbered gradients; availability and grab failures are
/// scriptable so session-machine edges can be exercised without hardware.
#[derive(Debug)]
pub struct SyntheticCameraBackend {
    width: u32,
    height: u32,
    available: bool,
    failing_grabs: Mutex<u32>,
    sequence: Mutex<u64>,
    engaged: Mutex<bool>,
}

impl SyntheticCameraBackend {
    /// Creates an available backend producing 8x8 frames.
    pub fn new() -> Self {
        Self::with_dimensions(8, 8)
    }

    /// Creates an available backend with caller-provided frame geometry.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            available: true,
            failing_grabs: Mutex::new(0),
            sequence: Mutex::new(0),
            engaged: Mutex::new(false),
        }
    }

    /// Creates a backend that refuses activation.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Scripts the next `count` grabs to fail with an unready feed.
    pub fn fail_next_grabs(&self, count: u32) {
        if let Ok(mut failing) = self.failing_grabs.lock() {
            *failing = count;
        }
    }

    /// Returns `true` while the synthetic device is engaged.
    pub fn is_engaged(&self) -> bool {
        self.engaged.lock().map(|engaged| *engaged).unwrap_or(false)
    }
}

impl Default for SyntheticCameraBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for SyntheticCameraBackend {
    fn activate(&self) -> Result<(), CaptureError> {
        if !self.available {
            return Err(CaptureError::DeviceUnavailable(
                "synthetic camera is configured unavailable".to_string(),
            ));
        }

        if let Ok(mut engaged) = self.engaged.lock() {
            *engaged = true;
        }
        Ok(())
    }

    fn grab_frame(&self) -> Result<CameraFrame, CaptureError> {
        let mut failing = self
            .failing_grabs
            .lock()
            .map_err(|_| CaptureError::FrameUnavailable("failure lock poisoned".to_string()))?;
        if *failing > 0 {
            *failing -= 1;
            return Err(CaptureError::FrameUnavailable(
                "synthetic feed not ready".to_string(),
            ));
        }
        drop(failing);

        let mut sequence = self
            .sequence
            .lock()
            .map_err(|_| CaptureError::FrameUnavailable("sequence lock poisoned".to_string()))?;
        *sequence += 1;

        let pixels = (self.width as usize) * (self.height as usize);
        let mut rgba = Vec::with_capacity(pixels * 4);
        for index in 0..pixels {
            let shade = ((index as u64 + *sequence) % 255) as u8;
            rgba.extend_from_slice(&[shade, shade, shade, 255]);
        }

        CameraFrame::new(self.width, self.height, rgba)
    }

    fn release(&self) {
        if let Ok(mut engaged) = self.engaged.lock() {
            *engaged = false;
        }
    }
}

/// Still-snapshot backend for HTTP cameras exposing a JPEG snapshot URL.
///
/// Activation probes the snapshot endpoint; each grab fetches and decodes one
/// snapshot so malformed payloads surface as retryable feed failures.
pub struct IpCameraBackend {
    snapshot_url: Url,
}

impl IpCameraBackend {
    /// Creates a backend for the given snapshot URL.
    ///
    /// # Errors
    /// Returns [`CaptureError::DeviceUnavailable`] when the URL is invalid or
    /// not http(s).
    pub fn new(snapshot_url: &str) -> Result<Self, CaptureError> {
        let parsed = Url::parse(snapshot_url).map_err(|error| {
            CaptureError::DeviceUnavailable(format!("invalid snapshot url: {error}"))
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(CaptureError::DeviceUnavailable(format!(
                "unsupported snapshot scheme '{}'",
                parsed.scheme()
            )));
        }

        Ok(Self {
            snapshot_url: parsed,
        })
    }

    fn fetch_snapshot(&self) -> Result<Vec<u8>, CaptureError> {
        let response = ureq::get(self.snapshot_url.as_str()).call().map_err(|error| {
            CaptureError::FrameUnavailable(format!("snapshot fetch failed: {error}"))
        })?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|error| {
                CaptureError::FrameUnavailable(format!("snapshot read failed: {error}"))
            })?;

        if bytes.is_empty() {
            return Err(CaptureError::FrameUnavailable(
                "empty snapshot body".to_string(),
            ));
        }

        Ok(bytes)
    }
}

impl CameraBackend for IpCameraBackend {
    fn activate(&self) -> Result<(), CaptureError> {
        ureq::get(self.snapshot_url.as_str())
            .call()
            .map_err(|error| {
                CaptureError::DeviceUnavailable(format!("snapshot endpoint unreachable: {error}"))
            })
            .map(|_| ())
    }

    fn grab_frame(&self) -> Result<CameraFrame, CaptureError> {
        let bytes = self.fetch_snapshot()?;
        let decoded = image::load_from_memory(&bytes).map_err(|error| {
            CaptureError::FrameUnavailable(format!("snapshot decode failed: {error}"))
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());

        CameraFrame::new(width, height, rgba.into_raw())
    }

    fn release(&self) {}
}

/// Capture layer error type.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Camera cannot be engaged; operator may retry or fall back to upload.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
    /// Feed could not supply a frame; the session stays active for retry.
    #[error("frame unavailable: {0}")]
    FrameUnavailable(String),
    /// Frame buffer shape does not match declared geometry.
    #[error("invalid frame shape: expected {expected} bytes, got {actual}")]
    InvalidFrameShape {
        /// Expected RGBA byte count.
        expected: usize,
        /// Actual RGBA byte count.
        actual: usize,
    },
    /// Still-image encoding failed.
    #[error("capture encode failure: {0}")]
    Encode(String),
}

fn required_rgba_len(width: u32, height: u32) -> Result<usize, CaptureError> {
    let pixels = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| CaptureError::Encode("frame dimensions overflow".to_string()))?;

    pixels
        .checked_mul(4)
        .ok_or_else(|| CaptureError::Encode("rgba length overflow".to_string()))
}

#[cfg(test)]
mod tests {
    //! Unit tests for the session machine and synthetic capture behavior.

    use super::*;

    #[test]
    fn capture_frame_is_a_no_op_while_inactive() {
        let backend = Arc::new(SyntheticCameraBackend::new());
        let mut controller = CaptureController::new(backend.clone());

        let produced = controller.capture_frame().expect("no-op should not error");
        assert!(produced.is_none());
        assert_eq!(controller.state(), CaptureSessionState::Inactive);
        assert!(!backend.is_engaged());
    }

    #[test]
    fn failed_activation_leaves_session_inactive() {
        let backend = Arc::new(SyntheticCameraBackend::unavailable());
        let mut controller = CaptureController::new(backend);

        let error = controller.activate().expect_err("activation should fail");
        assert!(matches!(error, CaptureError::DeviceUnavailable(_)));
        assert_eq!(controller.state(), CaptureSessionState::Inactive);
    }

    #[test]
    fn unready_feed_keeps_session_active_for_retry() {
        let backend = Arc::new(SyntheticCameraBackend::new());
        backend.fail_next_grabs(1);
        let mut controller = CaptureController::new(backend.clone());
        controller.activate().expect("activation should work");

        let error = controller.capture_frame().expect_err("grab should fail once");
        assert!(matches!(error, CaptureError::FrameUnavailable(_)));
        assert_eq!(controller.state(), CaptureSessionState::Active);

        let handle = controller
            .capture_frame()
            .expect("retry should work")
            .expect("retry should produce a handle");
        assert_eq!(handle.file_name, CAPTURE_FILE_NAME);
        assert_eq!(controller.state(), CaptureSessionState::Inactive);
    }

    #[test]
    fn successful_capture_encodes_jpeg_and_disengages() {
        let backend = Arc::new(SyntheticCameraBackend::new());
        let mut controller = CaptureController::new(backend.clone());
        controller.activate().expect("activation should work");
        assert!(backend.is_engaged());

        let handle = controller
            .capture_frame()
            .expect("capture should work")
            .expect("capture should produce a handle");
        assert_eq!(handle.mime_type, CAPTURE_MIME_TYPE);
        assert_eq!(&handle.bytes[..2], &[0xFF, 0xD8]);
        assert!(!backend.is_engaged());
    }

    #[test]
    fn cancel_disengages_without_producing_a_handle() {
        let backend = Arc::new(SyntheticCameraBackend::new());
        let mut controller = CaptureController::new(backend.clone());
        controller.activate().expect("activation should work");

        controller.cancel();
        assert_eq!(controller.state(), CaptureSessionState::Inactive);
        assert!(!backend.is_engaged());

        // Cancelling again is a harmless no-op.
        controller.cancel();
        assert_eq!(controller.state(), CaptureSessionState::Inactive);
    }

    #[test]
    fn activate_is_idempotent_while_active() {
        let backend = Arc::new(SyntheticCameraBackend::new());
        let mut controller = CaptureController::new(backend);
        controller.activate().expect("activation should work");
        controller.activate().expect("second activation is a no-op");
        assert_eq!(controller.state(), CaptureSessionState::Active);
    }

    #[test]
    fn frame_geometry_is_validated() {
        assert!(matches!(
            CameraFrame::new(2, 2, vec![0; 3]),
            Err(CaptureError::InvalidFrameShape { expected: 16, actual: 3 })
        ));
    }

    #[test]
    fn ip_backend_rejects_non_http_snapshot_urls() {
        assert!(IpCameraBackend::new("rtsp://camera.local/stream").is_err());
        assert!(IpCameraBackend::new("not a url").is_err());
        assert!(IpCameraBackend::new("http://camera.local/jpg").is_ok());
    }
}
