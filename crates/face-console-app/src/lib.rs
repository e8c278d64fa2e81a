#![warn(missing_docs)]
//! # face-console-app
//!
//! ## Purpose
//! Orchestrates acquisition, capture, submission, and presentation for the
//! three `face-console` workflows.
//!
//! ## Responsibilities
//! - Own one independent workflow instance per operation (compare, register,
//!   recognize) with no shared mutable state.
//! - Enforce readiness inside `submit` itself, not only at the UI trigger.
//! - Convert every client failure into the `Failed` display state at this
//!   boundary; nothing propagates further.
//! - Apply the registration-success reset side effect.
//! - Enforce the single-active-camera policy across workflows.
//!
//! ## Data flow
//! Slot acquisition (upload or capture) -> readiness gate -> client dispatch
//! -> tracker resolution -> verdict presentation.
//!
//! ## Ownership and lifetimes
//! Workflows own their slots, trackers, and capture controllers; dispatches
//! hand owned handle clones to the client so event-driven hosts may complete
//! submissions from worker threads.
//!
//! ## Error model
//! Infrastructure failures are wrapped in [`AppError`]. Submission failures
//! never surface as errors; they land in the workflow's `Failed` state.
//!
//! ## Security and privacy notes
//! Nothing here persists images or names; all state lives for one session.

use std::path::Path;
use std::sync::Arc;

use face_console_capture::{
    CameraBackend, CaptureController, CaptureError, CaptureSessionState, IpCameraBackend,
    SyntheticCameraBackend,
};
use face_console_client::{
    ApiBase, ClientError, DEFAULT_API_BASE, RecognitionClient, failure_message,
};
use face_console_contract::{CompareOutcome, Operation, RecognizeOutcome, RegisterAck};
use face_console_core::{
    CoreError, ImageHandle, ImageSlot, SubmissionState, SubmissionTicket, SubmissionTracker,
};
use thiserror::Error;

/// Build-time application version loaded from root `VERSION`.
pub const APP_VERSION: &str = env!("FACE_CONSOLE_VERSION");

/// Environment variable overriding the service base address.
pub const API_BASE_ENV: &str = "FACE_CONSOLE_API_BASE";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Resolves the service base address from the environment.
///
/// Falls back to the default local service address when the variable is
/// unset.
///
/// # Errors
/// Returns [`AppError::Client`] when the configured address is invalid.
pub fn api_base_from_env() -> Result<ApiBase, AppError> {
    let raw = std::env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
    Ok(ApiBase::parse(&raw)?)
}

/// Environment variable naming an HTTP camera snapshot URL.
pub const CAMERA_URL_ENV: &str = "FACE_CONSOLE_CAMERA_URL";

/// Resolves the live-capture backend from the environment.
///
/// A configured snapshot URL selects the HTTP camera; otherwise the
/// deterministic synthetic camera is used.
///
/// # Errors
/// Returns [`AppError::Capture`] when the configured URL is unusable.
pub fn camera_backend_from_env() -> Result<Arc<dyn CameraBackend>, AppError> {
    match std::env::var(CAMERA_URL_ENV) {
        Ok(url) => Ok(Arc::new(IpCameraBackend::new(&url)?)),
        Err(_) => Ok(Arc::new(SyntheticCameraBackend::new())),
    }
}

/// Result of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDisposition {
    /// One request was dispatched and its outcome applied to the tracker.
    Completed,
    /// Required inputs are missing; nothing was dispatched.
    NotReady,
    /// A request is already outstanding; the attempt was a no-op.
    AlreadyPending,
}

/// Reason a submission cycle could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBlocked {
    /// Required slots or fields are empty.
    NotReady,
    /// The previous request has not resolved yet.
    AlreadyPending,
}

impl SubmitBlocked {
    fn disposition(self) -> SubmitDisposition {
        match self {
            SubmitBlocked::NotReady => SubmitDisposition::NotReady,
            SubmitBlocked::AlreadyPending => SubmitDisposition::AlreadyPending,
        }
    }
}

/// Owned inputs for one dispatched comparison.
#[derive(Debug, Clone)]
pub struct CompareDispatch {
    /// Cycle ticket to pass back to [`CompareWorkflow::apply_outcome`].
    pub ticket: SubmissionTicket,
    /// Reference slot contents at dispatch time.
    pub reference: ImageHandle,
    /// Comparison slot contents at dispatch time.
    pub candidate: ImageHandle,
}

/// Pairwise comparison workflow: two upload-only acquisition slots.
#[derive(Debug, Clone)]
pub struct CompareWorkflow {
    reference: ImageSlot,
    candidate: ImageSlot,
    tracker: SubmissionTracker<CompareOutcome>,
}

impl CompareWorkflow {
    /// Creates an idle workflow with empty slots.
    pub fn new() -> Self {
        Self {
            reference: ImageSlot::new("reference image"),
            candidate: ImageSlot::new("comparison image"),
            tracker: SubmissionTracker::new(),
        }
    }

    /// Replaces the reference image.
    pub fn set_reference(&mut self, handle: ImageHandle) {
        self.reference.set(handle);
    }

    /// Replaces the comparison image.
    pub fn set_candidate(&mut self, handle: ImageHandle) {
        self.candidate.set(handle);
    }

    /// Abandons the reference selection.
    pub fn clear_reference(&mut self) {
        self.reference.clear();
    }

    /// Abandons the comparison selection.
    pub fn clear_candidate(&mut self) {
        self.candidate.clear();
    }

    /// Returns the current reference handle, if any.
    pub fn reference(&self) -> Option<&ImageHandle> {
        self.reference.current()
    }

    /// Returns the current comparison handle, if any.
    pub fn candidate(&self) -> Option<&ImageHandle> {
        self.candidate.current()
    }

    /// Returns the submission lifecycle state.
    pub fn state(&self) -> &SubmissionState<CompareOutcome> {
        self.tracker.state()
    }

    /// Returns `true` when both slots are populated.
    pub fn ready(&self) -> bool {
        self.reference.is_filled() && self.candidate.is_filled()
    }

    /// Discards the displayed outcome and invalidates any outstanding cycle.
    ///
    /// A response belonging to a superseded cycle is discarded on arrival.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// Opens a submission cycle and returns owned dispatch inputs.
    ///
    /// # Errors
    /// Returns [`SubmitBlocked`] when inputs are missing or a request is
    /// already outstanding; in both cases nothing is dispatched.
    pub fn begin_submission(&mut self) -> Result<CompareDispatch, SubmitBlocked> {
        if self.tracker.is_pending() {
            return Err(SubmitBlocked::AlreadyPending);
        }

        let (reference, candidate) = match (self.reference.current(), self.candidate.current()) {
            (Some(reference), Some(candidate)) => (reference.clone(), candidate.clone()),
            _ => return Err(SubmitBlocked::NotReady),
        };
        let ticket = self.tracker.begin().ok_or(SubmitBlocked::AlreadyPending)?;

        Ok(CompareDispatch {
            ticket,
            reference,
            candidate,
        })
    }

    /// Applies the resolution of one dispatched cycle.
    ///
    /// Stale tickets are discarded silently; the return value reports whether
    /// the outcome was applied.
    pub fn apply_outcome(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<CompareOutcome, String>,
    ) -> bool {
        match result {
            Ok(outcome) => self.tracker.resolve(ticket, outcome),
            Err(message) => self.tracker.fail(ticket, message),
        }
    }

    /// Validates readiness, dispatches exactly one request, and applies its
    /// outcome.
    pub fn submit(&mut self, client: &RecognitionClient) -> SubmitDisposition {
        let dispatch = match self.begin_submission() {
            Ok(dispatch) => dispatch,
            Err(blocked) => return blocked.disposition(),
        };

        let result = client
            .compare(&dispatch.reference, &dispatch.candidate)
            .map_err(|error| failure_message(&error, Operation::Compare));
        self.apply_outcome(dispatch.ticket, result);
        SubmitDisposition::Completed
    }
}

impl Default for CompareWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned inputs for one dispatched registration.
#[derive(Debug, Clone)]
pub struct RegisterDispatch {
    /// Cycle ticket to pass back to [`RegisterWorkflow::apply_outcome`].
    pub ticket: SubmissionTicket,
    /// Photo slot contents at dispatch time.
    pub photo: ImageHandle,
    /// Entered name at dispatch time.
    pub name: String,
}

/// Identity registration workflow: photo slot, name field, live capture.
pub struct RegisterWorkflow {
    photo: ImageSlot,
    name: String,
    capture: CaptureController,
    tracker: SubmissionTracker<RegisterAck>,
}

impl RegisterWorkflow {
    /// Creates an idle workflow with its own capture controller.
    pub fn new(camera: Arc<dyn CameraBackend>) -> Self {
        Self {
            photo: ImageSlot::new("registration photo"),
            name: String::new(),
            capture: CaptureController::new(camera),
            tracker: SubmissionTracker::new(),
        }
    }

    /// Replaces the registration photo.
    pub fn set_photo(&mut self, handle: ImageHandle) {
        self.photo.set(handle);
    }

    /// Abandons the photo selection.
    pub fn clear_photo(&mut self) {
        self.photo.clear();
    }

    /// Returns the current photo handle, if any.
    pub fn photo(&self) -> Option<&ImageHandle> {
        self.photo.current()
    }

    /// Sets the name to register the photo under.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the entered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Engages the live-capture session for the photo slot.
    ///
    /// # Errors
    /// Returns [`CaptureError::DeviceUnavailable`] when the camera cannot be
    /// engaged; the session remains inactive.
    pub fn activate_camera(&mut self) -> Result<(), CaptureError> {
        self.capture.activate()
    }

    /// Abandons the live-capture session without touching the photo slot.
    pub fn cancel_camera(&mut self) {
        self.capture.cancel();
    }

    /// Returns the live-capture session state.
    pub fn camera_state(&self) -> CaptureSessionState {
        self.capture.state()
    }

    /// Captures one still into the photo slot.
    ///
    /// # Returns
    /// `true` when a frame was captured and stored; `false` when the session
    /// was inactive and the call was a no-op.
    ///
    /// # Errors
    /// Grab failures keep the session active for retry.
    pub fn capture_into_photo(&mut self) -> Result<bool, CaptureError> {
        match self.capture.capture_frame()? {
            Some(handle) => {
                self.photo.set(handle);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns the submission lifecycle state.
    pub fn state(&self) -> &SubmissionState<RegisterAck> {
        self.tracker.state()
    }

    /// Returns `true` when a photo is present and the name is non-blank.
    pub fn ready(&self) -> bool {
        self.photo.is_filled() && !self.name.trim().is_empty()
    }

    /// Discards the displayed outcome and invalidates any outstanding cycle.
    ///
    /// A response belonging to a superseded cycle is discarded on arrival.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// Opens a submission cycle and returns owned dispatch inputs.
    ///
    /// # Errors
    /// Returns [`SubmitBlocked`] when inputs are missing or a request is
    /// already outstanding.
    pub fn begin_submission(&mut self) -> Result<RegisterDispatch, SubmitBlocked> {
        if self.tracker.is_pending() {
            return Err(SubmitBlocked::AlreadyPending);
        }

        let photo = match self.photo.current() {
            Some(photo) if !self.name.trim().is_empty() => photo.clone(),
            _ => return Err(SubmitBlocked::NotReady),
        };
        let ticket = self.tracker.begin().ok_or(SubmitBlocked::AlreadyPending)?;

        Ok(RegisterDispatch {
            ticket,
            photo,
            name: self.name.clone(),
        })
    }

    /// Applies the resolution of one dispatched cycle.
    ///
    /// A freshly applied success clears the photo slot, the entered name, and
    /// the capture session; a failure or a stale ticket leaves all inputs
    /// untouched.
    pub fn apply_outcome(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<RegisterAck, String>,
    ) -> bool {
        match result {
            Ok(ack) => {
                let applied = self.tracker.resolve(ticket, ack);
                if applied {
                    self.photo.clear();
                    self.name.clear();
                    self.capture.cancel();
                }
                applied
            }
            Err(message) => self.tracker.fail(ticket, message),
        }
    }

    /// Validates readiness, dispatches exactly one request, and applies its
    /// outcome.
    pub fn submit(&mut self, client: &RecognitionClient) -> SubmitDisposition {
        let dispatch = match self.begin_submission() {
            Ok(dispatch) => dispatch,
            Err(blocked) => return blocked.disposition(),
        };

        let result = client
            .register(&dispatch.photo, &dispatch.name)
            .map_err(|error| failure_message(&error, Operation::Register));
        self.apply_outcome(dispatch.ticket, result);
        SubmitDisposition::Completed
    }
}

/// Owned inputs for one dispatched identification.
#[derive(Debug, Clone)]
pub struct RecognizeDispatch {
    /// Cycle ticket to pass back to [`RecognizeWorkflow::apply_outcome`].
    pub ticket: SubmissionTicket,
    /// Probe slot contents at dispatch time.
    pub probe: ImageHandle,
}

/// Identity lookup workflow: probe slot plus live capture.
pub struct RecognizeWorkflow {
    probe: ImageSlot,
    capture: CaptureController,
    tracker: SubmissionTracker<RecognizeOutcome>,
}

impl RecognizeWorkflow {
    /// Creates an idle workflow with its own capture controller.
    pub fn new(camera: Arc<dyn CameraBackend>) -> Self {
        Self {
            probe: ImageSlot::new("probe photo"),
            capture: CaptureController::new(camera),
            tracker: SubmissionTracker::new(),
        }
    }

    /// Replaces the probe image.
    pub fn set_probe(&mut self, handle: ImageHandle) {
        self.probe.set(handle);
    }

    /// Abandons the probe selection.
    pub fn clear_probe(&mut self) {
        self.probe.clear();
    }

    /// Returns the current probe handle, if any.
    pub fn probe(&self) -> Option<&ImageHandle> {
        self.probe.current()
    }

    /// Engages the live-capture session for the probe slot.
    ///
    /// # Errors
    /// Returns [`CaptureError::DeviceUnavailable`] when the camera cannot be
    /// engaged; the session remains inactive.
    pub fn activate_camera(&mut self) -> Result<(), CaptureError> {
        self.capture.activate()
    }

    /// Abandons the live-capture session without touching the probe slot.
    pub fn cancel_camera(&mut self) {
        self.capture.cancel();
    }

    /// Returns the live-capture session state.
    pub fn camera_state(&self) -> CaptureSessionState {
        self.capture.state()
    }

    /// Captures one still into the probe slot.
    ///
    /// # Returns
    /// `true` when a frame was captured and stored; `false` when the session
    /// was inactive and the call was a no-op.
    ///
    /// # Errors
    /// Grab failures keep the session active for retry.
    pub fn capture_into_probe(&mut self) -> Result<bool, CaptureError> {
        match self.capture.capture_frame()? {
            Some(handle) => {
                self.probe.set(handle);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns the submission lifecycle state.
    pub fn state(&self) -> &SubmissionState<RecognizeOutcome> {
        self.tracker.state()
    }

    /// Returns `true` when the probe slot is populated.
    pub fn ready(&self) -> bool {
        self.probe.is_filled()
    }

    /// Discards the displayed outcome and invalidates any outstanding cycle.
    ///
    /// A response belonging to a superseded cycle is discarded on arrival.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// Opens a submission cycle and returns owned dispatch inputs.
    ///
    /// # Errors
    /// Returns [`SubmitBlocked`] when inputs are missing or a request is
    /// already outstanding.
    pub fn begin_submission(&mut self) -> Result<RecognizeDispatch, SubmitBlocked> {
        if self.tracker.is_pending() {
            return Err(SubmitBlocked::AlreadyPending);
        }

        let probe = match self.probe.current() {
            Some(probe) => probe.clone(),
            None => return Err(SubmitBlocked::NotReady),
        };
        let ticket = self.tracker.begin().ok_or(SubmitBlocked::AlreadyPending)?;

        Ok(RecognizeDispatch { ticket, probe })
    }

    /// Applies the resolution of one dispatched cycle.
    ///
    /// Stale tickets are discarded silently.
    pub fn apply_outcome(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<RecognizeOutcome, String>,
    ) -> bool {
        match result {
            Ok(outcome) => self.tracker.resolve(ticket, outcome),
            Err(message) => self.tracker.fail(ticket, message),
        }
    }

    /// Validates readiness, dispatches exactly one request, and applies its
    /// outcome.
    pub fn submit(&mut self, client: &RecognitionClient) -> SubmitDisposition {
        let dispatch = match self.begin_submission() {
            Ok(dispatch) => dispatch,
            Err(blocked) => return blocked.disposition(),
        };

        let result = client
            .recognize(&dispatch.probe)
            .map_err(|error| failure_message(&error, Operation::Recognize));
        self.apply_outcome(dispatch.ticket, result);
        SubmitDisposition::Completed
    }
}

/// The three independent workflow instances plus the shared-camera policy.
///
/// Workflows never share in-flight status or handles; the aggregate exists
/// only to construct them together and to keep at most one live-capture
/// session active across the register and recognize workflows.
pub struct FaceConsole {
    /// Pairwise comparison workflow (upload-only acquisition).
    pub compare: CompareWorkflow,
    /// Identity registration workflow.
    pub register: RegisterWorkflow,
    /// Identity lookup workflow.
    pub recognize: RecognizeWorkflow,
}

impl FaceConsole {
    /// Constructs the three workflows over per-slot camera backends.
    pub fn new(
        register_camera: Arc<dyn CameraBackend>,
        recognize_camera: Arc<dyn CameraBackend>,
    ) -> Self {
        Self {
            compare: CompareWorkflow::new(),
            register: RegisterWorkflow::new(register_camera),
            recognize: RecognizeWorkflow::new(recognize_camera),
        }
    }

    /// Engages the registration camera, cancelling any active probe session
    /// first.
    ///
    /// # Errors
    /// Returns [`CaptureError::DeviceUnavailable`] when the camera cannot be
    /// engaged.
    pub fn activate_register_camera(&mut self) -> Result<(), CaptureError> {
        self.recognize.cancel_camera();
        self.register.activate_camera()
    }

    /// Engages the probe camera, cancelling any active registration session
    /// first.
    ///
    /// # Errors
    /// Returns [`CaptureError::DeviceUnavailable`] when the camera cannot be
    /// engaged.
    pub fn activate_recognize_camera(&mut self) -> Result<(), CaptureError> {
        self.register.cancel_camera();
        self.recognize.activate_camera()
    }
}

/// Loads a file from disk into a submittable image handle.
///
/// # Errors
/// Returns [`AppError::UnsupportedImage`] for extensions outside the
/// supported set and [`AppError::Io`] for unreadable files.
pub fn load_image_handle(path: &Path) -> Result<ImageHandle, AppError> {
    let mime = mime_for_path(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::UnsupportedImage(path.display().to_string()))?;

    let bytes = std::fs::read(path)?;
    Ok(ImageHandle::new(file_name, mime, bytes)?)
}

/// Maps a file extension to its image MIME type.
///
/// # Errors
/// Returns [`AppError::UnsupportedImage`] for anything but JPEG/PNG input.
pub fn mime_for_path(path: &Path) -> Result<&'static str, AppError> {
    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        _ => Err(AppError::UnsupportedImage(path.display().to_string())),
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Capture subsystem error.
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
    /// Request layer error.
    #[error("client error: {0}")]
    Client(#[from] ClientError),
    /// Core model error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    /// File system error while loading operator input.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Operator supplied a file that is not a supported image.
    #[error("unsupported image file: {0}")]
    UnsupportedImage(String),
    /// A submission resolved to the failed display state.
    #[error("{0}")]
    Submission(String),
    /// Command line could not be interpreted.
    #[error("usage error: {0}")]
    Usage(String),
}
