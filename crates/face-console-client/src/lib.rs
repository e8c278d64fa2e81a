#![warn(missing_docs)]
//! # face-console-client
//!
//! ## Purpose
//! Implements the outbound request layer between acquisition workflows and
//! the remote recognition service.
//!
//! ## Responsibilities
//! - Validate the configured service base address.
//! - Encode image handles and scalar fields as multipart/form-data.
//! - Execute requests through an injectable transport abstraction.
//! - Classify every outcome as resolved, service-rejected, malformed, or a
//!   transport failure.
//!
//! ## Data flow
//! Workflow hands slot contents to [`RecognitionClient`] -> multipart body is
//! assembled -> one request runs through [`ApiTransport`] -> the response is
//! parsed against the service contract and returned as a typed outcome.
//!
//! ## Ownership and lifetimes
//! Requests own their encoded bodies, so transports may run on worker threads
//! without borrowing workflow state.
//!
//! ## Error model
//! All failure classes are [`ClientError`] variants. Each submission issues
//! exactly one request: no retry, no cancellation once dispatched.
//!
//! ## Security and privacy notes
//! Log lines carry endpoint paths and payload fingerprints, never image
//! bytes or entered names. No authentication headers are attached.

use std::sync::Arc;

use face_console_contract::{
    CompareOutcome, ContractError, Operation, RecognizeOutcome, RegisterAck, failure_detail,
    parse_compare_response, parse_recognize_response, parse_register_response,
};
use face_console_core::ImageHandle;
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

/// Default service base address used when no override is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Length of the random multipart boundary suffix.
const BOUNDARY_SUFFIX_LEN: usize = 24;

/// Validated base address all three endpoints are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase {
    base: String,
}

impl ApiBase {
    /// Parses and validates a base address.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidEndpoint`] when the address is not an
    /// absolute http(s) URL with a host.
    pub fn parse(raw: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(raw)
            .map_err(|error| ClientError::InvalidEndpoint(format!("invalid base url: {error}")))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ClientError::InvalidEndpoint(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        if parsed.host_str().is_none() {
            return Err(ClientError::InvalidEndpoint(
                "base url has no host".to_string(),
            ));
        }

        Ok(Self {
            base: raw.trim_end_matches('/').to_string(),
        })
    }

    /// Resolves the full endpoint URL for one operation.
    pub fn endpoint(&self, operation: Operation) -> String {
        format!("{}{}", self.base, operation.endpoint_path())
    }

    /// Returns the normalized base address.
    pub fn as_str(&self) -> &str {
        &self.base
    }
}

/// Encoded multipart request body plus its content-type header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedForm {
    /// `multipart/form-data` content type carrying the boundary.
    pub content_type: String,
    /// Fully assembled request body bytes.
    pub body: Vec<u8>,
}

/// Incremental multipart/form-data builder over text and file parts.
#[derive(Debug)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    /// Creates a builder with a random alphanumeric boundary.
    pub fn new() -> Self {
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(BOUNDARY_SUFFIX_LEN)
            .map(char::from)
            .collect();

        Self {
            boundary: format!("face-console-{suffix}"),
            body: Vec::new(),
        }
    }

    /// Creates a builder with a caller-provided boundary.
    ///
    /// Intended for deterministic encoding tests.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidInput`] when the boundary is blank or
    /// contains characters outside ASCII alphanumerics and `-`.
    pub fn with_boundary(boundary: impl Into<String>) -> Result<Self, ClientError> {
        let boundary = boundary.into();
        if boundary.is_empty()
            || !boundary
                .bytes()
                .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-')
        {
            return Err(ClientError::InvalidInput(format!(
                "invalid multipart boundary '{boundary}'"
            )));
        }

        Ok(Self {
            boundary,
            body: Vec::new(),
        })
    }

    /// Appends one text field.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidInput`] for a blank field name.
    pub fn add_text(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        self.check_name(name)?;
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        Ok(())
    }

    /// Appends one binary file part from an image handle.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidInput`] for a blank field name.
    pub fn add_file(&mut self, name: &str, handle: &ImageHandle) -> Result<(), ClientError> {
        self.check_name(name)?;
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, handle.file_name, handle.mime_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(&handle.bytes);
        self.body.extend_from_slice(b"\r\n");
        Ok(())
    }

    /// Seals the form and returns the encoded body.
    pub fn finish(mut self) -> EncodedForm {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());

        EncodedForm {
            content_type: format!("multipart/form-data; boundary={}", self.boundary),
            body: self.body,
        }
    }

    fn check_name(&self, name: &str) -> Result<(), ClientError> {
        if name.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "multipart field name is blank".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

/// One outbound request handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Fully resolved endpoint URL.
    pub url: String,
    /// Content-type header value.
    pub content_type: String,
    /// Request body bytes.
    pub body: Vec<u8>,
}

/// One HTTP response as seen by the classification layer.
///
/// Non-success statuses are responses, not transport errors; only
/// connection-level failures surface as [`ClientError::Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body decoded as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Abstract transport used by the recognition client.
pub trait ApiTransport: Send + Sync {
    /// Executes one request and returns the service's response.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] only for connection-level failures;
    /// non-2xx responses are returned as [`ApiResponse`] values.
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// Blocking transport over `ureq`.
///
/// No explicit timeout is configured; the transport's own error signaling is
/// the only failure source.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Creates a transport with a fresh connection agent.
    pub fn new() -> Self {
        Self {
            agent: ureq::agent(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiTransport for UreqTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let result = self
            .agent
            .post(&request.url)
            .set("Content-Type", &request.content_type)
            .send_bytes(&request.body);

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(error) => return Err(ClientError::Transport(error.to_string())),
        };

        let status = response.status();
        let mut body = Vec::new();
        use std::io::Read;
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|error| ClientError::Transport(format!("response read failed: {error}")))?;

        Ok(ApiResponse { status, body })
    }
}

/// Client for the three recognition service operations.
///
/// Each call issues exactly one request carrying the required image handles
/// and scalar fields, and awaits exactly one resolution.
#[derive(Clone)]
pub struct RecognitionClient {
    base: ApiBase,
    transport: Arc<dyn ApiTransport>,
}

impl RecognitionClient {
    /// Creates a client over the given base address and transport.
    pub fn new(base: ApiBase, transport: Arc<dyn ApiTransport>) -> Self {
        Self { base, transport }
    }

    /// Creates a client backed by the blocking `ureq` transport.
    pub fn with_default_transport(base: ApiBase) -> Self {
        Self::new(base, Arc::new(UreqTransport::new()))
    }

    /// Returns the configured base address.
    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    /// Submits two images for pairwise comparison.
    ///
    /// # Errors
    /// Classified per the workspace failure taxonomy: `Transport`, `Service`
    /// (with optional verbatim detail), or `MalformedResponse`.
    pub fn compare(
        &self,
        reference: &ImageHandle,
        candidate: &ImageHandle,
    ) -> Result<CompareOutcome, ClientError> {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "compare inputs {} / {}",
                image_fingerprint(reference),
                image_fingerprint(candidate)
            );
        }

        let mut form = MultipartForm::new();
        form.add_file("file1", reference)?;
        form.add_file("file2", candidate)?;

        let response = self.dispatch(Operation::Compare, form.finish())?;
        parse_compare_response(&response.body_text()).map_err(malformed)
    }

    /// Submits one photo and a name for identity registration.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidInput`] for a blank name; otherwise
    /// classified per the workspace failure taxonomy.
    pub fn register(&self, photo: &ImageHandle, name: &str) -> Result<RegisterAck, ClientError> {
        if name.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "registration name is blank".to_string(),
            ));
        }

        if log::log_enabled!(log::Level::Debug) {
            log::debug!("register input {}", image_fingerprint(photo));
        }

        let mut form = MultipartForm::new();
        form.add_file("file", photo)?;
        form.add_text("name", name)?;

        let response = self.dispatch(Operation::Register, form.finish())?;
        Ok(parse_register_response(&response.body_text()))
    }

    /// Submits one probe image for identity lookup.
    ///
    /// # Errors
    /// Classified per the workspace failure taxonomy.
    pub fn recognize(&self, probe: &ImageHandle) -> Result<RecognizeOutcome, ClientError> {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("recognize input {}", image_fingerprint(probe));
        }

        let mut form = MultipartForm::new();
        form.add_file("file", probe)?;

        let response = self.dispatch(Operation::Recognize, form.finish())?;
        parse_recognize_response(&response.body_text()).map_err(malformed)
    }

    fn dispatch(
        &self,
        operation: Operation,
        form: EncodedForm,
    ) -> Result<ApiResponse, ClientError> {
        let request = ApiRequest {
            url: self.base.endpoint(operation),
            content_type: form.content_type,
            body: form.body,
        };

        log::debug!(
            "dispatching {} request to {} ({} bytes)",
            operation.endpoint_path(),
            request.url,
            request.body.len()
        );

        let response = self.transport.execute(&request)?;
        if !response.is_success() {
            let detail = failure_detail(&response.body_text());
            log::warn!(
                "{} rejected with status {}",
                operation.endpoint_path(),
                response.status
            );
            return Err(ClientError::Service {
                status: response.status,
                detail,
            });
        }

        Ok(response)
    }
}

/// Computes a stable hex-encoded SHA-256 fingerprint of an image payload.
///
/// Used for dispatch-time log correlation only; never sent on the wire.
pub fn image_fingerprint(handle: &ImageHandle) -> String {
    let mut hasher = Sha256::new();
    hasher.update(&handle.bytes);
    hex::encode(hasher.finalize())
}

/// Maps a client failure to the operator-visible message.
///
/// A service-provided `detail` is shown verbatim; every other failure class
/// falls back to the generic per-operation message.
pub fn failure_message(error: &ClientError, operation: Operation) -> String {
    match error {
        ClientError::Service {
            detail: Some(detail),
            ..
        } => detail.clone(),
        _ => operation.generic_failure_message().to_string(),
    }
}

fn malformed(error: ContractError) -> ClientError {
    ClientError::MalformedResponse(error.to_string())
}

/// Errors produced by the request layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configured base address violates endpoint requirements.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Caller-supplied request input is unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Network/connection failure reaching the service.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Non-success response, with optional service-provided detail.
    #[error("service error: status {status}")]
    Service {
        /// HTTP status code of the rejection.
        status: u16,
        /// Verbatim `detail` string when the service provided one.
        detail: Option<String>,
    },
    /// Success status but the body failed contract validation.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
