#![warn(missing_docs)]
//! # face-console-contract
//!
//! ## Purpose
//! Defines the recognition service response schemas and client-side mapping
//! helpers.
//!
//! ## Responsibilities
//! - Parse and validate compare/recognize outcome payloads.
//! - Accept implementation-defined registration acknowledgements.
//! - Extract service-provided failure details with per-operation fallbacks.
//!
//! ## Data flow
//! Raw response body -> `parse_*_response` -> typed outcome consumed by the
//! workflow layer and projected by the presentation crate.
//!
//! ## Ownership and lifetimes
//! Parsed values are owned structs to avoid borrowing from transient network
//! buffers.
//!
//! ## Error model
//! Invalid JSON or out-of-contract values return [`ContractError`]; callers
//! surface these as malformed-response failures, never as panics.
//!
//! ## Security and privacy notes
//! This crate processes only verdict metadata; it never sees image bytes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three operations the recognition service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Pairwise comparison of two face images.
    Compare,
    /// Identity registration from one photo and a name.
    Register,
    /// Identity lookup from one probe image.
    Recognize,
}

impl Operation {
    /// Returns the endpoint path relative to the configured base address.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            Operation::Compare => "/compare",
            Operation::Register => "/register",
            Operation::Recognize => "/recognize",
        }
    }

    /// Returns the generic operator-visible failure message for this
    /// operation, used when the service provides no detail.
    pub fn generic_failure_message(&self) -> &'static str {
        match self {
            Operation::Compare => "Error comparing faces",
            Operation::Register => "Error registering user",
            Operation::Recognize => "Error recognizing user",
        }
    }
}

/// Verdict returned by `/compare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareOutcome {
    /// Similarity score in [0.0, 1.0].
    pub score: f32,
    /// Authoritative match decision made by the service.
    pub is_match: bool,
}

/// Verdict returned by `/recognize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizeOutcome {
    /// Best-matching registered identity.
    pub name: String,
    /// Confidence score in [0.0, 1.0].
    ///
    /// The service returns no boolean for recognize; any match/no-match
    /// treatment derived from this score is presentation-local.
    pub score: f32,
}

/// Acknowledgement returned by `/register`.
///
/// The success body is implementation-defined; only the success status
/// matters. An optional `message` string is preserved when the body happens
/// to carry one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegisterAck {
    /// Optional server-provided confirmation text.
    #[serde(default)]
    pub message: Option<String>,
}

/// Parses a `/compare` success body.
///
/// # Errors
/// Returns [`ContractError::Decode`] for invalid JSON.
/// Returns [`ContractError::InvalidContract`] when `score` falls outside
/// [0.0, 1.0].
pub fn parse_compare_response(raw: &str) -> Result<CompareOutcome, ContractError> {
    let parsed: CompareOutcome = serde_json::from_str(raw).map_err(ContractError::Decode)?;
    validate_score(parsed.score)?;
    Ok(parsed)
}

/// Parses a `/recognize` success body.
///
/// # Errors
/// Returns [`ContractError::Decode`] for invalid JSON.
/// Returns [`ContractError::InvalidContract`] when `score` falls outside
/// [0.0, 1.0] or `name` is blank.
pub fn parse_recognize_response(raw: &str) -> Result<RecognizeOutcome, ContractError> {
    let parsed: RecognizeOutcome = serde_json::from_str(raw).map_err(ContractError::Decode)?;
    validate_score(parsed.score)?;

    if parsed.name.trim().is_empty() {
        return Err(ContractError::InvalidContract(
            "recognize name is empty".to_string(),
        ));
    }

    Ok(parsed)
}

/// Parses a `/register` success body.
///
/// The body is implementation-defined, so any content (including none)
/// acknowledges success; a JSON object's `message` field is preserved.
pub fn parse_register_response(raw: &str) -> RegisterAck {
    if raw.trim().is_empty() {
        return RegisterAck::default();
    }

    serde_json::from_str(raw).unwrap_or_default()
}

/// Extracts the optional `detail` string from a non-success response body.
///
/// Returns `None` for non-JSON bodies, missing fields, and blank details, in
/// which case callers fall back to
/// [`Operation::generic_failure_message`].
pub fn failure_detail(raw: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        detail: Option<String>,
    }

    let body: ErrorBody = serde_json::from_str(raw).ok()?;
    let detail = body.detail?;
    if detail.trim().is_empty() {
        return None;
    }

    Some(detail)
}

fn validate_score(score: f32) -> Result<(), ContractError> {
    if !(0.0..=1.0).contains(&score) || score.is_nan() {
        return Err(ContractError::InvalidContract(format!(
            "score {score} is outside [0.0, 1.0]"
        )));
    }

    Ok(())
}

/// Service contract errors.
#[derive(Debug, Error)]
pub enum ContractError {
    /// JSON decode failure.
    #[error("response decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Parsed payload violates contract invariants.
    #[error("response contract violation: {0}")]
    InvalidContract(String),
}
