#![warn(missing_docs)]
//! # face-console-core
//!
//! ## Purpose
//! Defines the pure data model used across the `face-console` workspace.
//!
//! ## Responsibilities
//! - Represent acquired face images as validated, immutable handles.
//! - Model named acquisition slots with replace/clear semantics.
//! - Track the per-operation submission lifecycle with a generation guard.
//!
//! ## Data flow
//! Upload or capture code produces [`ImageHandle`] values into [`ImageSlot`]s.
//! Workflow code opens a submission cycle on a [`SubmissionTracker`], ships
//! the slot contents to the service, and applies exactly one outcome.
//!
//! ## Ownership and lifetimes
//! Handles and outcomes own their backing buffers (`Vec<u8>`, `String`) so
//! slots and trackers never borrow from transient capture or network buffers.
//!
//! ## Error model
//! Validation failures (empty payload, blank file name, non-image MIME type)
//! return [`CoreError`] variants with caller-actionable categorization.
//!
//! ## Security and privacy notes
//! This crate never logs image bytes. Handles carry only the metadata needed
//! to label an outbound request part.
//!
//! ## Example
//! ```rust
//! use face_console_core::{ImageHandle, ImageSlot};
//!
//! let mut slot = ImageSlot::new("reference image");
//! let handle = ImageHandle::new("face.jpg", "image/jpeg", vec![0xFF, 0xD8]).unwrap();
//! slot.set(handle);
//! assert!(slot.is_filled());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An opaque, immutable reference to acquired image data.
///
/// Created by a file selection or a live-capture frame grab. A new
/// acquisition supersedes a handle; a handle is never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHandle {
    /// File name attached to the outbound request part.
    pub file_name: String,
    /// MIME type of the binary payload (`image/*`).
    pub mime_type: String,
    /// Opaque binary image data.
    pub bytes: Vec<u8>,
}

impl ImageHandle {
    /// Constructs a validated image handle.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyImage`] when `bytes` is empty.
    /// Returns [`CoreError::InvalidImageMetadata`] when the file name is blank
    /// or the MIME type is not an `image/*` type.
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, CoreError> {
        if bytes.is_empty() {
            return Err(CoreError::EmptyImage);
        }

        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(CoreError::InvalidImageMetadata(
                "file name is blank".to_string(),
            ));
        }

        let mime_type = mime_type.into();
        if !mime_type.starts_with("image/") {
            return Err(CoreError::InvalidImageMetadata(format!(
                "mime type '{mime_type}' is not an image type"
            )));
        }

        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    /// Returns payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` when the payload is empty.
    ///
    /// Always `false` for handles built through [`ImageHandle::new`].
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A named role for one image within a workflow.
///
/// A slot owns at most one handle. Setting a new handle unconditionally
/// replaces the previous one; there is no merging or queueing. Handles are
/// never shared between slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlot {
    role: String,
    handle: Option<ImageHandle>,
}

impl ImageSlot {
    /// Creates an empty slot with a human-readable role name.
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            handle: None,
        }
    }

    /// Returns the slot role name.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Returns the current handle, if any.
    pub fn current(&self) -> Option<&ImageHandle> {
        self.handle.as_ref()
    }

    /// Replaces the slot contents with a new handle.
    pub fn set(&mut self, handle: ImageHandle) {
        self.handle = Some(handle);
    }

    /// Abandons the current selection, emptying the slot.
    pub fn clear(&mut self) {
        self.handle = None;
    }

    /// Returns `true` when the slot holds a handle.
    pub fn is_filled(&self) -> bool {
        self.handle.is_some()
    }
}

/// Lifecycle of one in-flight operation instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState<T> {
    /// No submission is outstanding and no outcome is held.
    Idle,
    /// Exactly one request has been dispatched and awaits its resolution.
    Pending,
    /// The last submission resolved with a typed outcome.
    Resolved(T),
    /// The last submission failed with an operator-visible message.
    ///
    /// Behaves like `Idle` for retry purposes.
    Failed(String),
}

/// Proof that a submission cycle was opened.
///
/// The ticket carries the generation it was issued for; applying an outcome
/// with a ticket from a superseded cycle is silently discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    generation: u64,
}

impl SubmissionTicket {
    /// Returns the generation this ticket belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Submission lifecycle tracker for one operation instance.
///
/// Enforces the single-pending invariant: at most one request is in flight
/// per instance, and a second submission attempt while pending is a no-op.
/// A monotonically increasing generation counter guards against stale
/// resolutions arriving after the operator has moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTracker<T> {
    state: SubmissionState<T>,
    generation: u64,
}

impl<T> SubmissionTracker<T> {
    /// Creates a tracker in `Idle` state.
    pub fn new() -> Self {
        Self {
            state: SubmissionState::Idle,
            generation: 0,
        }
    }

    /// Returns the current state snapshot.
    pub fn state(&self) -> &SubmissionState<T> {
        &self.state
    }

    /// Returns `true` while a request is outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, SubmissionState::Pending)
    }

    /// Opens a new submission cycle.
    ///
    /// # Returns
    /// - `Some(ticket)` when the tracker was `Idle`, `Resolved`, or `Failed`;
    ///   the previous outcome is discarded and the state becomes `Pending`.
    /// - `None` while `Pending`; the attempt is a no-op.
    pub fn begin(&mut self) -> Option<SubmissionTicket> {
        if self.is_pending() {
            return None;
        }

        self.generation += 1;
        self.state = SubmissionState::Pending;
        Some(SubmissionTicket {
            generation: self.generation,
        })
    }

    /// Applies a successful outcome for the given cycle.
    ///
    /// # Returns
    /// `true` when the outcome was applied; `false` when the ticket is stale
    /// or no request is pending, in which case the outcome is discarded.
    pub fn resolve(&mut self, ticket: SubmissionTicket, outcome: T) -> bool {
        if !self.accepts(ticket) {
            return false;
        }

        self.state = SubmissionState::Resolved(outcome);
        true
    }

    /// Applies a failure for the given cycle.
    ///
    /// # Returns
    /// `true` when the failure was recorded; `false` when the ticket is stale
    /// or no request is pending.
    pub fn fail(&mut self, ticket: SubmissionTicket, message: impl Into<String>) -> bool {
        if !self.accepts(ticket) {
            return false;
        }

        self.state = SubmissionState::Failed(message.into());
        true
    }

    /// Returns the tracker to `Idle`, invalidating any outstanding ticket.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = SubmissionState::Idle;
    }

    fn accepts(&self, ticket: SubmissionTicket) -> bool {
        self.is_pending() && ticket.generation == self.generation
    }
}

impl<T> Default for SubmissionTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Error type for core domain validation failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Image payload cannot be empty.
    #[error("image payload is empty")]
    EmptyImage,
    /// Handle metadata violates labeling requirements.
    #[error("invalid image metadata: {0}")]
    InvalidImageMetadata(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for handle validation, slot semantics, and the tracker.

    use super::*;

    fn handle(name: &str) -> ImageHandle {
        ImageHandle::new(name, "image/jpeg", vec![1, 2, 3]).expect("handle should be valid")
    }

    #[test]
    fn rejects_empty_payload_and_bad_metadata() {
        assert!(matches!(
            ImageHandle::new("face.jpg", "image/jpeg", vec![]),
            Err(CoreError::EmptyImage)
        ));
        assert!(ImageHandle::new("  ", "image/png", vec![1]).is_err());
        assert!(ImageHandle::new("face.txt", "text/plain", vec![1]).is_err());
    }

    #[test]
    fn slot_replaces_and_clears_without_merging() {
        let mut slot = ImageSlot::new("reference image");
        assert!(slot.current().is_none());

        slot.set(handle("first.jpg"));
        slot.set(handle("second.jpg"));
        assert_eq!(slot.current().map(|h| h.file_name.as_str()), Some("second.jpg"));

        slot.clear();
        assert!(!slot.is_filled());
    }

    #[test]
    fn second_begin_while_pending_is_a_no_op() {
        let mut tracker: SubmissionTracker<u8> = SubmissionTracker::new();
        let ticket = tracker.begin().expect("first begin should open a cycle");
        assert!(tracker.begin().is_none());

        assert!(tracker.resolve(ticket, 7));
        assert!(matches!(tracker.state(), SubmissionState::Resolved(7)));
    }

    #[test]
    fn stale_ticket_is_discarded_silently() {
        let mut tracker: SubmissionTracker<u8> = SubmissionTracker::new();
        let stale = tracker.begin().expect("cycle should open");
        tracker.reset();
        let current = tracker.begin().expect("fresh cycle should open");

        assert!(!tracker.resolve(stale, 1));
        assert!(tracker.is_pending());

        assert!(tracker.fail(current, "service unreachable"));
        assert!(matches!(tracker.state(), SubmissionState::Failed(_)));
    }

    #[test]
    fn failed_state_permits_a_fresh_cycle() {
        let mut tracker: SubmissionTracker<u8> = SubmissionTracker::new();
        let ticket = tracker.begin().expect("cycle should open");
        assert!(tracker.fail(ticket, "boom"));

        let retry = tracker.begin().expect("retry should open a new cycle");
        assert!(tracker.is_pending());
        assert!(tracker.resolve(retry, 9));
        assert!(matches!(tracker.state(), SubmissionState::Resolved(9)));
    }
}
