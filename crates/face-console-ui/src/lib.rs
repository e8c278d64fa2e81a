#![warn(missing_docs)]
//! # face-console-ui
//!
//! ## Purpose
//! Maps service outcomes into display-ready verdict structures for
//! `face-console`.
//!
//! ## Responsibilities
//! - Format similarity and confidence scores for rendering.
//! - Select verdict labels from the service's authoritative match decision.
//! - Apply the presentation-local confidence partition for recognize.
//! - Project submission lifecycle states into status text.
//!
//! ## Data flow
//! Workflow outcomes -> `present_*` functions -> verdict views consumed by
//! the hosting shell.
//!
//! ## Ownership and lifetimes
//! Views own their strings so rendering never borrows workflow state.
//!
//! ## Error model
//! Presentation is total: every mapping is a pure function with no failure
//! path and no side effects.
//!
//! ## Security and privacy notes
//! Views carry verdict text only; no image bytes enter this crate.

use face_console_contract::{CompareOutcome, Operation, RecognizeOutcome, RegisterAck};
use face_console_core::SubmissionState;

/// Verdict label shown for a confirmed match.
pub const MATCH_LABEL: &str = "Match Confirmed";

/// Verdict label shown when no match was detected.
pub const NO_MATCH_LABEL: &str = "No Match Detected";

/// Acknowledgement shown after a successful registration.
pub const REGISTER_CONFIRMATION: &str = "User registered successfully!";

/// Confidence threshold of the presentation-local recognize partition.
///
/// Strictly greater-than: a score of exactly 0.5 takes the low-confidence
/// treatment. This is a display heuristic, not the service's match decision.
pub const IDENTIFIED_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Visual verdict for a pairwise comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchVerdict {
    /// The service decided both images show the same person.
    Match,
    /// The service decided the images show different people.
    NoMatch,
}

/// Display-ready comparison result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareView {
    /// Verdict taken verbatim from the service decision.
    pub verdict: MatchVerdict,
    /// Verdict label text.
    pub label: &'static str,
    /// Similarity score formatted as a percentage with two decimals.
    pub score_text: String,
}

/// Visual treatment for an identification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTreatment {
    /// Confident identification.
    Identified,
    /// Below-threshold confidence; shown with a caution treatment.
    LowConfidence,
}

/// Display-ready identification result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizeView {
    /// Identified name as returned by the service.
    pub name: String,
    /// Selected visual treatment.
    pub treatment: ConfidenceTreatment,
    /// Confidence formatted as a percentage with one decimal.
    pub confidence_text: String,
}

/// Formats a unit-interval score as a percentage with two decimals.
pub fn format_score_percent(score: f32) -> String {
    format!("{:.2}%", score * 100.0)
}

/// Maps a comparison outcome into its display view.
///
/// The match boolean is authoritative from the service; this function never
/// recomputes it from the score.
pub fn present_compare(outcome: &CompareOutcome) -> CompareView {
    let verdict = if outcome.is_match {
        MatchVerdict::Match
    } else {
        MatchVerdict::NoMatch
    };

    CompareView {
        verdict,
        label: match verdict {
            MatchVerdict::Match => MATCH_LABEL,
            MatchVerdict::NoMatch => NO_MATCH_LABEL,
        },
        score_text: format_score_percent(outcome.score),
    }
}

/// Maps an identification outcome into its display view.
pub fn present_recognize(outcome: &RecognizeOutcome) -> RecognizeView {
    let treatment = if outcome.score > IDENTIFIED_CONFIDENCE_THRESHOLD {
        ConfidenceTreatment::Identified
    } else {
        ConfidenceTreatment::LowConfidence
    };

    RecognizeView {
        name: outcome.name.clone(),
        treatment,
        confidence_text: format!("{:.1}%", outcome.score * 100.0),
    }
}

/// Maps a registration acknowledgement into confirmation text.
///
/// A server-provided message is preferred; otherwise the fixed confirmation
/// is shown.
pub fn present_register(ack: &RegisterAck) -> String {
    ack.message
        .clone()
        .unwrap_or_else(|| REGISTER_CONFIRMATION.to_string())
}

/// Projects one submission lifecycle state into status text.
pub fn submission_status<T>(state: &SubmissionState<T>, operation: Operation) -> String {
    match state {
        SubmissionState::Idle => "Ready".to_string(),
        SubmissionState::Pending => busy_label(operation).to_string(),
        SubmissionState::Resolved(_) => "Completed".to_string(),
        SubmissionState::Failed(message) => message.clone(),
    }
}

/// Returns the busy-state label shown while a request is outstanding.
pub fn busy_label(operation: Operation) -> &'static str {
    match operation {
        Operation::Compare => "Analyzing...",
        Operation::Register => "Registering...",
        Operation::Recognize => "Scanning Database...",
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for verdict mapping determinism.

    use super::*;

    #[test]
    fn compare_formats_percentage_with_two_decimals() {
        let view = present_compare(&CompareOutcome {
            score: 0.8734,
            is_match: true,
        });
        assert_eq!(view.score_text, "87.34%");
        assert_eq!(view.label, MATCH_LABEL);
        assert_eq!(view.verdict, MatchVerdict::Match);
    }

    #[test]
    fn compare_verdict_follows_service_decision_not_score() {
        // The service decision stands even when the score looks contradictory.
        let view = present_compare(&CompareOutcome {
            score: 0.99,
            is_match: false,
        });
        assert_eq!(view.verdict, MatchVerdict::NoMatch);
        assert_eq!(view.label, NO_MATCH_LABEL);
    }

    #[test]
    fn recognize_treats_exactly_half_as_low_confidence() {
        let view = present_recognize(&RecognizeOutcome {
            name: "Jane Doe".to_string(),
            score: 0.5,
        });
        assert_eq!(view.treatment, ConfidenceTreatment::LowConfidence);
        assert_eq!(view.confidence_text, "50.0%");

        let confident = present_recognize(&RecognizeOutcome {
            name: "Jane Doe".to_string(),
            score: 0.51,
        });
        assert_eq!(confident.treatment, ConfidenceTreatment::Identified);
    }

    #[test]
    fn register_prefers_server_message_over_fixed_confirmation() {
        assert_eq!(
            present_register(&RegisterAck::default()),
            REGISTER_CONFIRMATION
        );
        assert_eq!(
            present_register(&RegisterAck {
                message: Some("welcome aboard".to_string()),
            }),
            "welcome aboard"
        );
    }

    #[test]
    fn submission_status_projects_lifecycle_states() {
        let pending: SubmissionState<u8> = SubmissionState::Pending;
        assert_eq!(
            submission_status(&pending, Operation::Recognize),
            "Scanning Database..."
        );

        let failed: SubmissionState<u8> = SubmissionState::Failed("no face found".to_string());
        assert_eq!(submission_status(&failed, Operation::Compare), "no face found");
    }
}
