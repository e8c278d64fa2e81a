//! Integration tests for the compare submission lifecycle.

mod common;

use face_console_app::{CompareWorkflow, SubmitDisposition};
use face_console_core::SubmissionState;

#[test]
fn compare_submission_tests_resolves_exactly_once_per_submit() {
    let transport = common::ScriptedTransport::single(200, r#"{"score":0.91,"is_match":true}"#);
    let client = common::client_with(transport.clone());

    let mut workflow = CompareWorkflow::new();
    workflow.set_reference(common::fixture_handle("reference.jpg"));
    workflow.set_candidate(common::fixture_handle("candidate.jpg"));

    assert_eq!(workflow.submit(&client), SubmitDisposition::Completed);
    assert_eq!(transport.request_count(), 1);
    assert_eq!(
        transport.request_url(0).as_deref(),
        Some("http://service.test/compare")
    );

    match workflow.state() {
        SubmissionState::Resolved(outcome) => assert!(outcome.is_match),
        other => panic!("unexpected state: {other:?}"),
    }
}

#[test]
fn compare_submission_tests_second_attempt_while_pending_is_a_no_op() {
    let transport = common::ScriptedTransport::single(200, r#"{"score":0.5,"is_match":false}"#);
    let client = common::client_with(transport.clone());

    let mut workflow = CompareWorkflow::new();
    workflow.set_reference(common::fixture_handle("reference.jpg"));
    workflow.set_candidate(common::fixture_handle("candidate.jpg"));

    // Hold the first cycle open, as an event-driven host would.
    let dispatch = workflow
        .begin_submission()
        .expect("first cycle should open");
    assert!(workflow.ready());

    assert_eq!(workflow.submit(&client), SubmitDisposition::AlreadyPending);
    assert_eq!(transport.request_count(), 0);

    let outcome = client
        .compare(&dispatch.reference, &dispatch.candidate)
        .expect("scripted compare should resolve");
    assert!(workflow.apply_outcome(dispatch.ticket, Ok(outcome)));
    assert!(matches!(workflow.state(), SubmissionState::Resolved(_)));
}
