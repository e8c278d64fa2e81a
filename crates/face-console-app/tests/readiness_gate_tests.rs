//! Integration tests for the readiness precondition inside submit.

mod common;

use std::sync::Arc;

use face_console_app::{
    CompareWorkflow, RecognizeWorkflow, RegisterWorkflow, SubmitDisposition,
};
use face_console_capture::SyntheticCameraBackend;
use face_console_core::SubmissionState;

#[test]
fn readiness_gate_tests_compare_needs_both_slots() {
    let transport = common::ScriptedTransport::new(vec![]);
    let client = common::client_with(transport.clone());

    let mut workflow = CompareWorkflow::new();
    workflow.set_reference(common::fixture_handle("reference.jpg"));

    assert_eq!(workflow.submit(&client), SubmitDisposition::NotReady);
    assert_eq!(transport.request_count(), 0);
    assert!(matches!(workflow.state(), SubmissionState::Idle));
}

#[test]
fn readiness_gate_tests_register_needs_photo_and_name() {
    let transport = common::ScriptedTransport::new(vec![]);
    let client = common::client_with(transport.clone());

    let mut workflow = RegisterWorkflow::new(Arc::new(SyntheticCameraBackend::new()));
    workflow.set_photo(common::fixture_handle("photo.jpg"));
    workflow.set_name("   ");

    assert_eq!(workflow.submit(&client), SubmitDisposition::NotReady);

    workflow.set_name("Jane Doe");
    workflow.clear_photo();
    assert_eq!(workflow.submit(&client), SubmitDisposition::NotReady);
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn readiness_gate_tests_recognize_never_dispatches_without_probe() {
    let transport = common::ScriptedTransport::new(vec![]);
    let client = common::client_with(transport.clone());

    let mut workflow = RecognizeWorkflow::new(Arc::new(SyntheticCameraBackend::new()));
    assert_eq!(workflow.submit(&client), SubmitDisposition::NotReady);
    assert_eq!(transport.request_count(), 0);
}
