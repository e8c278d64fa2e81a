//! Integration tests for failure message derivation.

mod common;

use std::sync::Arc;

use face_console_app::{RegisterWorkflow, SubmitDisposition};
use face_console_capture::SyntheticCameraBackend;
use face_console_core::SubmissionState;

fn register_workflow() -> RegisterWorkflow {
    let mut workflow = RegisterWorkflow::new(Arc::new(SyntheticCameraBackend::new()));
    workflow.set_photo(common::fixture_handle("photo.jpg"));
    workflow.set_name("Jane Doe");
    workflow
}

#[test]
fn failure_message_tests_service_detail_is_shown_verbatim() {
    let transport =
        common::ScriptedTransport::single(409, r#"{"detail":"name already exists"}"#);
    let client = common::client_with(transport);

    let mut workflow = register_workflow();
    assert_eq!(workflow.submit(&client), SubmitDisposition::Completed);

    match workflow.state() {
        SubmissionState::Failed(message) => assert_eq!(message, "name already exists"),
        other => panic!("unexpected state: {other:?}"),
    }
}

#[test]
fn failure_message_tests_missing_detail_falls_back_to_generic_text() {
    let transport = common::ScriptedTransport::single(500, r#"{"error":"internal"}"#);
    let client = common::client_with(transport);

    let mut workflow = register_workflow();
    assert_eq!(workflow.submit(&client), SubmitDisposition::Completed);

    match workflow.state() {
        SubmissionState::Failed(message) => assert_eq!(message, "Error registering user"),
        other => panic!("unexpected state: {other:?}"),
    }
}

#[test]
fn failure_message_tests_transport_failure_uses_generic_text() {
    let transport = common::ScriptedTransport::new(vec![Err(
        face_console_client::ClientError::Transport("connection refused".to_string()),
    )]);
    let client = common::client_with(transport);

    let mut workflow = register_workflow();
    assert_eq!(workflow.submit(&client), SubmitDisposition::Completed);

    match workflow.state() {
        SubmissionState::Failed(message) => assert_eq!(message, "Error registering user"),
        other => panic!("unexpected state: {other:?}"),
    }
}
