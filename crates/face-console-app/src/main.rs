#![warn(missing_docs)]
//! # face-console binary
//!
//! Console entry point: one-shot compare/register/recognize runs against the
//! configured recognition service, with upload or live-capture acquisition.

use std::path::Path;

use face_console_app::{
    AppError, CompareWorkflow, RecognizeWorkflow, RegisterWorkflow, SubmitDisposition,
    api_base_from_env, app_version, camera_backend_from_env, load_image_handle,
};
use face_console_client::RecognitionClient;
use face_console_core::SubmissionState;
use face_console_ui::{present_compare, present_recognize, present_register};

/// Command-line argument selecting live capture instead of a file path.
const CAMERA_ARG: &str = "--camera";

fn main() {
    env_logger::init();

    if let Err(error) = run() {
        eprintln!("face-console: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    let client = RecognitionClient::with_default_transport(api_base_from_env()?);
    log::info!(
        "face-console {} using service at {}",
        app_version(),
        client.base().as_str()
    );

    match (command.as_str(), args.len()) {
        ("compare", 3) => run_compare(&client, &args[1], &args[2]),
        ("register", 3) => run_register(&client, &args[1], &args[2]),
        ("recognize", 2) => run_recognize(&client, &args[1]),
        _ => {
            print_usage();
            Err(AppError::Usage(format!("unrecognized command '{command}'")))
        }
    }
}

fn run_compare(
    client: &RecognitionClient,
    reference: &str,
    candidate: &str,
) -> Result<(), AppError> {
    let mut workflow = CompareWorkflow::new();
    workflow.set_reference(load_image_handle(Path::new(reference))?);
    workflow.set_candidate(load_image_handle(Path::new(candidate))?);

    expect_completed(workflow.submit(client))?;
    match workflow.state() {
        SubmissionState::Resolved(outcome) => {
            let view = present_compare(outcome);
            println!("{}", view.label);
            println!("Similarity Score: {}", view.score_text);
            Ok(())
        }
        SubmissionState::Failed(message) => Err(AppError::Submission(message.clone())),
        _ => Err(AppError::Submission(
            "comparison did not resolve".to_string(),
        )),
    }
}

fn run_register(client: &RecognitionClient, name: &str, photo: &str) -> Result<(), AppError> {
    let mut workflow = RegisterWorkflow::new(camera_backend_from_env()?);
    workflow.set_name(name);

    if photo == CAMERA_ARG {
        workflow.activate_camera()?;
        if !workflow.capture_into_photo()? {
            return Err(AppError::Usage("capture session was inactive".to_string()));
        }
    } else {
        workflow.set_photo(load_image_handle(Path::new(photo))?);
    }

    expect_completed(workflow.submit(client))?;
    match workflow.state() {
        SubmissionState::Resolved(ack) => {
            println!("{}", present_register(ack));
            Ok(())
        }
        SubmissionState::Failed(message) => Err(AppError::Submission(message.clone())),
        _ => Err(AppError::Submission(
            "registration did not resolve".to_string(),
        )),
    }
}

fn run_recognize(client: &RecognitionClient, probe: &str) -> Result<(), AppError> {
    let mut workflow = RecognizeWorkflow::new(camera_backend_from_env()?);

    if probe == CAMERA_ARG {
        workflow.activate_camera()?;
        if !workflow.capture_into_probe()? {
            return Err(AppError::Usage("capture session was inactive".to_string()));
        }
    } else {
        workflow.set_probe(load_image_handle(Path::new(probe))?);
    }

    expect_completed(workflow.submit(client))?;
    match workflow.state() {
        SubmissionState::Resolved(outcome) => {
            let view = present_recognize(outcome);
            println!("{} (confidence {})", view.name, view.confidence_text);
            Ok(())
        }
        SubmissionState::Failed(message) => Err(AppError::Submission(message.clone())),
        _ => Err(AppError::Submission(
            "identification did not resolve".to_string(),
        )),
    }
}

fn expect_completed(disposition: SubmitDisposition) -> Result<(), AppError> {
    match disposition {
        SubmitDisposition::Completed => Ok(()),
        SubmitDisposition::NotReady => {
            Err(AppError::Usage("required inputs are missing".to_string()))
        }
        SubmitDisposition::AlreadyPending => Err(AppError::Usage(
            "a request is already outstanding".to_string(),
        )),
    }
}

fn print_usage() {
    println!("face-console {}", app_version());
    println!();
    println!("usage:");
    println!("  face-console-app compare <reference.jpg> <candidate.jpg>");
    println!("  face-console-app register <name> <photo.jpg | --camera>");
    println!("  face-console-app recognize <probe.jpg | --camera>");
    println!();
    println!("the service base address is read from FACE_CONSOLE_API_BASE;");
    println!("an HTTP camera snapshot URL may be set via FACE_CONSOLE_CAMERA_URL");
}
