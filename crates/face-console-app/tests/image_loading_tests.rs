//! Integration tests for operator file loading.

use std::path::Path;

use face_console_app::{AppError, load_image_handle, mime_for_path};

#[test]
fn image_loading_tests_maps_supported_extensions() {
    assert_eq!(
        mime_for_path(Path::new("face.JPG")).expect("jpg should map"),
        "image/jpeg"
    );
    assert_eq!(
        mime_for_path(Path::new("face.png")).expect("png should map"),
        "image/png"
    );
    assert!(matches!(
        mime_for_path(Path::new("face.gif")),
        Err(AppError::UnsupportedImage(_))
    ));
    assert!(mime_for_path(Path::new("face")).is_err());
}

#[test]
fn image_loading_tests_missing_file_is_an_io_error() {
    let error = load_image_handle(Path::new("does-not-exist.jpg"))
        .expect_err("missing file should not load");
    assert!(matches!(error, AppError::Io(_)));
}
