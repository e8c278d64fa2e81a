//! Shared fixtures for app integration tests.

use std::sync::{Arc, Mutex};

use face_console_client::{
    ApiBase, ApiRequest, ApiResponse, ApiTransport, ClientError, RecognitionClient,
};
use face_console_core::ImageHandle;

/// Creates a deterministic JPEG handle fixture.
#[allow(dead_code)]
pub fn fixture_handle(name: &str) -> ImageHandle {
    ImageHandle::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
        .expect("fixture handle should be valid")
}

/// Transport that replays scripted responses and records every request.
pub struct ScriptedTransport {
    responses: Mutex<Vec<Result<ApiResponse, ClientError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    /// Creates a transport that serves the given responses in order.
    #[allow(dead_code)]
    pub fn new(responses: Vec<Result<ApiResponse, ClientError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Creates a transport serving one JSON response.
    #[allow(dead_code)]
    pub fn single(status: u16, body: &str) -> Arc<Self> {
        Self::new(vec![Ok(ApiResponse {
            status,
            body: body.as_bytes().to_vec(),
        })])
    }

    /// Returns how many requests reached the transport.
    #[allow(dead_code)]
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .map(|requests| requests.len())
            .unwrap_or(0)
    }

    /// Returns the URL of request `index`.
    #[allow(dead_code)]
    pub fn request_url(&self, index: usize) -> Option<String> {
        self.requests
            .lock()
            .ok()
            .and_then(|requests| requests.get(index).map(|request| request.url.clone()))
    }
}

impl ApiTransport for ScriptedTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| ClientError::Transport("scripted response lock poisoned".to_string()))?;
        if responses.is_empty() {
            return Err(ClientError::Transport(
                "no scripted response left".to_string(),
            ));
        }
        responses.remove(0)
    }
}

/// Builds a client over a scripted transport.
#[allow(dead_code)]
pub fn client_with(transport: Arc<ScriptedTransport>) -> RecognitionClient {
    RecognitionClient::new(
        ApiBase::parse("http://service.test").expect("test base should parse"),
        transport,
    )
}
