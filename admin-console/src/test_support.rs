//! Fakes shared by unit tests.

use crate::services::{ApiRequest, ApiResponse, Transport, TransportError};
use crate::session::Navigator;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Unsigned JWT expiring `expires_in_secs` from now (negative for the past).
pub fn make_token(expires_in_secs: i64, roles: &[&str]) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = serde_json::json!({
        "sub": "user-1",
        "email": "user@example.com",
        "exp": Utc::now().timestamp() + expires_in_secs,
        "iat": Utc::now().timestamp(),
        "roles": roles,
        "nonce": uuid::Uuid::new_v4().to_string(),
    });
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.signature", header, payload)
}

type Handler = dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync;

pub struct FakeTransport {
    handler: Box<Handler>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            delays: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails as if the network were down.
    pub fn offline() -> Self {
        Self::new(|_| Err(TransportError::Connect("network is unreachable".to_string())))
    }

    /// Hold responses for `path` back by `delay`.
    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn count_path(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delays.get(&request.path) {
            tokio::time::sleep(*delay).await;
        }
        (self.handler)(&request)
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self, _reason: &str) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}
