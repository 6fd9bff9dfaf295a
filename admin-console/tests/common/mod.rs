//! Shared setup for admin-console integration tests.
//!
//! Both backends are `wiremock` servers; the session lives in a temp file.

#![allow(dead_code)]

use admin_console::models::TokenPair;
use admin_console::services::ReqwestTransport;
use admin_console::session::{FileStore, Navigator, SystemClock};
use admin_console::startup::build_state_with;
use admin_console::AppState;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

pub const REFRESH_TOKEN: &str = "refresh-token-1";

#[derive(Default)]
pub struct CountingNavigator {
    redirects: AtomicUsize,
}

impl CountingNavigator {
    pub fn count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for CountingNavigator {
    fn redirect_to_login(&self, _reason: &str) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

/// Test application wired against two mock backends.
pub struct TestApp {
    pub central: MockServer,
    pub app: MockServer,
    pub state: AppState,
    pub navigator: Arc<CountingNavigator>,
    pub session_file: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let central = MockServer::start().await;
        let app = MockServer::start().await;
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let session_file = dir.path().join("session.json");
        let navigator = Arc::new(CountingNavigator::default());
        let state = build(&central, &app, &session_file, navigator.clone());

        Self {
            central,
            app,
            state,
            navigator,
            session_file,
            _dir: dir,
        }
    }

    /// A second process sharing the same session file.
    pub fn reopen(&self) -> AppState {
        build(
            &self.central,
            &self.app,
            &self.session_file,
            Arc::new(CountingNavigator::default()),
        )
    }

    /// Store a token pair as if a login had happened earlier.
    pub fn sign_in(&self, access_token: &str) {
        self.state
            .session
            .establish(&TokenPair::new(access_token, REFRESH_TOKEN))
            .expect("Failed to store tokens");
    }
}

fn build(
    central: &MockServer,
    app: &MockServer,
    session_file: &PathBuf,
    navigator: Arc<CountingNavigator>,
) -> AppState {
    let transport = ReqwestTransport::with_urls(&central.uri(), &app.uri(), Duration::from_secs(5))
        .expect("Failed to build transport");
    build_state_with(
        Arc::new(FileStore::new(session_file)),
        Arc::new(transport),
        Arc::new(SystemClock),
        navigator,
    )
}

/// Unsigned JWT with the given lifetime and role identifiers.
pub fn token(expires_in_secs: i64, roles: &[&str]) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let now = Utc::now().timestamp();
    let payload = serde_json::json!({
        "sub": "42",
        "email": "operator@example.com",
        "iat": now,
        "exp": now + expires_in_secs,
        "roles": roles,
        "jti": uuid::Uuid::new_v4().to_string(),
    });
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.signature", header, payload)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn user_page(count: u64, emails: &[&str]) -> serde_json::Value {
    let results: Vec<_> = emails
        .iter()
        .enumerate()
        .map(|(i, email)| serde_json::json!({ "id": i + 1, "email": email, "is_active": true }))
        .collect();
    serde_json::json!({ "count": count, "next": null, "previous": null, "results": results })
}
