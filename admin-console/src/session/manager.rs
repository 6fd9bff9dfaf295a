//! Session manager and the access-token refresh protocol.
//!
//! ```text
//!                 login                    401 on a request
//! Unauthenticated ─────▶ Authenticated ──────────────────────▶ Refreshing
//!        ▲                    ▲                                   │  │
//!        │                    └──────── refresh succeeded ────────┘  │
//!        └─────────────── refresh failed / logout ───────────────────┘
//! ```
//!
//! At most one refresh call is on the network at any time. Callers that hit a
//! 401 while a refresh is running are parked in a FIFO queue and resumed with
//! that refresh's outcome.

use super::{Clock, KeyValueStore, Navigator, SessionStore, StoreError};
use crate::middleware::auth::attach_credentials;
use crate::models::{RefreshResponse, RemoteUser, Role, SessionUser, TokenPair};
use crate::services::{endpoints, ApiRequest, Backend, Transport};
use crate::utils::jwt::{derive_role, is_token_live};
use secrecy::{ExposeSecret, Secret};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    Refreshing,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("no refresh token stored")]
    NoRefreshToken,
    #[error("refresh rejected: {0}")]
    Rejected(String),
    #[error("session ended while the refresh was in flight")]
    SessionEnded,
    #[error("refresh was interrupted")]
    Cancelled,
}

type RefreshOutcome = Result<Secret<String>, RefreshError>;

#[derive(Default)]
struct RefreshState {
    in_progress: bool,
    pending: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

/// Clears the in-flight flag and hands the outcome to every parked caller.
///
/// If the refreshing task is dropped before completing, parked callers are
/// woken with `Cancelled` so one of them can take over.
struct RefreshFlight<'a> {
    state: &'a Mutex<RefreshState>,
    completed: bool,
}

impl RefreshFlight<'_> {
    fn take_waiters(&self) -> VecDeque<oneshot::Sender<RefreshOutcome>> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.in_progress = false;
        std::mem::take(&mut state.pending)
    }

    fn complete(mut self, outcome: &RefreshOutcome) {
        self.completed = true;
        let waiters = self.take_waiters();
        tracing::debug!(waiters = waiters.len(), "Resuming callers parked on refresh");
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for RefreshFlight<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        for waiter in self.take_waiters() {
            let _ = waiter.send(Err(RefreshError::Cancelled));
        }
    }
}

pub struct SessionManager {
    store: SessionStore,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    navigator: Arc<dyn Navigator>,
    refresh: Mutex<RefreshState>,
    redirecting: AtomicBool,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store: SessionStore::new(store),
            transport,
            clock,
            navigator,
            refresh: Mutex::new(RefreshState::default()),
            redirecting: AtomicBool::new(false),
        }
    }

    fn refresh_state(&self) -> MutexGuard<'_, RefreshState> {
        self.refresh.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        self.store.tokens()
    }

    /// A token pair is stored, regardless of expiry.
    pub fn has_session(&self) -> bool {
        self.store.tokens().is_some()
    }

    /// Pair present and access token not yet expired. Never touches the network.
    pub fn is_authenticated(&self) -> bool {
        match self.store.tokens() {
            Some(pair) => is_token_live(pair.access_token(), self.clock.now()),
            None => false,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.refresh_state().in_progress {
            SessionState::Refreshing
        } else if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Role derived from the current access token.
    pub fn current_role(&self) -> Option<Role> {
        self.store
            .tokens()
            .map(|pair| derive_role(pair.access_token()))
    }

    /// Cached snapshot; provisional until rebuilt with [`Self::remember_user`].
    pub fn cached_user(&self) -> Option<SessionUser> {
        if !self.has_session() {
            return None;
        }
        self.store.cached_user()
    }

    /// Store a fresh token pair after a successful login.
    pub fn establish(&self, tokens: &TokenPair) -> Result<(), StoreError> {
        self.store.save_tokens(tokens)?;
        self.redirecting.store(false, Ordering::SeqCst);
        tracing::info!("Session established");
        Ok(())
    }

    /// Build and cache the user snapshot, taking the role from the access token.
    pub fn remember_user(&self, remote: &RemoteUser) -> Result<SessionUser, StoreError> {
        let role = self.current_role().unwrap_or_default();
        if let Some(claimed) = remote.role.as_deref() {
            if claimed != role.as_str() {
                tracing::debug!(
                    user_id = %remote.id,
                    claimed,
                    derived = %role,
                    "Ignoring server-claimed role in favour of token role"
                );
            }
        }

        let user = SessionUser::from_remote(remote, role);
        self.store.save_user(&user)?;
        Ok(user)
    }

    /// Decorate `request` with the current access token, returning the token used.
    pub fn attach_credentials(&self, request: &mut ApiRequest) -> Option<Secret<String>> {
        let token = self.store.access_token();
        attach_credentials(request, token.as_ref());
        token
    }

    /// Obtain a new access token, sharing any refresh already in flight.
    pub async fn refresh(&self) -> Result<Secret<String>, RefreshError> {
        self.refresh_after(None).await
    }

    /// Like [`Self::refresh`], for a request that was rejected while carrying
    /// `rejected_token`. If the stored token has already moved on, it is
    /// returned without another network call.
    pub async fn refresh_after(
        &self,
        rejected_token: Option<&str>,
    ) -> Result<Secret<String>, RefreshError> {
        loop {
            let waiter = {
                let mut state = self.refresh_state();
                if state.in_progress {
                    let (tx, rx) = oneshot::channel();
                    state.pending.push_back(tx);
                    Some(rx)
                } else {
                    if let (Some(rejected), Some(current)) =
                        (rejected_token, self.store.access_token())
                    {
                        if current.expose_secret() != rejected {
                            tracing::debug!("Access token already replaced, skipping refresh");
                            return Ok(current);
                        }
                    }
                    state.in_progress = true;
                    None
                }
            };

            let Some(rx) = waiter else {
                return self.lead_refresh().await;
            };

            tracing::debug!("Refresh in flight, waiting for its outcome");
            match rx.await {
                Ok(Err(RefreshError::Cancelled)) | Err(_) => {
                    tracing::debug!("Refresh leader went away, retrying");
                    continue;
                }
                Ok(outcome) => return outcome,
            }
        }
    }

    async fn lead_refresh(&self) -> RefreshOutcome {
        let flight = RefreshFlight {
            state: &self.refresh,
            completed: false,
        };

        let outcome = self.exchange_refresh_token().await;

        match &outcome {
            Ok(_) => tracing::info!("Access token refreshed"),
            Err(RefreshError::SessionEnded) => {
                tracing::debug!("Session ended during refresh");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, ending session");
                self.end_session("Your session has expired.");
            }
        }

        flight.complete(&outcome);
        outcome
    }

    async fn exchange_refresh_token(&self) -> RefreshOutcome {
        let refresh_token = self
            .store
            .refresh_token()
            .ok_or(RefreshError::NoRefreshToken)?;

        let request = ApiRequest::post(Backend::Central, endpoints::REFRESH)
            .json(&serde_json::json!({ "refresh_token": refresh_token.expose_secret() }))
            .map_err(|e| RefreshError::Rejected(e.to_string()))?;

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| RefreshError::Rejected(e.to_string()))?;

        if !response.status.is_success() {
            return Err(RefreshError::Rejected(format!(
                "refresh endpoint returned {}",
                response.status
            )));
        }

        let body: RefreshResponse = response
            .json_body()
            .map_err(|e| RefreshError::Rejected(format!("malformed refresh response: {}", e)))?;

        match self.store.replace_access_token(&body.access_token) {
            Ok(true) => Ok(Secret::new(body.access_token)),
            Ok(false) => Err(RefreshError::SessionEnded),
            Err(e) => Err(RefreshError::Rejected(format!(
                "could not store refreshed token: {}",
                e
            ))),
        }
    }

    /// Involuntary teardown. Clears storage every time; redirects only once
    /// per session.
    pub fn end_session(&self, reason: &str) {
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear session storage");
        }

        if !self.redirecting.swap(true, Ordering::SeqCst) {
            self.navigator.redirect_to_login(reason);
        }
    }

    /// Voluntary logout.
    ///
    /// Storage is cleared before this returns. The remote logout call runs in
    /// the background and its failure is ignored; the handle is returned so a
    /// short-lived process can wait for it. Returns `None` when there was no
    /// session to revoke or no runtime to run the call on.
    pub fn logout(&self) -> Option<JoinHandle<()>> {
        let tokens = self.store.tokens();

        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear session storage on logout");
        }

        let tokens = tokens?;
        tracing::info!("Session cleared");

        let mut request = match ApiRequest::post(Backend::Central, endpoints::LOGOUT)
            .json(&serde_json::json!({ "refresh_token": tokens.refresh_token() }))
        {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Could not build logout request");
                return None;
            }
        };
        attach_credentials(&mut request, Some(&tokens.access));

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("No async runtime available, skipping remote logout");
                return None;
            }
        };

        let transport = Arc::clone(&self.transport);
        Some(handle.spawn(async move {
            match transport.send(request).await {
                Ok(response) if response.status.is_success() => {
                    tracing::debug!("Remote logout succeeded");
                }
                Ok(response) => {
                    tracing::debug!(status = response.status.as_u16(), "Remote logout rejected, ignoring");
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Remote logout failed, ignoring");
                }
            }
        }))
    }
}
