use super::{endpoints, ApiClient, ApiRequest, Backend, Resource};
use crate::error::ApiError;
use crate::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, PasswordResetRequest, ProfileUpdate,
    RegisterRequest, RemoteUser, SessionUser,
};
use crate::session::SessionManager;
use tokio::task::JoinHandle;
use validator::Validate;

/// Calls against the central auth backend.
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchange credentials for a token pair and cache the operator.
    ///
    /// When the login body carries no user, `/auth/me` is asked. If that
    /// fails the half-made session is discarded again.
    pub async fn login(&self, request: &LoginRequest) -> Result<SessionUser, ApiError> {
        request.validate()?;

        let http = ApiRequest::post(Backend::Central, endpoints::LOGIN).json(request)?;
        let response: LoginResponse = self.api.send_json(http, Resource::Credentials).await?;

        let session = self.api.session();
        session.establish(&response.tokens())?;

        let remote = match response.user {
            Some(user) => user,
            None => match self.fetch_me().await {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!(error = %e, "Login succeeded but the profile could not be loaded");
                    discard_session(session);
                    return Err(e);
                }
            },
        };

        let user = session.remember_user(&remote).map_err(|e| {
            discard_session(session);
            ApiError::from(e)
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(user)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<RemoteUser, ApiError> {
        request.validate()?;
        let http = ApiRequest::post(Backend::Central, endpoints::REGISTER).json(request)?;
        let user: RemoteUser = self.api.send_json(http, Resource::Credentials).await?;
        tracing::info!(user_id = %user.id, "Account registered");
        Ok(user)
    }

    /// Clears the local session immediately; see [`crate::session::SessionManager::logout`].
    pub fn logout(&self) -> Option<JoinHandle<()>> {
        self.api.session().logout()
    }

    pub async fn request_password_reset(&self, request: &PasswordResetRequest) -> Result<(), ApiError> {
        request.validate()?;
        let http = ApiRequest::post(Backend::Central, endpoints::PASSWORD_RESET).json(request)?;
        self.api.send_empty(http, Resource::Credentials).await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), ApiError> {
        request.validate()?;
        let http = ApiRequest::post(Backend::Central, endpoints::CHANGE_PASSWORD).json(request)?;
        self.api.send_empty(http, Resource::Account).await?;
        tracing::info!("Password changed");
        Ok(())
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<SessionUser, ApiError> {
        update.validate()?;
        let http = ApiRequest::patch(Backend::Central, endpoints::PROFILE).json(update)?;
        let remote: RemoteUser = self.api.send_json(http, Resource::Account).await?;
        Ok(self.api.session().remember_user(&remote)?)
    }

    /// Revalidate the cached operator against the backend.
    pub async fn me(&self) -> Result<SessionUser, ApiError> {
        let remote = self.fetch_me().await?;
        Ok(self.api.session().remember_user(&remote)?)
    }

    /// Cached operator without a network call. Provisional until [`Self::me`].
    pub fn current_user(&self) -> Option<SessionUser> {
        self.api.session().cached_user()
    }

    async fn fetch_me(&self) -> Result<RemoteUser, ApiError> {
        self.api
            .send_json(ApiRequest::get(Backend::Central, endpoints::ME), Resource::Account)
            .await
    }
}

fn discard_session(session: &SessionManager) {
    if let Err(e) = session.store().clear() {
        tracing::warn!(error = %e, "Failed to discard half-made session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::services::{ApiResponse, TransportError};
    use crate::session::{FixedClock, MemoryStore, SessionManager};
    use crate::test_support::{make_token, FakeTransport, RecordingNavigator};
    use chrono::Utc;
    use http::StatusCode;
    use std::sync::Arc;

    fn auth(transport: FakeTransport) -> (AuthClient, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        let session = Arc::new(SessionManager::new(
            Arc::new(MemoryStore::new()),
            transport.clone(),
            Arc::new(FixedClock::new(Utc::now())),
            Arc::new(RecordingNavigator::default()),
        ));
        (AuthClient::new(ApiClient::new(session, transport.clone())), transport)
    }

    fn credentials() -> LoginRequest {
        LoginRequest {
            email: "scout@example.com".to_string(),
            password: "hunter22".to_string(),
        }
    }

    fn ok(body: serde_json::Value) -> Result<ApiResponse, TransportError> {
        Ok(ApiResponse::new(StatusCode::OK, body.to_string()))
    }

    #[tokio::test]
    async fn test_login_fetches_profile_when_missing() {
        let access = make_token(3600, &["subscriber"]);
        let (client, transport) = auth(FakeTransport::new(move |request| match request.path.as_str() {
            endpoints::LOGIN => ok(serde_json::json!({ "access_token": access, "refresh_token": "r" })),
            endpoints::ME => ok(serde_json::json!({ "id": 5, "email": "scout@example.com", "role": "admin" })),
            _ => Ok(ApiResponse::new(StatusCode::NOT_FOUND, "")),
        }));

        let user = client.login(&credentials()).await.unwrap();
        assert_eq!(user.role, Role::Scout);
        assert_eq!(user.id, "5");
        assert_eq!(transport.count_path(endpoints::ME), 1);
        assert_eq!(client.current_user(), Some(user));
    }

    #[tokio::test]
    async fn test_failed_profile_fetch_discards_session() {
        let access = make_token(3600, &[]);
        let (client, _) = auth(FakeTransport::new(move |request| match request.path.as_str() {
            endpoints::LOGIN => ok(serde_json::json!({ "access_token": access, "refresh_token": "r" })),
            _ => Ok(ApiResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "")),
        }));

        let err = client.login(&credentials()).await.unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 500, .. }));
        assert!(client.current_user().is_none());
        assert!(!client.api.session().has_session());
    }

    #[tokio::test]
    async fn test_invalid_login_is_not_sent() {
        let (client, transport) = auth(FakeTransport::offline());
        let err = client
            .login(&LoginRequest {
                email: "nope".to_string(),
                password: String::new(),
            })
            .await
            .unwrap_err();
        assert!(err.field_errors().is_some());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_me_recomputes_role_from_token() {
        let access = make_token(3600, &["limited_user"]);
        let (client, _) = auth(FakeTransport::new(|_| {
            ok(serde_json::json!({ "id": "u1", "email": "p@example.com", "role": "admin" }))
        }));
        client
            .api
            .session()
            .establish(&crate::models::TokenPair::new(access, "r"))
            .unwrap();

        let user = client.me().await.unwrap();
        assert_eq!(user.role, Role::Player);
    }
}
