//! Decorated client: credentials on the way out, refresh-and-retry on 401.

use super::{ApiRequest, ApiResponse, Backend, Transport};
use crate::error::ApiError;
use crate::middleware::auth::{attach_credentials, is_credential_endpoint};
use crate::models::Paginated;
use crate::session::SessionManager;
use http::StatusCode;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// What a request is about, used to phrase 401 and 404 messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Login, registration and password reset.
    Credentials,
    /// The signed-in operator's own account.
    Account,
    User,
    Player,
    Dashboard,
}

impl Resource {
    pub fn not_found_message(&self) -> &'static str {
        match self {
            Resource::Credentials | Resource::Account => "Account not found.",
            Resource::User => "User not found.",
            Resource::Player => "Player not found.",
            Resource::Dashboard => "Dashboard data is not available.",
        }
    }

    pub fn unauthorized_message(&self) -> &'static str {
        match self {
            Resource::Credentials => "Invalid email or password.",
            _ => "Your session has expired. Please log in again.",
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    session: Arc<SessionManager>,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(session: Arc<SessionManager>, transport: Arc<dyn Transport>) -> Self {
        Self { session, transport }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Send `request`, refreshing the access token and retrying once on 401.
    ///
    /// Non-success responses are classified into [`ApiError`].
    pub async fn send(&self, request: ApiRequest, resource: Resource) -> Result<ApiResponse, ApiError> {
        let mut outgoing = request.clone();
        let sent_with = self.session.attach_credentials(&mut outgoing);
        let response = self.transport.send(outgoing).await?;

        if response.status != StatusCode::UNAUTHORIZED || is_credential_endpoint(&request) {
            return Self::classify(&request, response, resource);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            "Request unauthorized, refreshing access token"
        );

        let token = self
            .session
            .refresh_after(sent_with.as_ref().map(|t| t.expose_secret().as_str()))
            .await?;

        let mut retry = request;
        attach_credentials(&mut retry, Some(&token));
        let response = self.transport.send(retry.clone()).await?;
        Self::classify(&retry, response, resource)
    }

    fn classify(
        request: &ApiRequest,
        response: ApiResponse,
        resource: Resource,
    ) -> Result<ApiResponse, ApiError> {
        if response.status.is_success() {
            return Ok(response);
        }

        let error = ApiError::from_response(response.status, &response.body, resource);
        if response.status.is_server_error() {
            tracing::warn!(
                method = %request.method,
                path = %request.path,
                status = response.status.as_u16(),
                "Backend returned a server error"
            );
        } else {
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                status = response.status.as_u16(),
                error = %error,
                "Request rejected"
            );
        }
        Err(error)
    }

    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        resource: Resource,
    ) -> Result<T, ApiError> {
        let response = self.send(request, resource).await?;
        Ok(response.json_body()?)
    }

    /// For endpoints whose success body is irrelevant.
    pub async fn send_empty(&self, request: ApiRequest, resource: Resource) -> Result<(), ApiError> {
        self.send(request, resource).await?;
        Ok(())
    }

    /// Fetch one page of an application list endpoint.
    ///
    /// A page past the end (404, or an empty page after page one) is replaced
    /// by page one. The served page number is recorded in the result.
    pub async fn fetch_page<T, F>(
        &self,
        path: &str,
        page: u32,
        query: F,
        resource: Resource,
    ) -> Result<Paginated<T>, ApiError>
    where
        T: DeserializeOwned,
        F: Fn(u32) -> Vec<(String, String)>,
    {
        let page = page.max(1);
        let request = ApiRequest::get(Backend::App, path).query(query(page));

        match self.send_json::<Paginated<T>>(request, resource).await {
            Ok(mut result) if page == 1 || !result.results.is_empty() => {
                result.page = page;
                Ok(result)
            }
            Ok(_) | Err(ApiError::NotFound(_)) if page > 1 => {
                tracing::debug!(path, page, "Page is past the end, showing the first page");
                let request = ApiRequest::get(Backend::App, path).query(query(1));
                let mut result: Paginated<T> = self.send_json(request, resource).await?;
                result.page = 1;
                Ok(result)
            }
            Ok(mut result) => {
                result.page = page;
                Ok(result)
            }
            Err(e) => Err(e),
        }
    }
}
