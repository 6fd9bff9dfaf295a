use super::{endpoints, ApiClient, ApiRequest, Backend, Resource};
use crate::error::ApiError;
use crate::models::DashboardStats;

pub struct DashboardClient {
    api: ApiClient,
}

impl DashboardClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.api
            .send_json(
                ApiRequest::get(Backend::App, endpoints::DASHBOARD_STATS),
                Resource::Dashboard,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ApiResponse;
    use crate::session::{FixedClock, MemoryStore, SessionManager};
    use crate::test_support::{FakeTransport, RecordingNavigator};
    use chrono::Utc;
    use http::StatusCode;
    use std::sync::Arc;

    fn dashboard(transport: FakeTransport) -> DashboardClient {
        let transport = Arc::new(transport);
        let session = Arc::new(SessionManager::new(
            Arc::new(MemoryStore::new()),
            transport.clone(),
            Arc::new(FixedClock::new(Utc::now())),
            Arc::new(RecordingNavigator::default()),
        ));
        DashboardClient::new(ApiClient::new(session, transport))
    }

    #[tokio::test]
    async fn test_unexpected_body_is_decode_error() {
        let client = dashboard(FakeTransport::new(|_| {
            Ok(ApiResponse::new(StatusCode::OK, "<html></html>"))
        }));
        assert!(matches!(client.stats().await, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_generic() {
        let client = dashboard(FakeTransport::new(|_| {
            Ok(ApiResponse::new(StatusCode::BAD_GATEWAY, "upstream exploded"))
        }));
        let err = client.stats().await.unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 502, .. }));
        assert!(!err.user_message().contains("exploded"));
    }
}
