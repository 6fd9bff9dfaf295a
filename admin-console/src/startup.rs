use crate::config::Settings;
use crate::services::{
    ApiClient, AuthClient, DashboardClient, PlayerClient, ReqwestTransport, Transport, UserClient,
};
use crate::session::{
    Clock, ConsoleNavigator, FileStore, KeyValueStore, Navigator, SessionManager, SystemClock,
};
use crate::AppState;
use std::sync::Arc;

/// Wire the session and clients from their parts.
pub fn build_state_with(
    store: Arc<dyn KeyValueStore>,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    navigator: Arc<dyn Navigator>,
) -> AppState {
    let session = Arc::new(SessionManager::new(store, Arc::clone(&transport), clock, navigator));
    let api = ApiClient::new(Arc::clone(&session), transport);

    AppState {
        session,
        auth_client: Arc::new(AuthClient::new(api.clone())),
        user_client: Arc::new(UserClient::new(api.clone())),
        player_client: Arc::new(PlayerClient::new(api.clone())),
        dashboard_client: Arc::new(DashboardClient::new(api)),
    }
}

/// Production wiring: `reqwest` transport and the on-disk session file.
pub fn build_state(settings: &Settings) -> Result<AppState, reqwest::Error> {
    let transport = Arc::new(ReqwestTransport::new(settings)?);
    let session_path = settings.storage.session_path();
    tracing::debug!(path = %session_path.display(), "Using session file");

    Ok(build_state_with(
        Arc::new(FileStore::new(session_path)),
        transport,
        Arc::new(SystemClock),
        Arc::new(ConsoleNavigator),
    ))
}
