pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod session;
pub mod startup;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

use services::{AuthClient, DashboardClient, PlayerClient, UserClient};
use session::SessionManager;
use std::sync::Arc;

/// Shared application state containing the session and service clients
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionManager>,
    pub auth_client: Arc<AuthClient>,
    pub user_client: Arc<UserClient>,
    pub player_client: Arc<PlayerClient>,
    pub dashboard_client: Arc<DashboardClient>,
}
