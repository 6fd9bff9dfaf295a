pub mod api_client;
pub mod auth_client;
pub mod dashboard_client;
pub mod endpoints;
pub mod player_client;
pub mod transport;
pub mod user_client;

pub use api_client::{ApiClient, Resource};
pub use auth_client::AuthClient;
pub use dashboard_client::DashboardClient;
pub use player_client::PlayerClient;
pub use transport::{
    ApiRequest, ApiResponse, Backend, FormPart, FormValue, ReqwestTransport, RequestBody,
    Transport, TransportError,
};
pub use user_client::UserClient;
