//! Paths on the two backends. The backends own these contracts.

// Central (auth) backend
pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const LOGOUT: &str = "/auth/logout";
pub const REFRESH: &str = "/auth/token/refresh";
pub const PASSWORD_RESET: &str = "/auth/password-reset";
pub const CHANGE_PASSWORD: &str = "/auth/change-password";
pub const PROFILE: &str = "/auth/profile";
pub const ME: &str = "/auth/me";

// Application backend
pub const USERS: &str = "/users";
pub const PLAYERS: &str = "/players";
pub const DASHBOARD_STATS: &str = "/dashboard/stats";

/// Endpoints where a 401 means bad credentials rather than an expired session.
pub const CREDENTIAL_ENDPOINTS: &[&str] = &[LOGIN, REGISTER, PASSWORD_RESET];

pub fn user(id: &str) -> String {
    format!("{}/{}", USERS, id)
}

pub fn player(id: &str) -> String {
    format!("{}/{}", PLAYERS, id)
}

pub fn player_photo(id: &str) -> String {
    format!("{}/{}/photo", PLAYERS, id)
}
