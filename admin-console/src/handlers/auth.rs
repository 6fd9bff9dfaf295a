use super::{require_session, to_json, CommandError};
use crate::models::{
    ChangePasswordRequest, LoginRequest, PasswordResetRequest, ProfileUpdate, RegisterRequest,
};
use crate::session::SessionState;
use crate::AppState;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Use the given password or read one line from stdin.
async fn resolve_password(password: Option<String>) -> Result<String, CommandError> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .map_err(|e| CommandError::Input(format!("Could not read password: {}", e)))?;

    let password = line.trim_end_matches(&['\r', '\n'][..]).to_string();
    if password.is_empty() {
        return Err(CommandError::Input("A password is required.".to_string()));
    }
    Ok(password)
}

pub async fn login(
    state: &AppState,
    email: String,
    password: Option<String>,
) -> Result<Value, CommandError> {
    let password = resolve_password(password).await?;
    let user = state
        .auth_client
        .login(&LoginRequest { email, password })
        .await?;
    to_json(&user)
}

pub async fn logout(state: &AppState) -> Result<Value, CommandError> {
    if let Some(remote) = state.auth_client.logout() {
        // Local state is already gone; this only waits for the revoke call.
        let _ = remote.await;
    }
    Ok(json!({ "logged_out": true }))
}

pub async fn whoami(state: &AppState, cached: bool) -> Result<Value, CommandError> {
    require_session(state)?;
    if cached {
        return match state.auth_client.current_user() {
            Some(user) => to_json(&user),
            None => Err(CommandError::NotLoggedIn),
        };
    }
    let user = state.auth_client.me().await?;
    to_json(&user)
}

/// Local view only: never touches the network.
pub fn status(state: &AppState) -> Result<Value, CommandError> {
    let session = &state.session;
    let state_name = match session.state() {
        SessionState::Authenticated => "authenticated",
        SessionState::Refreshing => "refreshing",
        SessionState::Unauthenticated if session.has_session() => "expired",
        SessionState::Unauthenticated => "unauthenticated",
    };

    let user = session.cached_user();
    Ok(json!({
        "state": state_name,
        "role": session.current_role(),
        "initials": user.as_ref().map(|u| u.initials()),
        "user": user,
    }))
}

pub async fn register(
    state: &AppState,
    email: String,
    first_name: String,
    last_name: String,
    password: Option<String>,
) -> Result<Value, CommandError> {
    let password = resolve_password(password).await?;
    let user = state
        .auth_client
        .register(&RegisterRequest {
            email,
            password,
            first_name,
            last_name,
        })
        .await?;
    to_json(&user)
}

pub async fn reset_password(state: &AppState, email: String) -> Result<Value, CommandError> {
    state
        .auth_client
        .request_password_reset(&PasswordResetRequest { email })
        .await?;
    Ok(json!({ "reset_requested": true }))
}

pub async fn change_password(
    state: &AppState,
    old_password: String,
    new_password: String,
) -> Result<Value, CommandError> {
    require_session(state)?;
    state
        .auth_client
        .change_password(&ChangePasswordRequest {
            old_password,
            new_password,
        })
        .await?;
    Ok(json!({ "password_changed": true }))
}

pub async fn profile(
    state: &AppState,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
) -> Result<Value, CommandError> {
    require_session(state)?;
    let update = ProfileUpdate {
        email,
        first_name,
        last_name,
    };
    if update.email.is_none() && update.first_name.is_none() && update.last_name.is_none() {
        return Err(CommandError::Input(
            "Pass at least one of --first-name, --last-name or --email.".to_string(),
        ));
    }
    let user = state.auth_client.update_profile(&update).await?;
    to_json(&user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_state::{signed_in, state};
    use crate::services::{endpoints, ApiResponse};
    use crate::test_support::FakeTransport;
    use http::StatusCode;

    #[test]
    fn test_status_reports_role_without_network() {
        let (app, transport) = signed_in(FakeTransport::offline(), &["super_admin"]);
        let value = status(&app).unwrap();
        assert_eq!(value["state"], "authenticated");
        assert_eq!(value["role"], "admin");
        assert!(value["initials"].is_null());
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_status_shows_initials_of_cached_user() {
        let (app, _) = signed_in(FakeTransport::offline(), &["subscriber"]);
        let remote: crate::models::RemoteUser = serde_json::from_value(json!({
            "id": 3, "email": "ada@example.com", "first_name": "ada", "last_name": "king"
        }))
        .unwrap();
        app.session.remember_user(&remote).unwrap();

        let value = status(&app).unwrap();
        assert_eq!(value["initials"], "AK");
        assert_eq!(value["user"]["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn test_logout_waits_for_revoke_and_ignores_failure() {
        let (app, transport) = signed_in(
            FakeTransport::new(|_| Ok(ApiResponse::new(StatusCode::BAD_GATEWAY, ""))),
            &["admin"],
        );
        let value = logout(&app).await.unwrap();
        assert_eq!(value["logged_out"], true);
        assert_eq!(transport.count_path(endpoints::LOGOUT), 1);
        assert!(!app.session.has_session());

        logout(&app).await.unwrap();
        assert_eq!(transport.count_path(endpoints::LOGOUT), 1);
    }

    #[tokio::test]
    async fn test_login_with_bad_credentials() {
        let (app, transport) = state(FakeTransport::new(|_| {
            Ok(ApiResponse::new(
                StatusCode::UNAUTHORIZED,
                r#"{"error": "Invalid email or password"}"#,
            ))
        }));
        let err = login(&app, "a@example.com".to_string(), Some("wrong-pass".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(transport.count_path(endpoints::REFRESH), 0);
    }
}
