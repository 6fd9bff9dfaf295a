//! One handler per subcommand. Handlers return the JSON document to print.

pub mod auth;
pub mod dashboard;
pub mod players;
pub mod users;

use crate::cli::Command;
use crate::error::ApiError;
use crate::models::Role;
use crate::AppState;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("You are not logged in. Run `admin-console login` first.")]
    NotLoggedIn,

    #[error("This command requires the admin role; you are signed in as {0}.")]
    AdminOnly(Role),

    #[error("{0}")]
    Input(String),
}

impl CommandError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Input(_) | CommandError::Api(ApiError::Validation { .. }) => 2,
            CommandError::NotLoggedIn | CommandError::Api(ApiError::Authentication(_)) => 3,
            CommandError::AdminOnly(_) | CommandError::Api(ApiError::Authorization(_)) => 4,
            _ => 1,
        }
    }
}

pub async fn dispatch(state: &AppState, command: Command) -> Result<Value, CommandError> {
    match command {
        Command::Login { email, password } => auth::login(state, email, password).await,
        Command::Logout => auth::logout(state).await,
        Command::Whoami { cached } => auth::whoami(state, cached).await,
        Command::Status => auth::status(state),
        Command::Register {
            email,
            first_name,
            last_name,
            password,
        } => auth::register(state, email, first_name, last_name, password).await,
        Command::ResetPassword { email } => auth::reset_password(state, email).await,
        Command::ChangePassword {
            old_password,
            new_password,
        } => auth::change_password(state, old_password, new_password).await,
        Command::Profile {
            first_name,
            last_name,
            email,
        } => auth::profile(state, first_name, last_name, email).await,
        Command::Users { command } => users::run(state, command).await,
        Command::Players { command } => players::run(state, command).await,
        Command::Stats => dashboard::stats(state).await,
    }
}

/// A token pair is stored. An expired access token is fine; the first
/// request refreshes it.
pub(crate) fn require_session(state: &AppState) -> Result<(), CommandError> {
    if state.session.has_session() {
        Ok(())
    } else {
        Err(CommandError::NotLoggedIn)
    }
}

/// Role comes from the access token, never from the cached user.
pub(crate) fn require_admin(state: &AppState) -> Result<(), CommandError> {
    require_session(state)?;
    match state.session.current_role() {
        Some(Role::Admin) => Ok(()),
        Some(role) => {
            tracing::debug!(role = %role, "Refusing admin-only command");
            Err(CommandError::AdminOnly(role))
        }
        None => Err(CommandError::NotLoggedIn),
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<Value, CommandError> {
    serde_json::to_value(value).map_err(|e| CommandError::Api(ApiError::from(e)))
}


#[cfg(test)]
mod tests {
    use super::test_state::{signed_in, state};
    use super::*;
    use crate::cli::UsersCommand;
    use crate::test_support::FakeTransport;

    #[tokio::test]
    async fn test_users_commands_need_admin_role() {
        let (app, transport) = signed_in(FakeTransport::offline(), &["subscriber"]);
        let err = dispatch(
            &app,
            Command::Users {
                command: UsersCommand::Get { id: "1".to_string() },
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CommandError::AdminOnly(Role::Scout)));
        assert_eq!(err.exit_code(), 4);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_commands_need_a_session() {
        let (app, transport) = state(FakeTransport::offline());
        let err = dispatch(&app, Command::Stats).await.unwrap_err();
        assert!(matches!(err, CommandError::NotLoggedIn));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(transport.request_count(), 0);
    }
}
