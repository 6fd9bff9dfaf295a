use super::RemoteUser;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Access/refresh token pair. Both halves exist or the session does not.
#[derive(Clone)]
pub struct TokenPair {
    pub access: Secret<String>,
    pub refresh: Secret<String>,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: Secret::new(access.into()),
            refresh: Secret::new(refresh.into()),
        }
    }

    pub fn access_token(&self) -> &str {
        self.access.expose_secret()
    }

    pub fn refresh_token(&self) -> &str {
        self.refresh.expose_secret()
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub user: Option<RemoteUser>,
}

impl LoginResponse {
    pub fn tokens(&self) -> TokenPair {
        TokenPair::new(self.access_token.clone(), self.refresh_token.clone())
    }
}

/// Refresh responses only carry a new access token; the refresh token is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 150, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 150, message = "Last name is required"))]
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
#[validate(schema(function = "validate_password_change", skip_on_field_errors = true))]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

fn validate_password_change(request: &ChangePasswordRequest) -> Result<(), ValidationError> {
    if request.old_password == request.new_password {
        let mut error = ValidationError::new("password_unchanged");
        error.message = Some("New password must differ from the current one".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 150, message = "First name is too long"))]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 150, message = "Last name is too long"))]
    pub last_name: Option<String>,
}
