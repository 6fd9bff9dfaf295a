use crate::models::Role;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Identifiers that grant the internal `admin` role.
pub const ADMIN_ROLE_IDS: &[&str] = &["super_admin", "admin"];
/// Identifier that grants the internal `scout` role.
pub const SCOUT_ROLE_ID: &str = "subscriber";
/// Identifier that grants the internal `player` role.
pub const PLAYER_ROLE_ID: &str = "limited_user";

/// The claims the console reads. Anything else in the payload is ignored,
/// and a claim of an unexpected type reads as absent rather than failing
/// the whole token.
#[derive(Debug, Default, Deserialize)]
pub struct JwtClaims {
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub exp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_roles")]
    pub roles: Vec<String>,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|secs| secs as i64)),
        _ => None,
    })
}

fn lenient_roles<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(role) => Some(role),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

impl JwtClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    /// A token without an `exp` claim is treated as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expires_at) => expires_at <= now,
            None => true,
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenDecodeError {
    #[error("Invalid JWT format")]
    Format,
    #[error("Failed to decode JWT payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Failed to parse JWT claims: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode JWT claims without validation.
///
/// The token is trusted because it arrived over HTTPS from the central
/// backend. This is a parsing step only, not a security boundary; the
/// backends verify signatures on every request.
pub fn decode_jwt_claims(token: &str) -> Result<JwtClaims, TokenDecodeError> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return Err(TokenDecodeError::Format);
    }

    let payload = general_purpose::URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('='))?;

    Ok(serde_json::from_slice(&payload)?)
}

/// Map external role identifiers onto the internal role.
///
/// Precedence: any admin identifier, then subscriber, then limited user.
pub fn role_from_identifiers<S: AsRef<str>>(roles: &[S]) -> Role {
    let has = |wanted: &str| roles.iter().any(|r| r.as_ref() == wanted);

    if ADMIN_ROLE_IDS.iter().any(|id| has(id)) {
        Role::Admin
    } else if has(SCOUT_ROLE_ID) {
        Role::Scout
    } else if has(PLAYER_ROLE_ID) {
        Role::Player
    } else {
        Role::default()
    }
}

/// Derive the internal role from an access token. Never fails.
pub fn derive_role(access_token: &str) -> Role {
    match decode_jwt_claims(access_token) {
        Ok(claims) => role_from_identifiers(&claims.roles),
        Err(e) => {
            tracing::warn!(error = %e, "Could not decode access token, using default role");
            Role::default()
        }
    }
}

/// True when the token decodes and its `exp` claim is after `now`.
pub fn is_token_live(token: &str, now: DateTime<Utc>) -> bool {
    match decode_jwt_claims(token) {
        Ok(claims) => !claims.is_expired_at(now),
        Err(_) => false,
    }
}
