pub mod auth;
pub mod dashboard;
pub mod player;
pub mod user;

pub use auth::{
    ChangePasswordRequest, LoginRequest, LoginResponse, PasswordResetRequest, ProfileUpdate,
    RefreshResponse, RegisterRequest, TokenPair,
};
pub use dashboard::DashboardStats;
pub use player::{NewPlayer, Player, PlayerListQuery, PlayerUpdate};
pub use user::{NewUser, RemoteUser, Role, SessionUser, UserListQuery, UserUpdate};

use serde::{Deserialize, Deserializer, Serialize};

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total number of records across all pages.
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    /// Page number that was actually served. Filled in by the client.
    #[serde(default)]
    pub page: u32,
}

/// Backends are inconsistent about numeric vs string ids; normalise to `String`.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Str(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_string(),
        RawId::Str(s) => s,
    })
}

pub(crate) fn push_query<T: ToString>(
    pairs: &mut Vec<(String, String)>,
    key: &str,
    value: Option<T>,
) {
    if let Some(value) = value {
        pairs.push((key.to_string(), value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct WithId {
        #[serde(deserialize_with = "deserialize_id")]
        id: String,
    }

    #[test]
    fn test_numeric_and_string_ids() {
        let numeric: WithId = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(numeric.id, "42");
        let text: WithId = serde_json::from_str(r#"{"id": "u-1"}"#).unwrap();
        assert_eq!(text.id, "u-1");
    }

    #[test]
    fn test_paginated_defaults() {
        let page: Paginated<WithIdOut> = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.page, 0);
    }

    #[derive(Debug, Deserialize)]
    struct WithIdOut {}
}
