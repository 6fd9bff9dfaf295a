use super::{deserialize_id, push_query};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Internal role used for local authorization decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Player,
    Scout,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Player => "player",
            Role::Scout => "scout",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "player" => Ok(Role::Player),
            "scout" => Ok(Role::Scout),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// User record as returned by the backends.
///
/// `role` is whatever the server claims and is never used for authorization;
/// see [`SessionUser`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteUser {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, alias = "date_joined")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Snapshot of the signed-in user.
///
/// The role is always derived from the current access token when the snapshot
/// is built. A copy read back from storage is provisional until it has been
/// rebuilt from a fresh "who am I" response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub first_name: String,
    pub last_name: String,
}

impl SessionUser {
    pub fn from_remote(remote: &RemoteUser, role: Role) -> Self {
        Self {
            id: remote.id.clone(),
            email: remote.email.clone(),
            role,
            is_active: remote.is_active,
            created_at: remote.created_at,
            first_name: remote.first_name.clone(),
            last_name: remote.last_name.clone(),
        }
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.split('@').next().unwrap_or("User").to_string()
        } else {
            full.to_string()
        }
    }

    pub fn initials(&self) -> String {
        let first = self.first_name.trim().chars().next();
        let last = self.last_name.trim().chars().next();
        match (first, last) {
            (Some(f), Some(l)) => format!("{}{}", f, l).to_uppercase(),
            _ => {
                let name = self.display_name();
                let initials: String = name.chars().take(2).collect();
                if initials.is_empty() {
                    "U".to_string()
                } else {
                    initials.to_uppercase()
                }
            }
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Payload for creating a managed user.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewUser {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(max = 150, message = "First name is too long"))]
    pub first_name: String,
    #[validate(length(max = 150, message = "Last name is too long"))]
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
}

/// Partial update for a managed user; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 150, message = "First name is too long"))]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 150, message = "Last name is too long"))]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
    }
}

/// Filters for the user list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl Default for UserListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            search: None,
            role: None,
            is_active: None,
        }
    }
}

impl UserListQuery {
    pub fn to_pairs(&self, page: u32) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ];
        push_query(
            &mut pairs,
            "search",
            self.search.as_deref().filter(|s| !s.is_empty()),
        );
        push_query(&mut pairs, "role", self.role);
        push_query(&mut pairs, "is_active", self.is_active);
        pairs
    }
}
