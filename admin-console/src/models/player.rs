use super::{deserialize_id, push_query};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewPlayer {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50, message = "Position is too long"))]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct PlayerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50, message = "Position is too long"))]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club: Option<String>,
}

impl PlayerUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.position.is_none()
            && self.date_of_birth.is_none()
            && self.nationality.is_none()
            && self.club.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerListQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub position: Option<String>,
}

impl Default for PlayerListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            search: None,
            position: None,
        }
    }
}

impl PlayerListQuery {
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
        push_query(&mut pairs, "position", self.position.as_deref());
        pairs
    }
}
