use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only counters shown on the dashboard landing view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub total_players: u64,
    #[serde(default, alias = "new_users_this_month")]
    pub new_users_last_30_days: u64,
    #[serde(default)]
    pub users_by_role: BTreeMap<String, u64>,
}

impl DashboardStats {
    pub fn inactive_users(&self) -> u64 {
        self.total_users.saturating_sub(self.active_users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_stats_payload() {
        let stats: DashboardStats =
            serde_json::from_str(r#"{"total_users": 10, "active_users": 12, "new_users_this_month": 3}"#)
                .unwrap();
        assert_eq!(stats.new_users_last_30_days, 3);
        assert_eq!(stats.inactive_users(), 0);
        assert!(stats.users_by_role.is_empty());
    }
}
