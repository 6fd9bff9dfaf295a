use super::{require_session, to_json, CommandError};
use crate::AppState;
use serde_json::Value;

pub async fn stats(state: &AppState) -> Result<Value, CommandError> {
    require_session(state)?;
    let stats = state.dashboard_client.stats().await?;
    let mut value = to_json(&stats)?;
    value["inactive_users"] = stats.inactive_users().into();
    Ok(value)
}
