use super::{require_admin, to_json, CommandError};
use crate::cli::UsersCommand;
use crate::models::{NewUser, UserListQuery, UserUpdate};
use crate::AppState;
use serde_json::{json, Value};

pub async fn run(state: &AppState, command: UsersCommand) -> Result<Value, CommandError> {
    require_admin(state)?;
    let users = &state.user_client;

    match command {
        UsersCommand::List {
            paging,
            role,
            active,
        } => {
            let query = UserListQuery {
                page: paging.page,
                page_size: paging.page_size,
                search: paging.search,
                role,
                is_active: active,
            };
            to_json(&users.list(&query).await?)
        }
        UsersCommand::Get { id } => to_json(&users.get(&id).await?),
        UsersCommand::Create {
            email,
            password,
            first_name,
            last_name,
            role,
            inactive,
        } => {
            let user = NewUser {
                email,
                password,
                first_name,
                last_name,
                role,
                is_active: !inactive,
            };
            to_json(&users.create(&user).await?)
        }
        UsersCommand::Update {
            id,
            email,
            first_name,
            last_name,
            role,
        } => {
            let update = UserUpdate {
                email,
                first_name,
                last_name,
                role,
                is_active: None,
            };
            to_json(&users.update(&id, &update).await?)
        }
        UsersCommand::Delete { id } => {
            users.delete(&id).await?;
            Ok(json!({ "deleted": id }))
        }
        UsersCommand::Activate { id } => to_json(&users.set_active(&id, true).await?),
        UsersCommand::Deactivate { id } => to_json(&users.set_active(&id, false).await?),
    }
}
