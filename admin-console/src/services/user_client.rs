use super::{endpoints, ApiClient, ApiRequest, Backend, Resource};
use crate::error::{ApiError, FieldErrors};
use crate::models::{NewUser, Paginated, RemoteUser, UserListQuery, UserUpdate};
use crate::utils::supersede::{LatestOnly, Outcome};
use validator::Validate;

/// User administration on the application backend.
pub struct UserClient {
    api: ApiClient,
    latest_list: LatestOnly,
}

impl UserClient {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            latest_list: LatestOnly::new(),
        }
    }

    pub async fn list(&self, query: &UserListQuery) -> Result<Paginated<RemoteUser>, ApiError> {
        Self::fetch_list(&self.api, query).await
    }

    /// Like [`Self::list`], but a newer call supersedes one still in flight.
    pub async fn list_latest(
        &self,
        query: &UserListQuery,
    ) -> Outcome<Result<Paginated<RemoteUser>, ApiError>> {
        let api = self.api.clone();
        let query = query.clone();
        self.latest_list
            .run(async move { Self::fetch_list(&api, &query).await })
            .await
    }

    async fn fetch_list(
        api: &ApiClient,
        query: &UserListQuery,
    ) -> Result<Paginated<RemoteUser>, ApiError> {
        api.fetch_page(
            endpoints::USERS,
            query.page,
            |page| query.to_pairs(page),
            Resource::User,
        )
        .await
    }

    pub async fn get(&self, id: &str) -> Result<RemoteUser, ApiError> {
        self.api
            .send_json(ApiRequest::get(Backend::App, endpoints::user(id)), Resource::User)
            .await
    }

    pub async fn create(&self, user: &NewUser) -> Result<RemoteUser, ApiError> {
        user.validate()?;
        let request = ApiRequest::post(Backend::App, endpoints::USERS).json(user)?;
        let created: RemoteUser = self.api.send_json(request, Resource::User).await?;
        tracing::info!(user_id = %created.id, role = %user.role, "User created");
        Ok(created)
    }

    pub async fn update(&self, id: &str, update: &UserUpdate) -> Result<RemoteUser, ApiError> {
        if update.is_empty() {
            return Err(nothing_to_update());
        }
        update.validate()?;
        let request = ApiRequest::patch(Backend::App, endpoints::user(id)).json(update)?;
        let updated: RemoteUser = self.api.send_json(request, Resource::User).await?;
        tracing::info!(user_id = %updated.id, "User updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api
            .send_empty(ApiRequest::delete(Backend::App, endpoints::user(id)), Resource::User)
            .await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    pub async fn set_active(&self, id: &str, active: bool) -> Result<RemoteUser, ApiError> {
        let update = UserUpdate {
            is_active: Some(active),
            ..UserUpdate::default()
        };
        self.update(id, &update).await
    }
}

pub(crate) fn nothing_to_update() -> ApiError {
    let mut fields = FieldErrors::new();
    fields.insert(
        "non_field_errors".to_string(),
        vec!["Provide at least one field to change".to_string()],
    );
    ApiError::Validation {
        message: "Nothing to update.".to_string(),
        fields,
    }
}
