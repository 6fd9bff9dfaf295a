use super::{endpoints, ApiClient, ApiRequest, Backend, FormPart, Resource};
use crate::error::{ApiError, FieldErrors};
use crate::models::{NewPlayer, Paginated, Player, PlayerListQuery, PlayerUpdate};
use crate::services::user_client::nothing_to_update;
use validator::Validate;

/// Largest photo the backend accepts.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Player records on the application backend.
pub struct PlayerClient {
    api: ApiClient,
}

impl PlayerClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &PlayerListQuery) -> Result<Paginated<Player>, ApiError> {
        self.api
            .fetch_page(
                endpoints::PLAYERS,
                query.page,
                |page| query.to_pairs(page),
                Resource::Player,
            )
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Player, ApiError> {
        self.api
            .send_json(ApiRequest::get(Backend::App, endpoints::player(id)), Resource::Player)
            .await
    }

    pub async fn create(&self, player: &NewPlayer) -> Result<Player, ApiError> {
        player.validate()?;
        let request = ApiRequest::post(Backend::App, endpoints::PLAYERS).json(player)?;
        let created: Player = self.api.send_json(request, Resource::Player).await?;
        tracing::info!(player_id = %created.id, "Player created");
        Ok(created)
    }

    pub async fn update(&self, id: &str, update: &PlayerUpdate) -> Result<Player, ApiError> {
        if update.is_empty() {
            return Err(nothing_to_update());
        }
        update.validate()?;
        let request = ApiRequest::patch(Backend::App, endpoints::player(id)).json(update)?;
        self.api.send_json(request, Resource::Player).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api
            .send_empty(ApiRequest::delete(Backend::App, endpoints::player(id)), Resource::Player)
            .await?;
        tracing::info!(player_id = %id, "Player deleted");
        Ok(())
    }

    /// Upload a profile photo as a multipart form with a single `photo` part.
    pub async fn upload_photo(
        &self,
        id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Player, ApiError> {
        if bytes.is_empty() || bytes.len() > MAX_PHOTO_BYTES {
            let mut fields = FieldErrors::new();
            fields.insert(
                "photo".to_string(),
                vec!["Photo must be a non-empty file of at most 5 MB".to_string()],
            );
            return Err(ApiError::Validation {
                message: "Please choose a different photo.".to_string(),
                fields,
            });
        }

        let size = bytes.len();
        let request = ApiRequest::post(Backend::App, endpoints::player_photo(id)).multipart(vec![
            FormPart::file("photo", file_name, mime_for(file_name), bytes),
        ]);
        let player: Player = self.api.send_json(request, Resource::Player).await?;
        tracing::info!(player_id = %player.id, size, "Player photo uploaded");
        Ok(player)
    }
}

/// MIME type from a file extension, falling back to a generic binary type.
pub fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
