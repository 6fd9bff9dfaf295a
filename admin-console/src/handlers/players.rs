use super::{require_session, to_json, CommandError};
use crate::cli::PlayersCommand;
use crate::models::{NewPlayer, PlayerListQuery, PlayerUpdate};
use crate::AppState;
use serde_json::{json, Value};

pub async fn run(state: &AppState, command: PlayersCommand) -> Result<Value, CommandError> {
    require_session(state)?;
    let players = &state.player_client;

    match command {
        PlayersCommand::List { paging, position } => {
            let query = PlayerListQuery {
                page: paging.page,
                page_size: paging.page_size,
                search: paging.search,
                position,
            };
            to_json(&players.list(&query).await?)
        }
        PlayersCommand::Get { id } => to_json(&players.get(&id).await?),
        PlayersCommand::Create {
            first_name,
            last_name,
            fields,
        } => {
            let player = NewPlayer {
                first_name,
                last_name,
                position: fields.position,
                date_of_birth: fields.date_of_birth,
                nationality: fields.nationality,
                club: fields.club,
            };
            to_json(&players.create(&player).await?)
        }
        PlayersCommand::Update {
            id,
            first_name,
            last_name,
            fields,
        } => {
            let update = PlayerUpdate {
                first_name,
                last_name,
                position: fields.position,
                date_of_birth: fields.date_of_birth,
                nationality: fields.nationality,
                club: fields.club,
            };
            to_json(&players.update(&id, &update).await?)
        }
        PlayersCommand::Delete { id } => {
            players.delete(&id).await?;
            Ok(json!({ "deleted": id }))
        }
        PlayersCommand::UploadPhoto { id, file } => {
            let bytes = tokio::fs::read(&file).await.map_err(|e| {
                CommandError::Input(format!("Could not read {}: {}", file.display(), e))
            })?;
            let file_name = file
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("photo")
                .to_string();
            to_json(&players.upload_photo(&id, &file_name, bytes).await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_state::signed_in;
    use crate::services::{ApiResponse, RequestBody};
    use crate::test_support::FakeTransport;
    use http::StatusCode;
    use std::io::Write;

    #[tokio::test]
    async fn test_upload_reads_file_from_disk() {
        let (app, transport) = signed_in(
            FakeTransport::new(|_| {
                Ok(ApiResponse::new(
                    StatusCode::OK,
                    r#"{"id": 2, "first_name": "Ada", "last_name": "Hegerberg"}"#,
                ))
            }),
            &["subscriber"],
        );

        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&[1, 2, 3, 4]).unwrap();

        let value = run(
            &app,
            PlayersCommand::UploadPhoto {
                id: "2".to_string(),
                file: file.path().to_path_buf(),
            },
        )
        .await
        .unwrap();
        assert_eq!(value["last_name"], "Hegerberg");

        let sent = transport.requests();
        assert!(matches!(&sent[0].body, RequestBody::Multipart(parts) if parts.len() == 1));
    }

    #[tokio::test]
    async fn test_missing_file_is_input_error() {
        let (app, transport) = signed_in(FakeTransport::offline(), &["admin"]);
        let err = run(
            &app,
            PlayersCommand::UploadPhoto {
                id: "2".to_string(),
                file: "/no/such/photo.png".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CommandError::Input(_)));
        assert_eq!(transport.request_count(), 0);
    }
}
