//! Playlist download endpoint
//!
//! Subscribers fetch their playlist by its canonical filename. The stem is
//! matched case-insensitively; a trailing-agreement-number fast path avoids
//! the full scan in the common case.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::database::repositories::UserRepository;
use crate::entities::users;
use crate::errors::{AppError, AppResult};
use crate::services::PlaylistCodec;
use crate::web::{AppState, handle_error};

pub async fn download(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    match render(&state, &filename).await {
        Ok((content, canonical_name)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "audio/x-mpegurl".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{canonical_name}\""),
                ),
            ],
            content,
        )
            .into_response(),
        Err(error) => handle_error(error),
    }
}

async fn render(state: &AppState, filename: &str) -> AppResult<(String, String)> {
    let stem =
        playlist_stem(filename).ok_or_else(|| AppError::not_found("playlist", filename))?;

    let user = find_by_stem(&state.users, &state.codec, stem)
        .await?
        .ok_or_else(|| AppError::not_found("playlist", filename))?;

    let channels = state.resolver.resolve_channels_with_groups(user.id).await?;
    let content = state.codec.encode(&user, &channels);
    let canonical_name = state.codec.filename(&user);

    Ok((content, canonical_name))
}

/// Strip the `.m3u8` extension case-insensitively, preserving the stem's case
fn playlist_stem(filename: &str) -> Option<&str> {
    let split = filename.len().checked_sub(5)?;
    let stem = filename.get(..split)?;
    filename
        .get(split..)
        .filter(|ext| ext.eq_ignore_ascii_case(".m3u8"))?;
    Some(stem)
}

async fn find_by_stem(
    users: &UserRepository,
    codec: &PlaylistCodec,
    stem: &str,
) -> AppResult<Option<users::Model>> {
    // Fast path: a canonical stem ends with the agreement number as stored
    if let Some((_, agreement_candidate)) = stem.rsplit_once('_') {
        if !agreement_candidate.is_empty() {
            if let Some(user) = users.find_by_agreement(agreement_candidate).await? {
                if codec.matches_stem(&user, stem) {
                    return Ok(Some(user));
                }
            }
        }
    }

    // Correctness baseline: match against every subscriber's computed name
    for user in users.find_all().await? {
        if codec.matches_stem(&user, stem) {
            return Ok(Some(user));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::migrations::Migrator;
    use crate::database::repositories::user::UserCreateRequest;
    use crate::entities::users::UserStatus;
    use sea_orm_migration::MigratorTrait;
    use std::sync::Arc;

    async fn setup() -> (UserRepository, PlaylistCodec) {
        let connection = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&connection, None).await.unwrap();
        (
            UserRepository::new(Arc::new(connection)),
            PlaylistCodec::new("http://media.example"),
        )
    }

    async fn seed_user(users: &UserRepository, agreement: &str) -> users::Model {
        users
            .create(
                UserCreateRequest {
                    first_name: "Jo".to_string(),
                    last_name: "Doe".to_string(),
                    agreement_number: agreement.to_string(),
                    max_sessions: 1,
                    status: UserStatus::Enabled,
                    valid_from: None,
                    valid_until: None,
                    tariff_ids: vec![],
                    package_ids: vec![],
                    channel_ids: vec![],
                },
                "tok".to_string(),
            )
            .await
            .unwrap()
    }

    #[test]
    fn stem_extraction_ignores_extension_case() {
        assert_eq!(playlist_stem("Doe_Jo_A-100.m3u8"), Some("Doe_Jo_A-100"));
        assert_eq!(playlist_stem("Doe_Jo_A-100.M3U8"), Some("Doe_Jo_A-100"));
        assert_eq!(playlist_stem("Doe_Jo_A-100.m3u"), None);
        assert_eq!(playlist_stem(".m3u8"), Some(""));
    }

    #[tokio::test]
    async fn canonical_stem_resolves_uppercase_agreement() {
        let (users, codec) = setup().await;
        let user = seed_user(&users, "A-100").await;

        // The canonical link keeps the agreement number's stored case, so the
        // trailing-segment lookup must too
        let found = find_by_stem(&users, &codec, "Doe_Jo_A-100").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn lowercased_stem_resolves_via_full_scan() {
        let (users, codec) = setup().await;
        let user = seed_user(&users, "A-100").await;

        let found = find_by_stem(&users, &codec, "doe_jo_a-100").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn unknown_stem_resolves_to_none() {
        let (users, codec) = setup().await;
        seed_user(&users, "A-100").await;

        let found = find_by_stem(&users, &codec, "Roe_Jane_B-200").await.unwrap();
        assert!(found.is_none());
    }
}
