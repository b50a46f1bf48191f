use axum::{
    Json,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;
use tracing::error;

use crate::models::MediaKind;
use crate::policy::{Action, can_act};
use crate::services::uploads::{MAX_MEDIA_BYTES, MEDIA_DIR};

use super::auth::current_user;
use super::types::{ApiResponse, MediaItemDto};
use super::{ApiError, AppState};

/// GET /profile/media
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<MediaItemDto>>>, ApiError> {
    let user = current_user(&session).await?;

    let media = state.store.list_media_for_account(user.id).await?;

    Ok(Json(ApiResponse::success(
        media.iter().map(MediaItemDto::from).collect(),
    )))
}

/// POST /profile/media (multipart)
/// Accepts one "media_file" part; kind is derived from its content type.
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let user = current_user(&session).await?;
    if !can_act(user.actor(), Action::UploadOwnMedia, Some(user.id)) {
        return Err(ApiError::forbidden());
    }

    let mut upload: Option<(Option<String>, Option<String>, axum::body::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation("Media file too large (max 50MB)."))?
    {
        if field.name() != Some("media_file") {
            continue;
        }

        let filename = field.file_name().map(ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::validation("Media file too large (max 50MB)."))?;

        if bytes.is_empty() {
            continue;
        }
        if bytes.len() > MAX_MEDIA_BYTES {
            return Err(ApiError::validation("Media file too large (max 50MB)."));
        }

        upload = Some((filename, content_type, bytes));
    }

    let Some((filename, content_type, bytes)) = upload else {
        return Err(ApiError::validation(
            "Please choose a media file to upload.",
        ));
    };

    let kind = MediaKind::from_content_type(content_type.as_deref());

    let path = state
        .uploads
        .save(
            MEDIA_DIR,
            user.id,
            filename.as_deref(),
            content_type.as_deref(),
            &bytes,
        )
        .await
        .map_err(|e| {
            error!(account_id = user.id, error = %e, "Media write failed");
            ApiError::validation("Unable to upload that media file. Please try again.")
        })?;

    state.store.add_media_item(user.id, kind, &path).await?;

    Ok(Redirect::to("/profile/media").into_response())
}

/// POST /profile/media/{id}/delete
/// An id that exists but belongs to someone else reads the same as one that
/// does not exist.
pub async fn delete_media_item(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(media_id): Path<i32>,
) -> Result<Response, ApiError> {
    let user = current_user(&session).await?;
    if !can_act(user.actor(), Action::DeleteOwnMediaItem, Some(user.id)) {
        return Err(ApiError::forbidden());
    }

    let media = state.store.get_media_item(media_id).await?;
    let Some(media) = media.filter(|m| m.account_id == user.id) else {
        return Err(ApiError::not_found("Media item"));
    };

    state.uploads.delete(&media.path).await;
    state.store.delete_media_item(media.id).await?;

    Ok(Redirect::to("/profile/media").into_response())
}
