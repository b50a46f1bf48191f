use axum::{
    Form, Json,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;
use tracing::info;

use crate::models::{NewProfile, ProfileUpdate};
use crate::policy::{Action, can_act};

use super::auth::{SESSION_USER_KEY, current_user};
use super::profile::{read_profile_form, resolve_image_choice};
use super::types::{ApiResponse, ManagerUserDto, MediaItemDto, ProfileSummaryDto};
use super::{ApiError, AppState};

/// GET /manager/users/{id}
pub async fn show_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(account_id): Path<i32>,
) -> Result<Json<ApiResponse<ManagerUserDto>>, ApiError> {
    let user = current_user(&session).await?;
    if !can_act(user.actor(), Action::ManagerEditAnyProfile, Some(account_id)) {
        return Err(ApiError::forbidden());
    }

    let Some(account) = state.store.get_account(account_id).await? else {
        return Err(ApiError::not_found("User"));
    };

    let profile = state.store.get_profile(account_id).await?;
    let media = state.store.list_media_for_account(account_id).await?;

    Ok(Json(ApiResponse::success(ManagerUserDto {
        profile: profile
            .as_ref()
            .map(|p| ProfileSummaryDto::from_profile(p, &account.email)),
        media: media.iter().map(MediaItemDto::from).collect(),
        account: (&account).into(),
    })))
}

/// POST /manager/users/{id}/edit (multipart)
/// Upserts the target's profile: updates the row when one exists, creates it
/// otherwise.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(account_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let user = current_user(&session).await?;
    if !can_act(user.actor(), Action::ManagerEditAnyProfile, Some(account_id)) {
        return Err(ApiError::forbidden());
    }

    if state.store.get_account(account_id).await?.is_none() {
        return Err(ApiError::not_found("User"));
    }

    let form = read_profile_form(&mut multipart).await?;
    let image_path = resolve_image_choice(&state, account_id, &form).await?;

    let existing = state.store.get_profile(account_id).await?;
    if existing.is_some() {
        state
            .store
            .update_profile(
                account_id,
                &ProfileUpdate {
                    is_performer: form.is_performer,
                    act_category: form.act_category,
                    genre: form.genre,
                    bio: form.bio,
                    availability: form.availability,
                    location: form.location,
                    image_path,
                },
            )
            .await?;
    } else {
        state
            .store
            .create_profile(&NewProfile {
                account_id,
                is_performer: form.is_performer,
                act_category: form.act_category,
                genre: form.genre,
                bio: form.bio,
                availability: form.availability,
                location: form.location,
                image_path,
            })
            .await?;
    }

    info!(manager_id = user.id, account_id, "Manager updated profile");

    Ok(Redirect::to(&format!("/performers/{account_id}")).into_response())
}

#[derive(Deserialize)]
pub struct ToggleManagerForm {
    pub make_manager: Option<String>,
}

/// POST /manager/users/{id}/toggle-manager
/// Self-demotion is allowed; when the manager toggles themselves, the
/// session copy of the flag is refreshed so the change takes effect
/// immediately.
pub async fn toggle_manager(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(account_id): Path<i32>,
    Form(form): Form<ToggleManagerForm>,
) -> Result<Response, ApiError> {
    let mut user = current_user(&session).await?;
    if !can_act(
        user.actor(),
        Action::ManagerToggleManagerFlag,
        Some(account_id),
    ) {
        return Err(ApiError::forbidden());
    }

    let make_manager = super::validation::form_flag(form.make_manager.as_deref());

    let updated = state.store.set_manager_flag(account_id, make_manager).await?;
    if !updated {
        return Err(ApiError::not_found("User"));
    }

    if user.id == account_id {
        user.is_manager = make_manager;
        session
            .insert(SESSION_USER_KEY, &user)
            .await
            .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;
    }

    info!(manager_id = user.id, account_id, make_manager, "Manager flag changed");

    Ok(Redirect::to(&format!("/manager/users/{account_id}")).into_response())
}

/// POST /manager/users/{id}/delete
/// Full cascade: best-effort file cleanup, then media rows, profile row, and
/// finally the account row.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(account_id): Path<i32>,
) -> Result<Response, ApiError> {
    let user = current_user(&session).await?;
    if !can_act(
        user.actor(),
        Action::ManagerDeleteAnyAccount,
        Some(account_id),
    ) {
        return Err(ApiError::forbidden());
    }

    let deleted = state.accounts.delete_account(account_id).await?;
    if !deleted {
        return Err(ApiError::not_found("User"));
    }

    info!(manager_id = user.id, account_id, "Manager deleted account");

    Ok(Redirect::to("/directory").into_response())
}

/// POST /manager/users/{id}/media/{media_id}/delete
/// An id/owner mismatch reads the same as a missing item.
pub async fn delete_user_media(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path((account_id, media_id)): Path<(i32, i32)>,
) -> Result<Response, ApiError> {
    let user = current_user(&session).await?;
    if !can_act(
        user.actor(),
        Action::ManagerDeleteAnyMediaItem,
        Some(account_id),
    ) {
        return Err(ApiError::forbidden());
    }

    let media = state.store.get_media_item(media_id).await?;
    let Some(media) = media.filter(|m| m.account_id == account_id) else {
        return Err(ApiError::not_found("Media item"));
    };

    state.uploads.delete(&media.path).await;
    state.store.delete_media_item(media.id).await?;

    Ok(Redirect::to(&format!("/manager/users/{account_id}")).into_response())
}
