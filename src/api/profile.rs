use axum::{
    Form, Json,
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;
use tracing::error;

use crate::avatar::{self, DEFAULT_AVATAR_DIR, DEFAULT_AVATARS, PROFILE_IMAGE_DIR};
use crate::models::{Availability, NewProfile, ProfileUpdate};
use crate::policy::{Action, can_act};
use crate::services::uploads::MAX_PROFILE_IMAGE_BYTES;

use super::auth::current_user;
use super::types::{
    AccountDto, ApiResponse, AvailabilityDto, DashboardDto, MediaItemDto, MessageResponse,
    ProfileDto, ProfileSummaryDto, ProfileViewDto,
};
use super::validation::{form_flag, optional_text, validate_performer_fields};
use super::{ApiError, AppState};

// ============================================================================
// Multipart profile form
// ============================================================================

/// Parsed profile add/edit form. The image slot holds the raw upload; which
/// path ends up stored is decided by `resolve_image_choice`.
#[derive(Default)]
pub(super) struct ProfileForm {
    pub is_performer: bool,
    pub act_category: Option<String>,
    pub genre: Option<String>,
    pub bio: Option<String>,
    pub availability: Availability,
    pub location: Option<String>,
    pub default_avatar: Option<String>,
    pub image: Option<UploadedImage>,
}

pub(super) struct UploadedImage {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: axum::body::Bytes,
}

pub(super) async fn read_profile_form(multipart: &mut Multipart) -> Result<ProfileForm, ApiError> {
    let mut form = ProfileForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Unable to read the submitted form: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "profile_image" {
            let filename = field.file_name().map(ToString::to_string);
            let content_type = field.content_type().map(ToString::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|_| ApiError::validation("Image too large (max 5MB)."))?;

            // Browsers submit an empty file part when nothing was chosen.
            if bytes.is_empty() {
                continue;
            }
            if bytes.len() > MAX_PROFILE_IMAGE_BYTES {
                return Err(ApiError::validation("Image too large (max 5MB)."));
            }
            if !content_type
                .as_deref()
                .is_some_and(|c| c.starts_with("image/"))
            {
                return Err(ApiError::validation(
                    "Unable to upload that image. Try a smaller JPG/PNG.",
                ));
            }

            form.image = Some(UploadedImage {
                filename,
                content_type,
                bytes,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::validation(format!("Unable to read the submitted form: {e}")))?;

        match name.as_str() {
            "is_performer" => form.is_performer = form_flag(Some(&value)),
            "act_category" => form.act_category = optional_text(Some(value)),
            "genre" => form.genre = optional_text(Some(value)),
            "bio" => form.bio = optional_text(Some(value)),
            "availability" => form.availability = Availability::from_str(value.trim()),
            "location" => form.location = optional_text(Some(value)),
            "default_avatar" => {
                if let Some(choice) = optional_text(Some(value)) {
                    if !DEFAULT_AVATARS.contains(&choice.as_str()) {
                        return Err(ApiError::validation("Unknown default avatar."));
                    }
                    form.default_avatar = Some(choice);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Stores the image choice for a profile mutation. Resolution order matches
/// rendering: an uploaded file wins over a picked default; neither leaves
/// the stored path untouched.
pub(super) async fn resolve_image_choice(
    state: &AppState,
    account_id: i32,
    form: &ProfileForm,
) -> Result<Option<String>, ApiError> {
    if let Some(image) = &form.image {
        let path = state
            .uploads
            .save(
                PROFILE_IMAGE_DIR,
                account_id,
                image.filename.as_deref(),
                image.content_type.as_deref(),
                &image.bytes,
            )
            .await
            .map_err(|e| {
                error!(account_id, error = %e, "Profile image write failed");
                ApiError::validation("Unable to upload that image. Try a smaller JPG/PNG.")
            })?;
        return Ok(Some(path));
    }

    if let Some(choice) = &form.default_avatar {
        return Ok(Some(format!("{DEFAULT_AVATAR_DIR}/{choice}")));
    }

    Ok(None)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<DashboardDto>>, ApiError> {
    let user = current_user(&session).await?;

    let profile = state.store.get_profile(user.id).await?;
    let summary = profile
        .as_ref()
        .map(|p| ProfileSummaryDto::from_profile(p, &user.email));

    Ok(Json(ApiResponse::success(DashboardDto {
        user: AccountDto {
            id: user.id,
            name: user.name,
            email: user.email,
            is_manager: user.is_manager,
        },
        profile: summary,
    })))
}

/// GET /profile
/// Redirects to profile creation when no row exists. On the first view
/// without a stored image the deterministic default avatar is persisted so
/// later listings read a concrete path.
pub async fn show_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let user = current_user(&session).await?;
    if !can_act(user.actor(), Action::ViewOwnProfile, Some(user.id)) {
        return Err(ApiError::forbidden());
    }

    let Some(mut profile) = state.store.get_profile(user.id).await? else {
        return Ok(Redirect::to("/profile/add").into_response());
    };

    if profile.image_path.is_none() {
        let path = avatar::default_avatar_path(&user.email);
        state.store.set_profile_image_path(user.id, &path).await?;
        profile.image_path = Some(path);
    }

    let media = state.store.list_media_for_account(user.id).await?;

    let view = ProfileViewDto {
        profile: ProfileDto::from_parts(&profile, &user.name, &user.email),
        media: media.iter().map(MediaItemDto::from).collect(),
    };

    Ok(Json(ApiResponse::success(view)).into_response())
}

/// GET /profile/add
pub async fn show_add_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let user = current_user(&session).await?;

    if state.store.get_profile(user.id).await?.is_some() {
        return Ok(Redirect::to("/profile/edit").into_response());
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "No profile yet; submit this form to create one.",
    )))
    .into_response())
}

/// POST /profile/add (multipart)
pub async fn add_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let user = current_user(&session).await?;
    if !can_act(user.actor(), Action::EditOwnProfile, Some(user.id)) {
        return Err(ApiError::forbidden());
    }

    let form = read_profile_form(&mut multipart).await?;
    validate_performer_fields(
        form.is_performer,
        form.genre.as_deref(),
        form.location.as_deref(),
    )?;

    if state.store.get_profile(user.id).await?.is_some() {
        return Err(ApiError::validation("You already have a profile."));
    }

    let image_path = resolve_image_choice(&state, user.id, &form).await?;

    state
        .store
        .create_profile(&NewProfile {
            account_id: user.id,
            is_performer: form.is_performer,
            act_category: form.act_category,
            genre: form.genre,
            bio: form.bio,
            availability: form.availability,
            location: form.location,
            image_path,
        })
        .await?;

    Ok(Redirect::to("/profile").into_response())
}

/// GET /profile/edit
pub async fn show_edit_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let user = current_user(&session).await?;

    let Some(profile) = state.store.get_profile(user.id).await? else {
        return Ok(Redirect::to("/profile/add").into_response());
    };

    Ok(Json(ApiResponse::success(ProfileSummaryDto::from_profile(
        &profile,
        &user.email,
    )))
    .into_response())
}

/// POST /profile/edit (multipart)
pub async fn edit_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let user = current_user(&session).await?;
    if !can_act(user.actor(), Action::EditOwnProfile, Some(user.id)) {
        return Err(ApiError::forbidden());
    }

    let form = read_profile_form(&mut multipart).await?;
    validate_performer_fields(
        form.is_performer,
        form.genre.as_deref(),
        form.location.as_deref(),
    )?;

    let image_path = resolve_image_choice(&state, user.id, &form).await?;

    let updated = state
        .store
        .update_profile(
            user.id,
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

    if !updated {
        return Ok(Redirect::to("/profile/add").into_response());
    }

    Ok(Redirect::to("/profile").into_response())
}

/// POST /profile/delete
/// Removes the profile row only; the account and its media stay.
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let user = current_user(&session).await?;
    if !can_act(user.actor(), Action::DeleteOwnProfile, Some(user.id)) {
        return Err(ApiError::forbidden());
    }

    state.store.delete_profile(user.id).await?;

    Ok(Redirect::to("/profile/add").into_response())
}

#[derive(Deserialize)]
pub struct AvailabilityForm {
    pub availability: Option<String>,
}

/// GET /availability
pub async fn show_availability(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let user = current_user(&session).await?;

    let Some(profile) = state.store.get_profile(user.id).await? else {
        return Ok(Redirect::to("/profile/add").into_response());
    };

    Ok(Json(ApiResponse::success(AvailabilityDto {
        availability: profile.availability,
    }))
    .into_response())
}

/// POST /availability
pub async fn update_availability(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<AvailabilityForm>,
) -> Result<Response, ApiError> {
    let user = current_user(&session).await?;
    if !can_act(user.actor(), Action::EditOwnProfile, Some(user.id)) {
        return Err(ApiError::forbidden());
    }

    let availability = Availability::from_str(form.availability.as_deref().unwrap_or_default());

    let updated = state.store.set_availability(user.id, availability).await?;
    if !updated {
        return Ok(Redirect::to("/profile/add").into_response());
    }

    Ok(Redirect::to("/availability").into_response())
}
