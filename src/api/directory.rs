use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use crate::avatar;

use super::types::{
    ApiResponse, DirectoryEntryDto, DirectoryQuery, MediaItemDto, ProfileDto, ProfileViewDto,
};
use super::{ApiError, AppState};

/// GET /directory?search=
/// Public listing of performer profiles, optionally filtered by a free-text
/// term over name, category, genre, and location.
pub async fn list_performers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<ApiResponse<Vec<DirectoryEntryDto>>>, ApiError> {
    let rows = state
        .store
        .search_directory(query.search.as_deref())
        .await?;

    let entries = rows
        .iter()
        .filter_map(|(profile, account)| {
            let account = account.as_ref()?;
            Some(DirectoryEntryDto {
                account_id: account.id,
                name: account.name.clone(),
                act_category: profile.act_category.clone(),
                genre: profile.genre.clone(),
                bio: profile.bio.clone(),
                availability: profile.availability.clone(),
                location: profile.location.clone(),
                image_url: avatar::avatar_url(profile.image_path.as_deref(), &account.email),
            })
        })
        .collect();

    Ok(Json(ApiResponse::success(entries)))
}

/// GET /performers/{id}
/// Public performer detail with media gallery. An account without a profile
/// row is not a performer and reads as not found.
pub async fn show_performer(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<i32>,
) -> Result<Json<ApiResponse<ProfileViewDto>>, ApiError> {
    let Some((profile, Some(account))) = state.store.get_profile_with_account(account_id).await?
    else {
        return Err(ApiError::not_found("Performer"));
    };

    let media = state.store.list_media_for_account(account_id).await?;

    Ok(Json(ApiResponse::success(ProfileViewDto {
        profile: ProfileDto::from_parts(&profile, &account.name, &account.email),
        media: media.iter().map(MediaItemDto::from).collect(),
    })))
}
