use serde::{Deserialize, Serialize};

use crate::avatar;
use crate::entities::{media_items, profiles};
use crate::models::Account;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub is_manager: bool,
}

impl From<&Account> for AccountDto {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            is_manager: account.is_manager,
        }
    }
}

/// Profile fields as the owner's dashboard and edit form see them. The
/// avatar URL is always resolved, falling back to the deterministic default
/// when nothing is stored yet.
#[derive(Debug, Serialize)]
pub struct ProfileSummaryDto {
    pub is_performer: bool,
    pub act_category: Option<String>,
    pub genre: Option<String>,
    pub bio: Option<String>,
    pub availability: String,
    pub location: Option<String>,
    pub image_url: String,
}

impl ProfileSummaryDto {
    pub fn from_profile(profile: &profiles::Model, seed: &str) -> Self {
        Self {
            is_performer: profile.is_performer,
            act_category: profile.act_category.clone(),
            genre: profile.genre.clone(),
            bio: profile.bio.clone(),
            availability: profile.availability.clone(),
            location: profile.location.clone(),
            image_url: avatar::avatar_url(profile.image_path.as_deref(), seed),
        }
    }
}

/// Full profile view, joined with the owning account.
#[derive(Debug, Serialize)]
pub struct ProfileDto {
    pub account_id: i32,
    pub name: String,
    pub email: String,
    pub is_performer: bool,
    pub act_category: Option<String>,
    pub genre: Option<String>,
    pub bio: Option<String>,
    pub availability: String,
    pub location: Option<String>,
    pub image_url: String,
}

impl ProfileDto {
    pub fn from_parts(profile: &profiles::Model, name: &str, email: &str) -> Self {
        Self {
            account_id: profile.account_id,
            name: name.to_string(),
            email: email.to_string(),
            is_performer: profile.is_performer,
            act_category: profile.act_category.clone(),
            genre: profile.genre.clone(),
            bio: profile.bio.clone(),
            availability: profile.availability.clone(),
            location: profile.location.clone(),
            image_url: avatar::avatar_url(profile.image_path.as_deref(), email),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MediaItemDto {
    pub id: i32,
    pub kind: String,
    pub url: String,
    pub created_at: String,
}

impl From<&media_items::Model> for MediaItemDto {
    fn from(item: &media_items::Model) -> Self {
        Self {
            id: item.id,
            kind: item.kind.clone(),
            url: avatar::public_url(&item.path),
            created_at: item.created_at.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardDto {
    pub user: AccountDto,
    pub profile: Option<ProfileSummaryDto>,
}

#[derive(Debug, Serialize)]
pub struct ProfileViewDto {
    pub profile: ProfileDto,
    pub media: Vec<MediaItemDto>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityDto {
    pub availability: String,
}

#[derive(Debug, Serialize)]
pub struct ManagerUserDto {
    pub account: AccountDto,
    pub profile: Option<ProfileSummaryDto>,
    pub media: Vec<MediaItemDto>,
}

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DirectoryEntryDto {
    pub account_id: i32,
    pub name: String,
    pub act_category: Option<String>,
    pub genre: Option<String>,
    pub bio: Option<String>,
    pub availability: String,
    pub location: Option<String>,
    pub image_url: String,
}
