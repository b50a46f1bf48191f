use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::Key};

use crate::config::Config;
use crate::db::Store;
use crate::services::{AccountService, UploadService, uploads::MAX_MEDIA_BYTES};

pub mod auth;
mod directory;
mod error;
mod manager;
mod media;
mod profile;
mod types;
mod validation;

pub use auth::SessionUser;
pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub uploads: UploadService,

    pub accounts: AccountService,
}

#[must_use]
pub fn create_app_state(config: Config, store: Store, uploads: UploadService) -> Arc<AppState> {
    let accounts = AccountService::new(store.clone(), uploads.clone());
    Arc::new(AppState {
        config,
        store,
        uploads,
        accounts,
    })
}

/// Derives the 64-byte cookie signing key from the configured secret by
/// cycling its bytes. Deterministic so sessions survive restarts with the
/// same secret.
fn session_key(secret: &str) -> Key {
    let secret = secret.as_bytes();
    let mut bytes = [0u8; 64];
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = secret[i % secret.len()];
    }
    Key::from(&bytes)
}

pub fn router(state: Arc<AppState>) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_signed(session_key(state.config.session_secret()))
        .with_secure(state.config.server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.config.server.session_minutes,
        )));

    let uploads_root = state.uploads.root().to_path_buf();

    let app = Router::new()
        .merge(protected_router())
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/directory", get(directory::list_performers))
        .route("/performers/{id}", get(directory::show_performer))
        .layer(session_layer)
        .with_state(state);

    Router::new()
        .merge(app)
        .nest_service("/uploads", ServeDir::new(uploads_root))
        .layer(DefaultBodyLimit::max(MAX_MEDIA_BYTES + 1024 * 1024))
        .layer(TraceLayer::new_for_http())
}

fn protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(profile::dashboard))
        .route("/profile", get(profile::show_profile))
        .route("/profile/add", get(profile::show_add_profile))
        .route("/profile/add", post(profile::add_profile))
        .route("/profile/edit", get(profile::show_edit_profile))
        .route("/profile/edit", post(profile::edit_profile))
        .route("/profile/delete", post(profile::delete_profile))
        .route("/availability", get(profile::show_availability))
        .route("/availability", post(profile::update_availability))
        .route("/profile/media", get(media::list_media))
        .route("/profile/media", post(media::upload_media))
        .route("/profile/media/{id}/delete", post(media::delete_media_item))
        .route("/manager/users/{id}", get(manager::show_user))
        .route("/manager/users/{id}/edit", post(manager::update_user))
        .route(
            "/manager/users/{id}/toggle-manager",
            post(manager::toggle_manager),
        )
        .route("/manager/users/{id}/delete", post(manager::delete_user))
        .route(
            "/manager/users/{id}/media/{media_id}/delete",
            post(manager::delete_user_media),
        )
        .route_layer(middleware::from_fn(auth::require_session))
}
