use axum::{
    Form, Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;
use tracing::info;

use crate::models::Account;
use crate::policy::Actor;
use crate::services::{AuthFailure, RegistrationError};

use super::{ApiError, ApiResponse, AppState, types::AccountDto, validation};

pub const SESSION_USER_KEY: &str = "user";

/// Authenticated actor carried by the session. Established at login or
/// registration, destroyed at logout. Never contains the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub is_manager: bool,
}

impl SessionUser {
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor::Account {
            id: self.id,
            is_manager: self.is_manager,
        }
    }
}

impl From<Account> for SessionUser {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            is_manager: account.is_manager,
        }
    }
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

// ============================================================================
// Middleware
// ============================================================================

/// Gate for everything behind a login: a request without a session user gets
/// a 401 before the handler runs.
pub async fn require_session(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    if user.is_none() {
        return Err(ApiError::unauthorized());
    }

    Ok(next.run(request).await)
}

/// Reads the session user, erroring when not authenticated. Handlers take
/// the result as a plain value so core logic never touches session
/// mechanics.
pub async fn current_user(session: &Session) -> Result<SessionUser, ApiError> {
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(ApiError::unauthorized)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create an account and establish a session. No profile row is created
/// here; that happens on the first profile submission.
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let name = validation::require_field(form.name.as_deref(), "Name")?;
    let email = validation::require_field(form.email.as_deref(), "Email")?;
    let password = validation::require_field(form.password.as_deref(), "Password")?;
    let confirm = validation::require_field(form.confirm_password.as_deref(), "Confirm password")?;

    if password != confirm {
        return Err(ApiError::validation("Passwords do not match."));
    }

    let account = match state.accounts.register(name, email, password).await? {
        Ok(account) => account,
        Err(RegistrationError::DuplicateEmail) => {
            return Err(ApiError::validation("That email already has an account."));
        }
    };

    let user = SessionUser::from(account);
    session
        .insert(SESSION_USER_KEY, &user)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(AccountDto {
        id: user.id,
        name: user.name,
        email: user.email,
        is_manager: user.is_manager,
    })))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let email = validation::require_field(form.email.as_deref(), "Email")?;
    let password = validation::require_field(form.password.as_deref(), "Password")?;

    let account = match state.accounts.authenticate(email, password).await? {
        Ok(account) => account,
        Err(failure) => {
            // The two cases stay distinguishable in the logs only.
            match failure {
                AuthFailure::NoSuchAccount => info!(email, "Login rejected: unknown email"),
                AuthFailure::BadPassword => info!(email, "Login rejected: wrong password"),
            }
            return Err(ApiError::Unauthorized(
                "Invalid email or password.".to_string(),
            ));
        }
    };

    let user = SessionUser::from(account);
    session
        .insert(SESSION_USER_KEY, &user)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    info!(account_id = user.id, "Login successful");

    Ok(Json(ApiResponse::success(AccountDto {
        id: user.id,
        name: user.name,
        email: user.email,
        is_manager: user.is_manager,
    })))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    Json(ApiResponse::success(super::types::MessageResponse::new(
        "Logged out",
    )))
}
