use anyhow::{Context, Result};
use thiserror::Error;
use tokio::task;
use tracing::info;

use crate::avatar;
use crate::db::Store;
use crate::db::repositories::account::{hash_password, verify_password};
use crate::models::Account;

use super::uploads::UploadService;

/// Why a login attempt failed. The two cases are logged distinctly but the
/// user-facing message never tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("no account with that email")]
    NoSuchAccount,
    #[error("password does not match")]
    BadPassword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("that email already has an account")]
    DuplicateEmail,
}

/// Account lifecycle operations that span more than one store.
#[derive(Clone)]
pub struct AccountService {
    store: Store,
    uploads: UploadService,
}

impl AccountService {
    #[must_use]
    pub const fn new(store: Store, uploads: UploadService) -> Self {
        Self { store, uploads }
    }

    /// Creates an account after the duplicate-email check. The check runs
    /// before any hashing so a duplicate costs no CPU and mutates nothing.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<std::result::Result<Account, RegistrationError>> {
        if self.store.find_account_by_email_ci(email).await?.is_some() {
            return Ok(Err(RegistrationError::DuplicateEmail));
        }

        let password = password.to_string();
        let password_hash = task::spawn_blocking(move || hash_password(&password))
            .await
            .context("Password hashing task panicked")??;

        let account = self.store.insert_account(name, email, &password_hash).await?;
        info!(account_id = account.id, "Account registered");

        Ok(Ok(account))
    }

    /// Verifies credentials. Email lookup is case-insensitive; the password
    /// is checked against the stored Argon2id hash in a blocking task.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<std::result::Result<Account, AuthFailure>> {
        let Some(model) = self.store.find_account_by_email_ci(email).await? else {
            return Ok(Err(AuthFailure::NoSuchAccount));
        };

        let stored_hash = model.password_hash.clone();
        let password = password.to_string();
        let is_valid = task::spawn_blocking(move || verify_password(&stored_hash, &password))
            .await
            .context("Password verification task panicked")??;

        if is_valid {
            Ok(Ok(Account::from(model)))
        } else {
            Ok(Err(AuthFailure::BadPassword))
        }
    }

    /// Removes an account and everything it owns. Returns false when the
    /// account does not exist.
    ///
    /// Files go first and are best-effort: a crash mid-way leaves stray
    /// files, never rows pointing at a deleted account. Row deletion then
    /// runs children-first (media, profile, account) and any failure aborts
    /// before the credential row is touched.
    pub async fn delete_account(&self, target_id: i32) -> Result<bool> {
        if self.store.get_account(target_id).await?.is_none() {
            return Ok(false);
        }

        if let Some(profile) = self.store.get_profile(target_id).await?
            && let Some(path) = &profile.image_path
            && avatar::is_custom_upload(path)
        {
            self.uploads.delete(path).await;
        }

        for item in self.store.list_media_for_account(target_id).await? {
            self.uploads.delete(&item.path).await;
        }

        self.store.delete_media_for_account(target_id).await?;
        self.store.delete_profile(target_id).await?;
        self.store.delete_account_row(target_id).await?;

        info!(account_id = target_id, "Account deleted");
        Ok(true)
    }
}
