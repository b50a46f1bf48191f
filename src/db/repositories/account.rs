use anyhow::{Context, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::accounts;
use crate::models::Account;

pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Case-insensitive email lookup. Emails are stored lowercased, but the
    /// comparison lowers both sides so legacy rows are still found.
    pub async fn find_by_email_ci(&self, email: &str) -> Result<Option<accounts::Model>> {
        let account = accounts::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col((
                    accounts::Entity,
                    accounts::Column::Email,
                ))))
                .eq(email.trim().to_lowercase()),
            )
            .one(&self.conn)
            .await
            .context("Failed to query account by email")?;

        Ok(account)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Account>> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account by id")?;

        Ok(account.map(Account::from))
    }

    pub async fn insert(&self, name: &str, email: &str, password_hash: &str) -> Result<Account> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = accounts::ActiveModel {
            name: Set(name.trim().to_string()),
            email: Set(email.trim().to_lowercase()),
            password_hash: Set(password_hash.to_string()),
            is_manager: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert account")?;

        Ok(Account::from(model))
    }

    /// Returns false when no such account exists.
    pub async fn set_manager_flag(&self, id: i32, is_manager: bool) -> Result<bool> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account for manager toggle")?;

        let Some(account) = account else {
            return Ok(false);
        };

        let mut active: accounts::ActiveModel = account.into();
        active.is_manager = Set(is_manager);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to update manager flag")?;

        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = accounts::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete account row")?;

        Ok(result.rows_affected > 0)
    }
}

/// Hash a password with Argon2id. CPU-heavy; call through `spawn_blocking`.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2id hash. CPU-heavy; call through
/// `spawn_blocking`.
pub fn verify_password(stored_hash: &str, password: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    let argon2 = Argon2::default();
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password(&hash, "s3cret").unwrap());
        assert!(!verify_password(&hash, "wrong").unwrap());
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(verify_password("not-a-phc-string", "anything").is_err());
    }
}
