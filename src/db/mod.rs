use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{accounts, media_items, profiles};
use crate::models::{Account, MediaKind, NewProfile, ProfileUpdate};

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    /// Connects and runs all pending migrations before returning, so a Store
    /// in hand always means the schema is current.
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if let Some(path_str) = db_url.strip_prefix("sqlite:")
            && !path_str.contains(":memory:")
            && !path_str.contains("mode=memory")
        {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    fn media_repo(&self) -> repositories::media::MediaRepository {
        repositories::media::MediaRepository::new(self.conn.clone())
    }

    // ========== Accounts ==========

    pub async fn find_account_by_email_ci(&self, email: &str) -> Result<Option<accounts::Model>> {
        self.account_repo().find_by_email_ci(email).await
    }

    pub async fn get_account(&self, id: i32) -> Result<Option<Account>> {
        self.account_repo().get(id).await
    }

    pub async fn insert_account(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account> {
        self.account_repo()
            .insert(name, email, password_hash)
            .await
    }

    pub async fn set_manager_flag(&self, id: i32, is_manager: bool) -> Result<bool> {
        self.account_repo().set_manager_flag(id, is_manager).await
    }

    pub async fn delete_account_row(&self, id: i32) -> Result<bool> {
        self.account_repo().delete(id).await
    }

    // ========== Profiles ==========

    pub async fn get_profile(&self, account_id: i32) -> Result<Option<profiles::Model>> {
        self.profile_repo().find_by_account_id(account_id).await
    }

    pub async fn get_profile_with_account(
        &self,
        account_id: i32,
    ) -> Result<Option<(profiles::Model, Option<accounts::Model>)>> {
        self.profile_repo().find_with_account(account_id).await
    }

    pub async fn create_profile(&self, profile: &NewProfile) -> Result<profiles::Model> {
        self.profile_repo().create(profile).await
    }

    pub async fn update_profile(&self, account_id: i32, update: &ProfileUpdate) -> Result<bool> {
        self.profile_repo().update(account_id, update).await
    }

    pub async fn set_availability(
        &self,
        account_id: i32,
        availability: crate::models::Availability,
    ) -> Result<bool> {
        self.profile_repo()
            .set_availability(account_id, availability)
            .await
    }

    pub async fn set_profile_image_path(&self, account_id: i32, path: &str) -> Result<()> {
        self.profile_repo().set_image_path(account_id, path).await
    }

    pub async fn delete_profile(&self, account_id: i32) -> Result<bool> {
        self.profile_repo().delete_by_account_id(account_id).await
    }

    pub async fn search_directory(
        &self,
        term: Option<&str>,
    ) -> Result<Vec<(profiles::Model, Option<accounts::Model>)>> {
        self.profile_repo().search_directory(term).await
    }

    // ========== Media ==========

    pub async fn list_media_for_account(&self, account_id: i32) -> Result<Vec<media_items::Model>> {
        self.media_repo().list_for_account(account_id).await
    }

    pub async fn get_media_item(&self, id: i32) -> Result<Option<media_items::Model>> {
        self.media_repo().get(id).await
    }

    pub async fn add_media_item(
        &self,
        account_id: i32,
        kind: MediaKind,
        path: &str,
    ) -> Result<media_items::Model> {
        self.media_repo().add(account_id, kind, path).await
    }

    pub async fn delete_media_item(&self, id: i32) -> Result<bool> {
        self.media_repo().delete(id).await
    }

    pub async fn delete_media_for_account(&self, account_id: i32) -> Result<u64> {
        self.media_repo().delete_for_account(account_id).await
    }
}
