use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{media_items, prelude::*};
use crate::models::MediaKind;

pub struct MediaRepository {
    conn: DatabaseConnection,
}

impl MediaRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All media for an account, newest first.
    pub async fn list_for_account(&self, account_id: i32) -> Result<Vec<media_items::Model>> {
        let items = MediaItems::find()
            .filter(media_items::Column::AccountId.eq(account_id))
            .order_by_desc(media_items::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list media items")?;

        Ok(items)
    }

    pub async fn get(&self, id: i32) -> Result<Option<media_items::Model>> {
        let item = MediaItems::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query media item")?;

        Ok(item)
    }

    pub async fn add(
        &self,
        account_id: i32,
        kind: MediaKind,
        path: &str,
    ) -> Result<media_items::Model> {
        let active = media_items::ActiveModel {
            account_id: Set(account_id),
            kind: Set(kind.as_str().to_string()),
            path: Set(path.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert media item")?;

        Ok(model)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = MediaItems::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete media item")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_for_account(&self, account_id: i32) -> Result<u64> {
        let result = MediaItems::delete_many()
            .filter(media_items::Column::AccountId.eq(account_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete media items for account")?;

        Ok(result.rows_affected)
    }
}
