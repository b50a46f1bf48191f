use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{accounts, prelude::*, profiles};
use crate::models::{NewProfile, ProfileUpdate};

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_account_id(&self, account_id: i32) -> Result<Option<profiles::Model>> {
        let profile = Profiles::find()
            .filter(profiles::Column::AccountId.eq(account_id))
            .one(&self.conn)
            .await
            .context("Failed to query profile by account id")?;

        Ok(profile)
    }

    pub async fn find_with_account(
        &self,
        account_id: i32,
    ) -> Result<Option<(profiles::Model, Option<accounts::Model>)>> {
        let row = Profiles::find()
            .filter(profiles::Column::AccountId.eq(account_id))
            .find_also_related(Accounts)
            .one(&self.conn)
            .await
            .context("Failed to query profile with account")?;

        Ok(row)
    }

    pub async fn create(&self, profile: &NewProfile) -> Result<profiles::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = profiles::ActiveModel {
            account_id: Set(profile.account_id),
            is_performer: Set(profile.is_performer),
            act_category: Set(profile.act_category.clone()),
            genre: Set(profile.genre.clone()),
            bio: Set(profile.bio.clone()),
            availability: Set(profile.availability.as_str().to_string()),
            location: Set(profile.location.clone()),
            image_path: Set(profile.image_path.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert profile")?;

        Ok(model)
    }

    /// Full-field update. Returns false when the account has no profile row.
    pub async fn update(&self, account_id: i32, update: &ProfileUpdate) -> Result<bool> {
        let Some(model) = self.find_by_account_id(account_id).await? else {
            return Ok(false);
        };

        let mut active: profiles::ActiveModel = model.into();
        active.is_performer = Set(update.is_performer);
        active.act_category = Set(update.act_category.clone());
        active.genre = Set(update.genre.clone());
        active.bio = Set(update.bio.clone());
        active.availability = Set(update.availability.as_str().to_string());
        active.location = Set(update.location.clone());
        if let Some(path) = &update.image_path {
            active.image_path = Set(Some(path.clone()));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        active
            .update(&self.conn)
            .await
            .context("Failed to update profile")?;

        Ok(true)
    }

    /// Availability-only update. Returns false when the account has no
    /// profile row, which callers use to send the user to profile creation.
    pub async fn set_availability(
        &self,
        account_id: i32,
        availability: crate::models::Availability,
    ) -> Result<bool> {
        let result = Profiles::update_many()
            .col_expr(
                profiles::Column::Availability,
                Expr::value(availability.as_str()),
            )
            .col_expr(
                profiles::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(profiles::Column::AccountId.eq(account_id))
            .exec(&self.conn)
            .await
            .context("Failed to update availability")?;

        Ok(result.rows_affected > 0)
    }

    /// Persist a lazily resolved avatar path. Idempotent: callers may race
    /// and all write the same deterministic value.
    pub async fn set_image_path(&self, account_id: i32, path: &str) -> Result<()> {
        Profiles::update_many()
            .col_expr(profiles::Column::ImagePath, Expr::value(path))
            .filter(profiles::Column::AccountId.eq(account_id))
            .exec(&self.conn)
            .await
            .context("Failed to persist profile image path")?;

        Ok(())
    }

    pub async fn delete_by_account_id(&self, account_id: i32) -> Result<bool> {
        let result = Profiles::delete_many()
            .filter(profiles::Column::AccountId.eq(account_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete profile")?;

        Ok(result.rows_affected > 0)
    }

    /// Directory listing: performer profiles joined with their accounts,
    /// optionally filtered by a free-text term over name, category, genre,
    /// and location, ordered by lowercased account name.
    pub async fn search_directory(
        &self,
        term: Option<&str>,
    ) -> Result<Vec<(profiles::Model, Option<accounts::Model>)>> {
        let mut select = Profiles::find()
            .filter(profiles::Column::IsPerformer.eq(true))
            .find_also_related(Accounts);

        if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            accounts::Entity,
                            accounts::Column::Name,
                        ))))
                        .like(pattern.as_str()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            profiles::Entity,
                            profiles::Column::ActCategory,
                        ))))
                        .like(pattern.as_str()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            profiles::Entity,
                            profiles::Column::Genre,
                        ))))
                        .like(pattern.as_str()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            profiles::Entity,
                            profiles::Column::Location,
                        ))))
                        .like(pattern.as_str()),
                    ),
            );
        }

        let name_lower: SimpleExpr =
            Func::lower(Expr::col((accounts::Entity, accounts::Column::Name))).into();

        let rows = select
            .order_by(name_lower, Order::Asc)
            .all(&self.conn)
            .await
            .context("Failed to query performer directory")?;

        Ok(rows)
    }
}
