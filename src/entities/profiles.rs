use sea_orm::entity::prelude::*;

/// Performer profile row. The row itself is the existence marker: an account
/// with no row here has never created a profile, which is distinct from a row
/// whose optional fields are all empty.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub account_id: i32,

    pub is_performer: bool,

    pub act_category: Option<String>,

    pub genre: Option<String>,

    pub bio: Option<String>,

    /// "Y" or "N"; anything else collapses to "N" at the form boundary.
    pub availability: String,

    pub location: Option<String>,

    /// Relative path under the upload root. None until an image is uploaded,
    /// a default is picked, or the deterministic fallback is materialized.
    pub image_path: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
