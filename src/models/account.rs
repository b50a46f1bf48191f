use crate::entities::accounts;

/// Account data handed out by the store, without the password hash.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub is_manager: bool,
    pub created_at: String,
}

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            is_manager: model.is_manager,
            created_at: model.created_at,
        }
    }
}
