pub use super::accounts::Entity as Accounts;
pub use super::media_items::Entity as MediaItems;
pub use super::profiles::Entity as Profiles;
