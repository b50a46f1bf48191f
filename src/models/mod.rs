pub mod account;
pub mod media;
pub mod profile;

pub use account::Account;
pub use media::MediaKind;
pub use profile::{Availability, NewProfile, ProfileUpdate};
