pub mod accounts;
pub mod uploads;

pub use accounts::{AccountService, AuthFailure, RegistrationError};
pub use uploads::UploadService;
