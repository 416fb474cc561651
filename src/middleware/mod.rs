pub mod auth;

pub use auth::{CurrentUser, AUTH_COOKIE};
