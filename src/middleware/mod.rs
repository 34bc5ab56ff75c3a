pub mod auth;

pub use auth::{CurrentSession, RequireSession, SESSION_COOKIE};
