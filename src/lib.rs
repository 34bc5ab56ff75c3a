pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod sanitize;
pub mod service;
pub mod validation;

pub use error::CatalogError;
pub use router::{AppState, app_router};
