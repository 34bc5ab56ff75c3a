//! Database module: models, schema and storages for persistent state.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and conversions
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: pool ownership and the uniform query timeout
//! - `backrooms.rs`, `users.rs`, `sessions.rs`: one storage per table

pub mod backrooms;
pub mod models;
pub mod schema;
pub mod sessions;
pub mod sqlite;
pub mod users;

pub use backrooms::BackroomsStorage;
pub use models::{Backroom, DbSession, DbUser, NewBackroom};
pub use schema::SQLITE_INIT;
pub use sessions::SessionsStorage;
pub use sqlite::{Database, SqlitePool};
pub use users::UsersStorage;
