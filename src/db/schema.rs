//! SQL DDL for initializing the catalog storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `backrooms`: one row per catalog entry, optional columns NULL when absent
/// - `users`: `username` UNIQUE so concurrent registrations cannot both succeed
/// - `sessions`: opaque id per login, `expires_at` as unix seconds
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS backrooms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    level TEXT NOT NULL,
    entities TEXT NULL,
    danger_level INTEGER NOT NULL,
    entry_method TEXT NOT NULL,
    investigation_status TEXT NULL,
    description TEXT NOT NULL,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    expires_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
"#;
