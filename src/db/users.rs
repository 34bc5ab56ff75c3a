use crate::db::models::DbUser;
use crate::db::sqlite::Database;
use crate::error::CatalogError;
use chrono::Utc;

#[derive(Clone)]
pub struct UsersStorage {
    db: Database,
}

impl UsersStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<DbUser>, CatalogError> {
        self.db
            .run(
                sqlx::query_as::<_, DbUser>(
                    "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
                )
                .bind(username)
                .fetch_optional(self.db.pool()),
            )
            .await
    }

    pub async fn exists(&self, username: &str) -> Result<bool, CatalogError> {
        let rec: Option<(i64,)> = self
            .db
            .run(
                sqlx::query_as("SELECT id FROM users WHERE username = ?")
                    .bind(username)
                    .fetch_optional(self.db.pool()),
            )
            .await?;
        Ok(rec.is_some())
    }

    /// Insert a user. A `UNIQUE` violation maps to `DuplicateUser`.
    pub async fn insert(&self, username: &str, password_hash: &str) -> Result<i64, CatalogError> {
        let res = self
            .db
            .run(
                sqlx::query(
                    "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?)",
                )
                .bind(username)
                .bind(password_hash)
                .bind(Utc::now())
                .execute(self.db.pool()),
            )
            .await;
        match res {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(e) if e.is_unique_violation() => Err(CatalogError::DuplicateUser),
            Err(e) => Err(e),
        }
    }

    pub async fn count_by_username(&self, username: &str) -> Result<i64, CatalogError> {
        let rec: (i64,) = self
            .db
            .run(
                sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
                    .bind(username)
                    .fetch_one(self.db.pool()),
            )
            .await?;
        Ok(rec.0)
    }
}
