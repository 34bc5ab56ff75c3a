use crate::db::models::DbSession;
use crate::db::sqlite::Database;
use crate::error::CatalogError;

#[derive(Clone)]
pub struct SessionsStorage {
    db: Database,
}

impl SessionsStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn insert(&self, id: &str, user_id: i64, expires_at: i64) -> Result<(), CatalogError> {
        self.db
            .run(
                sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
                    .bind(id)
                    .bind(user_id)
                    .bind(expires_at)
                    .execute(self.db.pool()),
            )
            .await?;
        Ok(())
    }

    /// Live session joined with its user; `None` when unknown or expired at `now`.
    pub async fn find_active(&self, id: &str, now: i64) -> Result<Option<DbSession>, CatalogError> {
        self.db
            .run(
                sqlx::query_as::<_, DbSession>(
                    r#"SELECT s.id, s.user_id, u.username, s.expires_at
                       FROM sessions s JOIN users u ON u.id = s.user_id
                       WHERE s.id = ? AND s.expires_at > ?"#,
                )
                .bind(id)
                .bind(now)
                .fetch_optional(self.db.pool()),
            )
            .await
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, CatalogError> {
        let done = self
            .db
            .run(
                sqlx::query("DELETE FROM sessions WHERE id = ?")
                    .bind(id)
                    .execute(self.db.pool()),
            )
            .await?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn purge_expired(&self, now: i64) -> Result<u64, CatalogError> {
        let done = self
            .db
            .run(
                sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
                    .bind(now)
                    .execute(self.db.pool()),
            )
            .await?;
        Ok(done.rows_affected())
    }

    pub async fn count(&self) -> Result<i64, CatalogError> {
        let rec: (i64,) = self
            .db
            .run(sqlx::query_as("SELECT COUNT(*) FROM sessions").fetch_one(self.db.pool()))
            .await?;
        Ok(rec.0)
    }
}
