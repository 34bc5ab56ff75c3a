use crate::db::models::{Backroom, NewBackroom};
use crate::db::sqlite::Database;
use crate::error::CatalogError;
use chrono::Utc;
use tracing::debug;

#[derive(Clone)]
pub struct BackroomsStorage {
    db: Database,
}

impl BackroomsStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Backroom>, CatalogError> {
        self.db
            .run(
                sqlx::query_as::<_, Backroom>(
                    r#"SELECT id, level, entities, danger_level, entry_method,
                       investigation_status, description, created_at
                       FROM backrooms ORDER BY id"#,
                )
                .fetch_all(self.db.pool()),
            )
            .await
    }

    /// Insert one validated entry. Returns the row id.
    pub async fn insert(&self, entry: NewBackroom) -> Result<i64, CatalogError> {
        let done = self
            .db
            .run(
                sqlx::query(
                    r#"
                    INSERT INTO backrooms (
                        level, entities, danger_level, entry_method,
                        investigation_status, description, created_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(entry.level)
                .bind(entry.entities)
                .bind(entry.danger_level)
                .bind(entry.entry_method)
                .bind(entry.investigation_status)
                .bind(entry.description)
                .bind(Utc::now())
                .execute(self.db.pool()),
            )
            .await?;
        let id = done.last_insert_rowid();
        debug!(id, "inserted backroom");
        Ok(id)
    }

    /// Delete by id; `NotFound` when no row matched.
    pub async fn delete(&self, id: i64) -> Result<(), CatalogError> {
        let done = self
            .db
            .run(
                sqlx::query("DELETE FROM backrooms WHERE id = ?")
                    .bind(id)
                    .execute(self.db.pool()),
            )
            .await?;
        if done.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }
        debug!(id, "deleted backroom");
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, CatalogError> {
        let rec: (i64,) = self
            .db
            .run(sqlx::query_as("SELECT COUNT(*) FROM backrooms").fetch_one(self.db.pool()))
            .await?;
        Ok(rec.0)
    }
}
