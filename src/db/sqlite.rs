use crate::db::schema::SQLITE_INIT;
use crate::error::CatalogError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub type SqlitePool = Pool<Sqlite>;

/// Owns the connection pool and applies one timeout to every store call.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl Database {
    pub async fn connect(database_url: &str, query_timeout: Duration) -> Result<Self, CatalogError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(query_timeout)
            .connect_with(connect_opts)
            .await?;
        info!(database_url = %database_url, "connected to database");

        let db = Self::new(pool, query_timeout);
        db.init_schema().await?;
        Ok(db)
    }

    pub fn new(pool: SqlitePool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), CatalogError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            self.run(sqlx::query(s).execute(&self.pool)).await?;
        }
        Ok(())
    }

    /// Await a store future under the configured timeout.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, CatalogError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(res) => res.map_err(CatalogError::from),
            Err(_) => Err(CatalogError::QueryTimeout(self.query_timeout)),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("database pool closed");
    }
}
