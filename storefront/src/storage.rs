//! Durable key/value storage
//!
//! The client counterpart of browser local storage: a single table of string keys and values
//! kept in SQLite, so whatever is written there survives restarts of the client.

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::config;

/// Key/value storage handle
#[derive(Debug, Clone)]
pub struct Storage {
    /// Database access
    db: sqlx::SqlitePool,
}

impl Storage {
    /// Storage for testing purposes - using the in-memory SQLite database
    pub async fn test() -> Result<Self> {
        Self::with_config(config::Storage::Memory).await
    }

    /// Storage from configuration
    ///
    /// In-memory storage is always migrated. File based storage is migrated only if requested by
    /// the configuration.
    pub async fn with_config(config: config::Storage) -> Result<Self> {
        use config::Storage::*;

        let db = match config {
            Memory => {
                let opts: SqliteConnectOptions = "sqlite::memory:".parse()?;

                // Every in-memory connection is a separate database, so the single connection
                // has to be kept alive for the lifetime of the pool.
                let pool = SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(opts)
                    .await?;

                sqlx::migrate!("storage/migrations").run(&pool).await?;
                pool
            }

            SqLite { path, migrate } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await.wrap_err_with(|| {
                        format!("Cannot create storage directory {}", parent.display())
                    })?;
                }

                let opts = SqliteConnectOptions::new()
                    .filename(&path)
                    .create_if_missing(true);

                let pool = SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect_lazy_with(opts);

                if migrate {
                    sqlx::migrate!("storage/migrations")
                        .run(&pool)
                        .await
                        .wrap_err_with(|| format!("Cannot migrate {}", path.display()))?;
                }

                pool
            }
        };

        Ok(Self { db })
    }

    /// Reads the value stored under `key`
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("select value from local_storage where key = ?")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Stores `value` under `key`, replacing the previous one
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "insert into local_storage (key, value) values (?, ?) \
             on conflict(key) do update set value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Removes `key` from the storage. Removing a missing key is not an error.
    pub async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("delete from local_storage where key = ?")
            .bind(key)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
