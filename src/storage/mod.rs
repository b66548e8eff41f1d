//! Storage implementations.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info};

use crate::interfaces::RecordStore;

pub mod memory;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod schema;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql;

pub use memory::MemoryRecordStore;

#[cfg(feature = "postgres")]
pub use sql::postgres::PostgresRecordStore;
#[cfg(feature = "sqlite")]
pub use sql::sqlite::SqliteRecordStore;

/// SQLite path naming a private in-memory database.
pub const SQLITE_IN_MEMORY: &str = ":memory:";

/// Storage type discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Sqlite,
    Postgres,
    Memory,
}

/// Storage configuration (discriminated union).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage type discriminator.
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    /// SQLite-specific configuration.
    pub sqlite: SqliteConfig,
    /// PostgreSQL-specific configuration.
    pub postgres: PostgresConfig,
}

/// SQLite-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Database file path. Parent directories are created on startup.
    /// `:memory:` keeps the database in the process, on a single connection.
    pub path: String,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: "data/simcard.db".to_string(),
        }
    }
}

/// PostgreSQL-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    /// PostgreSQL connection URI.
    pub uri: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            uri: "postgres://localhost:5432/simcard".to_string(),
        }
    }
}

/// Initialize the record store based on configuration.
pub async fn init_storage(
    config: &StorageConfig,
) -> Result<Arc<dyn RecordStore>, Box<dyn std::error::Error>> {
    match config.storage_type {
        StorageType::Memory => {
            info!("Storage: memory");
            Ok(Arc::new(MemoryRecordStore::new()))
        }
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
            use std::time::Duration;

            info!("Storage: sqlite at {}", config.sqlite.path);
            let in_memory = config.sqlite.path == SQLITE_IN_MEMORY;
            if !in_memory {
                if let Some(parent) = std::path::Path::new(&config.sqlite.path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
            }

            let opts = SqliteConnectOptions::new()
                .filename(&config.sqlite.path)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(30))
                .create_if_missing(true);
            // Every connection to ":memory:" opens its own empty database.
            let pool_opts = if in_memory {
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
            } else {
                SqlitePoolOptions::new().max_connections(5)
            };
            let pool = pool_opts.connect_with(opts).await?;
            let store = SqliteRecordStore::new(pool);
            store.init().await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "postgres")]
        StorageType::Postgres => {
            info!("Storage: postgres");
            let pool = sqlx::PgPool::connect(&config.postgres.uri).await?;
            let store = PostgresRecordStore::new(pool);
            store.init().await?;
            Ok(Arc::new(store))
        }
        #[allow(unreachable_patterns)]
        other => {
            error!("Storage type {:?} requested but its feature is not enabled", other);
            Err(format!("Storage feature not enabled: {:?}", other).into())
        }
    }
}
