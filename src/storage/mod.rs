// SQLite storage for scheduler snapshots and agent statistics.
// Uses sqlx for async + connection pooling. Every table is mapped by hand in `rows`;
// `codec` converts between those rows and the wire models.

pub mod codec;
pub mod page;
pub mod rows;
mod schema;
mod snapshots;
mod statistics;
pub mod window;

pub use snapshots::SnapshotStore;
pub use statistics::StatisticsStore;

use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::StoreResult;
use window::TimeWindow;

/// Which rows the total count of a query covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountScope {
    /// Rows of the owner inside the resolved time window (pages add up to the count).
    #[default]
    Window,
    /// Every row of the owner, ignoring the window.
    Owner,
}

/// Owns the pool; hands out the two stores.
pub struct Database {
    pool: SqlitePool,
    count_scope: CountScope,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(&config.path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.path))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_pool_size)
            .connect_with(opts)
            .await?;
        tracing::info!(path = %config.path, count_scope = ?config.count_scope, "database connected");
        Ok(Self {
            pool,
            count_scope: config.count_scope,
        })
    }

    /// Creates tables and indexes if missing. Safe to call on every start.
    pub async fn init(&self) -> anyhow::Result<()> {
        schema::create_tables(&self.pool).await
    }

    pub fn snapshots(&self) -> SnapshotStore {
        SnapshotStore::new(self.pool.clone(), self.count_scope)
    }

    pub fn statistics(&self) -> StatisticsStore {
        StatisticsStore::new(self.pool.clone(), self.count_scope)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Row count for one owner, used as the pagination base. `table` and `owner_column`
/// are internal constants, never caller input.
pub(crate) async fn count_owned(
    pool: &SqlitePool,
    table: &str,
    owner_column: &str,
    owner: &str,
    window: &TimeWindow,
    scope: CountScope,
) -> StoreResult<u64> {
    let count = match scope {
        CountScope::Owner => {
            let sql = format!("SELECT COUNT(*) FROM {table} WHERE {owner_column} = $1");
            sqlx::query_scalar::<_, i64>(&sql)
                .bind(owner)
                .fetch_one(pool)
                .await?
        }
        CountScope::Window => {
            let sql = format!(
                "SELECT COUNT(*) FROM {table} WHERE {owner_column} = $1 AND time BETWEEN $2 AND $3"
            );
            sqlx::query_scalar::<_, i64>(&sql)
                .bind(owner)
                .bind(window.from_nanos())
                .bind(window.to_nanos())
                .fetch_one(pool)
                .await?
        }
    };
    Ok(count.max(0) as u64)
}
