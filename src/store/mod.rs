//! Durable dedup store: the fingerprint → item index plus the append-only run history.
//!
//! Backed by SQLite. The unit of atomicity is one item's check-and-insert, implemented as a
//! conditional insert so that concurrent writers of the same fingerprint see exactly one winner.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::StoreError;

pub mod fingerprint;
mod items;
mod runs;
pub mod types;

pub use fingerprint::fingerprint;
pub use types::{ContentItem, PutOutcome, RunOutcome, RunRecord, RunRollup};

const MAX_CONNECTIONS: u32 = 5;

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) the database at `dsn` and apply pending migrations.
    pub async fn open(dsn: &str) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str(dsn)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let in_memory = dsn.contains(":memory:");
        if !in_memory {
            ensure_parent_dir(&sqlite_file_path(dsn))?;
        }

        // every in-memory connection is its own database
        let max = if in_memory { 1 } else { MAX_CONNECTIONS };
        let pool = SqlitePoolOptions::new().max_connections(max).connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        Ok(())
    }

    /// Flush and close every pooled connection (checkpoints the WAL).
    pub async fn close(&self) { self.pool.close().await }

    pub async fn has(&self, fingerprint: &str) -> Result<bool, StoreError> {
        items::exists(&self.pool, fingerprint).await
    }

    /// Idempotent insert. An existing fingerprint is left untouched unless `force`, in which case
    /// the stored item is overwritten and `ingested_at` refreshed.
    pub async fn put(&self, item: &ContentItem, force: bool) -> Result<PutOutcome, StoreError> {
        items::put_item(&self.pool, item, force).await
    }

    pub async fn get_item_by_fingerprint(&self, fingerprint: &str) -> Result<Option<ContentItem>, StoreError> {
        items::get_item(&self.pool, fingerprint).await
    }

    /// Items whose `published_at` (or `ingested_at` when absent) is at or after `since`, ascending.
    pub async fn items_in_window(&self, since: DateTime<Utc>) -> Result<Vec<ContentItem>, StoreError> {
        items::items_since(&self.pool, since).await
    }

    pub async fn item_counts(&self) -> Result<Vec<(String, i64)>, StoreError> {
        items::counts_by_source(&self.pool).await
    }

    pub async fn append_run(&self, run: &RunRecord) -> Result<i64, StoreError> {
        runs::append_run(&self.pool, run).await
    }

    pub async fn recent_runs(&self, source_id: &str, limit: i64) -> Result<Vec<RunRecord>, StoreError> {
        runs::recent_runs(&self.pool, source_id, limit).await
    }

    pub async fn run_rollup(&self, source_id: &str) -> Result<RunRollup, StoreError> {
        runs::rollup(&self.pool, source_id).await
    }

    pub async fn run_source_ids(&self) -> Result<Vec<String>, StoreError> {
        runs::run_source_ids(&self.pool).await
    }
}

// "sqlite://data/brief.db?mode=rwc" -> "data/brief.db"
fn sqlite_file_path(dsn: &str) -> PathBuf {
    let rest = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .unwrap_or(dsn);
    let path = rest.split_once('?').map_or(rest, |(p, _)| p);
    PathBuf::from(path)
}

fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Database(sqlx::Error::Io(e)))?;
        }
    }
    Ok(())
}
