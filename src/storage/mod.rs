// src/storage/mod.rs
// SQLite access for the change_log store

pub mod change_log;

pub use change_log::{ChangeLogStore, PendingEntry};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{BackfillError, Result};

/// Open an existing store with write-ahead journaling.
///
/// The pool holds a single connection: the job is the only writer and runs
/// strictly sequentially. A missing database file is an error, never created.
pub async fn open_pool(database_url: &str) -> Result<SqlitePool> {
    let store_open = |source| BackfillError::StoreOpen {
        url: database_url.to_string(),
        source,
    };

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(store_open)?
        .create_if_missing(false)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(store_open)?;

    info!("Opened store {} (journal_mode=WAL)", database_url);
    Ok(pool)
}
