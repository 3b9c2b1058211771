// src/storage/change_log.rs
// Selection and update of change_log importance ratings

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{BackfillError, Result};
use crate::llm::Importance;

/// A row still waiting for an importance rating
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PendingEntry {
    pub log_id: i64,
    pub summary: String,
}

pub struct ChangeLogStore {
    pool: SqlitePool,
}

impl ChangeLogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Snapshot of every row with no importance and a summary, in store order.
    pub async fn fetch_unrated(&self) -> Result<Vec<PendingEntry>> {
        let entries = sqlx::query_as::<_, PendingEntry>(
            r#"
            SELECT log_id, summary
            FROM change_log
            WHERE importance IS NULL AND summary IS NOT NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!("Selected {} unrated change_log rows", entries.len());
        Ok(entries)
    }

    /// Write one rating and commit before returning.
    ///
    /// Fails with `RowNotFound` when the update touched no row, so a vanished
    /// row is never reported as updated.
    pub async fn set_importance(&self, log_id: i64, importance: Importance) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE change_log SET importance = ? WHERE log_id = ?")
            .bind(importance.as_str())
            .bind(log_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(BackfillError::RowNotFound(log_id));
        }

        tx.commit().await?;
        Ok(())
    }
}
