// src/tasks/backfill.rs
// One-shot importance backfill over unrated change_log rows

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::BackfillConfig;
use crate::error::Result;
use crate::llm::{Classification, ImportanceClassifier};
use crate::storage::{ChangeLogStore, PendingEntry};

/// Outcome counts for one backfill run
#[derive(Debug, Clone, Serialize)]
pub struct BackfillReport {
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub updated: usize,
    pub would_update: usize,
    pub skipped: usize,
    pub write_failures: usize,
    pub pacing_delays: usize,
    pub duration_ms: u64,
}

impl BackfillReport {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            started_at: Utc::now(),
            total: 0,
            updated: 0,
            would_update: 0,
            skipped: 0,
            write_failures: 0,
            pacing_delays: 0,
            duration_ms: 0,
        }
    }

    pub fn summary(&self) -> String {
        if self.dry_run {
            format!(
                "{} entries: {} would be updated, {} skipped ({}ms)",
                self.total, self.would_update, self.skipped, self.duration_ms
            )
        } else {
            format!(
                "{} entries: {} updated, {} skipped, {} write failures ({}ms)",
                self.total, self.updated, self.skipped, self.write_failures, self.duration_ms
            )
        }
    }
}

pub struct BackfillTask {
    store: ChangeLogStore,
    classifier: ImportanceClassifier,
    pacing: Duration,
    dry_run: bool,
}

impl BackfillTask {
    pub fn new(
        store: ChangeLogStore,
        classifier: ImportanceClassifier,
        pacing: Duration,
        dry_run: bool,
    ) -> Self {
        Self {
            store,
            classifier,
            pacing,
            dry_run,
        }
    }

    pub fn from_config(
        store: ChangeLogStore,
        classifier: ImportanceClassifier,
        config: &BackfillConfig,
        dry_run: bool,
    ) -> Self {
        Self::new(store, classifier, config.pacing, dry_run)
    }

    fn log_prefix(&self) -> &'static str {
        if self.dry_run { "[DRY RUN] " } else { "" }
    }

    /// Run the backfill once over a snapshot of unrated rows.
    ///
    /// Only the initial selection can fail; per-row failures are logged and
    /// counted in the report.
    pub async fn run(&self) -> Result<BackfillReport> {
        let start = Instant::now();
        let mut report = BackfillReport::new(self.dry_run);

        let entries = self.store.fetch_unrated().await?;
        report.total = entries.len();

        if entries.is_empty() {
            info!("No change_log entries found needing importance backfill.");
            report.duration_ms = start.elapsed().as_millis() as u64;
            return Ok(report);
        }

        let prefix = self.log_prefix();
        info!("{}Found {} entries to backfill importance.", prefix, entries.len());

        for (i, entry) in entries.iter().enumerate() {
            info!(
                "Processing entry {}/{} (log_id: {})...",
                i + 1,
                entries.len(),
                entry.log_id
            );

            self.process_entry(entry, &mut report).await;

            // Rate limit between remote calls, whatever the row's outcome
            if i + 1 < entries.len() {
                tokio::time::sleep(self.pacing).await;
                report.pacing_delays += 1;
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!("{}Importance backfill process completed: {}", prefix, report.summary());

        Ok(report)
    }

    async fn process_entry(&self, entry: &PendingEntry, report: &mut BackfillReport) {
        let importance = match self.classifier.classify(&entry.summary).await {
            Classification::Rated(label) => label,
            Classification::Unrated(reason) => {
                warn!(
                    "  Could not determine importance for log_id {} ({}). Skipping.",
                    entry.log_id, reason
                );
                report.skipped += 1;
                return;
            }
        };

        if self.dry_run {
            info!(
                "{}Would update log_id {} with importance: {}",
                self.log_prefix(),
                entry.log_id,
                importance
            );
            report.would_update += 1;
            return;
        }

        match self.store.set_importance(entry.log_id, importance).await {
            Ok(()) => {
                info!("  Updated log_id {} with importance: {}", entry.log_id, importance);
                report.updated += 1;
            }
            Err(e) => {
                error!(
                    "  Failed to write importance {} for log_id {}: {}",
                    importance, entry.log_id, e
                );
                report.write_failures += 1;
            }
        }
    }
}
