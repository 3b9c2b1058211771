// src/tasks/mod.rs

//! One-shot maintenance tasks run against the change_log store.

pub mod backfill;

pub use backfill::{BackfillReport, BackfillTask};
