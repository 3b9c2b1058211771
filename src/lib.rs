// src/lib.rs

pub mod config;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod storage;
pub mod tasks;

pub use config::BackfillConfig;
pub use error::{BackfillError, ProviderError};
pub use llm::{Classification, Importance, ImportanceClassifier, LlmProvider, SkipReason};
pub use storage::{ChangeLogStore, PendingEntry};
pub use tasks::{BackfillReport, BackfillTask};
