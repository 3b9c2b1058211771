// src/llm/classification.rs
// Importance rating of change log summaries via the remote model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use super::provider::LlmProvider;
use crate::config::BackfillConfig;
use crate::error::ProviderError;
use crate::prompt::build_importance_prompt;

/// Characters of a summary included in log lines
const SUMMARY_PREVIEW_CHARS: usize = 100;

/// Closed label set, ordered by ascending severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Importance {
    Low,
    Medium,
    High,
    Critical,
}

impl Importance {
    pub const ALL: [Importance; 4] = [
        Importance::Low,
        Importance::Medium,
        Importance::High,
        Importance::Critical,
    ];

    /// The exact string stored in the `importance` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Low => "Low",
            Importance::Medium => "Medium",
            Importance::High => "High",
            Importance::Critical => "Critical",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Case-sensitive and exact: `"high"` or `"High."` are not labels.
impl FromStr for Importance {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Importance::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown importance label: {}", s))
    }
}

/// Result of a single remote call
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Call succeeded and the trimmed text is a known label
    Rated(Importance),
    /// Call itself failed; worth another attempt
    Retryable(ProviderError),
    /// Call succeeded but answered outside the label set; final
    Invalid(String),
}

/// Why a row ends up without a rating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    EmptySummary,
    InvalidLabel(String),
    RetriesExhausted { attempts: u32, last_error: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptySummary => write!(f, "empty summary"),
            SkipReason::InvalidLabel(raw) => write!(f, "unexpected rating '{}'", raw),
            SkipReason::RetriesExhausted { attempts, last_error } => {
                write!(f, "failed after {} attempts: {}", attempts, last_error)
            }
        }
    }
}

/// What the classifier hands back to the driver for one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Rated(Importance),
    Unrated(SkipReason),
}

/// Validate raw model output against the label set
pub fn parse_rating(raw: &str) -> Option<Importance> {
    raw.trim().parse().ok()
}

pub(crate) fn preview(text: &str) -> String {
    text.chars().take(SUMMARY_PREVIEW_CHARS).collect()
}

/// Maps a summary to an importance label with bounded retry on transport errors.
pub struct ImportanceClassifier {
    provider: Arc<dyn LlmProvider>,
    max_attempts: u32,
    backoff_base: Duration,
}

impl ImportanceClassifier {
    pub fn new(provider: Arc<dyn LlmProvider>, max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            provider,
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    pub fn from_config(provider: Arc<dyn LlmProvider>, config: &BackfillConfig) -> Self {
        Self::new(provider, config.max_attempts, config.backoff_base)
    }

    /// Wait after failed attempt `attempt_index` (0-based): `base * 2^index`
    pub fn backoff_delay(&self, attempt_index: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(attempt_index))
    }

    async fn attempt(&self, prompt: &str) -> AttemptOutcome {
        match self.provider.generate(prompt).await {
            Ok(text) => {
                let rating = text.trim();
                match parse_rating(rating) {
                    Some(label) => AttemptOutcome::Rated(label),
                    None => AttemptOutcome::Invalid(rating.to_string()),
                }
            }
            Err(e) => AttemptOutcome::Retryable(e),
        }
    }

    /// Rate one summary. Never fails: every failure becomes `Classification::Unrated`.
    pub async fn classify(&self, summary: &str) -> Classification {
        if summary.is_empty() {
            return Classification::Unrated(SkipReason::EmptySummary);
        }

        let prompt = build_importance_prompt(summary);
        let mut last_error = String::new();

        for i in 0..self.max_attempts {
            match self.attempt(&prompt).await {
                AttemptOutcome::Rated(label) => return Classification::Rated(label),
                AttemptOutcome::Invalid(raw) => {
                    warn!(
                        "{} returned unexpected rating '{}' for summary: {}...",
                        self.provider.name(),
                        raw,
                        preview(summary)
                    );
                    return Classification::Unrated(SkipReason::InvalidLabel(raw));
                }
                AttemptOutcome::Retryable(e) => {
                    error!(
                        "Error calling {} (attempt {}/{}): {}",
                        self.provider.name(),
                        i + 1,
                        self.max_attempts,
                        e
                    );
                    last_error = e.to_string();
                    if i + 1 < self.max_attempts {
                        tokio::time::sleep(self.backoff_delay(i)).await;
                    }
                }
            }
        }

        error!(
            "Failed to get importance rating after {} attempts for summary: {}...",
            self.max_attempts,
            preview(summary)
        );
        Classification::Unrated(SkipReason::RetriesExhausted {
            attempts: self.max_attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays scripted responses, one per call
    struct Scripted {
        replies: Mutex<VecDeque<Result<String, ProviderError>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProviderError::EmptyResponse))
        }
    }

    fn transport_error() -> Result<String, ProviderError> {
        Err(ProviderError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })
    }

    fn classifier(provider: Arc<Scripted>) -> ImportanceClassifier {
        ImportanceClassifier::new(provider, 3, Duration::from_secs(1))
    }

    #[test]
    fn test_labels_ordered_by_severity() {
        assert!(Importance::Low < Importance::Medium);
        assert!(Importance::High < Importance::Critical);
    }

    #[test]
    fn test_parse_rating_trims_whitespace() {
        assert_eq!(parse_rating("  Critical\n"), Some(Importance::Critical));
    }

    #[test]
    fn test_parse_rating_rejects_near_misses() {
        for raw in ["high", "HIGH", "High.", "High confidence", "", "**High**"] {
            assert_eq!(parse_rating(raw), None, "accepted {:?}", raw);
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let c = classifier(Scripted::new(vec![]));
        assert_eq!(c.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(c.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(c.backoff_delay(2), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_rated_on_first_attempt() {
        let provider = Scripted::new(vec![Ok(" Medium \n".to_string())]);
        let c = classifier(provider.clone());

        assert_eq!(c.classify("Added webhook event").await, Classification::Rated(Importance::Medium));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_label_is_not_retried() {
        let provider = Scripted::new(vec![Ok("High confidence".to_string()), Ok("High".to_string())]);
        let c = classifier(provider.clone());

        let result = c.classify("Removed v1 auth endpoint").await;
        assert_eq!(
            result,
            Classification::Unrated(SkipReason::InvalidLabel("High confidence".to_string()))
        );
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds() {
        let provider = Scripted::new(vec![transport_error(), Ok("Low".to_string())]);
        let c = classifier(provider.clone());

        let start = tokio::time::Instant::now();
        assert_eq!(c.classify("Fixed typo in docs").await, Classification::Rated(Importance::Low));
        assert_eq!(provider.calls(), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_errors_exhaust_attempts() {
        let provider = Scripted::new(vec![transport_error(), transport_error(), transport_error()]);
        let c = classifier(provider.clone());

        let start = tokio::time::Instant::now();
        let result = c.classify("Rotated signing keys").await;

        assert_eq!(provider.calls(), 3);
        // 1s after the first failure, 2s after the second, none after the last
        assert_eq!(start.elapsed(), Duration::from_secs(3));
        match result {
            Classification::Unrated(SkipReason::RetriesExhausted { attempts, last_error }) => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("503"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_summary_skips_remote_call() {
        let provider = Scripted::new(vec![Ok("High".to_string())]);
        let c = classifier(provider.clone());

        assert_eq!(c.classify("").await, Classification::Unrated(SkipReason::EmptySummary));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_summary_still_reaches_model() {
        let provider = Scripted::new(vec![Ok("Low".to_string())]);
        let c = classifier(provider.clone());

        assert_eq!(c.classify("   ").await, Classification::Rated(Importance::Low));
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(150);
        assert_eq!(preview(&long).chars().count(), 100);
    }
}
