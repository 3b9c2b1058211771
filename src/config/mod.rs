// src/config/mod.rs
// Runtime configuration, loaded from the environment (and .env when present)

use std::str::FromStr;
use std::time::Duration;

use crate::error::{BackfillError, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./changelog.db";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct BackfillConfig {
    // ── Store
    pub database_url: String,

    // ── Remote model
    pub gemini_api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub request_timeout: Duration,

    // ── Retry & pacing
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub pacing: Duration,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            gemini_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(60),
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            pacing: Duration::from_secs(1),
        }
    }
}

/// Parse an environment value, ignoring trailing `# comments` and whitespace.
fn parse_value<T: FromStr>(raw: &str) -> Option<T> {
    raw.split('#').next().unwrap_or("").trim().parse::<T>().ok()
}

fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(val) => parse_value(&val).unwrap_or(default),
        Err(_) => default,
    }
}

impl BackfillConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Self {
            database_url: env_var_or("DATABASE_URL", defaults.database_url),
            gemini_api_key,
            model: env_var_or("BACKFILL_MODEL", defaults.model),
            api_base: env_var_or("BACKFILL_API_BASE", defaults.api_base),
            request_timeout: Duration::from_secs(env_var_or("BACKFILL_REQUEST_TIMEOUT", 60)),
            max_attempts: env_var_or("BACKFILL_MAX_ATTEMPTS", defaults.max_attempts),
            backoff_base: Duration::from_millis(env_var_or("BACKFILL_BACKOFF_BASE_MS", 1000)),
            pacing: Duration::from_millis(env_var_or("BACKFILL_PACING_MS", 1000)),
        }
    }

    /// API key for the remote model, required for any classification call.
    pub fn require_api_key(&self) -> Result<&str> {
        self.gemini_api_key
            .as_deref()
            .ok_or_else(|| BackfillError::Config("GEMINI_API_KEY not set".to_string()))
    }

    /// Human-readable summary for startup logging. Never includes the API key.
    pub fn summary(&self) -> String {
        format!(
            "store: {}, model: {}, attempts: {}, backoff base: {}ms, pacing: {}ms",
            self.database_url,
            self.model,
            self.max_attempts,
            self.backoff_base.as_millis(),
            self.pacing.as_millis(),
        )
    }
}
