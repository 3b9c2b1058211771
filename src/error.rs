// src/error.rs
// Error types for the importance backfill

use thiserror::Error;

/// Failure of a single remote model call.
///
/// Every variant is treated as transient by the classifier: the call itself
/// did not produce an answer, so it is worth asking again.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("response contained no text")]
    EmptyResponse,
}

/// Errors surfaced by the store and the job setup.
#[derive(Error, Debug)]
pub enum BackfillError {
    #[error("failed to open store at {url}: {source}")]
    StoreOpen {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("no change_log row with log_id {0}")]
    RowNotFound(i64),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BackfillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = ProviderError::Status {
            status: 429,
            body: "quota exceeded".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_row_not_found_message() {
        let err = BackfillError::RowNotFound(42);
        assert_eq!(err.to_string(), "no change_log row with log_id 42");
    }

    #[test]
    fn test_config_error_message() {
        let err = BackfillError::Config("GEMINI_API_KEY not set".to_string());
        assert!(err.to_string().starts_with("configuration error"));
    }
}
