//! Gemini provider for importance classification
//!
//! Uses Gemini's generateContent API with a single user turn and no tools.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::LlmProvider;
use crate::config::BackfillConfig;
use crate::error::{BackfillError, ProviderError};

/// Gemini generateContent client
pub struct GeminiProvider {
    client: HttpClient,
    api_key: String,
    model: String,
    api_base: String,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, api_base: String, timeout: Duration) -> Self {
        Self {
            client: HttpClient::new(),
            api_key,
            model,
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Create from loaded configuration. Fails when no API key is configured.
    pub fn from_config(config: &BackfillConfig) -> Result<Self, BackfillError> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self::new(
            api_key,
            config.model.clone(),
            config.api_base.clone(),
            config.request_timeout,
        ))
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn build_request(prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart { text: prompt.to_string() }],
            }],
        }
    }

    /// The key travels in a header so it never appears in URLs or error messages
    fn request(&self, prompt: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_request(prompt))
            .timeout(self.timeout)
    }

    /// Concatenate the text parts of the first candidate
    fn extract_text(response: GeminiResponse) -> Result<String, ProviderError> {
        if let Some(error) = response.error {
            return Err(ProviderError::Api(error.message));
        }

        let text: String = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!("Gemini request to {} ({} chars)", self.model, prompt.len());

        let response = self.request(prompt).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let api_response: GeminiResponse = response.json().await?;
        Self::extract_text(api_response)
    }
}

// ============================================================================
// Gemini API types
// ============================================================================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
}
