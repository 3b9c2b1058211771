// src/llm/mod.rs
// LLM module exports and submodule declarations

pub mod classification;
pub mod provider;

pub use classification::{Classification, Importance, ImportanceClassifier, SkipReason};
pub use provider::{LlmProvider, gemini::GeminiProvider};
