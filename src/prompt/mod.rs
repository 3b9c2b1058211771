// src/prompt/mod.rs
// Prompt templates sent to the remote classifier

pub mod importance;

pub use importance::build_importance_prompt;
