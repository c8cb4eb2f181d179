//! Completion-service integration for slot extraction
//!
//! Features:
//! - OpenAI-compatible chat backend with JSON mode
//! - Retry with exponential backoff on transient failures
//! - Slot extraction prompt built from the taxonomy registry
//! - JSON schema check of every reply

pub mod backend;
pub mod extractor;
pub mod factory;
pub mod prompt;

pub use backend::{FinishReason, GenerationResult, LlmBackend, LlmConfig, OpenAIBackend};
pub use extractor::{parse_reply, LlmSlotExtractor, REPLY_SCHEMA};
pub use factory::create_fallback_extractor;
pub use prompt::{extract_json, system_prompt, Message, PromptBuilder, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Reply does not match schema: {0}")]
    SchemaViolation(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for wallet_support_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout => wallet_support_core::Error::Timeout("completion service".to_string()),
            other => wallet_support_core::Error::Llm(other.to_string()),
        }
    }
}
