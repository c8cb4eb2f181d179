//! Decision layer and end-to-end support pipeline
//!
//! Features:
//! - Certainty-graded decisions with hard escalation exits
//! - Per-session clarification counter with TTL
//! - Screening, triage, retrieval, reranking and decision in one call
//! - Graceful degradation at every collaborator boundary

pub mod decision;
pub mod pipeline;
pub mod session;

pub use decision::{explain, Certainty, DecisionEngine};
pub use pipeline::{RetrievalSummary, SupportPipeline, SupportResponse};
pub use session::{InMemoryClarifyCounter, SessionHistory};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Session store error: {0}")]
    Session(String),
}

impl From<wallet_support_config::ConfigError> for AgentError {
    fn from(err: wallet_support_config::ConfigError) -> Self {
        AgentError::Config(err.to_string())
    }
}

impl From<wallet_support_text_processing::BankCatalogError> for AgentError {
    fn from(err: wallet_support_text_processing::BankCatalogError) -> Self {
        AgentError::Config(err.to_string())
    }
}

impl From<wallet_support_rag::RagError> for AgentError {
    fn from(err: wallet_support_rag::RagError) -> Self {
        AgentError::Initialization(format!("knowledge graph: {}", err))
    }
}

impl From<wallet_support_llm::LlmError> for AgentError {
    fn from(err: wallet_support_llm::LlmError) -> Self {
        AgentError::Initialization(format!("completion fallback: {}", err))
    }
}

impl From<AgentError> for wallet_support_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Config(msg) => wallet_support_core::Error::Config(msg),
            AgentError::Session(msg) => wallet_support_core::Error::Session(msg),
            other => wallet_support_core::Error::InvalidInput(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: wallet_support_core::Error = AgentError::Config("bad".into()).into();
        assert!(matches!(err, wallet_support_core::Error::Config(m) if m == "bad"));

        let err: AgentError = wallet_support_rag::RagError::Configuration("empty".into()).into();
        assert!(matches!(err, AgentError::Initialization(m) if m.contains("knowledge graph")));
    }
}
