//! Crate-wide error type
//!
//! Component crates keep their own error enums and convert into this one at
//! the trait boundaries defined in [`crate::traits`].

use thiserror::Error;

/// Core error type shared by every collaborator trait
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Retrieval error: {0}")]
    Rag(String),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, Error>;
