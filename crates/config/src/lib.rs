//! Configuration management for the wallet support decision engine
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/` (`default`, then `{env}`)
//! - Environment variables (`WALLET_SUPPORT__` prefix)
//!
//! Every section carries serde defaults taken from [`constants`], so an
//! empty configuration is valid.

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, DecisionConfig, ExtractionConfig, GraphBackend,
    LlmSettings, ObservabilityConfig, RerankConfig, RetrievalConfig, RuntimeEnvironment,
    SessionConfig, Settings, TierLimits,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for wallet_support_core::Error {
    fn from(err: ConfigError) -> Self {
        wallet_support_core::Error::Config(err.to_string())
    }
}
