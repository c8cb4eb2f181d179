//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{decision, endpoints, extraction, gate, session, tiers, timeouts};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Slot extraction and completion fallback
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Knowledge graph backend and tier limits
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Reranker weights and gate thresholds
    #[serde(default)]
    pub rerank: RerankConfig,

    /// Certainty thresholds and clarify budget
    #[serde(default)]
    pub decision: DecisionConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub llm: LlmSettings,

    /// Optional bank catalog file (YAML or JSON) replacing the built-in list
    #[serde(default)]
    pub banks_path: Option<String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_extraction()?;
        self.validate_retrieval()?;
        self.validate_rerank()?;
        self.validate_decision()?;
        self.validate_llm()?;

        if self.session.clarify_ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.clarify_ttl_seconds".to_string(),
                message: "TTL must be greater than 0".to_string(),
            });
        }
        if self.session.cleanup_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.cleanup_interval_seconds".to_string(),
                message: "Interval must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Render the effective settings as YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn validate_extraction(&self) -> Result<(), ConfigError> {
        let ext = &self.extraction;
        check_unit("extraction.fallback_threshold", ext.fallback_threshold)?;
        check_unit(
            "extraction.service_filter_min_confidence",
            ext.service_filter_min_confidence,
        )?;
        Ok(())
    }

    fn validate_retrieval(&self) -> Result<(), ConfigError> {
        let retrieval = &self.retrieval;

        if retrieval.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.timeout_ms".to_string(),
                message: "Timeout must be greater than 0".to_string(),
            });
        }

        if retrieval.total_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.total_limit".to_string(),
                message: "Total limit must be greater than 0".to_string(),
            });
        }

        if retrieval.backend == GraphBackend::Neo4j && retrieval.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("retrieval.endpoint".to_string()));
        }

        Ok(())
    }

    fn validate_rerank(&self) -> Result<(), ConfigError> {
        let rerank = &self.rerank;

        check_unit(
            "rerank.min_extraction_confidence",
            rerank.min_extraction_confidence,
        )?;
        check_unit(
            "rerank.low_tier_min_confidence",
            rerank.low_tier_min_confidence,
        )?;

        // Lower tiers must be at least as hard to accept as higher ones
        if rerank.tier4_min_score > rerank.tier3_min_score
            || rerank.tier3_min_score > rerank.tier2_min_score
            || rerank.tier2_min_score > rerank.low_tier_min_score
        {
            return Err(ConfigError::InvalidValue {
                field: "rerank.tier*_min_score".to_string(),
                message: format!(
                    "Thresholds must be non-decreasing from tier 4 to tier 1, got {}/{}/{}/{}",
                    rerank.tier4_min_score,
                    rerank.tier3_min_score,
                    rerank.tier2_min_score,
                    rerank.low_tier_min_score
                ),
            });
        }

        if rerank.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rerank.top_k".to_string(),
                message: "top_k must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    fn validate_decision(&self) -> Result<(), ConfigError> {
        let d = &self.decision;

        check_unit("decision.certainty_low", d.certainty_low)?;
        check_unit("decision.certainty_medium", d.certainty_medium)?;
        check_unit("decision.certainty_high", d.certainty_high)?;

        if !(d.certainty_low <= d.certainty_medium && d.certainty_medium <= d.certainty_high) {
            return Err(ConfigError::InvalidValue {
                field: "decision.certainty_*".to_string(),
                message: format!(
                    "Expected low <= medium <= high, got {}/{}/{}",
                    d.certainty_low, d.certainty_medium, d.certainty_high
                ),
            });
        }

        if d.score_gap_normalizer <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "decision.score_gap_normalizer".to_string(),
                message: format!("Must be positive, got {}", d.score_gap_normalizer),
            });
        }

        if d.max_clarify_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "decision.max_clarify_count".to_string(),
                message: "Must allow at least one clarification round".to_string(),
            });
        }

        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            });
        }

        if llm.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_tokens".to_string(),
                message: "max_tokens must be greater than 0".to_string(),
            });
        }

        if llm.enabled && llm.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.endpoint".to_string()));
        }

        Ok(())
    }
}

fn check_unit(field: &str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be between 0.0 and 1.0, got {}", value),
        });
    }
    Ok(())
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Slot extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Mean service/problem confidence below which the fallback runs
    #[serde(default = "default_fallback_threshold")]
    pub fallback_threshold: f32,

    /// Service confidence needed to filter the graph by service
    #[serde(default = "default_service_filter_min_confidence")]
    pub service_filter_min_confidence: f32,

    /// Recent history turns passed to the completion service
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

fn default_fallback_threshold() -> f32 {
    extraction::FALLBACK_THRESHOLD
}
fn default_service_filter_min_confidence() -> f32 {
    extraction::SERVICE_FILTER_MIN_CONFIDENCE
}
fn default_history_turns() -> usize {
    extraction::HISTORY_TURNS
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fallback_threshold: default_fallback_threshold(),
            service_filter_min_confidence: default_service_filter_min_confidence(),
            history_turns: default_history_turns(),
        }
    }
}

/// Knowledge graph backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GraphBackend {
    /// In-process store loaded from `knowledge_path`
    #[default]
    Memory,
    /// Neo4j HTTP transactional endpoint
    Neo4j,
}

/// Per-tier row limits of the primary query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierLimits {
    #[serde(default = "default_tier4_limit")]
    pub tier4: usize,
    #[serde(default = "default_tier3_limit")]
    pub tier3: usize,
    #[serde(default = "default_tier2_limit")]
    pub tier2: usize,
    #[serde(default = "default_tier1_limit")]
    pub tier1: usize,
    #[serde(default = "default_tier0_limit")]
    pub tier0: usize,
}

fn default_tier4_limit() -> usize {
    tiers::TIER4_LIMIT
}
fn default_tier3_limit() -> usize {
    tiers::TIER3_LIMIT
}
fn default_tier2_limit() -> usize {
    tiers::TIER2_LIMIT
}
fn default_tier1_limit() -> usize {
    tiers::TIER1_LIMIT
}
fn default_tier0_limit() -> usize {
    tiers::TIER0_LIMIT
}

impl Default for TierLimits {
    fn default() -> Self {
        Self {
            tier4: default_tier4_limit(),
            tier3: default_tier3_limit(),
            tier2: default_tier2_limit(),
            tier1: default_tier1_limit(),
            tier0: default_tier0_limit(),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub backend: GraphBackend,

    #[serde(default = "default_neo4j_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_neo4j_database")]
    pub database: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Solutions file for the in-memory backend (YAML or JSON)
    #[serde(default)]
    pub knowledge_path: Option<String>,

    #[serde(default = "default_graph_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub tier_limits: TierLimits,

    #[serde(default = "default_total_limit")]
    pub total_limit: usize,

    /// Limit of the service-only and problem-only fallback queries
    #[serde(default = "default_fallback_limit")]
    pub fallback_limit: usize,

    /// Limit of the unfiltered fallback query
    #[serde(default = "default_generic_fallback_limit")]
    pub generic_fallback_limit: usize,
}

fn default_neo4j_endpoint() -> String {
    endpoints::NEO4J_DEFAULT.to_string()
}
fn default_neo4j_database() -> String {
    endpoints::NEO4J_DATABASE.to_string()
}
fn default_graph_timeout_ms() -> u64 {
    timeouts::GRAPH_QUERY_MS
}
fn default_total_limit() -> usize {
    tiers::TOTAL_LIMIT
}
fn default_fallback_limit() -> usize {
    tiers::FALLBACK_LIMIT
}
fn default_generic_fallback_limit() -> usize {
    tiers::GENERIC_FALLBACK_LIMIT
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            backend: GraphBackend::default(),
            endpoint: default_neo4j_endpoint(),
            database: default_neo4j_database(),
            username: None,
            password: None,
            knowledge_path: None,
            timeout_ms: default_graph_timeout_ms(),
            tier_limits: TierLimits::default(),
            total_limit: default_total_limit(),
            fallback_limit: default_fallback_limit(),
            generic_fallback_limit: default_generic_fallback_limit(),
        }
    }
}

/// Reranker and gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankConfig {
    #[serde(default = "default_tier4_min_score")]
    pub tier4_min_score: f32,
    #[serde(default = "default_tier3_min_score")]
    pub tier3_min_score: f32,
    #[serde(default = "default_tier2_min_score")]
    pub tier2_min_score: f32,
    /// Threshold for tier 1 and tier 0
    #[serde(default = "default_low_tier_min_score")]
    pub low_tier_min_score: f32,
    /// Agreement confidence a low-tier answer must also reach
    #[serde(default = "default_low_tier_min_confidence")]
    pub low_tier_min_confidence: f32,
    #[serde(default = "default_min_extraction_confidence")]
    pub min_extraction_confidence: f32,
    #[serde(default = "default_min_semantic")]
    pub min_semantic: f32,
    /// Service confidence under which an irrelevant result is out of scope
    #[serde(default = "default_min_service_confidence")]
    pub min_service_confidence: f32,
    /// Score margin under which tie-breakers apply
    #[serde(default = "default_close_score_margin")]
    pub close_score_margin: f32,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_tier4_min_score() -> f32 {
    gate::TIER4_MIN_SCORE
}
fn default_tier3_min_score() -> f32 {
    gate::TIER3_MIN_SCORE
}
fn default_tier2_min_score() -> f32 {
    gate::TIER2_MIN_SCORE
}
fn default_low_tier_min_score() -> f32 {
    gate::LOW_TIER_MIN_SCORE
}
fn default_low_tier_min_confidence() -> f32 {
    gate::LOW_TIER_MIN_CONFIDENCE
}
fn default_min_extraction_confidence() -> f32 {
    gate::MIN_EXTRACTION_CONFIDENCE
}
fn default_min_semantic() -> f32 {
    gate::MIN_SEMANTIC
}
fn default_min_service_confidence() -> f32 {
    gate::MIN_SERVICE_CONFIDENCE
}
fn default_close_score_margin() -> f32 {
    gate::CLOSE_SCORE_MARGIN
}
fn default_top_k() -> usize {
    gate::TOP_K
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            tier4_min_score: default_tier4_min_score(),
            tier3_min_score: default_tier3_min_score(),
            tier2_min_score: default_tier2_min_score(),
            low_tier_min_score: default_low_tier_min_score(),
            low_tier_min_confidence: default_low_tier_min_confidence(),
            min_extraction_confidence: default_min_extraction_confidence(),
            min_semantic: default_min_semantic(),
            min_service_confidence: default_min_service_confidence(),
            close_score_margin: default_close_score_margin(),
            top_k: default_top_k(),
        }
    }
}

/// Outer decision layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    #[serde(default = "default_certainty_high")]
    pub certainty_high: f32,
    #[serde(default = "default_certainty_medium")]
    pub certainty_medium: f32,
    #[serde(default = "default_certainty_low")]
    pub certainty_low: f32,
    /// Relative score gap that counts as fully separated
    #[serde(default = "default_score_gap_normalizer")]
    pub score_gap_normalizer: f32,
    /// Consecutive clarification rounds before escalation
    #[serde(default = "default_max_clarify_count")]
    pub max_clarify_count: u32,
    /// Missing slots surfaced with an ANSWER_WITH_CLARIFY decision
    #[serde(default = "default_max_clarification_slots")]
    pub max_clarification_slots: usize,
}

fn default_certainty_high() -> f32 {
    decision::CERTAINTY_HIGH
}
fn default_certainty_medium() -> f32 {
    decision::CERTAINTY_MEDIUM
}
fn default_certainty_low() -> f32 {
    decision::CERTAINTY_LOW
}
fn default_score_gap_normalizer() -> f32 {
    decision::SCORE_GAP_NORMALIZER
}
fn default_max_clarify_count() -> u32 {
    decision::MAX_CLARIFY_COUNT
}
fn default_max_clarification_slots() -> usize {
    decision::MAX_CLARIFICATION_SLOTS
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            certainty_high: default_certainty_high(),
            certainty_medium: default_certainty_medium(),
            certainty_low: default_certainty_low(),
            score_gap_normalizer: default_score_gap_normalizer(),
            max_clarify_count: default_max_clarify_count(),
            max_clarification_slots: default_max_clarification_slots(),
        }
    }
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_clarify_ttl_seconds")]
    pub clarify_ttl_seconds: u64,
    /// How often expired counters and histories are swept
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,
}

fn default_clarify_ttl_seconds() -> u64 {
    session::CLARIFY_TTL_SECONDS
}

fn default_cleanup_interval_seconds() -> u64 {
    session::CLEANUP_INTERVAL_SECONDS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            clarify_ttl_seconds: default_clarify_ttl_seconds(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
        }
    }
}

/// Completion service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Run the completion fallback at all
    #[serde(default)]
    pub enabled: bool,

    /// OpenAI-compatible base URL
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_llm_max_retries")]
    pub max_retries: u32,
}

fn default_llm_endpoint() -> String {
    endpoints::LLM_DEFAULT.to_string()
}
fn default_llm_model() -> String {
    endpoints::LLM_MODEL.to_string()
}
fn default_llm_max_tokens() -> u32 {
    300
}
fn default_llm_timeout_ms() -> u64 {
    timeouts::LLM_REQUEST_MS
}
fn default_llm_max_retries() -> u32 {
    timeouts::LLM_MAX_RETRIES
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: None,
            temperature: 0.0,
            max_tokens: default_llm_max_tokens(),
            timeout_ms: default_llm_timeout_ms(),
            max_retries: default_llm_max_retries(),
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (`WALLET_SUPPORT__` prefix, `__` separator)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings with an explicit config directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    let default_path = dir.join("default");
    builder = builder.add_source(File::with_name(&default_path.to_string_lossy()).required(false));

    if let Some(env_name) = env {
        let env_path = dir.join(env_name);
        builder =
            builder.add_source(File::with_name(&env_path.to_string_lossy()).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("WALLET_SUPPORT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
