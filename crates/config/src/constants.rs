//! Centralized constants for the decision engine
//!
//! Single source of truth for default thresholds. Settings use these as
//! serde defaults; components fall back to them when built without settings.

/// Slot extraction thresholds
pub mod extraction {
    /// Mean service/problem confidence below which the completion fallback runs
    pub const FALLBACK_THRESHOLD: f32 = 0.85;

    /// Service confidence required before service becomes a hard graph filter
    pub const SERVICE_FILTER_MIN_CONFIDENCE: f32 = 0.40;

    /// Confidence assigned when no taxonomy entry matched
    pub const NO_MATCH_CONFIDENCE: f32 = 0.20;

    /// Recent turns rendered into the completion prompt
    pub const HISTORY_TURNS: usize = 3;
}

/// Tier base scores and per-branch limits
pub mod tiers {
    pub const TIER4_BASE: f32 = 100.0;
    pub const TIER3_BASE: f32 = 70.0;
    pub const TIER2_BASE: f32 = 40.0;
    pub const TIER1_BASE: f32 = 30.0;
    pub const TIER0_BASE: f32 = 20.0;

    pub const TIER4_LIMIT: usize = 10;
    pub const TIER3_LIMIT: usize = 10;
    pub const TIER2_LIMIT: usize = 20;
    pub const TIER1_LIMIT: usize = 10;
    pub const TIER0_LIMIT: usize = 5;

    pub const TOTAL_LIMIT: usize = 80;
    pub const FALLBACK_LIMIT: usize = 30;
    pub const GENERIC_FALLBACK_LIMIT: usize = 20;
}

/// Reranker gate thresholds
pub mod gate {
    pub const TIER4_MIN_SCORE: f32 = 75.0;
    pub const TIER3_MIN_SCORE: f32 = 85.0;
    pub const TIER2_MIN_SCORE: f32 = 95.0;
    pub const LOW_TIER_MIN_SCORE: f32 = 100.0;
    pub const LOW_TIER_MIN_CONFIDENCE: f32 = 0.40;
    pub const MIN_EXTRACTION_CONFIDENCE: f32 = 0.70;
    pub const MIN_SEMANTIC: f32 = 0.12;
    pub const MIN_SERVICE_CONFIDENCE: f32 = 0.30;
    pub const CLOSE_SCORE_MARGIN: f32 = 5.0;
    pub const TOP_K: usize = 3;
}

/// Outer decision layer thresholds
pub mod decision {
    pub const CERTAINTY_HIGH: f32 = 0.65;
    pub const CERTAINTY_MEDIUM: f32 = 0.50;
    pub const CERTAINTY_LOW: f32 = 0.42;
    pub const SCORE_GAP_NORMALIZER: f32 = 0.15;
    pub const MAX_CLARIFY_COUNT: u32 = 10;
    pub const MAX_CLARIFICATION_SLOTS: usize = 2;
}

/// Session store defaults
pub mod session {
    pub const CLARIFY_TTL_SECONDS: u64 = 1800;
    pub const CLEANUP_INTERVAL_SECONDS: u64 = 300;
}

/// Default endpoints
pub mod endpoints {
    pub const NEO4J_DEFAULT: &str = "http://localhost:7474";
    pub const NEO4J_DATABASE: &str = "neo4j";
    pub const LLM_DEFAULT: &str = "https://api.openai.com/v1";
    pub const LLM_MODEL: &str = "gpt-4o-mini";
}

/// Network timeouts
pub mod timeouts {
    pub const GRAPH_QUERY_MS: u64 = 3000;
    pub const LLM_REQUEST_MS: u64 = 8000;
    pub const LLM_MAX_RETRIES: u32 = 2;
}
