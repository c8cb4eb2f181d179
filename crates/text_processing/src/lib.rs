//! Query understanding for wallet support
//!
//! This crate turns a free-text support question into structured case slots:
//! - **Normalization**: diacritic folding and word-boundary phrase matching
//! - **Taxonomies**: service, problem type, state, outcome and bank catalogs
//! - **Slot inference**: weighted anchor/keyword/alias scoring with override rules
//! - **Entities**: amount, time, bank and quoted error text
//! - **Case triage**: rules, completion fallback, corrections and validation
//! - **Screening**: account-lookup and out-of-domain flags
//! - **Clarification**: questions for missing or uncertain slots
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wallet_support_text_processing::{BankCatalog, CaseTriage, TriageConfig};
//!
//! let triage = CaseTriage::new(TriageConfig::default(), Arc::new(BankCatalog::default()));
//! let slots = triage.extract("Tôi nạp tiền thất bại nhưng ngân hàng đã trừ tiền", &[]).await;
//! assert_eq!(slots.problem_type.as_deref(), Some("tra_soat"));
//! ```

pub mod clarify;
pub mod entities;
pub mod inference;
pub mod normalize;
pub mod screening;
pub mod taxonomy;
pub mod triage;

pub use clarify::clarifying_questions;
pub use entities::{normalize_amount, EntityExtractor, ExtractedEntities};
pub use inference::{
    Condition, OverrideRule, RuleInferencer, RuleSlots, ScoreBoost, ScoringProfile, SlotInference,
    SlotInferencer,
};
pub use normalize::{match_form, normalize, MatchText};
pub use screening::QueryScreener;
pub use taxonomy::{
    outcomes, problems, services, states, taxonomy, Bank, BankCatalog, BankCatalogError,
    Taxonomy, TaxonomyEntry, TaxonomyKind, Tier,
};
pub use triage::{CaseTriage, TriageConfig};
