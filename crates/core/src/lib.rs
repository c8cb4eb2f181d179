//! Core traits and types for the wallet support decision engine
//!
//! This crate provides foundational types used across all other crates:
//! - Case slots produced by triage and their inference evidence
//! - Retrieval candidates, ranked solutions and graph query plans
//! - Gate and decision values handed to the response layer
//! - Collaborator traits (knowledge graph, fallback extractor, clarify counter)
//! - Error types

pub mod conversation;
pub mod decision;
pub mod error;
pub mod retrieval;
pub mod slots;
pub mod traits;

pub use conversation::{Turn, TurnRole};
pub use decision::{Decision, DecisionType, GateDecision, GateVerdict, QueryFlags};
pub use error::{Error, Result};
pub use retrieval::{
    GraphQuery, QueryParams, RankedSolution, RetrievalCandidate, TierBranch, TierPlan,
};
pub use slots::{CaseSlots, FallbackSlots, InferenceEvidence, InferenceMethod, SlotName};
pub use traits::{ClarifyCounterStore, FallbackExtractor, KnowledgeGraph};
