//! Retrieval types: graph query plans, candidates and ranked solutions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Slot values a graph query is parameterized with
///
/// `None` means the dimension takes no part in filtering or bonuses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    pub service: Option<String>,
    pub problem: Option<String>,
    pub state: Option<String>,
    pub outcome: Option<String>,
    pub bank_id: Option<String>,
    /// Normalized utterance used for the stored-question lexical bonus
    pub query_norm: String,
}

/// One branch of the tiered union
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierBranch {
    pub tier: u8,
    pub base_score: f32,
    /// Solution must carry the query service
    pub match_service: bool,
    /// Solution must carry the query problem type (tier qualifier only)
    pub match_problem: bool,
    /// Solution must match the query state or outcome
    pub match_state_or_outcome: bool,
    /// Solution bank must be empty or equal to the query bank
    pub bank_compatible: bool,
    pub state_bonus: f32,
    pub outcome_bonus: f32,
    pub bank_bonus: f32,
    pub limit: usize,
}

/// Ordered branches plus the overall row cap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierPlan {
    pub branches: Vec<TierBranch>,
    pub limit: usize,
}

/// A query against the knowledge graph
///
/// `statement` and `parameters` target a Cypher endpoint; `plan` and
/// `params` carry the same semantics for stores that evaluate the tiers
/// themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphQuery {
    pub statement: String,
    pub parameters: Map<String, Value>,
    pub params: QueryParams,
    pub plan: TierPlan,
}

/// A row returned by the knowledge graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalCandidate {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub tier: u8,
    #[serde(alias = "score")]
    pub base_score: f32,
    #[serde(default)]
    pub matched_service: Option<String>,
    #[serde(default)]
    pub matched_problem: Option<String>,
    #[serde(default)]
    pub matched_state: Option<String>,
    #[serde(default)]
    pub matched_outcome: Option<String>,
    #[serde(default)]
    pub bank_id: Option<String>,
}

/// A candidate after reranking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedSolution {
    #[serde(flatten)]
    pub candidate: RetrievalCandidate,
    /// Candidate answers the kind of question (policy, procedure, faq) the query asks
    pub type_match: bool,
    /// Bank agreement component
    pub bank_match: f32,
    pub semantic: f32,
    /// Raw slot agreement before weighting
    pub agreement: f32,
    pub agreement_boost: f32,
    pub exact_match_boost: f32,
    pub penalties: f32,
    pub perfect_match_bonus: f32,
    pub lexical_anchors: usize,
    pub lexical_boost: f32,
    pub final_score: f32,
    /// Agreement confidence in [0, 1]
    pub confidence: f32,
}

impl RankedSolution {
    pub fn id(&self) -> &str {
        &self.candidate.id
    }

    pub fn tier(&self) -> u8 {
        self.candidate.tier
    }
}
