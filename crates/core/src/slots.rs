//! Case slots: the structured intent extracted from one utterance
//!
//! Every populated taxonomy field (`service`, `problem_type`, `state`,
//! `outcome`, `bank_id`) holds a registered slot key. Triage enforces this
//! before a value leaves the extractor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the slots tracked per case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotName {
    Service,
    ProblemType,
    State,
    Outcome,
    Bank,
    Amount,
    Time,
    ErrorMessage,
}

impl SlotName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::Service => "service",
            SlotName::ProblemType => "problem_type",
            SlotName::State => "state",
            SlotName::Outcome => "outcome",
            SlotName::Bank => "bank",
            SlotName::Amount => "amount",
            SlotName::Time => "time",
            SlotName::ErrorMessage => "error_message",
        }
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the final slot set was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceMethod {
    /// Rule-based inference only
    #[default]
    RuleBased,
    /// Rule-based inference merged with the completion fallback
    Hybrid,
    /// Short-circuited by the out-of-scope screen
    OutOfScopeDetection,
}

/// Evidence trail recorded while inferring slots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceEvidence {
    pub method: InferenceMethod,
    #[serde(default)]
    pub service: Vec<String>,
    #[serde(default)]
    pub problem_type: Vec<String>,
    #[serde(default)]
    pub state: Vec<String>,
    #[serde(default)]
    pub outcome: Vec<String>,
    /// Names of post-processing and validation rules that changed a slot
    #[serde(default)]
    pub corrections: Vec<String>,
    #[serde(default)]
    pub fallback_used: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_of_scope_reason: Option<String>,
}

/// Structured intent for one utterance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseSlots {
    pub service: Option<String>,
    pub service_id: Option<String>,
    pub problem_type: Option<String>,
    pub problem_id: Option<String>,
    pub state: Option<String>,
    pub outcome: Option<String>,
    /// Bank display name
    pub bank: Option<String>,
    /// Bank slot key
    pub bank_id: Option<String>,
    pub amount: Option<String>,
    pub time: Option<String>,
    pub error_message: Option<String>,
    pub raw_narrative: String,
    /// Mean of service and problem confidence
    pub confidence_score: f32,
    pub service_confidence: f32,
    pub problem_confidence: f32,
    pub state_confidence: f32,
    pub outcome_confidence: f32,
    pub missing_slots: Vec<SlotName>,
    pub contradictions: Vec<String>,
    pub inference_evidence: InferenceEvidence,
}

impl CaseSlots {
    /// Slot set returned when the utterance targets an unsupported service
    pub fn out_of_scope(raw_narrative: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            raw_narrative: raw_narrative.into(),
            inference_evidence: InferenceEvidence {
                method: InferenceMethod::OutOfScopeDetection,
                out_of_scope_reason: Some(reason.into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn is_out_of_scope(&self) -> bool {
        self.inference_evidence.method == InferenceMethod::OutOfScopeDetection
    }

    /// Whether a slot carries a value
    pub fn has(&self, slot: SlotName) -> bool {
        match slot {
            SlotName::Service => self.service.is_some(),
            SlotName::ProblemType => self.problem_type.is_some(),
            SlotName::State => self.state.is_some(),
            SlotName::Outcome => self.outcome.is_some(),
            SlotName::Bank => self.bank_id.is_some(),
            SlotName::Amount => self.amount.is_some(),
            SlotName::Time => self.time.is_some(),
            SlotName::ErrorMessage => self.error_message.is_some(),
        }
    }

    /// Recompute the aggregate extraction confidence
    pub fn refresh_confidence(&mut self) {
        self.confidence_score = (self.service_confidence + self.problem_confidence) / 2.0;
    }
}

/// Slot set re-derived by the completion service
///
/// Values are raw strings as returned by the model. Triage resolves them
/// against the taxonomies before merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FallbackSlots {
    pub service: Option<String>,
    pub problem_type: Option<String>,
    pub state: Option<String>,
    pub outcome: Option<String>,
    pub bank: Option<String>,
    pub amount: Option<String>,
    pub time: Option<String>,
    pub error_message: Option<String>,
    pub service_confidence: f32,
    pub problem_confidence: f32,
    pub state_confidence: f32,
    pub outcome_confidence: f32,
}
