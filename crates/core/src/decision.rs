//! Gate and decision values handed to the response layer

use crate::retrieval::RankedSolution;
use crate::slots::SlotName;
use serde::{Deserialize, Serialize};

/// Reranker gate verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateVerdict {
    Answer,
    Clarify,
    OutOfScope,
}

/// Result of the reranker confidence gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    pub decision: GateVerdict,
    pub reason: String,
    pub best: Option<RankedSolution>,
    pub topk: Vec<RankedSolution>,
    pub clarifying_questions: Vec<String>,
}

/// Outer decision type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionType {
    DirectAnswer,
    AnswerWithClarify,
    ClarifyRequired,
    EscalatePersonal,
    EscalateOutOfScope,
    EscalateMaxRetry,
    EscalateLowConfidence,
}

impl DecisionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionType::DirectAnswer => "DIRECT_ANSWER",
            DecisionType::AnswerWithClarify => "ANSWER_WITH_CLARIFY",
            DecisionType::ClarifyRequired => "CLARIFY_REQUIRED",
            DecisionType::EscalatePersonal => "ESCALATE_PERSONAL",
            DecisionType::EscalateOutOfScope => "ESCALATE_OUT_OF_SCOPE",
            DecisionType::EscalateMaxRetry => "ESCALATE_MAX_RETRY",
            DecisionType::EscalateLowConfidence => "ESCALATE_LOW_CONFIDENCE",
        }
    }

    /// Decisions that deliver an answer and reset the clarify counter
    pub fn is_answer(&self) -> bool {
        matches!(
            self,
            DecisionType::DirectAnswer | DecisionType::AnswerWithClarify
        )
    }

    pub fn is_escalation(&self) -> bool {
        matches!(
            self,
            DecisionType::EscalatePersonal
                | DecisionType::EscalateOutOfScope
                | DecisionType::EscalateMaxRetry
                | DecisionType::EscalateLowConfidence
        )
    }
}

/// Outbound decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(rename = "type")]
    pub decision_type: DecisionType,
    pub top_result: Option<RankedSolution>,
    pub clarification_slots: Vec<SlotName>,
    #[serde(default)]
    pub clarifying_questions: Vec<String>,
    pub escalation_reason: Option<String>,
    /// Certainty score when it was computed
    #[serde(default)]
    pub certainty: Option<f32>,
    #[serde(default)]
    pub explanation: String,
}

impl Decision {
    pub fn new(decision_type: DecisionType) -> Self {
        Self {
            decision_type,
            top_result: None,
            clarification_slots: Vec::new(),
            clarifying_questions: Vec::new(),
            escalation_reason: None,
            certainty: None,
            explanation: String::new(),
        }
    }

    pub fn escalate(decision_type: DecisionType, reason: impl Into<String>) -> Self {
        Self {
            escalation_reason: Some(reason.into()),
            ..Self::new(decision_type)
        }
    }

    /// Safe default when nothing else can be decided
    pub fn low_confidence(reason: impl Into<String>) -> Self {
        Self::escalate(DecisionType::EscalateLowConfidence, reason)
    }
}

/// Screening flags computed from the raw utterance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryFlags {
    pub need_account_lookup: bool,
    pub out_of_domain: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_of_domain_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_type_serialization() {
        let json = serde_json::to_string(&DecisionType::AnswerWithClarify).unwrap();
        assert_eq!(json, "\"ANSWER_WITH_CLARIFY\"");
        assert!(DecisionType::DirectAnswer.is_answer());
        assert!(!DecisionType::ClarifyRequired.is_answer());
        assert!(DecisionType::EscalateMaxRetry.is_escalation());
    }

    #[test]
    fn test_decision_type_field_name() {
        let decision = Decision::low_confidence("no_results");
        let value = serde_json::to_value(&decision).unwrap();
        assert_eq!(value["type"], "ESCALATE_LOW_CONFIDENCE");
        assert_eq!(value["escalation_reason"], "no_results");
    }
}
