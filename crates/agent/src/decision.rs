//! Certainty-based decision engine
//!
//! Sits after the reranker gate and turns its verdict into the outbound
//! [`Decision`]. Hard exits come first and bypass certainty entirely:
//!
//! ```text
//! need_account_lookup            -> ESCALATE_PERSONAL
//! out of domain / gate out_of_scope -> ESCALATE_OUT_OF_SCOPE
//! clarify_count >= max           -> ESCALATE_MAX_RETRY
//! no candidates                  -> CLARIFY_REQUIRED or ESCALATE_LOW_CONFIDENCE
//! gate clarify                   -> CLARIFY_REQUIRED
//! ```
//!
//! Answers are then graded by certainty:
//!
//! ```text
//! certainty = 0.6 * confidence + 0.3 * min(gap / normalizer, 1) + 0.1 * relevance
//! ```

use wallet_support_config::constants::gate;
use wallet_support_config::DecisionConfig;
use wallet_support_core::{
    CaseSlots, Decision, DecisionType, GateDecision, GateVerdict, QueryFlags, RankedSolution,
};
use wallet_support_text_processing::clarifying_questions;

const CONFIDENCE_WEIGHT: f32 = 0.6;
const GAP_WEIGHT: f32 = 0.3;
const RELEVANCE_WEIGHT: f32 = 0.1;

/// Semantic score at which the top result counts as fully relevant
/// (a perfect title match)
const FULL_RELEVANCE_SEMANTIC: f32 = 12.0;

const BORDERLINE_QUESTION: &str = "Thông tin này có đúng với trường hợp của bạn không?";

/// Components of a certainty score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Certainty {
    pub confidence: f32,
    /// Relative gap between the best and second-best score
    pub score_gap: f32,
    pub normalized_gap: f32,
    pub relevance: f32,
    pub value: f32,
}

/// Outer decision layer
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: DecisionConfig,
    /// Top-two score distance treated as ambiguous
    ambiguity_margin: f32,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(DecisionConfig::default())
    }
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig) -> Self {
        Self {
            config,
            ambiguity_margin: gate::CLOSE_SCORE_MARGIN,
        }
    }

    pub fn with_ambiguity_margin(mut self, margin: f32) -> Self {
        self.ambiguity_margin = margin;
        self
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Certainty of answering with the gate's best candidate
    pub fn certainty(&self, gate: &GateDecision) -> Option<Certainty> {
        let best = gate.best.as_ref()?;
        let second = gate
            .topk
            .iter()
            .find(|r| r.id() != best.id())
            .map(|r| r.final_score);

        let score_gap = match second {
            Some(second) => ((best.final_score - second) / best.final_score.abs().max(1.0)).max(0.0),
            None => 1.0,
        };
        let normalized_gap = if self.config.score_gap_normalizer > 0.0 {
            (score_gap / self.config.score_gap_normalizer).min(1.0)
        } else {
            1.0
        };
        let relevance = (best.semantic / FULL_RELEVANCE_SEMANTIC).clamp(0.0, 1.0);
        let confidence = best.confidence.clamp(0.0, 1.0);

        Some(Certainty {
            confidence,
            score_gap,
            normalized_gap,
            relevance,
            value: confidence * CONFIDENCE_WEIGHT
                + normalized_gap * GAP_WEIGHT
                + relevance * RELEVANCE_WEIGHT,
        })
    }

    fn is_ambiguous(&self, gate: &GateDecision) -> bool {
        match (gate.topk.first(), gate.topk.get(1)) {
            (Some(a), Some(b)) => (a.final_score - b.final_score).abs() <= self.ambiguity_margin,
            _ => false,
        }
    }

    /// Decide for one request given the session's consecutive clarify count
    pub fn decide(
        &self,
        flags: &QueryFlags,
        slots: &CaseSlots,
        gate: &GateDecision,
        clarify_count: u32,
    ) -> Decision {
        let mut decision = self.route(flags, slots, gate, clarify_count);
        decision.explanation = explain(decision.decision_type).to_string();

        tracing::info!(
            decision = decision.decision_type.as_str(),
            certainty = decision.certainty,
            clarify_count,
            top = decision.top_result.as_ref().map(|r| r.id()).unwrap_or("-"),
            reason = decision.escalation_reason.as_deref().unwrap_or(""),
            "Decision"
        );
        decision
    }

    fn route(
        &self,
        flags: &QueryFlags,
        slots: &CaseSlots,
        gate: &GateDecision,
        clarify_count: u32,
    ) -> Decision {
        if flags.need_account_lookup {
            return Decision::escalate(
                DecisionType::EscalatePersonal,
                "Personal transaction data required",
            );
        }

        if flags.out_of_domain {
            let reason = flags
                .out_of_domain_reason
                .clone()
                .unwrap_or_else(|| "Question outside supported scope".to_string());
            return Decision::escalate(DecisionType::EscalateOutOfScope, reason);
        }
        if gate.decision == GateVerdict::OutOfScope {
            return Decision::escalate(DecisionType::EscalateOutOfScope, gate.reason.clone());
        }

        if clarify_count >= self.config.max_clarify_count {
            return Decision::escalate(
                DecisionType::EscalateMaxRetry,
                format!("Asked for clarification {} times", clarify_count),
            );
        }

        if gate.topk.is_empty() {
            // Something left to ask keeps the conversation going; the retry
            // ceiling above ends it eventually.
            if slots.service.is_some() || !slots.missing_slots.is_empty() {
                return self.clarify(slots, gate, None);
            }
            return Decision::low_confidence("No matching solution found");
        }

        let certainty = self.certainty(gate);
        if let Some(c) = &certainty {
            tracing::debug!(
                confidence = c.confidence,
                gap = c.score_gap,
                normalized_gap = c.normalized_gap,
                relevance = c.relevance,
                certainty = c.value,
                "Certainty"
            );
        }

        let (best, certainty) = match (gate.decision, &gate.best, certainty) {
            (GateVerdict::Answer, Some(best), Some(c)) => (best, c.value),
            (_, _, c) => return self.clarify(slots, gate, c.map(|c| c.value)),
        };

        if certainty < self.config.certainty_low {
            let mut decision = Decision::low_confidence(format!(
                "Certainty {:.3} below {:.2}",
                certainty, self.config.certainty_low
            ));
            decision.certainty = Some(certainty);
            return decision;
        }

        if certainty >= self.config.certainty_high {
            return answer(DecisionType::DirectAnswer, best, certainty);
        }

        if certainty >= self.config.certainty_medium {
            let mut decision = answer(DecisionType::AnswerWithClarify, best, certainty);
            decision.clarification_slots = self.limited_missing(slots);
            decision.clarifying_questions = clarifying_questions(slots);
            return decision;
        }

        if self.is_ambiguous(gate) || !slots.missing_slots.is_empty() {
            return self.clarify(slots, gate, Some(certainty));
        }

        let mut decision = answer(DecisionType::AnswerWithClarify, best, certainty);
        decision.clarifying_questions = vec![BORDERLINE_QUESTION.to_string()];
        decision
    }

    fn limited_missing(&self, slots: &CaseSlots) -> Vec<wallet_support_core::SlotName> {
        slots
            .missing_slots
            .iter()
            .take(self.config.max_clarification_slots)
            .copied()
            .collect()
    }

    fn clarify(&self, slots: &CaseSlots, gate: &GateDecision, certainty: Option<f32>) -> Decision {
        let mut decision = Decision::new(DecisionType::ClarifyRequired);
        decision.clarification_slots = self.limited_missing(slots);
        decision.clarifying_questions = if gate.clarifying_questions.is_empty() {
            clarifying_questions(slots)
        } else {
            gate.clarifying_questions.clone()
        };
        decision.certainty = certainty;
        decision
    }
}

fn answer(decision_type: DecisionType, best: &RankedSolution, certainty: f32) -> Decision {
    let mut decision = Decision::new(decision_type);
    decision.top_result = Some(best.clone());
    decision.certainty = Some(certainty);
    decision
}

/// Short operator-facing explanation of a decision type
pub fn explain(decision_type: DecisionType) -> &'static str {
    match decision_type {
        DecisionType::DirectAnswer => "High certainty, answer directly",
        DecisionType::AnswerWithClarify => "Medium certainty, answer with a follow-up question",
        DecisionType::ClarifyRequired => "More information needed, ask to clarify",
        DecisionType::EscalatePersonal => "Personal data check needed, hand over to an agent",
        DecisionType::EscalateOutOfScope => "Outside supported scope, decline politely",
        DecisionType::EscalateMaxRetry => "Too many clarification rounds, hand over to an agent",
        DecisionType::EscalateLowConfidence => "Low certainty, hand over to an agent",
    }
}
