//! Case triage
//!
//! Turns one utterance into [`CaseSlots`]:
//! 1. Unsupported-service screen (short-circuits with an out-of-scope case)
//! 2. Rule-based slot inference and entity extraction
//! 3. Completion-service fallback when rules are not confident enough
//! 4. Post-processing corrections
//! 5. Catch-all cleanup, taxonomy enforcement, missing slots, contradictions
//!
//! Triage never fails: a fallback error is logged and recorded in the
//! evidence, and the rule-based values are kept.

pub mod corrections;
pub mod merge;
pub mod scope;
pub mod validation;

use std::sync::Arc;
use tracing::{debug, warn};
use wallet_support_core::{
    CaseSlots, FallbackExtractor, InferenceEvidence, InferenceMethod, Turn,
};

use crate::entities::EntityExtractor;
use crate::inference::RuleInferencer;
use crate::normalize::MatchText;
use crate::taxonomy::{problems, services, BankCatalog};

/// Triage thresholds
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Mean rule confidence below which the fallback is consulted
    pub fallback_threshold: f32,
    /// Recent turns forwarded to the fallback
    pub history_turns: usize,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            fallback_threshold: 0.85,
            history_turns: 3,
        }
    }
}

/// Slot extractor combining rules, entities and an optional completion fallback
pub struct CaseTriage {
    config: TriageConfig,
    rules: RuleInferencer,
    entities: EntityExtractor,
    banks: Arc<BankCatalog>,
    fallback: Option<Arc<dyn FallbackExtractor>>,
}

impl CaseTriage {
    pub fn new(config: TriageConfig, banks: Arc<BankCatalog>) -> Self {
        Self {
            config,
            rules: RuleInferencer::default(),
            entities: EntityExtractor::new(banks.clone()),
            banks,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackExtractor>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Replace the rule inferencer, e.g. with custom override tables
    pub fn with_rules(mut self, rules: RuleInferencer) -> Self {
        self.rules = rules;
        self
    }

    pub fn banks(&self) -> &BankCatalog {
        &self.banks
    }

    /// Extract slots, consulting the fallback when needed
    pub async fn extract(&self, utterance: &str, history: &[Turn]) -> CaseSlots {
        let text = MatchText::new(utterance);
        if let Some(reason) = scope::detect_out_of_scope(&text) {
            debug!(reason = %reason, "Utterance targets an unsupported service");
            return CaseSlots::out_of_scope(utterance, reason);
        }

        let mut slots = self.rule_slots(utterance, &text);

        if self.needs_fallback(&slots) {
            if let Some(fallback) = &self.fallback {
                let start = history.len().saturating_sub(self.config.history_turns);
                match fallback.extract(utterance, &history[start..]).await {
                    Ok(result) => {
                        let notes = merge::apply_fallback(&mut slots, &result, &self.banks);
                        debug!(notes = ?notes, "Merged fallback slots");
                        slots.inference_evidence.method = InferenceMethod::Hybrid;
                        slots.inference_evidence.fallback_used = true;
                        slots.inference_evidence.corrections.extend(notes);
                    }
                    Err(e) => {
                        warn!(error = %e, "Fallback extraction failed, keeping rule-based slots");
                        slots.inference_evidence.fallback_error = Some(e.to_string());
                    }
                }
            }
        }

        self.finish(&text, &mut slots);
        slots
    }

    /// Extract slots from rules and entities only
    pub fn extract_rules_only(&self, utterance: &str) -> CaseSlots {
        let text = MatchText::new(utterance);
        if let Some(reason) = scope::detect_out_of_scope(&text) {
            return CaseSlots::out_of_scope(utterance, reason);
        }
        let mut slots = self.rule_slots(utterance, &text);
        self.finish(&text, &mut slots);
        slots
    }

    fn needs_fallback(&self, slots: &CaseSlots) -> bool {
        let catch_all = |value: &Option<String>, key: &str| value.as_deref().map_or(true, |v| v == key);
        catch_all(&slots.service, services().fallback_key())
            || catch_all(&slots.problem_type, problems().fallback_key())
            || slots.confidence_score < self.config.fallback_threshold
    }

    fn rule_slots(&self, utterance: &str, text: &MatchText) -> CaseSlots {
        let rules = self.rules.infer(text);
        let entities = self.entities.extract(utterance, text);

        let mut slots = CaseSlots {
            service: Some(rules.service.value.to_string()),
            problem_type: Some(rules.problem.value.to_string()),
            state: Some(rules.state.value.to_string()),
            outcome: Some(rules.outcome.value.to_string()),
            bank: entities.bank,
            bank_id: entities.bank_id,
            amount: entities.amount,
            time: entities.time,
            error_message: entities.error_message,
            raw_narrative: utterance.to_string(),
            service_confidence: rules.service.confidence,
            problem_confidence: rules.problem.confidence,
            state_confidence: rules.state.confidence,
            outcome_confidence: rules.outcome.confidence,
            inference_evidence: InferenceEvidence {
                method: InferenceMethod::RuleBased,
                service: rules.service.evidence,
                problem_type: rules.problem.evidence,
                state: rules.state.evidence,
                outcome: rules.outcome.evidence,
                ..Default::default()
            },
            ..Default::default()
        };
        slots.refresh_confidence();
        slots
    }

    fn finish(&self, text: &MatchText, slots: &mut CaseSlots) {
        let applied = corrections::apply(text, slots);
        slots
            .inference_evidence
            .corrections
            .extend(applied.into_iter().map(String::from));

        validation::clear_fallback_values(slots);
        for field in validation::enforce_taxonomy(slots, &self.banks) {
            slots.inference_evidence.corrections.push(format!("rejected:{}", field));
        }

        slots.missing_slots = validation::missing_slots(slots);
        slots.contradictions =
            validation::contradictions(slots.state.as_deref(), slots.problem_type.as_deref());
        slots.refresh_confidence();
    }
}
