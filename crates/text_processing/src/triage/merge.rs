//! Merge completion-service slots into rule-based slots
//!
//! Per field, the fallback value wins when it resolves to a registered
//! slot key and either the rule value is the catch-all or the fallback is
//! more confident. Entities only fill gaps.

use wallet_support_core::{CaseSlots, FallbackSlots};

use crate::taxonomy::{outcomes, problems, services, states, BankCatalog, Taxonomy};

/// Map a reported confidence into [0, 1]
///
/// Percent-style values (e.g. 85) are scaled down first.
pub fn normalize_confidence(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let scaled = if value > 1.0 { value / 100.0 } else { value };
    scaled.clamp(0.0, 1.0)
}

fn merge_field(
    field: &'static str,
    taxonomy: &Taxonomy,
    rule_value: &mut Option<String>,
    rule_confidence: &mut f32,
    fallback_value: Option<&str>,
    fallback_confidence: f32,
    notes: &mut Vec<String>,
) {
    let Some(raw) = fallback_value.map(str::trim).filter(|v| !v.is_empty()) else {
        return;
    };
    let Some(resolved) = taxonomy.resolve(raw) else {
        notes.push(format!("fallback_unresolved:{}={}", field, raw));
        return;
    };

    let fallback_confidence = normalize_confidence(fallback_confidence);
    let rule_is_catch_all = rule_value
        .as_deref()
        .map(|v| v == taxonomy.fallback_key())
        .unwrap_or(true);

    if rule_is_catch_all || fallback_confidence > *rule_confidence {
        if rule_value.as_deref() != Some(resolved) {
            notes.push(format!("fallback:{}", field));
        }
        *rule_value = Some(resolved.to_string());
        *rule_confidence = fallback_confidence;
    }
}

fn fill_gap(value: &mut Option<String>, fallback: &Option<String>) {
    if value.is_none() {
        if let Some(v) = fallback.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            *value = Some(v.to_string());
        }
    }
}

/// Merge the fallback result into `slots`, returning notes on what changed
pub fn apply_fallback(slots: &mut CaseSlots, fallback: &FallbackSlots, banks: &BankCatalog) -> Vec<String> {
    let mut notes = Vec::new();

    merge_field(
        "service",
        services(),
        &mut slots.service,
        &mut slots.service_confidence,
        fallback.service.as_deref(),
        fallback.service_confidence,
        &mut notes,
    );
    merge_field(
        "problem_type",
        problems(),
        &mut slots.problem_type,
        &mut slots.problem_confidence,
        fallback.problem_type.as_deref(),
        fallback.problem_confidence,
        &mut notes,
    );
    merge_field(
        "state",
        states(),
        &mut slots.state,
        &mut slots.state_confidence,
        fallback.state.as_deref(),
        fallback.state_confidence,
        &mut notes,
    );
    merge_field(
        "outcome",
        outcomes(),
        &mut slots.outcome,
        &mut slots.outcome_confidence,
        fallback.outcome.as_deref(),
        fallback.outcome_confidence,
        &mut notes,
    );

    if slots.bank_id.is_none() {
        if let Some(raw) = fallback.bank.as_deref() {
            match banks.from_any(raw).and_then(|id| banks.get(id)) {
                Some(bank) => {
                    slots.bank_id = Some(bank.bank_id.clone());
                    slots.bank = Some(bank.name.clone());
                    notes.push("fallback:bank".to_string());
                }
                None => notes.push(format!("fallback_unresolved:bank={}", raw)),
            }
        }
    }

    fill_gap(&mut slots.amount, &fallback.amount);
    fill_gap(&mut slots.time, &fallback.time);
    fill_gap(&mut slots.error_message, &fallback.error_message);

    notes
}
