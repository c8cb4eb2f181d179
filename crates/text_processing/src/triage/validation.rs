//! Final slot checks
//!
//! - Catch-all values (`khac`, `unknown`) become absent slots
//! - Values missing from their taxonomy are dropped
//! - Missing critical slots and contradictions are computed

use tracing::warn;
use wallet_support_core::{CaseSlots, SlotName};

use crate::taxonomy::{outcomes, problems, services, states, BankCatalog, Taxonomy};

/// Services that cannot be resolved without knowing the bank
pub const BANK_SERVICES: &[&str] = &[
    "nap_tien",
    "rut_tien",
    "lien_ket_ngan_hang",
    "huy_lien_ket_ngan_hang",
];

/// Incompatible (transaction state, problem type) pairs
const CONTRADICTIONS: &[(&str, &str)] = &[("success", "that_bai"), ("pending", "that_bai")];

/// Slots a case needs before it can be answered
pub fn critical_slots(service: Option<&str>) -> &'static [SlotName] {
    const WITH_BANK: &[SlotName] = &[SlotName::Service, SlotName::ProblemType, SlotName::Bank];
    const DEFAULT: &[SlotName] = &[SlotName::Service, SlotName::ProblemType];

    match service {
        Some(s) if BANK_SERVICES.contains(&s) => WITH_BANK,
        _ => DEFAULT,
    }
}

pub fn missing_slots(slots: &CaseSlots) -> Vec<SlotName> {
    critical_slots(slots.service.as_deref())
        .iter()
        .copied()
        .filter(|slot| !slots.has(*slot))
        .collect()
}

pub fn contradictions(state: Option<&str>, problem: Option<&str>) -> Vec<String> {
    let (Some(state), Some(problem)) = (state, problem) else {
        return Vec::new();
    };
    CONTRADICTIONS
        .iter()
        .filter(|(s, p)| *s == state && *p == problem)
        .map(|(s, p)| format!("transaction_status={} mâu thuẫn với problem_type={}", s, p))
        .collect()
}

fn clear_if(value: &mut Option<String>, confidence: &mut f32, is_fallback: impl Fn(&str) -> bool) {
    if value.as_deref().map(is_fallback).unwrap_or(false) {
        *value = None;
        *confidence = 0.0;
    }
}

/// Turn catch-all values into absent slots
pub fn clear_fallback_values(slots: &mut CaseSlots) {
    let fallback = |tax: &'static Taxonomy| move |v: &str| v == tax.fallback_key();
    clear_if(&mut slots.service, &mut slots.service_confidence, fallback(services()));
    clear_if(&mut slots.problem_type, &mut slots.problem_confidence, fallback(problems()));
    clear_if(&mut slots.state, &mut slots.state_confidence, fallback(states()));
    clear_if(&mut slots.outcome, &mut slots.outcome_confidence, fallback(outcomes()));
}

/// Drop values that are not registered slot keys; returns the names of rejected fields
pub fn enforce_taxonomy(slots: &mut CaseSlots, banks: &BankCatalog) -> Vec<&'static str> {
    let mut rejected = Vec::new();

    let checks: [(&'static str, &'static Taxonomy, &mut Option<String>, &mut f32); 4] = [
        ("service", services(), &mut slots.service, &mut slots.service_confidence),
        ("problem_type", problems(), &mut slots.problem_type, &mut slots.problem_confidence),
        ("state", states(), &mut slots.state, &mut slots.state_confidence),
        ("outcome", outcomes(), &mut slots.outcome, &mut slots.outcome_confidence),
    ];

    for (field, taxonomy, value, confidence) in checks {
        if let Some(v) = value.as_deref() {
            if !taxonomy.is_registered(v) {
                warn!(field, value = v, "Slot value not in taxonomy, dropping");
                *value = None;
                *confidence = 0.0;
                rejected.push(field);
            }
        }
    }

    if let Some(bank_id) = slots.bank_id.as_deref() {
        if !banks.contains(bank_id) {
            warn!(bank_id, "Bank not in catalog, dropping");
            slots.bank_id = None;
            slots.bank = None;
            rejected.push("bank");
        }
    }

    slots.service_id = slots
        .service
        .as_deref()
        .and_then(|s| services().get(s))
        .map(|e| e.canonical_id.to_string());
    slots.problem_id = slots
        .problem_type
        .as_deref()
        .and_then(|p| problems().get(p))
        .map(|e| e.canonical_id.to_string());

    rejected
}
