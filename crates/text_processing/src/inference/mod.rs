//! Slot inference over a taxonomy
//!
//! Two stages per slot:
//! 1. Generic scoring of every catalog entry against the utterance
//!    (negative keywords disqualify, anchors dominate, tiers filter)
//! 2. An ordered table of [`OverrideRule`]s evaluated afterwards; the first
//!    matching rule replaces the generic result outright
//!
//! Override tables are plain data and can be replaced per inferencer with
//! [`SlotInferencer::with_overrides`].

pub mod rules;

use serde::Serialize;

use crate::normalize::MatchText;
use crate::taxonomy::{self, Taxonomy, TaxonomyEntry, TaxonomyKind, Tier};

const ANCHOR_WEIGHT: f32 = 10.0;
const KEYWORD_WEIGHT: f32 = 2.0;
const SERVICE_ALIAS_WEIGHT: f32 = 1.5;
const ALIAS_WEIGHT: f32 = 2.0;

/// Confidence assigned when nothing matched and the fallback key is returned
pub const NO_MATCH_CONFIDENCE: f32 = 0.20;

/// Weighting and confidence curve used for a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringProfile {
    /// Anchors, keywords and aliases with tier and anchor filtering
    Weighted,
    /// Aliases only
    AliasOnly,
}

impl ScoringProfile {
    fn confidence(&self, score: f32, has_anchor: bool) -> f32 {
        match self {
            ScoringProfile::Weighted if has_anchor => (0.75 + score / 100.0).min(0.95),
            ScoringProfile::Weighted => (0.40 + score / 50.0).min(0.85),
            ScoringProfile::AliasOnly => (0.40 + score / 30.0).min(0.85),
        }
    }
}

/// Predicate over the utterance and already inferred slots
#[derive(Debug, Clone)]
pub enum Condition {
    /// Any of the match-formed phrases occurs on word boundaries
    Phrases(&'static [&'static str]),
    AllOf(Vec<Condition>),
    AnyOf(Vec<Condition>),
    Not(Box<Condition>),
    /// The problem type inferred earlier equals this slot key
    ProblemIs(&'static str),
    /// The best generic score is below this value (or nothing matched)
    GenericBelow(f32),
}

impl Condition {
    pub fn eval(&self, ctx: &RuleContext<'_>) -> bool {
        match self {
            Condition::Phrases(phrases) => ctx.text.contains_any(phrases),
            Condition::AllOf(all) => all.iter().all(|c| c.eval(ctx)),
            Condition::AnyOf(any) => any.iter().any(|c| c.eval(ctx)),
            Condition::Not(inner) => !inner.eval(ctx),
            Condition::ProblemIs(key) => ctx.problem == Some(*key),
            Condition::GenericBelow(limit) => ctx.generic_score < *limit,
        }
    }
}

/// Forces a slot value when its condition holds
#[derive(Debug, Clone)]
pub struct OverrideRule {
    pub name: &'static str,
    pub when: Condition,
    pub value: &'static str,
    pub confidence: f32,
}

/// Multiplies the generic score of one entry when its condition holds
#[derive(Debug, Clone)]
pub struct ScoreBoost {
    pub name: &'static str,
    pub target: &'static str,
    pub when: Condition,
    pub factor: f32,
}

/// Inputs visible to override conditions
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub text: &'a MatchText,
    pub problem: Option<&'a str>,
    pub generic_score: f32,
}

/// Result of inferring one slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotInference {
    pub value: &'static str,
    pub confidence: f32,
    pub evidence: Vec<String>,
}

impl SlotInference {
    /// True when the value is the catalog's fallback key
    pub fn is_fallback(&self, taxonomy: &Taxonomy) -> bool {
        self.value == taxonomy.fallback_key()
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    entry: &'static TaxonomyEntry,
    score: f32,
    has_anchor: bool,
    evidence: Vec<String>,
}

/// Infers one slot from an utterance
#[derive(Debug, Clone)]
pub struct SlotInferencer {
    taxonomy: &'static Taxonomy,
    profile: ScoringProfile,
    overrides: Vec<OverrideRule>,
    boosts: Vec<ScoreBoost>,
}

impl SlotInferencer {
    pub fn new(kind: TaxonomyKind, profile: ScoringProfile) -> Self {
        Self {
            taxonomy: taxonomy::taxonomy(kind),
            profile,
            overrides: Vec::new(),
            boosts: Vec::new(),
        }
    }

    pub fn service() -> Self {
        Self::new(TaxonomyKind::Service, ScoringProfile::Weighted)
            .with_overrides(rules::service_overrides())
            .with_boosts(rules::service_boosts())
    }

    pub fn problem() -> Self {
        Self::new(TaxonomyKind::Problem, ScoringProfile::AliasOnly)
            .with_overrides(rules::problem_overrides())
    }

    pub fn state() -> Self {
        Self::new(TaxonomyKind::State, ScoringProfile::AliasOnly)
            .with_overrides(rules::state_overrides())
    }

    pub fn outcome() -> Self {
        Self::new(TaxonomyKind::Outcome, ScoringProfile::AliasOnly)
            .with_overrides(rules::outcome_overrides())
    }

    /// Replace the override table
    pub fn with_overrides(mut self, overrides: Vec<OverrideRule>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_boosts(mut self, boosts: Vec<ScoreBoost>) -> Self {
        self.boosts = boosts;
        self
    }

    pub fn taxonomy(&self) -> &'static Taxonomy {
        self.taxonomy
    }

    pub fn overrides(&self) -> &[OverrideRule] {
        &self.overrides
    }

    /// Infer the slot; `problem` is the problem type inferred earlier, if any
    pub fn infer(&self, text: &MatchText, problem: Option<&str>) -> SlotInference {
        let candidates = self.score(text, problem);
        let best = candidates.first();

        let ctx = RuleContext {
            text,
            problem,
            generic_score: best.map(|c| c.score).unwrap_or(0.0),
        };

        if let Some(rule) = self.overrides.iter().find(|r| r.when.eval(&ctx)) {
            tracing::trace!(
                kind = ?self.taxonomy.kind(),
                rule = rule.name,
                value = rule.value,
                "Override rule matched"
            );
            return SlotInference {
                value: rule.value,
                confidence: rule.confidence,
                evidence: vec![format!("override:{}", rule.name)],
            };
        }

        match best {
            Some(best) => SlotInference {
                value: best.entry.slot_key,
                confidence: self.profile.confidence(best.score, best.has_anchor),
                evidence: best.evidence.clone(),
            },
            None => SlotInference {
                value: self.taxonomy.fallback_key(),
                confidence: NO_MATCH_CONFIDENCE,
                evidence: vec!["fallback:no_match".to_string()],
            },
        }
    }

    /// Generic scoring, best candidate first
    fn score(&self, text: &MatchText, problem: Option<&str>) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .taxonomy
            .entries()
            .iter()
            .filter_map(|entry| self.score_entry(entry, text))
            .collect();

        if !self.boosts.is_empty() {
            let ctx = RuleContext {
                text,
                problem,
                generic_score: 0.0,
            };
            for boost in self.boosts.iter().filter(|b| b.when.eval(&ctx)) {
                for candidate in candidates.iter_mut().filter(|c| c.entry.slot_key == boost.target) {
                    candidate.score *= boost.factor;
                    candidate.evidence.push(format!("boost:{}", boost.name));
                }
            }
        }

        if self.profile == ScoringProfile::Weighted {
            for tier in [Tier::Core, Tier::Platform] {
                if candidates.iter().any(|c| c.entry.tier == tier) {
                    candidates.retain(|c| c.entry.tier == tier);
                    break;
                }
            }
            if candidates.iter().any(|c| c.has_anchor) {
                candidates.retain(|c| c.has_anchor);
            }
        }

        candidates.sort_by(|a, b| {
            b.has_anchor
                .cmp(&a.has_anchor)
                .then_with(|| b.score.total_cmp(&a.score))
                .then_with(|| a.entry.priority.cmp(&b.entry.priority))
        });
        candidates
    }

    fn score_entry(&self, entry: &'static TaxonomyEntry, text: &MatchText) -> Option<Candidate> {
        if entry.negative_keywords.iter().any(|p| text.contains(&p.text)) {
            return None;
        }

        let mut score = 0.0;
        let mut has_anchor = false;
        let mut evidence = Vec::new();

        let alias_weight = match self.profile {
            ScoringProfile::Weighted => {
                for phrase in entry.anchors.iter().filter(|p| text.contains(&p.text)) {
                    score += ANCHOR_WEIGHT * phrase.words as f32;
                    has_anchor = true;
                    evidence.push(format!("anchor:{}", phrase.text));
                }
                for phrase in entry.keywords.iter().filter(|p| text.contains(&p.text)) {
                    score += KEYWORD_WEIGHT * phrase.words as f32;
                    evidence.push(format!("keyword:{}", phrase.text));
                }
                SERVICE_ALIAS_WEIGHT
            }
            ScoringProfile::AliasOnly => ALIAS_WEIGHT,
        };

        for phrase in entry.aliases.iter().filter(|p| text.contains(&p.text)) {
            score += alias_weight * phrase.words as f32;
            evidence.push(format!("alias:{}", phrase.text));
        }

        (score > 0.0).then_some(Candidate {
            entry,
            score,
            has_anchor,
            evidence,
        })
    }
}

/// Rule-based values for the four taxonomy slots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSlots {
    pub service: SlotInference,
    pub problem: SlotInference,
    pub state: SlotInference,
    pub outcome: SlotInference,
}

/// The four slot inferencers, run in dependency order
#[derive(Debug, Clone)]
pub struct RuleInferencer {
    pub service: SlotInferencer,
    pub problem: SlotInferencer,
    pub state: SlotInferencer,
    pub outcome: SlotInferencer,
}

impl Default for RuleInferencer {
    fn default() -> Self {
        Self {
            service: SlotInferencer::service(),
            problem: SlotInferencer::problem(),
            state: SlotInferencer::state(),
            outcome: SlotInferencer::outcome(),
        }
    }
}

impl RuleInferencer {
    pub fn infer(&self, text: &MatchText) -> RuleSlots {
        let service = self.service.infer(text, None);
        let problem = self.problem.infer(text, None);
        let state = self.state.infer(text, Some(problem.value));
        let outcome = self.outcome.infer(text, Some(problem.value));
        RuleSlots {
            service,
            problem,
            state,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer_service(text: &str) -> SlotInference {
        SlotInferencer::service().infer(&MatchText::new(text), None)
    }

    #[test]
    fn test_service_keyword_confidence() {
        let result = infer_service("Tôi nạp tiền thất bại nhưng ngân hàng đã trừ tiền");
        assert_eq!(result.value, "nap_tien");
        assert!((result.confidence - 0.58).abs() < 1e-4);
        assert!(result.evidence.contains(&"keyword:nap tien".to_string()));
    }

    #[test]
    fn test_anchor_dominates() {
        let result = infer_service("liên kết ngân hàng VCB bị lỗi");
        assert_eq!(result.value, "lien_ket_ngan_hang");
        assert!(result.confidence >= 0.75);
    }

    #[test]
    fn test_negative_keyword_disqualifies() {
        // "nạp tiền điện thoại" must not land on the wallet deposit
        let result = infer_service("nạp tiền điện thoại không vào");
        assert_eq!(result.value, "nap_tien_dien_thoai");
    }

    #[test]
    fn test_core_tier_beats_platform() {
        // Mentions the app but the action is a withdrawal
        let result = infer_service("rút tiền trên app bị lỗi");
        assert_eq!(result.value, "rut_tien");
    }

    #[test]
    fn test_unlink_is_separate_service() {
        let result = infer_service("hủy liên kết ngân hàng thế nào");
        assert_eq!(result.value, "huy_lien_ket_ngan_hang");
    }

    #[test]
    fn test_fee_word_does_not_force_public_service() {
        let result = infer_service("rút tiền có mất phí không");
        assert_eq!(result.value, "rut_tien");
    }

    #[test]
    fn test_no_match_falls_back() {
        let result = infer_service("cho mình hỏi chút");
        assert_eq!(result.value, "khac");
        assert!((result.confidence - NO_MATCH_CONFIDENCE).abs() < f32::EPSILON);
        assert_eq!(result.evidence, vec!["fallback:no_match".to_string()]);
    }

    #[test]
    fn test_biometric_override() {
        let result = infer_service("cài đặt vân tay trên ứng dụng");
        assert_eq!(result.value, "xac_thuc_dinh_danh");
        assert_eq!(result.evidence, vec!["override:biometric".to_string()]);
    }

    #[test]
    fn test_telecom_boost() {
        let result = infer_service("mua mã thẻ cào bị lỗi");
        assert_eq!(result.value, "vien_thong");
        assert!(result.evidence.iter().any(|e| e.starts_with("boost:")));
    }

    #[test]
    fn test_problem_overrides() {
        let problem = SlotInferencer::problem();
        let infer = |t: &str| problem.infer(&MatchText::new(t), None);

        assert_eq!(infer("không nhận được OTP").value, "loi_xac_thuc");
        assert_eq!(infer("nạp tiền thất bại nhưng bị trừ tiền").value, "tra_soat");
        assert_eq!(infer("chuyển nhầm tiền cho người khác").value, "tra_soat");
        assert_eq!(infer("liên kết thất bại").value, "loi_lien_ket");
        assert_eq!(infer("làm thế nào để rút tiền").value, "huong_dan");
        assert_eq!(infer("rút tiền tối đa bao nhiêu").value, "chinh_sach");
    }

    #[test]
    fn test_custom_override_order() {
        let problem = SlotInferencer::problem().with_overrides(vec![OverrideRule {
            name: "always_policy",
            when: Condition::Phrases(&["otp"]),
            value: "chinh_sach",
            confidence: 0.5,
        }]);
        let result = problem.infer(&MatchText::new("không nhận được otp"), None);
        assert_eq!(result.value, "chinh_sach");
    }

    #[test]
    fn test_state_and_outcome() {
        let inferencer = RuleInferencer::default();
        let slots = inferencer.infer(&MatchText::new(
            "Tôi nạp tiền thất bại nhưng ngân hàng đã trừ tiền",
        ));
        assert_eq!(slots.problem.value, "tra_soat");
        assert_eq!(slots.state.value, "failed");
        assert!((slots.state.confidence - 0.85).abs() < 1e-4);
        assert_eq!(slots.outcome.value, "money_deducted");

        let slots = inferencer.infer(&MatchText::new("hướng dẫn nạp tiền vào ví"));
        assert_eq!(slots.problem.value, "huong_dan");
        assert_eq!(slots.outcome.value, "need_instruction");
        assert_eq!(slots.state.value, "unknown");
    }

    #[test]
    fn test_condition_combinators() {
        let text = MatchText::new("otp khong ve");
        let ctx = RuleContext {
            text: &text,
            problem: Some("loi_xac_thuc"),
            generic_score: 3.0,
        };
        let cond = Condition::AllOf(vec![
            Condition::Phrases(&["otp"]),
            Condition::Not(Box::new(Condition::Phrases(&["phi"]))),
            Condition::AnyOf(vec![Condition::ProblemIs("loi_xac_thuc"), Condition::GenericBelow(1.0)]),
        ]);
        assert!(cond.eval(&ctx));
        assert!(!Condition::GenericBelow(2.0).eval(&ctx));
    }
}
