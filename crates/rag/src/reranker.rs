//! Multi-signal reranker and tier-aware confidence gate
//!
//! Every candidate gets one comparable score:
//!
//! ```text
//! final = base_score (tier + graph bonuses)
//!       + semantic              title similarity x 12 + content similarity x 0.3
//!       + agreement x 8         slot agreement, at most 6
//!       + exact state/outcome   +20 both, +8 one (only when the query has both)
//!       + penalties             weak semantic -30/-15, service or problem mismatch -20 each
//!       + perfect match         +8 when service and problem both agree
//!       + lexical anchors x 3
//! ```
//!
//! The gate then turns the best candidate into an answer, a clarification
//! or an out-of-scope verdict.

use parking_lot::Mutex;
use wallet_support_config::constants::gate;
use wallet_support_config::RerankConfig;
use wallet_support_core::{
    CaseSlots, GateDecision, GateVerdict, RankedSolution, RetrievalCandidate,
};
use wallet_support_text_processing::clarifying_questions;

use crate::similarity::QueryProfile;

const TITLE_WEIGHT: f32 = 12.0;
const CONTENT_WEIGHT: f32 = 0.3;
const AGREEMENT_WEIGHT: f32 = 8.0;
const MAX_AGREEMENT: f32 = 7.0;
/// Slot key the state and outcome taxonomies fall back to
const UNKNOWN_KEY: &str = "unknown";
const EXACT_STATE_OUTCOME_BOOST: f32 = 20.0;
const PARTIAL_STATE_OUTCOME_BOOST: f32 = 8.0;
const WEAK_SEMANTIC: f32 = 0.5;
const WEAK_SEMANTIC_PENALTY: f32 = -30.0;
const MODEST_SEMANTIC: f32 = 1.0;
const MODEST_SEMANTIC_PENALTY: f32 = -15.0;
const MISMATCH_PENALTY: f32 = -20.0;
const PERFECT_MATCH_BONUS: f32 = 8.0;
const ANCHOR_WEIGHT: f32 = 3.0;

/// Anchors the runner-up needs beyond the leader to be promoted
const ANCHOR_PROMOTION_MARGIN: usize = 1;
const AGREEMENT_PROMOTION_MARGIN: f32 = 0.1;
const SEMANTIC_PROMOTION_MARGIN: f32 = 2.0;

/// Kind of answer a problem type calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionType {
    Policy,
    Procedure,
    Faq,
}

/// Expected solution kind for a problem type slot key
pub fn expected_solution_type(problem: Option<&str>) -> SolutionType {
    match problem {
        Some("chinh_sach" | "loi_han_muc" | "loi_so_du") => SolutionType::Policy,
        Some("huong_dan") => SolutionType::Procedure,
        _ => SolutionType::Faq,
    }
}

/// Bank agreement in [0, 1]
fn bank_match(solution_bank: Option<&str>, slot_bank: Option<&str>) -> f32 {
    match (slot_bank, solution_bank) {
        // Any bank is fine when the customer named none
        (None, _) => 0.8,
        (Some(_), None) => 0.6,
        (Some(wanted), Some(bank)) if wanted.eq_ignore_ascii_case(bank) => 1.0,
        _ => 0.0,
    }
}

fn same(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a.eq_ignore_ascii_case(b))
}

/// Optional dimension: exact match +0.5, unknown on either side +0.3
fn optional_agreement(solution: Option<&str>, slot: Option<&str>) -> f32 {
    let known: fn(Option<&str>) -> Option<&str> = |v| v.filter(|v| !v.eq_ignore_ascii_case(UNKNOWN_KEY));
    match (known(solution), known(slot)) {
        (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => 0.5,
        (Some(_), Some(_)) => 0.0,
        _ => 0.3,
    }
}

/// Weighted agreement between candidate metadata and case slots
///
/// Service and problem weigh 2 each, bank 1, state and outcome 0.5 each.
/// Confidence divides by 7, so even a full match stays below 1.
fn slot_agreement(candidate: &RetrievalCandidate, slots: &CaseSlots) -> f32 {
    let mut agreement = 0.0;

    if same(candidate.matched_service.as_deref(), slots.service.as_deref()) {
        agreement += 2.0;
    }
    if same(candidate.matched_problem.as_deref(), slots.problem_type.as_deref()) {
        agreement += 2.0;
    }

    agreement += match (candidate.bank_id.as_deref(), slots.bank_id.as_deref()) {
        (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => 1.0,
        (Some(_), Some(_)) => 0.0,
        (None, None) => 0.8,
        (None, Some(_)) => 0.5,
        (Some(_), None) => 0.0,
    };

    agreement += optional_agreement(candidate.matched_state.as_deref(), slots.state.as_deref());
    agreement += optional_agreement(candidate.matched_outcome.as_deref(), slots.outcome.as_deref());
    agreement
}

/// Reranker configuration
#[derive(Debug, Clone)]
pub struct RerankerConfig {
    pub tier4_min_score: f32,
    pub tier3_min_score: f32,
    pub tier2_min_score: f32,
    pub low_tier_min_score: f32,
    pub low_tier_min_confidence: f32,
    pub min_extraction_confidence: f32,
    pub min_semantic: f32,
    pub min_service_confidence: f32,
    pub close_score_margin: f32,
    pub top_k: usize,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            tier4_min_score: gate::TIER4_MIN_SCORE,
            tier3_min_score: gate::TIER3_MIN_SCORE,
            tier2_min_score: gate::TIER2_MIN_SCORE,
            low_tier_min_score: gate::LOW_TIER_MIN_SCORE,
            low_tier_min_confidence: gate::LOW_TIER_MIN_CONFIDENCE,
            min_extraction_confidence: gate::MIN_EXTRACTION_CONFIDENCE,
            min_semantic: gate::MIN_SEMANTIC,
            min_service_confidence: gate::MIN_SERVICE_CONFIDENCE,
            close_score_margin: gate::CLOSE_SCORE_MARGIN,
            top_k: gate::TOP_K,
        }
    }
}

impl From<&RerankConfig> for RerankerConfig {
    fn from(config: &RerankConfig) -> Self {
        Self {
            tier4_min_score: config.tier4_min_score,
            tier3_min_score: config.tier3_min_score,
            tier2_min_score: config.tier2_min_score,
            low_tier_min_score: config.low_tier_min_score,
            low_tier_min_confidence: config.low_tier_min_confidence,
            min_extraction_confidence: config.min_extraction_confidence,
            min_semantic: config.min_semantic,
            min_service_confidence: config.min_service_confidence,
            close_score_margin: config.close_score_margin,
            top_k: config.top_k,
        }
    }
}

/// Gate outcome counters
#[derive(Debug, Clone, Default)]
pub struct RerankerStats {
    pub candidates_scored: usize,
    pub answers: usize,
    pub clarifications: usize,
    pub out_of_scope: usize,
    pub promotions: usize,
}

/// Candidate scorer and confidence gate
pub struct Reranker {
    config: RerankerConfig,
    stats: Mutex<RerankerStats>,
}

impl Default for Reranker {
    fn default() -> Self {
        Self::new(RerankerConfig::default())
    }
}

impl Reranker {
    pub fn new(config: RerankerConfig) -> Self {
        Self {
            config,
            stats: Mutex::new(RerankerStats::default()),
        }
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    /// Score one candidate
    pub fn score(
        &self,
        profile: &QueryProfile,
        slots: &CaseSlots,
        candidate: RetrievalCandidate,
    ) -> RankedSolution {
        let title_sim = profile.similarity(&candidate.title);
        let content_sim = profile.similarity(&candidate.content);
        let semantic = title_sim * TITLE_WEIGHT + content_sim * CONTENT_WEIGHT;

        let lexical_anchors = profile.anchors(&format!("{} {}", candidate.title, candidate.content));
        let lexical_boost = lexical_anchors as f32 * ANCHOR_WEIGHT;

        let agreement = slot_agreement(&candidate, slots);
        let agreement_boost = agreement * AGREEMENT_WEIGHT;

        let exact_match_boost = match (slots.state.as_deref(), slots.outcome.as_deref()) {
            (Some(state), Some(outcome)) => {
                let state_hit = same(candidate.matched_state.as_deref(), Some(state));
                let outcome_hit = same(candidate.matched_outcome.as_deref(), Some(outcome));
                match (state_hit, outcome_hit) {
                    (true, true) => EXACT_STATE_OUTCOME_BOOST,
                    (true, false) | (false, true) => PARTIAL_STATE_OUTCOME_BOOST,
                    (false, false) => 0.0,
                }
            }
            _ => 0.0,
        };

        let mut penalties = if semantic < WEAK_SEMANTIC {
            WEAK_SEMANTIC_PENALTY
        } else if semantic < MODEST_SEMANTIC {
            MODEST_SEMANTIC_PENALTY
        } else {
            0.0
        };

        let service_hit = same(candidate.matched_service.as_deref(), slots.service.as_deref());
        let problem_hit = same(candidate.matched_problem.as_deref(), slots.problem_type.as_deref());
        if slots.service.is_some() && !service_hit {
            penalties += MISMATCH_PENALTY;
        }
        if slots.problem_type.is_some() && !problem_hit {
            penalties += MISMATCH_PENALTY;
        }
        let perfect_match_bonus = if service_hit && problem_hit {
            PERFECT_MATCH_BONUS
        } else {
            0.0
        };

        let final_score = candidate.base_score
            + semantic
            + agreement_boost
            + exact_match_boost
            + penalties
            + perfect_match_bonus
            + lexical_boost;

        let type_match = expected_solution_type(candidate.matched_problem.as_deref())
            == expected_solution_type(slots.problem_type.as_deref());
        let bank_match = bank_match(candidate.bank_id.as_deref(), slots.bank_id.as_deref());

        RankedSolution {
            candidate,
            type_match,
            bank_match,
            semantic,
            agreement,
            agreement_boost,
            exact_match_boost,
            penalties,
            perfect_match_bonus,
            lexical_anchors,
            lexical_boost,
            final_score,
            confidence: (agreement / MAX_AGREEMENT).min(1.0),
        }
    }

    /// Score and order candidates by score, then agreement, then anchors
    pub fn rank(
        &self,
        utterance: &str,
        slots: &CaseSlots,
        candidates: Vec<RetrievalCandidate>,
    ) -> Vec<RankedSolution> {
        let profile = QueryProfile::new(utterance);
        self.stats.lock().candidates_scored += candidates.len();

        let mut ranked: Vec<RankedSolution> = candidates
            .into_iter()
            .map(|c| self.score(&profile, slots, c))
            .collect();

        ranked.sort_by(|a, b| {
            b.final_score
                .total_cmp(&a.final_score)
                .then_with(|| b.confidence.total_cmp(&a.confidence))
                .then_with(|| b.lexical_anchors.cmp(&a.lexical_anchors))
                .then_with(|| a.id().cmp(b.id()))
        });
        ranked
    }

    /// Promote the runner-up when the top two are close
    ///
    /// Returns the reason suffix when a promotion happened.
    fn break_tie(&self, ranked: &mut [RankedSolution]) -> Option<&'static str> {
        if ranked.len() < 2 {
            return None;
        }
        let (best, second) = (&ranked[0], &ranked[1]);
        if (best.final_score - second.final_score).abs() > self.config.close_score_margin {
            return None;
        }

        let reason = if second.lexical_anchors > best.lexical_anchors + ANCHOR_PROMOTION_MARGIN {
            "promoted via lexical anchors"
        } else if second.confidence > best.confidence + AGREEMENT_PROMOTION_MARGIN {
            "promoted via slot agreement"
        } else if second.semantic > best.semantic + SEMANTIC_PROMOTION_MARGIN {
            "promoted via semantic similarity"
        } else {
            return None;
        };

        ranked.swap(0, 1);
        self.stats.lock().promotions += 1;
        Some(reason)
    }

    /// Turn ranked candidates into a gate decision
    pub fn gate(&self, slots: &CaseSlots, mut ranked: Vec<RankedSolution>) -> GateDecision {
        let decision = self.decide(slots, &mut ranked);

        let mut stats = self.stats.lock();
        match decision.decision {
            GateVerdict::Answer => stats.answers += 1,
            GateVerdict::Clarify => stats.clarifications += 1,
            GateVerdict::OutOfScope => stats.out_of_scope += 1,
        }
        drop(stats);

        tracing::debug!(
            verdict = ?decision.decision,
            best = decision.best.as_ref().map(|b| b.id()).unwrap_or("-"),
            reason = %decision.reason,
            "Gate decision"
        );
        decision
    }

    fn decide(&self, slots: &CaseSlots, ranked: &mut Vec<RankedSolution>) -> GateDecision {
        let cfg = &self.config;

        if slots.is_out_of_scope() {
            let why = slots
                .inference_evidence
                .out_of_scope_reason
                .clone()
                .unwrap_or_else(|| "service not supported".to_string());
            return verdict(GateVerdict::OutOfScope, format!("Out of scope: {}", why), None, Vec::new(), Vec::new());
        }

        if ranked.is_empty() {
            return verdict(
                GateVerdict::Clarify,
                "No matching solution found".to_string(),
                None,
                Vec::new(),
                clarifying_questions(slots),
            );
        }

        let suffix = self
            .break_tie(ranked)
            .map(|r| format!(" ({})", r))
            .unwrap_or_default();
        let topk: Vec<RankedSolution> = ranked.iter().take(cfg.top_k).cloned().collect();
        let best = ranked[0].clone();

        if slots.confidence_score < cfg.min_extraction_confidence {
            let reason = format!(
                "Low extraction confidence ({:.2} < {:.2})",
                slots.confidence_score, cfg.min_extraction_confidence
            );
            return verdict(GateVerdict::Clarify, reason, Some(best), topk, clarifying_questions(slots));
        }

        if best.semantic < cfg.min_semantic {
            if slots.service.is_none() || slots.service_confidence < cfg.min_service_confidence {
                let reason = format!(
                    "No supported service and irrelevant best match (semantic={:.3} < {})",
                    best.semantic, cfg.min_semantic
                );
                return verdict(GateVerdict::OutOfScope, reason, None, topk, Vec::new());
            }
            let reason = format!(
                "Low semantic relevance (semantic={:.3} < {})",
                best.semantic, cfg.min_semantic
            );
            return verdict(GateVerdict::Clarify, reason, Some(best), topk, clarifying_questions(slots));
        }

        let tier = best.tier();
        let score = best.final_score;
        let accepted = if tier >= 4 && score >= cfg.tier4_min_score {
            Some("Tier 4 full match")
        } else if tier >= 3 && score >= cfg.tier3_min_score {
            Some("Tier 3 partial match")
        } else if tier >= 2 && score >= cfg.tier2_min_score {
            Some("Tier 2 base match")
        } else if tier < 2
            && score >= cfg.low_tier_min_score
            && best.confidence >= cfg.low_tier_min_confidence
        {
            Some("Low tier fallback")
        } else {
            None
        };

        if let Some(label) = accepted {
            let reason = format!(
                "{} (tier={}, score={:.1}, agreement={:.2}){}",
                label, tier, score, best.confidence, suffix
            );
            return verdict(GateVerdict::Answer, reason, Some(best), topk, Vec::new());
        }

        let reason = format!(
            "Low confidence (tier={}, score={:.1}, agreement={:.2}, extraction={:.2})",
            tier, score, best.confidence, slots.confidence_score
        );
        verdict(GateVerdict::Clarify, reason, Some(best), topk, clarifying_questions(slots))
    }

    /// Rank and gate in one step
    pub fn rerank(
        &self,
        utterance: &str,
        slots: &CaseSlots,
        candidates: Vec<RetrievalCandidate>,
    ) -> GateDecision {
        let ranked = self.rank(utterance, slots, candidates);
        self.gate(slots, ranked)
    }

    pub fn stats(&self) -> RerankerStats {
        self.stats.lock().clone()
    }

    pub fn reset_stats(&self) {
        *self.stats.lock() = RerankerStats::default();
    }
}

fn verdict(
    decision: GateVerdict,
    reason: String,
    best: Option<RankedSolution>,
    topk: Vec<RankedSolution>,
    clarifying_questions: Vec<String>,
) -> GateDecision {
    GateDecision {
        decision,
        reason,
        best,
        topk,
        clarifying_questions,
    }
}
