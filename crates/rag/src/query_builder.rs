//! Retrieval query builder
//!
//! Turns case slots into one cascading query over five tiers:
//!
//! ```text
//! tier 4  service + problem + state|outcome, bank compatible   100 (+5 state, +5 outcome)
//! tier 3  service + problem                                     70 (+3 state, +3 outcome, +5 bank)
//! tier 2  service, bank compatible                              40
//! tier 1  problem, bank compatible                              30
//! tier 0  any solution, bank compatible                         20
//! ```
//!
//! Service and bank are the only hard filters. Problem type decides which
//! tier a solution lands in but never removes it: a solution whose problem
//! differs from the query still comes back through tier 2. Tiers whose
//! dimension the query lacks are left out of the plan.

use serde_json::{json, Map, Value};
use wallet_support_config::constants::{extraction, tiers};
use wallet_support_config::{ExtractionConfig, RetrievalConfig, TierLimits};
use wallet_support_core::{CaseSlots, GraphQuery, QueryParams, TierBranch, TierPlan};
use wallet_support_text_processing::normalize;

/// Bonus when the stored question equals the utterance
pub const QUESTION_EXACT_BONUS: f32 = 20.0;
/// Bonus when the stored question contains the utterance
pub const QUESTION_CONTAINS_BONUS: f32 = 8.0;
/// Bonus when the utterance contains the stored question
pub const QUESTION_CONTAINED_BONUS: f32 = 5.0;

/// Lexical bonus of a stored normalized question against the normalized utterance
pub fn question_bonus(question_norm: &str, query_norm: &str) -> f32 {
    if query_norm.is_empty() || question_norm.is_empty() {
        0.0
    } else if question_norm == query_norm {
        QUESTION_EXACT_BONUS
    } else if question_norm.contains(query_norm) {
        QUESTION_CONTAINS_BONUS
    } else if query_norm.contains(question_norm) {
        QUESTION_CONTAINED_BONUS
    } else {
        0.0
    }
}

/// Query builder configuration
#[derive(Debug, Clone)]
pub struct QueryBuilderConfig {
    pub tier_limits: TierLimits,
    pub total_limit: usize,
    pub fallback_limit: usize,
    pub generic_fallback_limit: usize,
    /// Service (and problem, for the fallback) confidence needed to filter on it
    pub min_filter_confidence: f32,
}

impl Default for QueryBuilderConfig {
    fn default() -> Self {
        Self {
            tier_limits: TierLimits::default(),
            total_limit: tiers::TOTAL_LIMIT,
            fallback_limit: tiers::FALLBACK_LIMIT,
            generic_fallback_limit: tiers::GENERIC_FALLBACK_LIMIT,
            min_filter_confidence: extraction::SERVICE_FILTER_MIN_CONFIDENCE,
        }
    }
}

impl QueryBuilderConfig {
    pub fn from_settings(retrieval: &RetrievalConfig, extraction: &ExtractionConfig) -> Self {
        Self {
            tier_limits: retrieval.tier_limits.clone(),
            total_limit: retrieval.total_limit,
            fallback_limit: retrieval.fallback_limit,
            generic_fallback_limit: retrieval.generic_fallback_limit,
            min_filter_confidence: extraction.service_filter_min_confidence,
        }
    }
}

fn branch(tier: u8, base_score: f32, limit: usize) -> TierBranch {
    TierBranch {
        tier,
        base_score,
        match_service: false,
        match_problem: false,
        match_state_or_outcome: false,
        bank_compatible: false,
        state_bonus: 0.0,
        outcome_bonus: 0.0,
        bank_bonus: 0.0,
        limit,
    }
}

/// Builds tiered and fallback graph queries from case slots
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    config: QueryBuilderConfig,
}

impl QueryBuilder {
    pub fn new(config: QueryBuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QueryBuilderConfig {
        &self.config
    }

    /// Query parameters for a slot set
    ///
    /// The service is dropped when its confidence is below the filter floor so
    /// a shaky classification never filters out the right answer.
    pub fn params(&self, slots: &CaseSlots) -> QueryParams {
        let service = slots
            .service
            .clone()
            .filter(|_| slots.service_confidence >= self.config.min_filter_confidence);

        QueryParams {
            service,
            problem: slots.problem_type.clone(),
            state: slots.state.clone(),
            outcome: slots.outcome.clone(),
            bank_id: slots.bank_id.clone(),
            query_norm: normalize(&slots.raw_narrative),
        }
    }

    /// Primary tiered query
    pub fn build(&self, slots: &CaseSlots) -> GraphQuery {
        let params = self.params(slots);
        let plan = self.primary_plan(&params);
        finish(params, plan)
    }

    /// Relaxed query issued when the primary query returned no rows
    ///
    /// Service only when the service is trusted, else problem only when the
    /// problem is trusted, else an unfiltered generic query.
    pub fn build_fallback(&self, slots: &CaseSlots) -> GraphQuery {
        let floor = self.config.min_filter_confidence;
        let query_norm = normalize(&slots.raw_narrative);

        let (params, fallback) = match (&slots.service, &slots.problem_type) {
            (Some(service), _) if slots.service_confidence >= floor => {
                let mut b = branch(2, tiers::TIER2_BASE, self.config.fallback_limit);
                b.match_service = true;
                let params = QueryParams {
                    service: Some(service.clone()),
                    query_norm,
                    ..Default::default()
                };
                (params, b)
            }
            (_, Some(problem)) if slots.problem_confidence >= floor => {
                let mut b = branch(1, tiers::TIER1_BASE, self.config.fallback_limit);
                b.match_problem = true;
                let params = QueryParams {
                    problem: Some(problem.clone()),
                    query_norm,
                    ..Default::default()
                };
                (params, b)
            }
            _ => {
                let params = QueryParams {
                    query_norm,
                    ..Default::default()
                };
                (params, branch(0, tiers::TIER0_BASE, self.config.generic_fallback_limit))
            }
        };

        let limit = fallback.limit;
        finish(
            params,
            TierPlan {
                branches: vec![fallback],
                limit,
            },
        )
    }

    fn primary_plan(&self, params: &QueryParams) -> TierPlan {
        let limits = &self.config.tier_limits;
        let has_service = params.service.is_some();
        let has_problem = params.problem.is_some();
        let mut branches = Vec::with_capacity(5);

        if has_service && has_problem {
            let mut full = branch(4, tiers::TIER4_BASE, limits.tier4);
            full.match_service = true;
            full.match_problem = true;
            full.match_state_or_outcome = params.state.is_some() || params.outcome.is_some();
            full.bank_compatible = true;
            full.state_bonus = 5.0;
            full.outcome_bonus = 5.0;
            branches.push(full);

            let mut partial = branch(3, tiers::TIER3_BASE, limits.tier3);
            partial.match_service = true;
            partial.match_problem = true;
            partial.state_bonus = 3.0;
            partial.outcome_bonus = 3.0;
            partial.bank_bonus = 5.0;
            branches.push(partial);
        }

        if has_service {
            let mut service_only = branch(2, tiers::TIER2_BASE, limits.tier2);
            service_only.match_service = true;
            service_only.bank_compatible = true;
            branches.push(service_only);
        }

        if has_problem {
            let mut problem_only = branch(1, tiers::TIER1_BASE, limits.tier1);
            problem_only.match_problem = true;
            problem_only.bank_compatible = true;
            branches.push(problem_only);
        }

        let mut generic = branch(0, tiers::TIER0_BASE, limits.tier0);
        generic.bank_compatible = true;
        branches.push(generic);

        TierPlan {
            branches,
            limit: self.config.total_limit,
        }
    }
}

fn finish(params: QueryParams, plan: TierPlan) -> GraphQuery {
    GraphQuery {
        statement: render_cypher(&plan),
        parameters: cypher_parameters(&params, plan.limit),
        params,
        plan,
    }
}

fn cypher_parameters(params: &QueryParams, limit: usize) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("service".into(), json!(params.service));
    map.insert("problem".into(), json!(params.problem));
    map.insert("state".into(), json!(params.state));
    map.insert("outcome".into(), json!(params.outcome));
    map.insert("bank_id".into(), json!(params.bank_id));
    map.insert("q_norm".into(), json!(params.query_norm));
    map.insert("limit".into(), json!(limit));
    map
}

fn render_branch(b: &TierBranch) -> String {
    let mut conditions = Vec::new();
    if b.match_service {
        conditions.push("svc.name = $service".to_string());
    }
    if b.match_problem {
        conditions.push("prb.name = $problem".to_string());
    }
    if b.match_state_or_outcome {
        conditions.push("(st.name = $state OR out.name = $outcome)".to_string());
    }
    if b.bank_compatible {
        conditions
            .push("($bank_id IS NULL OR sol.bank_id IS NULL OR sol.bank_id = $bank_id)".to_string());
    }
    let filter = if conditions.is_empty() {
        "true".to_string()
    } else {
        conditions.join("\n      AND ")
    };

    let mut score = format!("{}", b.base_score);
    if b.state_bonus > 0.0 {
        score.push_str(&format!(
            "\n           + CASE WHEN $state IS NOT NULL AND st.name = $state THEN {} ELSE 0 END",
            b.state_bonus
        ));
    }
    if b.outcome_bonus > 0.0 {
        score.push_str(&format!(
            "\n           + CASE WHEN $outcome IS NOT NULL AND out.name = $outcome THEN {} ELSE 0 END",
            b.outcome_bonus
        ));
    }
    if b.bank_bonus > 0.0 {
        score.push_str(&format!(
            "\n           + CASE WHEN $bank_id IS NOT NULL AND sol.bank_id = $bank_id THEN {} ELSE 0 END",
            b.bank_bonus
        ));
    }

    format!(
        "    // tier {tier}
    MATCH (sol:Solution)
    OPTIONAL MATCH (sol)-[:OF_SERVICE]->(svc:Service)
    OPTIONAL MATCH (sol)-[:OF_PROBLEM]->(prb:Problem)
    OPTIONAL MATCH (sol)-[:OF_STATE]->(st:State)
    OPTIONAL MATCH (sol)-[:OF_OUTCOME]->(out:Outcome)
    WITH sol, svc, prb, st, out
    WHERE {filter}
    WITH sol, svc.name AS matched_service, prb.name AS matched_problem,
         st.name AS matched_state, out.name AS matched_outcome,
         {tier} AS tier, {score} AS base_score
    ORDER BY sol.id
    LIMIT {limit}
    RETURN sol, matched_service, matched_problem, matched_state, matched_outcome, tier, base_score",
        tier = b.tier,
        filter = filter,
        score = score,
        limit = b.limit,
    )
}

/// Render a tier plan as one Cypher statement
///
/// Rows come back as `{id, title, content, bank_id, tier, score, matched_*}`,
/// ordered by score, then tier, then id.
pub fn render_cypher(plan: &TierPlan) -> String {
    let union = plan
        .branches
        .iter()
        .map(render_branch)
        .collect::<Vec<_>>()
        .join("\n\n    UNION ALL\n\n");

    format!(
        "CALL {{
{union}
}}
WITH sol, matched_service, matched_problem, matched_state, matched_outcome, tier,
     base_score + CASE
         WHEN $q_norm IS NULL OR $q_norm = '' OR coalesce(sol.question_norm, '') = '' THEN 0
         WHEN sol.question_norm = $q_norm THEN {exact}
         WHEN sol.question_norm CONTAINS $q_norm THEN {contains}
         WHEN $q_norm CONTAINS sol.question_norm THEN {contained}
         ELSE 0
     END AS score
RETURN sol.id AS id,
       coalesce(sol.question, '') AS title,
       coalesce(sol.answer, '') AS content,
       sol.bank_id AS bank_id,
       matched_service, matched_problem, matched_state, matched_outcome,
       tier, score
ORDER BY score DESC, tier DESC, id ASC
LIMIT $limit",
        union = union,
        exact = QUESTION_EXACT_BONUS,
        contains = QUESTION_CONTAINS_BONUS,
        contained = QUESTION_CONTAINED_BONUS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(service: Option<&str>, service_conf: f32, problem: Option<&str>) -> CaseSlots {
        CaseSlots {
            service: service.map(String::from),
            service_confidence: service_conf,
            problem_type: problem.map(String::from),
            problem_confidence: 0.8,
            raw_narrative: "Tôi nạp tiền thất bại".to_string(),
            ..Default::default()
        }
    }

    fn tiers_of(query: &GraphQuery) -> Vec<u8> {
        query.plan.branches.iter().map(|b| b.tier).collect()
    }

    #[test]
    fn test_full_plan() {
        let mut s = slots(Some("nap_tien"), 0.9, Some("tra_soat"));
        s.state = Some("failed".into());
        s.bank_id = Some("VCB".into());
        let query = QueryBuilder::default().build(&s);

        assert_eq!(tiers_of(&query), vec![4, 3, 2, 1, 0]);
        assert_eq!(query.plan.limit, 80);
        assert_eq!(query.params.query_norm, "toi nap tien that bai");

        let full = &query.plan.branches[0];
        assert_eq!(full.base_score, 100.0);
        assert!(full.match_state_or_outcome);
        assert!(full.bank_compatible);
        assert_eq!(full.limit, 10);

        let partial = &query.plan.branches[1];
        assert!(!partial.bank_compatible);
        assert_eq!(partial.bank_bonus, 5.0);
    }

    #[test]
    fn test_low_service_confidence_drops_service() {
        let query = QueryBuilder::default().build(&slots(Some("nap_tien"), 0.3, Some("tra_soat")));
        assert_eq!(query.params.service, None);
        assert_eq!(tiers_of(&query), vec![1, 0]);
        assert_eq!(query.parameters["service"], Value::Null);
    }

    #[test]
    fn test_no_slots_is_generic_only() {
        let query = QueryBuilder::default().build(&slots(None, 0.0, None));
        assert_eq!(tiers_of(&query), vec![0]);
        assert!(!query.statement.contains("svc.name = $service"));
    }

    #[test]
    fn test_problem_never_filters_service_tier() {
        let query = QueryBuilder::default().build(&slots(Some("rut_tien"), 0.9, Some("huong_dan")));
        let service_tier = query.plan.branches.iter().find(|b| b.tier == 2).unwrap();
        assert!(service_tier.match_service);
        assert!(!service_tier.match_problem);
    }

    #[test]
    fn test_fallback_cascade() {
        let builder = QueryBuilder::default();

        let q = builder.build_fallback(&slots(Some("nap_tien"), 0.5, Some("tra_soat")));
        assert_eq!(tiers_of(&q), vec![2]);
        assert_eq!(q.plan.limit, 30);
        assert_eq!(q.params.problem, None);

        let q = builder.build_fallback(&slots(Some("nap_tien"), 0.2, Some("tra_soat")));
        assert_eq!(tiers_of(&q), vec![1]);
        assert_eq!(q.params.service, None);

        let mut vague = slots(None, 0.0, Some("tra_soat"));
        vague.problem_confidence = 0.2;
        let q = builder.build_fallback(&vague);
        assert_eq!(tiers_of(&q), vec![0]);
        assert_eq!(q.plan.limit, 20);
    }

    #[test]
    fn test_cypher_rendering() {
        let query = QueryBuilder::default().build(&slots(Some("nap_tien"), 0.9, Some("tra_soat")));
        assert_eq!(query.statement.matches("UNION ALL").count(), 4);
        assert!(query.statement.contains("40 AS base_score"));
        assert!(query.statement.contains("LIMIT $limit"));
        assert_eq!(query.parameters["limit"], json!(80));
        assert_eq!(query.parameters["problem"], json!("tra_soat"));
    }

    #[test]
    fn test_question_bonus() {
        assert_eq!(question_bonus("nap tien that bai", "nap tien that bai"), 20.0);
        assert_eq!(question_bonus("toi nap tien that bai thi sao", "nap tien that bai"), 8.0);
        assert_eq!(question_bonus("nap tien", "toi nap tien that bai"), 5.0);
        assert_eq!(question_bonus("rut tien", "nap tien"), 0.0);
        assert_eq!(question_bonus("", "nap tien"), 0.0);
    }
}
