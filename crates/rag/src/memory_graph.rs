//! In-memory knowledge graph
//!
//! Evaluates the same tier plan the Cypher statement encodes, over solution
//! records loaded from a YAML or JSON file. Used for offline runs and tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use wallet_support_core::{GraphQuery, KnowledgeGraph, RetrievalCandidate, TierBranch, QueryParams};
use wallet_support_text_processing::normalize;

use crate::query_builder::question_bonus;
use crate::RagError;

/// A stored solution with its graph relations flattened
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionRecord {
    pub id: String,
    /// Stored customer question, returned as the candidate title
    pub question: String,
    #[serde(default)]
    pub question_norm: Option<String>,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub bank_id: Option<String>,
}

/// Knowledge file format
#[derive(Debug, Serialize, Deserialize)]
pub struct KnowledgeFile {
    #[serde(default)]
    pub version: Option<String>,
    pub solutions: Vec<SolutionRecord>,
}

fn eq(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

fn qualifies(branch: &TierBranch, params: &QueryParams, record: &SolutionRecord) -> bool {
    if branch.match_service && !eq(&record.service, &params.service) {
        return false;
    }
    if branch.match_problem && !eq(&record.problem, &params.problem) {
        return false;
    }
    if branch.match_state_or_outcome
        && !(eq(&record.state, &params.state) || eq(&record.outcome, &params.outcome))
    {
        return false;
    }
    if branch.bank_compatible {
        if let (Some(wanted), Some(bank)) = (&params.bank_id, &record.bank_id) {
            if wanted != bank {
                return false;
            }
        }
    }
    true
}

fn branch_score(branch: &TierBranch, params: &QueryParams, record: &SolutionRecord) -> f32 {
    let mut score = branch.base_score;
    if eq(&record.state, &params.state) {
        score += branch.state_bonus;
    }
    if eq(&record.outcome, &params.outcome) {
        score += branch.outcome_bonus;
    }
    if eq(&record.bank_id, &params.bank_id) {
        score += branch.bank_bonus;
    }
    score
}

/// Solution store held in process memory
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    /// Sorted by id, the order every branch limit applies in
    records: Vec<SolutionRecord>,
}

impl InMemoryGraph {
    pub fn new(records: Vec<SolutionRecord>) -> Self {
        let mut records: Vec<SolutionRecord> = records
            .into_iter()
            .map(|mut r| {
                if r.question_norm.is_none() {
                    r.question_norm = Some(normalize(&r.question));
                }
                r
            })
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Self { records }
    }

    /// Load solutions from a `.yaml`, `.yml` or `.json` knowledge file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RagError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RagError::Load(format!("Failed to read {}: {}", path.display(), e)))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let file: KnowledgeFile = match extension {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| RagError::Load(format!("Invalid YAML in {}: {}", path.display(), e)))?,
            "json" => serde_json::from_str(&content)
                .map_err(|e| RagError::Load(format!("Invalid JSON in {}: {}", path.display(), e)))?,
            other => {
                return Err(RagError::Load(format!(
                    "Unsupported knowledge file extension '{}' for {}",
                    other,
                    path.display()
                )))
            }
        };

        tracing::debug!(
            path = %path.display(),
            version = file.version.as_deref().unwrap_or("-"),
            count = file.solutions.len(),
            "Loaded knowledge file"
        );
        Ok(Self::new(file.solutions))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Evaluate a tier plan
    pub fn evaluate(&self, query: &GraphQuery) -> Vec<RetrievalCandidate> {
        let params = &query.params;
        let mut rows: Vec<RetrievalCandidate> = Vec::new();

        for branch in &query.plan.branches {
            let hits = self
                .records
                .iter()
                .filter(|r| qualifies(branch, params, r))
                .take(branch.limit);

            for record in hits {
                let bonus = question_bonus(
                    record.question_norm.as_deref().unwrap_or(""),
                    &params.query_norm,
                );
                rows.push(RetrievalCandidate {
                    id: record.id.clone(),
                    title: record.question.clone(),
                    content: record.answer.clone(),
                    tier: branch.tier,
                    base_score: branch_score(branch, params, record) + bonus,
                    matched_service: record.service.clone(),
                    matched_problem: record.problem.clone(),
                    matched_state: record.state.clone(),
                    matched_outcome: record.outcome.clone(),
                    bank_id: record.bank_id.clone(),
                });
            }
        }

        rows.sort_by(|a, b| {
            b.base_score
                .total_cmp(&a.base_score)
                .then_with(|| b.tier.cmp(&a.tier))
                .then_with(|| a.id.cmp(&b.id))
        });
        rows.truncate(query.plan.limit);
        rows
    }
}

#[async_trait]
impl KnowledgeGraph for InMemoryGraph {
    async fn query(&self, query: &GraphQuery) -> wallet_support_core::Result<Vec<RetrievalCandidate>> {
        Ok(self.evaluate(query))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::QueryBuilder;
    use std::io::Write;
    use wallet_support_core::CaseSlots;

    fn record(id: &str, service: &str, problem: &str, bank: Option<&str>) -> SolutionRecord {
        SolutionRecord {
            id: id.into(),
            question: format!("Câu hỏi {}", id),
            question_norm: None,
            answer: "Trả lời".into(),
            service: Some(service.into()),
            problem: Some(problem.into()),
            state: Some("failed".into()),
            outcome: None,
            bank_id: bank.map(String::from),
        }
    }

    fn slots() -> CaseSlots {
        CaseSlots {
            service: Some("nap_tien".into()),
            service_confidence: 0.9,
            problem_type: Some("tra_soat".into()),
            problem_confidence: 0.9,
            state: Some("failed".into()),
            bank_id: Some("VCB".into()),
            raw_narrative: "nạp tiền lỗi".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_tiers_and_bank_filter() {
        let graph = InMemoryGraph::new(vec![
            record("a", "nap_tien", "tra_soat", None),
            record("b", "nap_tien", "tra_soat", Some("BIDV")),
            record("c", "nap_tien", "huong_dan", None),
            record("d", "rut_tien", "tra_soat", None),
        ]);
        let rows = graph.evaluate(&QueryBuilder::default().build(&slots()));

        // a: tier 4 with the state bonus
        assert_eq!(rows[0].id, "a");
        assert_eq!(rows[0].tier, 4);
        assert_eq!(rows[0].base_score, 105.0);

        // b only reaches tier 3 because its bank differs
        let b_tiers: Vec<u8> = rows.iter().filter(|r| r.id == "b").map(|r| r.tier).collect();
        assert_eq!(b_tiers, vec![3]);

        // c keeps the service but not the problem
        assert!(rows.iter().any(|r| r.id == "c" && r.tier == 2));
        // d only shares the problem
        assert!(rows.iter().any(|r| r.id == "d" && r.tier == 1));
        assert!(!rows.iter().any(|r| r.id == "d" && r.tier >= 2));
    }

    #[test]
    fn test_question_bonus_applied() {
        let mut exact = record("x", "nap_tien", "tra_soat", None);
        exact.question = "Nạp tiền lỗi".into();
        let graph = InMemoryGraph::new(vec![exact]);
        let rows = graph.evaluate(&QueryBuilder::default().build(&slots()));
        assert_eq!(rows[0].base_score, 125.0);
    }

    #[test]
    fn test_total_limit() {
        let records = (0..50)
            .map(|i| record(&format!("s{:02}", i), "nap_tien", "tra_soat", None))
            .collect();
        let graph = InMemoryGraph::new(records);
        let rows = graph.evaluate(&QueryBuilder::default().build(&slots()));
        // 10 + 10 + 20 + 10 + 5 rows across tiers, capped at 80
        assert_eq!(rows.len(), 55);
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "version: \"1\"\nsolutions:\n  - id: q1\n    question: Rút tiền chưa về\n    answer: Vui lòng chờ\n    service: rut_tien\n    problem: tra_soat"
        )
        .unwrap();

        let graph = InMemoryGraph::from_file(file.path()).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.records[0].question_norm.as_deref(), Some("rut tien chua ve"));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(matches!(InMemoryGraph::from_file(file.path()), Err(RagError::Load(_))));
    }

    #[test]
    fn test_sample_knowledge_file() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/knowledge.yaml");
        let graph = InMemoryGraph::from_file(path).unwrap();
        assert_eq!(graph.len(), 11);
        assert!(graph.records.iter().all(|r| r.question_norm.is_some()));
        assert!(graph.records.windows(2).all(|w| w[0].id < w[1].id));
    }
}
