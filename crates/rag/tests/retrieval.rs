//! Triage, tiered retrieval and reranking against an in-memory graph

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use wallet_support_core::{
    CaseSlots, Error, GateVerdict, GraphQuery, KnowledgeGraph, RetrievalCandidate,
};
use wallet_support_rag::{
    InMemoryGraph, QueryBuilder, Reranker, Retriever, RetrieverConfig, SolutionRecord,
};
use wallet_support_text_processing::{BankCatalog, CaseTriage, TriageConfig};

fn solution(
    id: &str,
    question: &str,
    service: &str,
    problem: &str,
    state: Option<&str>,
    outcome: Option<&str>,
) -> SolutionRecord {
    SolutionRecord {
        id: id.into(),
        question: question.into(),
        question_norm: None,
        answer: format!("Trả lời cho: {}", question),
        service: Some(service.into()),
        problem: Some(problem.into()),
        state: state.map(String::from),
        outcome: outcome.map(String::from),
        bank_id: None,
    }
}

fn knowledge() -> Arc<InMemoryGraph> {
    Arc::new(InMemoryGraph::new(vec![
        solution(
            "dep-investigate",
            "Nạp tiền thất bại nhưng ngân hàng đã trừ tiền",
            "nap_tien",
            "tra_soat",
            Some("failed"),
            Some("money_deducted"),
        ),
        solution("dep-guide", "Hướng dẫn nạp tiền vào ví", "nap_tien", "huong_dan", None, None),
        solution(
            "wd-missing",
            "Rút tiền về ngân hàng nhưng chưa nhận được tiền",
            "rut_tien",
            "tra_soat",
            Some("success"),
            Some("money_not_received"),
        ),
    ]))
}

fn retriever(graph: Arc<dyn KnowledgeGraph>) -> Retriever {
    Retriever::new(graph, QueryBuilder::default(), RetrieverConfig::default())
}

#[tokio::test]
async fn test_deposit_scenario_answers_from_tier4() {
    let triage = CaseTriage::new(TriageConfig::default(), Arc::new(BankCatalog::default()));
    let utterance = "Tôi nạp tiền thất bại nhưng ngân hàng đã trừ tiền";
    let slots = triage.extract_rules_only(utterance);
    assert_eq!(slots.service.as_deref(), Some("nap_tien"));
    assert_eq!(slots.problem_type.as_deref(), Some("tra_soat"));

    let outcome = retriever(knowledge()).retrieve(&slots).await;
    assert!(!outcome.fallback_used);
    assert!(outcome.error.is_none());
    assert_eq!(outcome.candidates[0].id, "dep-investigate");
    assert_eq!(outcome.candidates[0].tier, 4);

    let decision = Reranker::default().rerank(utterance, &slots, outcome.candidates);
    assert_eq!(decision.decision, GateVerdict::Answer);
    let best = decision.best.unwrap();
    assert_eq!(best.id(), "dep-investigate");
    assert!(best.final_score >= 75.0);
    assert!(decision.topk.len() <= 3);
}

#[tokio::test]
async fn test_vague_utterance_clarifies() {
    let triage = CaseTriage::new(TriageConfig::default(), Arc::new(BankCatalog::default()));
    let utterance = "giúp mình với";
    let slots = triage.extract_rules_only(utterance);

    let outcome = retriever(knowledge()).retrieve(&slots).await;
    let decision = Reranker::default().rerank(utterance, &slots, outcome.candidates);

    assert_ne!(decision.decision, GateVerdict::Answer);
    if decision.decision == GateVerdict::Clarify {
        assert!(!decision.clarifying_questions.is_empty());
    }
}

#[tokio::test]
async fn test_fallback_query_when_primary_empty() {
    // Only a withdrawal solution exists for a bank the query excludes
    let mut record = solution("wd", "Rút tiền", "rut_tien", "tra_soat", None, None);
    record.bank_id = Some("BIDV".into());
    let graph = Arc::new(InMemoryGraph::new(vec![record]));

    let slots = CaseSlots {
        service: Some("rut_tien".into()),
        service_confidence: 0.9,
        problem_type: Some("tra_soat".into()),
        problem_confidence: 0.9,
        bank_id: Some("VCB".into()),
        raw_narrative: "rút tiền về VCB".into(),
        ..Default::default()
    };

    let outcome = retriever(graph).retrieve(&slots).await;
    // Tier 3 ignores the bank, so the primary query still finds it
    assert!(!outcome.fallback_used);
    assert_eq!(outcome.candidates.len(), 1);
    assert_eq!(outcome.candidates[0].tier, 3);

    let slots = CaseSlots {
        problem_type: None,
        ..slots
    };
    let mut record = solution("wd", "Rút tiền", "rut_tien", "tra_soat", None, None);
    record.bank_id = Some("BIDV".into());
    let outcome = retriever(Arc::new(InMemoryGraph::new(vec![record])))
        .retrieve(&slots)
        .await;
    assert!(outcome.fallback_used);
    assert_eq!(outcome.candidates[0].tier, 2);
}

struct FailingGraph;

#[async_trait]
impl KnowledgeGraph for FailingGraph {
    async fn query(&self, _query: &GraphQuery) -> wallet_support_core::Result<Vec<RetrievalCandidate>> {
        Err(Error::Rag("connection refused".into()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

struct SlowGraph;

#[async_trait]
impl KnowledgeGraph for SlowGraph {
    async fn query(&self, _query: &GraphQuery) -> wallet_support_core::Result<Vec<RetrievalCandidate>> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "slow"
    }
}

#[tokio::test]
async fn test_graph_failure_degrades_to_empty() {
    let slots = CaseSlots {
        service: Some("nap_tien".into()),
        service_confidence: 0.9,
        raw_narrative: "nạp tiền".into(),
        ..Default::default()
    };
    let outcome = retriever(Arc::new(FailingGraph)).retrieve(&slots).await;
    assert!(outcome.candidates.is_empty());
    assert!(outcome.fallback_used);
    assert!(outcome.error.unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_graph_timeout_degrades_to_empty() {
    let retriever = Retriever::new(
        Arc::new(SlowGraph),
        QueryBuilder::default(),
        RetrieverConfig {
            timeout: Duration::from_millis(20),
        },
    );
    let outcome = retriever.retrieve(&CaseSlots::default()).await;
    assert!(outcome.candidates.is_empty());
    assert!(outcome.error.unwrap().contains("timed out"));
}
