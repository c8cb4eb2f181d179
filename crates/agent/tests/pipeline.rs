//! End-to-end pipeline behavior against an in-memory knowledge graph

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use wallet_support_agent::{
    DecisionEngine, InMemoryClarifyCounter, SessionHistory, SupportPipeline,
};
use wallet_support_config::{DecisionConfig, Settings};
use wallet_support_core::{
    ClarifyCounterStore, DecisionType, Error, GateVerdict, GraphQuery, KnowledgeGraph,
    RetrievalCandidate, SlotName, TurnRole,
};
use wallet_support_rag::{InMemoryGraph, QueryBuilder, Retriever, RetrieverConfig, SolutionRecord};
use wallet_support_text_processing::{BankCatalog, CaseTriage, TriageConfig};

const DEPOSIT: &str = "Tôi nạp tiền thất bại nhưng ngân hàng đã trừ tiền";
const VAGUE: &str = "giúp mình với";

fn solution(id: &str, question: &str, service: &str, problem: &str) -> SolutionRecord {
    SolutionRecord {
        id: id.into(),
        question: question.into(),
        question_norm: None,
        answer: format!("Trả lời cho: {}", question),
        service: Some(service.into()),
        problem: Some(problem.into()),
        state: None,
        outcome: None,
        bank_id: None,
    }
}

fn knowledge() -> Arc<InMemoryGraph> {
    let mut investigate = solution(
        "dep-investigate",
        "Nạp tiền thất bại nhưng ngân hàng đã trừ tiền",
        "nap_tien",
        "tra_soat",
    );
    investigate.state = Some("failed".into());
    investigate.outcome = Some("money_deducted".into());

    Arc::new(InMemoryGraph::new(vec![
        investigate,
        solution("dep-guide", "Hướng dẫn nạp tiền vào ví", "nap_tien", "huong_dan"),
        solution(
            "wd-missing",
            "Rút tiền về ngân hàng nhưng chưa nhận được tiền",
            "rut_tien",
            "tra_soat",
        ),
    ]))
}

fn pipeline_with(graph: Arc<dyn KnowledgeGraph>) -> SupportPipeline {
    let triage = CaseTriage::new(TriageConfig::default(), Arc::new(BankCatalog::default()));
    let retriever = Retriever::new(graph, QueryBuilder::default(), RetrieverConfig::default());
    SupportPipeline::new(triage, retriever)
}

fn pipeline() -> SupportPipeline {
    pipeline_with(knowledge())
}

#[tokio::test]
async fn test_deposit_is_answered() {
    let response = pipeline().process("s-deposit", DEPOSIT).await;

    assert_eq!(response.gate, GateVerdict::Answer);
    assert!(response.decision.decision_type.is_answer(), "{:?}", response.decision);
    let top = response.decision.top_result.as_ref().unwrap();
    assert_eq!(top.id(), "dep-investigate");
    assert!(response.decision.certainty.unwrap() >= 0.5);
    assert_eq!(response.slots.service.as_deref(), Some("nap_tien"));
    assert_eq!(response.slots.problem_type.as_deref(), Some("tra_soat"));
    assert_eq!(response.clarify_count, 0);
    assert!(!response.retrieval.skipped);
}

#[tokio::test]
async fn test_vague_question_asks_for_service_and_problem() {
    let response = pipeline().process("s-vague", VAGUE).await;

    assert_eq!(response.decision.decision_type, DecisionType::ClarifyRequired);
    assert_eq!(
        response.decision.clarification_slots,
        vec![SlotName::Service, SlotName::ProblemType]
    );
    assert!(response.decision.clarifying_questions.len() >= 2);
    assert_eq!(response.clarify_count, 1);
}

#[tokio::test]
async fn test_out_of_scope_short_circuits() {
    let response = pipeline().process("s-oos", "Tôi muốn đặt đồ ăn giao tận nhà").await;

    assert!(response.slots.is_out_of_scope());
    assert_eq!(response.slots.confidence_score, 0.0);
    assert!(response.retrieval.skipped);
    assert_eq!(response.gate, GateVerdict::OutOfScope);
    assert_eq!(response.decision.decision_type, DecisionType::EscalateOutOfScope);
}

#[tokio::test]
async fn test_personal_lookup_escalates() {
    let response = pipeline().process("s-personal", "Kiểm tra giao dịch của tôi hôm qua").await;
    assert!(response.flags.need_account_lookup);
    assert_eq!(response.decision.decision_type, DecisionType::EscalatePersonal);
    assert_eq!(response.clarify_count, 0);
}

#[tokio::test]
async fn test_greeting_is_out_of_domain() {
    let response = pipeline().process("s-hello", "Xin chào").await;
    assert!(response.flags.out_of_domain);
    assert!(response.retrieval.skipped);
    assert_eq!(response.decision.decision_type, DecisionType::EscalateOutOfScope);
}

#[tokio::test]
async fn test_clarify_rounds_escalate_at_max() {
    let engine = DecisionEngine::new(DecisionConfig {
        max_clarify_count: 3,
        ..Default::default()
    });
    let pipeline = pipeline().with_engine(engine);

    for expected in 1..=3 {
        let response = pipeline.process("s-retry", VAGUE).await;
        assert_eq!(response.decision.decision_type, DecisionType::ClarifyRequired);
        assert_eq!(response.clarify_count, expected);
    }

    let response = pipeline.process("s-retry", VAGUE).await;
    assert_eq!(response.decision.decision_type, DecisionType::EscalateMaxRetry);

    // Other sessions are unaffected
    let response = pipeline.process("s-other", VAGUE).await;
    assert_eq!(response.decision.decision_type, DecisionType::ClarifyRequired);
}

#[tokio::test]
async fn test_answer_resets_clarify_count() {
    let counter = Arc::new(InMemoryClarifyCounter::default());
    let pipeline = pipeline().with_counter(counter.clone());

    pipeline.process("s-reset", VAGUE).await;
    pipeline.process("s-reset", VAGUE).await;
    assert_eq!(counter.get("s-reset").await.unwrap(), 2);

    let response = pipeline.process("s-reset", DEPOSIT).await;
    assert!(response.decision.decision_type.is_answer());
    assert_eq!(response.clarify_count, 0);
    assert_eq!(counter.get("s-reset").await.unwrap(), 0);

    let response = pipeline.process("s-reset", VAGUE).await;
    assert_eq!(response.clarify_count, 1);
}

#[tokio::test]
async fn test_clear_session() {
    let pipeline = pipeline();
    pipeline.process("s-clear", VAGUE).await;
    pipeline.clear_session("s-clear").await.unwrap();
    let response = pipeline.process("s-clear", VAGUE).await;
    assert_eq!(response.clarify_count, 1);
}

struct DownGraph;

#[async_trait]
impl KnowledgeGraph for DownGraph {
    async fn query(&self, _query: &GraphQuery) -> wallet_support_core::Result<Vec<RetrievalCandidate>> {
        Err(Error::Rag("connection refused".into()))
    }

    fn name(&self) -> &str {
        "down"
    }
}

#[tokio::test]
async fn test_graph_outage_degrades_to_clarify() {
    let response = pipeline_with(Arc::new(DownGraph)).process("s-down", DEPOSIT).await;

    assert!(response.retrieval.error.is_some());
    assert_eq!(response.retrieval.candidates, 0);
    // A known service keeps the conversation going
    assert_eq!(response.decision.decision_type, DecisionType::ClarifyRequired);
}

struct BrokenCounter;

#[async_trait]
impl ClarifyCounterStore for BrokenCounter {
    async fn get(&self, _session_id: &str) -> wallet_support_core::Result<u32> {
        Err(Error::Session("store unavailable".into()))
    }

    async fn increment(&self, _session_id: &str) -> wallet_support_core::Result<u32> {
        Err(Error::Session("store unavailable".into()))
    }

    async fn reset(&self, _session_id: &str) -> wallet_support_core::Result<()> {
        Err(Error::Session("store unavailable".into()))
    }
}

#[tokio::test]
async fn test_counter_failure_does_not_fail_request() {
    let pipeline = pipeline().with_counter(Arc::new(BrokenCounter));

    let response = pipeline.process("s-broken", DEPOSIT).await;
    assert!(response.decision.decision_type.is_answer());

    let response = pipeline.process("s-broken", VAGUE).await;
    assert_eq!(response.decision.decision_type, DecisionType::ClarifyRequired);
    assert_eq!(response.clarify_count, 0);

    assert!(pipeline.clear_session("s-broken").await.is_err());
}

#[tokio::test]
async fn test_response_serializes_decision_type() {
    let response = pipeline().process("s-json", DEPOSIT).await;
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["session_id"], "s-json");
    assert!(value["decision"]["type"].as_str().unwrap().contains("ANSWER"));
    assert_eq!(value["gate"], "answer");
}

#[tokio::test]
async fn test_pipeline_from_default_settings() {
    let pipeline = SupportPipeline::from_settings(&Settings::default()).unwrap();
    assert_eq!(pipeline.engine().config().max_clarify_count, 10);

    let response = pipeline.process("s-settings", VAGUE).await;
    assert_eq!(response.decision.decision_type, DecisionType::ClarifyRequired);
    assert!(!response.retrieval.skipped);
}

#[tokio::test]
async fn test_history_keeps_clarifying_questions() {
    let pipeline = pipeline();
    let response = pipeline.process("s-turns", VAGUE).await;

    let turns = pipeline.history().recent("s-turns");
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, TurnRole::User);
    assert_eq!(turns[0].content, VAGUE);
    assert_eq!(turns[1].role, TurnRole::Assistant);
    assert!(turns[1].content.contains(&response.decision.clarifying_questions[0]));
}

#[tokio::test]
async fn test_sweep_drops_expired_sessions() {
    let ttl = Duration::from_millis(20);
    let counter = Arc::new(InMemoryClarifyCounter::new(ttl));
    let pipeline = pipeline()
        .with_counter(counter.clone())
        .with_history(SessionHistory::new(3, ttl));

    for i in 0..50 {
        pipeline.process(&format!("s-{}", i), VAGUE).await;
    }
    assert_eq!(counter.len(), 50);
    assert_eq!(pipeline.history().len(), 50);

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(pipeline.sweep_expired(), 100);
    assert!(counter.is_empty());
    assert!(pipeline.history().is_empty());
}

#[tokio::test]
async fn test_cleanup_task_sweeps_in_background() {
    let ttl = Duration::from_millis(10);
    let counter = Arc::new(InMemoryClarifyCounter::new(ttl));
    let pipeline = Arc::new(
        pipeline()
            .with_counter(counter.clone())
            .with_history(SessionHistory::new(3, ttl))
            .with_cleanup_interval(Duration::from_millis(20)),
    );

    pipeline.process("s-background", VAGUE).await;
    let shutdown = pipeline.start_cleanup_task();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(counter.is_empty());
    assert!(pipeline.history().is_empty());
    shutdown.send(true).unwrap();
}
