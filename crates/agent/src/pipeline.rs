//! End-to-end support pipeline
//!
//! ```text
//! utterance ─► screen ─► triage ─► retrieve ─► rerank/gate ─► decide
//!                 │         │          │                        │
//!               flags    history    graph (timeout)      clarify counter
//! ```
//!
//! Nothing here fails a request. Collaborator errors are logged, counted
//! and replaced by the neutral value (no candidates, a zero count), and the
//! decision layer turns that into a clarification or an escalation.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

use wallet_support_config::constants::{extraction, session};
use wallet_support_config::Settings;
use wallet_support_core::{
    CaseSlots, ClarifyCounterStore, Decision, DecisionType, GateVerdict, QueryFlags, Turn,
};
use wallet_support_llm::create_fallback_extractor;
use wallet_support_rag::{
    create_graph, QueryBuilder, QueryBuilderConfig, Reranker, RerankerConfig, Retriever,
    RetrieverConfig,
};
use wallet_support_text_processing::{BankCatalog, CaseTriage, QueryScreener, TriageConfig};

use crate::decision::DecisionEngine;
use crate::session::{InMemoryClarifyCounter, SessionHistory};
use crate::AgentError;

/// What retrieval did for a request
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetrievalSummary {
    pub skipped: bool,
    pub candidates: usize,
    pub fallback_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full result of one request
#[derive(Debug, Clone, Serialize)]
pub struct SupportResponse {
    pub session_id: String,
    pub decision: Decision,
    pub slots: CaseSlots,
    pub flags: QueryFlags,
    pub gate: GateVerdict,
    pub gate_reason: String,
    pub retrieval: RetrievalSummary,
    /// Consecutive clarification rounds after this request
    pub clarify_count: u32,
    pub latency_ms: u64,
}

/// Screening, triage, retrieval, reranking and decision in one call
pub struct SupportPipeline {
    screener: QueryScreener,
    triage: CaseTriage,
    retriever: Retriever,
    reranker: Reranker,
    engine: DecisionEngine,
    counter: Arc<dyn ClarifyCounterStore>,
    history: SessionHistory,
    cleanup_interval: Duration,
}

impl SupportPipeline {
    /// Pipeline with default reranker, decision engine and counter
    pub fn new(triage: CaseTriage, retriever: Retriever) -> Self {
        Self {
            screener: QueryScreener::new(),
            triage,
            retriever,
            reranker: Reranker::default(),
            engine: DecisionEngine::default(),
            counter: Arc::new(InMemoryClarifyCounter::default()),
            history: SessionHistory::new(
                extraction::HISTORY_TURNS,
                Duration::from_secs(session::CLARIFY_TTL_SECONDS),
            ),
            cleanup_interval: Duration::from_secs(session::CLEANUP_INTERVAL_SECONDS),
        }
    }

    pub fn with_reranker(mut self, reranker: Reranker) -> Self {
        self.reranker = reranker;
        self
    }

    pub fn with_engine(mut self, engine: DecisionEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_counter(mut self, counter: Arc<dyn ClarifyCounterStore>) -> Self {
        self.counter = counter;
        self
    }

    pub fn with_history(mut self, history: SessionHistory) -> Self {
        self.history = history;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Wire every component from settings
    pub fn from_settings(settings: &Settings) -> Result<Self, AgentError> {
        settings.validate()?;

        let banks = match &settings.banks_path {
            Some(path) => {
                let catalog = BankCatalog::load(path)?;
                tracing::info!(path = %path, banks = catalog.banks().len(), "Bank catalog loaded");
                catalog
            }
            None => BankCatalog::default(),
        };

        let mut triage = CaseTriage::new(
            TriageConfig {
                fallback_threshold: settings.extraction.fallback_threshold,
                history_turns: settings.extraction.history_turns,
            },
            Arc::new(banks),
        );
        if let Some(fallback) = create_fallback_extractor(&settings.llm, &settings.extraction)? {
            triage = triage.with_fallback(fallback);
        }

        let graph = create_graph(&settings.retrieval)?;
        let retriever = Retriever::new(
            graph,
            QueryBuilder::new(QueryBuilderConfig::from_settings(
                &settings.retrieval,
                &settings.extraction,
            )),
            RetrieverConfig::from(&settings.retrieval),
        );

        let engine = DecisionEngine::new(settings.decision.clone())
            .with_ambiguity_margin(settings.rerank.close_score_margin);

        Ok(Self::new(triage, retriever)
            .with_reranker(Reranker::new(RerankerConfig::from(&settings.rerank)))
            .with_engine(engine)
            .with_counter(Arc::new(InMemoryClarifyCounter::from_config(&settings.session)))
            .with_history(SessionHistory::new(
                settings.extraction.history_turns,
                Duration::from_secs(settings.session.clarify_ttl_seconds),
            ))
            .with_cleanup_interval(Duration::from_secs(settings.session.cleanup_interval_seconds)))
    }

    pub fn reranker(&self) -> &Reranker {
        &self.reranker
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Process one utterance for a session
    pub async fn process(&self, session_id: &str, utterance: &str) -> SupportResponse {
        let started = Instant::now();
        metrics::counter!("wallet_support_requests_total").increment(1);

        let flags = self.screener.screen(utterance);
        let history = self.history.recent(session_id);
        let slots = self.triage.extract(utterance, &history).await;
        if slots.inference_evidence.fallback_error.is_some() {
            metrics::counter!("wallet_support_degraded_total", "stage" => "fallback").increment(1);
        }

        let mut retrieval = RetrievalSummary::default();
        let candidates = if flags.out_of_domain || slots.is_out_of_scope() {
            retrieval.skipped = true;
            Vec::new()
        } else {
            let outcome = self.retriever.retrieve(&slots).await;
            if outcome.error.is_some() {
                metrics::counter!("wallet_support_degraded_total", "stage" => "graph").increment(1);
            }
            retrieval.candidates = outcome.candidates.len();
            retrieval.fallback_used = outcome.fallback_used;
            retrieval.error = outcome.error;
            outcome.candidates
        };

        let gate = self.reranker.rerank(utterance, &slots, candidates);

        let count = match self.counter.get(session_id).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "Clarify counter read failed, assuming zero");
                metrics::counter!("wallet_support_degraded_total", "stage" => "session").increment(1);
                0
            }
        };

        let decision = self.engine.decide(&flags, &slots, &gate, count);
        let clarify_count = self.update_counter(session_id, decision.decision_type, count).await;
        self.history.push(session_id, Turn::user(utterance));
        if let Some(reply) = assistant_reply(&decision) {
            self.history.push(session_id, Turn::assistant(reply));
        }

        let latency_ms = started.elapsed().as_millis() as u64;
        metrics::counter!("wallet_support_decisions_total", "type" => decision.decision_type.as_str())
            .increment(1);
        tracing::info!(
            session_id,
            decision = decision.decision_type.as_str(),
            service = slots.service.as_deref().unwrap_or("-"),
            problem = slots.problem_type.as_deref().unwrap_or("-"),
            extraction_confidence = slots.confidence_score,
            gate = ?gate.decision,
            clarify_count,
            latency_ms,
            "Request processed"
        );

        SupportResponse {
            session_id: session_id.to_string(),
            decision,
            slots,
            flags,
            gate: gate.decision,
            gate_reason: gate.reason,
            retrieval,
            clarify_count,
            latency_ms,
        }
    }

    async fn update_counter(&self, session_id: &str, decision: DecisionType, current: u32) -> u32 {
        let result = if decision == DecisionType::ClarifyRequired {
            self.counter.increment(session_id).await
        } else if decision.is_answer() {
            self.counter.reset(session_id).await.map(|_| 0)
        } else {
            return current;
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(session_id, error = %e, "Clarify counter update failed");
            metrics::counter!("wallet_support_degraded_total", "stage" => "session").increment(1);
            current
        })
    }

    /// Drop expired clarify counters and histories
    pub fn sweep_expired(&self) -> usize {
        self.counter.cleanup_expired() + self.history.cleanup_expired()
    }

    /// Sweep expired session state every `cleanup_interval`
    ///
    /// Returns a sender that stops the task when `true` is sent.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let pipeline = Arc::clone(self);
        let interval = self.cleanup_interval;

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        let removed = pipeline.sweep_expired();
                        if removed > 0 {
                            tracing::info!(
                                removed,
                                histories = pipeline.history.len(),
                                "Expired session state removed"
                            );
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            tracing::debug!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    /// Forget a session's counter and history
    pub async fn clear_session(&self, session_id: &str) -> Result<(), AgentError> {
        self.history.clear(session_id);
        self.counter
            .reset(session_id)
            .await
            .map_err(|e| AgentError::Session(e.to_string()))
    }
}

/// What the assistant said back, kept in history for the completion fallback
fn assistant_reply(decision: &Decision) -> Option<String> {
    if !decision.clarifying_questions.is_empty() {
        return Some(decision.clarifying_questions.join("\n"));
    }
    if decision.decision_type.is_answer() {
        if let Some(top) = &decision.top_result {
            return Some(top.candidate.content.clone());
        }
    }
    (!decision.explanation.is_empty()).then(|| decision.explanation.clone())
}
