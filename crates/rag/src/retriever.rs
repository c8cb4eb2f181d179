//! Retriever: tiered query, relaxed fallback, deduplication
//!
//! Graph failures never propagate. A failed or timed-out query is logged,
//! recorded on the outcome and treated as an empty result, which the gate
//! later turns into a clarification or an escalation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use wallet_support_config::constants::timeouts;
use wallet_support_config::RetrievalConfig;
use wallet_support_core::{CaseSlots, GraphQuery, KnowledgeGraph, RetrievalCandidate};

use crate::query_builder::QueryBuilder;
use crate::RagError;

/// Retriever configuration
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Upper bound on each graph query
    pub timeout: Duration,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(timeouts::GRAPH_QUERY_MS),
        }
    }
}

impl From<&RetrievalConfig> for RetrieverConfig {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

/// What one retrieval produced
#[derive(Debug, Clone, Default)]
pub struct RetrievalOutcome {
    /// Unique by id, best row per solution, ordered by score
    pub candidates: Vec<RetrievalCandidate>,
    pub fallback_used: bool,
    /// Last graph error, when a query failed
    pub error: Option<String>,
}

/// Runs graph queries for case slots
pub struct Retriever {
    graph: Arc<dyn KnowledgeGraph>,
    builder: QueryBuilder,
    config: RetrieverConfig,
}

impl Retriever {
    pub fn new(graph: Arc<dyn KnowledgeGraph>, builder: QueryBuilder, config: RetrieverConfig) -> Self {
        Self {
            graph,
            builder,
            config,
        }
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    pub fn graph_name(&self) -> &str {
        self.graph.name()
    }

    async fn run(&self, query: &GraphQuery) -> Result<Vec<RetrievalCandidate>, RagError> {
        let timeout_ms = self.config.timeout.as_millis() as u64;
        match tokio::time::timeout(self.config.timeout, self.graph.query(query)).await {
            Ok(Ok(rows)) => Ok(rows),
            Ok(Err(e)) => Err(RagError::Query(e.to_string())),
            Err(_) => Err(RagError::Timeout(timeout_ms)),
        }
    }

    /// Primary tiered query, then the relaxed query when it found nothing
    pub async fn retrieve(&self, slots: &CaseSlots) -> RetrievalOutcome {
        let mut outcome = RetrievalOutcome::default();

        let primary = self.builder.build(slots);
        match self.run(&primary).await {
            Ok(rows) => outcome.candidates = rows,
            Err(e) => {
                tracing::warn!(graph = self.graph.name(), error = %e, "Tiered graph query failed");
                outcome.error = Some(e.to_string());
            }
        }

        if outcome.candidates.is_empty() {
            let fallback = self.builder.build_fallback(slots);
            let tier = fallback.plan.branches.first().map(|b| b.tier).unwrap_or(0);
            tracing::debug!(tier, "Primary query empty, running fallback query");
            outcome.fallback_used = true;

            match self.run(&fallback).await {
                Ok(rows) => outcome.candidates = rows,
                Err(e) => {
                    tracing::warn!(graph = self.graph.name(), error = %e, "Fallback graph query failed");
                    outcome.error = Some(e.to_string());
                }
            }
        }

        outcome.candidates = dedupe(std::mem::take(&mut outcome.candidates));
        tracing::debug!(
            candidates = outcome.candidates.len(),
            fallback = outcome.fallback_used,
            top_tier = outcome.candidates.first().map(|c| c.tier),
            "Retrieval finished"
        );
        outcome
    }
}

/// Keep the best-scoring row of each solution
fn dedupe(rows: Vec<RetrievalCandidate>) -> Vec<RetrievalCandidate> {
    let mut best: HashMap<String, RetrievalCandidate> = HashMap::with_capacity(rows.len());
    for row in rows {
        match best.get(&row.id) {
            Some(kept) if kept.base_score >= row.base_score => {}
            _ => {
                best.insert(row.id.clone(), row);
            }
        }
    }

    let mut unique: Vec<RetrievalCandidate> = best.into_values().collect();
    unique.sort_by(|a, b| {
        b.base_score
            .total_cmp(&a.base_score)
            .then_with(|| b.tier.cmp(&a.tier))
            .then_with(|| a.id.cmp(&b.id))
    });
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, tier: u8, score: f32) -> RetrievalCandidate {
        RetrievalCandidate {
            id: id.into(),
            title: id.into(),
            tier,
            base_score: score,
            ..Default::default()
        }
    }

    #[test]
    fn test_dedupe_keeps_best_row() {
        let rows = vec![row("a", 4, 105.0), row("b", 2, 40.0), row("a", 2, 40.0), row("b", 3, 73.0)];
        let unique = dedupe(rows);
        assert_eq!(unique.len(), 2);
        assert_eq!((unique[0].id.as_str(), unique[0].tier), ("a", 4));
        assert_eq!((unique[1].id.as_str(), unique[1].tier), ("b", 3));
    }
}
