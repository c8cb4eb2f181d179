//! Tiered retrieval and reranking over the solution knowledge graph
//!
//! Features:
//! - Cascading tier plan (full match down to generic) rendered as Cypher
//! - Relaxed fallback query when the tiered query returns nothing
//! - Neo4j transactional HTTP store and an in-memory store for offline runs
//! - Lexical similarity with domain keyword clusters
//! - Multi-signal reranking with close-score tie-breakers
//! - Tier-aware confidence gate

pub mod memory_graph;
pub mod neo4j;
pub mod query_builder;
pub mod reranker;
pub mod retriever;
pub mod similarity;

pub use memory_graph::{InMemoryGraph, KnowledgeFile, SolutionRecord};
pub use neo4j::{Neo4jConfig, Neo4jGraph};
pub use query_builder::{question_bonus, render_cypher, QueryBuilder, QueryBuilderConfig};
pub use reranker::{expected_solution_type, Reranker, RerankerConfig, RerankerStats, SolutionType};
pub use retriever::{RetrievalOutcome, Retriever, RetrieverConfig};
pub use similarity::{lexical_anchors, text_similarity, QueryProfile};

use thiserror::Error;
use wallet_support_config::{GraphBackend, RetrievalConfig};
use wallet_support_core::KnowledgeGraph;

use std::sync::Arc;

/// Retrieval errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Graph query timed out after {0} ms")]
    Timeout(u64),

    #[error("Knowledge load error: {0}")]
    Load(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for RagError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RagError::Parse(err.to_string())
        } else {
            RagError::Connection(err.to_string())
        }
    }
}

impl From<RagError> for wallet_support_core::Error {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Timeout(ms) => {
                wallet_support_core::Error::Timeout(format!("graph query after {} ms", ms))
            }
            other => wallet_support_core::Error::Rag(other.to_string()),
        }
    }
}

/// Build the configured knowledge graph store
pub fn create_graph(config: &RetrievalConfig) -> Result<Arc<dyn KnowledgeGraph>, RagError> {
    match config.backend {
        GraphBackend::Memory => {
            let graph = match &config.knowledge_path {
                Some(path) => InMemoryGraph::from_file(path)?,
                None => {
                    tracing::warn!("No knowledge_path configured, in-memory graph is empty");
                    InMemoryGraph::default()
                }
            };
            tracing::info!(solutions = graph.len(), "In-memory knowledge graph ready");
            Ok(Arc::new(graph))
        }
        GraphBackend::Neo4j => {
            let graph = Neo4jGraph::new(Neo4jConfig::from(config))?;
            tracing::info!(endpoint = %config.endpoint, database = %config.database, "Neo4j knowledge graph ready");
            Ok(Arc::new(graph))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_maps_to_core_timeout() {
        let err: wallet_support_core::Error = RagError::Timeout(3000).into();
        assert!(matches!(err, wallet_support_core::Error::Timeout(_)));

        let err: wallet_support_core::Error = RagError::Query("syntax".into()).into();
        assert!(matches!(err, wallet_support_core::Error::Rag(_)));
    }

    #[test]
    fn test_create_empty_memory_graph() {
        let graph = create_graph(&RetrievalConfig::default()).unwrap();
        assert_eq!(graph.name(), "memory");
    }
}
