//! Knowledge graph store

use async_trait::async_trait;

use crate::retrieval::{GraphQuery, RetrievalCandidate};
use crate::Result;

/// Store holding the pre-authored solutions
///
/// Implementations must honor the query's tier plan: service and bank are
/// hard filters, problem type only qualifies a branch.
#[async_trait]
pub trait KnowledgeGraph: Send + Sync {
    /// Execute a tiered query and return the union of all branches
    async fn query(&self, query: &GraphQuery) -> Result<Vec<RetrievalCandidate>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
