//! Collaborator traits for the decision engine
//!
//! Every external dependency of the pipeline sits behind one of these traits
//! so stores and backends can be swapped from configuration or mocked in tests.
//!
//! ```text
//! Retrieval:
//!   - KnowledgeGraph: tiered solution lookup
//!
//! Extraction:
//!   - FallbackExtractor: completion-service slot re-derivation
//!
//! Session:
//!   - ClarifyCounterStore: per-session clarification rounds with TTL
//! ```

mod extraction;
mod graph;
mod session;

pub use extraction::FallbackExtractor;
pub use graph::KnowledgeGraph;
pub use session::ClarifyCounterStore;
