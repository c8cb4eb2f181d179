//! Clarification counter store

use async_trait::async_trait;

use crate::Result;

/// Keyed counter of consecutive clarification rounds
///
/// `increment` must be atomic per session. Entries expire after the
/// store's TTL; an expired or unknown session reads as zero.
#[async_trait]
pub trait ClarifyCounterStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Result<u32>;

    /// Increment and return the new count
    async fn increment(&self, session_id: &str) -> Result<u32>;

    async fn reset(&self, session_id: &str) -> Result<()>;

    /// Drop expired entries, returning how many were removed
    ///
    /// Stores that expire keys on their own keep the default.
    fn cleanup_expired(&self) -> usize {
        0
    }
}
