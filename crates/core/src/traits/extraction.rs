//! Completion-service slot extraction

use async_trait::async_trait;

use crate::conversation::Turn;
use crate::slots::FallbackSlots;
use crate::Result;

/// Re-derives slots when rule-based inference is not confident enough
#[async_trait]
pub trait FallbackExtractor: Send + Sync {
    async fn extract(&self, utterance: &str, history: &[Turn]) -> Result<FallbackSlots>;
}
