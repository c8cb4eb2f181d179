//! Build the completion fallback from settings

use std::sync::Arc;
use wallet_support_config::{ExtractionConfig, LlmSettings};
use wallet_support_core::FallbackExtractor;

use crate::backend::{LlmBackend, LlmConfig, OpenAIBackend};
use crate::extractor::LlmSlotExtractor;
use crate::LlmError;

/// Create the fallback extractor, or `None` when the completion service is disabled
pub fn create_fallback_extractor(
    llm: &LlmSettings,
    extraction: &ExtractionConfig,
) -> Result<Option<Arc<dyn FallbackExtractor>>, LlmError> {
    if !llm.enabled {
        tracing::info!("Completion fallback disabled");
        return Ok(None);
    }

    let backend: Arc<dyn LlmBackend> = Arc::new(OpenAIBackend::new(LlmConfig::from(llm))?);
    tracing::info!(model = backend.model_name(), endpoint = %llm.endpoint, "Completion fallback enabled");

    let extractor = LlmSlotExtractor::new(backend).with_history_turns(extraction.history_turns);
    Ok(Some(Arc::new(extractor)))
}
