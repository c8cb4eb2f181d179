//! Completion-service slot extractor
//!
//! Implements [`FallbackExtractor`] on top of any [`LlmBackend`]. The reply
//! must be a JSON object matching [`REPLY_SCHEMA`]; anything else is an
//! error that case triage logs before keeping its rule-based slots.

use async_trait::async_trait;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;
use wallet_support_core::{FallbackExtractor, FallbackSlots, Turn};

use crate::backend::LlmBackend;
use crate::prompt::{extract_json, PromptBuilder};
use crate::LlmError;

/// JSON schema every extraction reply must satisfy
pub static REPLY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let text = json!({ "type": ["string", "null"] });
    let score = json!({ "type": ["number", "null"], "minimum": 0 });
    json!({
        "type": "object",
        "required": ["service", "problem_type"],
        "properties": {
            "service": text,
            "problem_type": text,
            "state": text,
            "issue_state": text,
            "outcome": text,
            "issue_outcome": text,
            "bank": text,
            "amount": text,
            "time": text,
            "error_message": text,
            "confidence_assessment": {
                "type": "object",
                "properties": {
                    "service_confidence": score,
                    "problem_confidence": score,
                    "state_confidence": score,
                    "outcome_confidence": score
                }
            }
        }
    })
});

static COMPILED_SCHEMA: Lazy<JSONSchema> =
    Lazy::new(|| JSONSchema::compile(&REPLY_SCHEMA).expect("reply schema is valid"));

#[derive(Debug, Default, Deserialize)]
struct ConfidenceAssessment {
    #[serde(default)]
    service_confidence: Option<f32>,
    #[serde(default)]
    problem_confidence: Option<f32>,
    #[serde(default)]
    state_confidence: Option<f32>,
    #[serde(default)]
    outcome_confidence: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ExtractionReply {
    service: Option<String>,
    problem_type: Option<String>,
    #[serde(default, alias = "issue_state")]
    state: Option<String>,
    #[serde(default, alias = "issue_outcome")]
    outcome: Option<String>,
    #[serde(default)]
    bank: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    confidence_assessment: Option<ConfidenceAssessment>,
}

impl From<ExtractionReply> for FallbackSlots {
    fn from(reply: ExtractionReply) -> Self {
        let confidence = reply.confidence_assessment.unwrap_or_default();
        // A missing score counts as zero so it never beats a rule value
        Self {
            service_confidence: confidence.service_confidence.unwrap_or(0.0),
            problem_confidence: confidence.problem_confidence.unwrap_or(0.0),
            state_confidence: confidence.state_confidence.unwrap_or(0.0),
            outcome_confidence: confidence.outcome_confidence.unwrap_or(0.0),
            service: reply.service,
            problem_type: reply.problem_type,
            state: reply.state,
            outcome: reply.outcome,
            bank: reply.bank,
            amount: reply.amount,
            time: reply.time,
            error_message: reply.error_message,
        }
    }
}

/// Parse and validate a raw completion reply
pub fn parse_reply(text: &str) -> Result<FallbackSlots, LlmError> {
    let body = extract_json(text)
        .ok_or_else(|| LlmError::InvalidResponse("Reply contains no JSON object".to_string()))?;
    let value: Value = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Malformed JSON: {}", e)))?;

    if let Err(errors) = COMPILED_SCHEMA.validate(&value) {
        let details = errors.map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
        return Err(LlmError::SchemaViolation(details));
    }

    let reply: ExtractionReply = serde_json::from_value(value)
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
    Ok(reply.into())
}

/// Slot extractor backed by a completion service
pub struct LlmSlotExtractor {
    backend: Arc<dyn LlmBackend>,
    history_turns: usize,
}

impl LlmSlotExtractor {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend,
            history_turns: 3,
        }
    }

    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    async fn run(&self, utterance: &str, history: &[Turn]) -> Result<FallbackSlots, LlmError> {
        let start = history.len().saturating_sub(self.history_turns);
        let messages = PromptBuilder::new()
            .system_prompt()
            .with_history(&history[start..])
            .utterance(utterance)
            .build();

        let result = self.backend.generate(&messages).await?;
        debug!(
            model = self.backend.model_name(),
            tokens = result.tokens,
            elapsed_ms = result.total_time_ms,
            "Completion reply received"
        );
        parse_reply(&result.text)
    }
}

#[async_trait]
impl FallbackExtractor for LlmSlotExtractor {
    async fn extract(&self, utterance: &str, history: &[Turn]) -> wallet_support_core::Result<FallbackSlots> {
        Ok(self.run(utterance, history).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply() {
        let slots = parse_reply(
            r#"```json
            {"service": "rut_tien", "problem_type": "tra_soat", "issue_state": "failed",
             "bank": "VCB", "confidence_assessment": {"service_confidence": 0.9, "problem_confidence": 0.8}}
            ```"#,
        )
        .unwrap();
        assert_eq!(slots.service.as_deref(), Some("rut_tien"));
        assert_eq!(slots.state.as_deref(), Some("failed"));
        assert_eq!(slots.bank.as_deref(), Some("VCB"));
        assert_eq!(slots.service_confidence, 0.9);
        assert_eq!(slots.state_confidence, 0.0);
    }

    #[test]
    fn test_schema_violation() {
        let err = parse_reply(r#"{"service": 5, "problem_type": null}"#).unwrap_err();
        assert!(matches!(err, LlmError::SchemaViolation(_)));

        let err = parse_reply(r#"{"problem_type": "tra_soat"}"#).unwrap_err();
        assert!(matches!(err, LlmError::SchemaViolation(_)));
    }

    #[test]
    fn test_malformed_reply() {
        assert!(matches!(
            parse_reply("xin lỗi, tôi không hiểu").unwrap_err(),
            LlmError::InvalidResponse(_)
        ));
        assert!(matches!(
            parse_reply("{service: rut_tien}").unwrap_err(),
            LlmError::InvalidResponse(_)
        ));
    }
}
