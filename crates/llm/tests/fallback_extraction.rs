//! Completion fallback wired into case triage with a scripted backend

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use wallet_support_core::{FallbackExtractor, InferenceMethod, Turn};
use wallet_support_llm::{
    FinishReason, GenerationResult, LlmBackend, LlmError, LlmSlotExtractor, Message, Role,
};
use wallet_support_text_processing::{BankCatalog, CaseTriage, TriageConfig};

struct ScriptedBackend {
    reply: Result<String, String>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedBackend {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        self.seen.lock().push(messages.to_vec());
        match &self.reply {
            Ok(text) => Ok(GenerationResult {
                text: text.clone(),
                tokens: 42,
                total_time_ms: 5,
                finish_reason: FinishReason::Stop,
            }),
            Err(message) => Err(LlmError::Api(message.clone())),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn triage_with(backend: Arc<ScriptedBackend>) -> CaseTriage {
    let extractor: Arc<dyn FallbackExtractor> = Arc::new(LlmSlotExtractor::new(backend).with_history_turns(2));
    CaseTriage::new(TriageConfig::default(), Arc::new(BankCatalog::default())).with_fallback(extractor)
}

#[tokio::test]
async fn test_fallback_fills_vague_utterance() {
    let backend = ScriptedBackend::replying(
        r#"{"service": "rut_tien", "problem_type": "tra_soat", "state": "failed", "outcome": "money_not_received",
            "bank": "Vietcombank", "amount": "2 triệu",
            "confidence_assessment": {"service_confidence": 0.9, "problem_confidence": 0.95,
                                      "state_confidence": 0.8, "outcome_confidence": 0.8}}"#,
    );
    let triage = triage_with(backend.clone());

    let history = vec![
        Turn::user("xin chào"),
        Turn::assistant("Mình có thể giúp gì?"),
        Turn::user("hôm qua mình rút tiền"),
    ];
    let slots = triage.extract("vẫn chưa thấy đâu cả", &history).await;

    assert_eq!(slots.inference_evidence.method, InferenceMethod::Hybrid);
    assert_eq!(slots.service.as_deref(), Some("rut_tien"));
    assert_eq!(slots.problem_type.as_deref(), Some("tra_soat"));
    assert_eq!(slots.bank_id.as_deref(), Some("VCB"));
    assert_eq!(slots.amount.as_deref(), Some("2 triệu"));
    assert!(slots.missing_slots.is_empty());

    // Only the last two turns reach the prompt
    let seen = backend.seen.lock();
    let messages = &seen[0];
    assert_eq!(messages[0].role, Role::System);
    assert!(!messages[1].content.contains("xin chào"));
    assert!(messages[1].content.contains("hôm qua mình rút tiền"));
}

#[tokio::test]
async fn test_backend_error_keeps_rule_slots() {
    let triage = triage_with(ScriptedBackend::failing("HTTP 401: invalid key"));
    let slots = triage.extract("rút tiền về BIDV", &[]).await;

    assert_eq!(slots.service.as_deref(), Some("rut_tien"));
    assert_eq!(slots.bank_id.as_deref(), Some("BIDV"));
    assert_eq!(slots.inference_evidence.method, InferenceMethod::RuleBased);
    assert!(slots
        .inference_evidence
        .fallback_error
        .as_deref()
        .unwrap()
        .contains("invalid key"));
}

#[tokio::test]
async fn test_unregistered_reply_values_are_ignored() {
    let backend = ScriptedBackend::replying(
        r#"{"service": "giao_do_an", "problem_type": "giao_hang_cham",
            "confidence_assessment": {"service_confidence": 0.99, "problem_confidence": 0.99}}"#,
    );
    let slots = triage_with(backend).extract("cho mình hỏi chút", &[]).await;

    assert_eq!(slots.service, None);
    assert_eq!(slots.problem_type, None);
    assert!(slots
        .inference_evidence
        .corrections
        .iter()
        .any(|n| n == "fallback_unresolved:service=giao_do_an"));
}
