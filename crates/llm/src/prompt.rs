//! Prompt construction for slot extraction
//!
//! The system prompt lists the registered slot keys so the completion
//! service answers in the same vocabulary the rules use. The user prompt
//! carries the utterance and a few recent turns.

use serde::{Deserialize, Serialize};
use std::fmt;
use wallet_support_core::{Turn, TurnRole};
use wallet_support_text_processing::{outcomes, problems, services, states, Taxonomy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TurnRole> for Role {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => Role::User,
            TurnRole::Assistant => Role::Assistant,
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

fn key_list(taxonomy: &Taxonomy) -> String {
    taxonomy
        .entries()
        .iter()
        .map(|e| format!("- {} ({})", e.slot_key, e.display))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fixed system prompt for slot extraction
pub fn system_prompt() -> String {
    format!(
        r#"Bạn là hệ thống trích xuất thông tin cho bộ phận chăm sóc khách hàng ví điện tử VNPT Money. Luôn trả về đúng một đối tượng JSON.

Chỉ dùng các giá trị sau (snake_case, không dấu). Nếu không chắc chắn, trả về null.

service:
{services}

problem_type:
{problems}

state (chỉ khi người dùng nói rõ trạng thái giao dịch):
{states}

outcome (triệu chứng người dùng gặp phải):
{outcomes}

Nếu người dùng hỏi về dịch vụ ví không hỗ trợ (gọi đồ ăn, gọi xe, mua sắm online, đặt phòng khách sạn) thì service = null và service_confidence = 0.

Định dạng trả về:
{{
  "service": string | null,
  "problem_type": string | null,
  "state": string | null,
  "outcome": string | null,
  "bank": string | null,
  "amount": string | null,
  "time": string | null,
  "error_message": string | null,
  "confidence_assessment": {{
    "service_confidence": số từ 0.0 đến 1.0,
    "problem_confidence": số từ 0.0 đến 1.0,
    "state_confidence": số từ 0.0 đến 1.0,
    "outcome_confidence": số từ 0.0 đến 1.0
  }}
}}

Ví dụ: "Giao dịch báo đang xử lý nhưng ngân hàng đã trừ tiền"
-> {{"service": null, "problem_type": "tra_soat", "state": "pending", "outcome": "money_deducted", "bank": null, "amount": null, "time": null, "error_message": null, "confidence_assessment": {{"service_confidence": 0.0, "problem_confidence": 0.9, "state_confidence": 0.9, "outcome_confidence": 0.9}}}}

Chỉ trả về JSON."#,
        services = key_list(services()),
        problems = key_list(problems()),
        states = key_list(states()),
        outcomes = key_list(outcomes()),
    )
}

/// Builds the message list for one extraction call
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    messages: Vec<Message>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system_prompt(mut self) -> Self {
        self.messages.push(Message::system(system_prompt()));
        self
    }

    /// Render recent turns as context inside a single user message
    pub fn with_history(mut self, history: &[Turn]) -> Self {
        if history.is_empty() {
            return self;
        }
        let rendered = history
            .iter()
            .map(|turn| format!("{}: {}", Role::from(turn.role), turn.content.trim()))
            .collect::<Vec<_>>()
            .join("\n");
        self.messages
            .push(Message::user(format!("Lịch sử hội thoại gần đây:\n{}", rendered)));
        self
    }

    pub fn utterance(mut self, utterance: &str) -> Self {
        self.messages.push(Message::user(format!(
            "Trích xuất thông tin từ câu hỏi của người dùng: \"{}\"",
            utterance.trim()
        )));
        self
    }

    pub fn build(self) -> Vec<Message> {
        self.messages
    }
}

/// Extract the JSON object from a reply, tolerating code fences and prose
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_lists_slot_keys() {
        let prompt = system_prompt();
        assert!(prompt.contains("- nap_tien (Nạp tiền (ví))"));
        assert!(prompt.contains("tra_soat"));
        assert!(prompt.contains("money_deducted"));
    }

    #[test]
    fn test_prompt_builder() {
        let history = vec![Turn::user("rút tiền bị lỗi"), Turn::assistant("Bạn dùng ngân hàng nào?")];
        let messages = PromptBuilder::new()
            .system_prompt()
            .with_history(&history)
            .utterance("  vietcombank ")
            .build();

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[1].content.contains("assistant: Bạn dùng ngân hàng nào?"));
        assert!(messages[2].content.ends_with("\"vietcombank\""));
    }

    #[test]
    fn test_empty_history_adds_nothing() {
        let messages = PromptBuilder::new().system_prompt().with_history(&[]).utterance("x").build();
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_extract_json() {
        assert_eq!(extract_json("```json\n{\"a\": 1}\n```"), Some("{\"a\": 1}"));
        assert_eq!(extract_json("no json here"), None);
        assert_eq!(extract_json("} {"), None);
    }
}
