//! Clarifying questions derived from incomplete case slots

use wallet_support_core::{CaseSlots, SlotName};

use crate::normalize::MatchText;

/// Slots below this confidence are asked about again
pub const LOW_CONFIDENCE: f32 = 0.6;

const SERVICE_QUESTION: &str =
    "Bạn đang gặp vấn đề với dịch vụ nào? (Nạp tiền / Rút tiền / Chuyển tiền / Liên kết ngân hàng / Thanh toán / Ứng dụng)";
const PROBLEM_QUESTION: &str =
    "Vấn đề cụ thể là gì? (Bị trừ tiền / Chưa nhận dịch vụ / Không nhận OTP / Giao dịch thất bại / Đang xử lý / Chưa nhận được tiền)";
const BANK_QUESTION: &str =
    "Bạn đang thực hiện với ngân hàng nào? (Ví dụ: Vietcombank, BIDV, Techcombank...)";
const AMOUNT_QUESTION: &str = "Số tiền giao dịch là bao nhiêu? (Ví dụ: 500k, 1 triệu)";
const TIME_QUESTION: &str = "Giao dịch xảy ra lúc nào? (Hôm nay / Hôm qua / Ngày cụ thể)";
const ERROR_QUESTION: &str =
    "Có vẻ như có lỗi xảy ra. Vui lòng cung cấp thêm thông tin lỗi nếu có.";
const CONTRADICTION_PREFIX: &str = "Có vẻ thông tin đang mâu thuẫn. Hãy xác nhận lại giúp mình: ";
const GENERIC_QUESTION: &str =
    "Bạn có thể mô tả chi tiết hơn vấn đề đang gặp phải không? (Dịch vụ, thời gian, số tiền, thông báo lỗi...)";

const AMOUNT_SERVICES: &[&str] = &["rut_tien", "chuyen_tien"];
const ERROR_WORDS: &[&str] = &["loi", "khong duoc", "bi loi", "gap su co"];

fn uncertain(value: &Option<String>, confidence: f32) -> bool {
    value.is_none() || confidence < LOW_CONFIDENCE
}

/// Questions for the slots a case still needs, in asking order
pub fn clarifying_questions(slots: &CaseSlots) -> Vec<String> {
    let mut questions = Vec::new();

    if uncertain(&slots.service, slots.service_confidence) {
        questions.push(SERVICE_QUESTION.to_string());
    }
    if uncertain(&slots.problem_type, slots.problem_confidence) {
        questions.push(PROBLEM_QUESTION.to_string());
    }
    if slots.missing_slots.contains(&SlotName::Bank) {
        questions.push(BANK_QUESTION.to_string());
    }

    let service = slots.service.as_deref();
    if slots.amount.is_none() && service.map_or(false, |s| AMOUNT_SERVICES.contains(&s)) {
        questions.push(AMOUNT_QUESTION.to_string());
    }
    if slots.time.is_none() && slots.problem_type.as_deref() == Some("tra_soat") {
        questions.push(TIME_QUESTION.to_string());
    }

    if slots.error_message.is_none() {
        let failed = slots.state.as_deref() == Some("failed");
        if failed || MatchText::new(&slots.raw_narrative).contains_any(ERROR_WORDS) {
            questions.push(ERROR_QUESTION.to_string());
        }
    }

    if !slots.contradictions.is_empty() {
        questions.push(format!("{}{}", CONTRADICTION_PREFIX, slots.contradictions.join("; ")));
    }

    if questions.is_empty() {
        questions.push(GENERIC_QUESTION.to_string());
    }
    questions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vague_case_asks_service_and_problem() {
        let slots = CaseSlots {
            raw_narrative: "cho mình hỏi chút".into(),
            missing_slots: vec![SlotName::Service, SlotName::ProblemType],
            ..Default::default()
        };
        let questions = clarifying_questions(&slots);
        assert_eq!(questions, vec![SERVICE_QUESTION.to_string(), PROBLEM_QUESTION.to_string()]);
    }

    #[test]
    fn test_withdrawal_investigation_questions() {
        let slots = CaseSlots {
            service: Some("rut_tien".into()),
            service_confidence: 0.9,
            problem_type: Some("tra_soat".into()),
            problem_confidence: 0.85,
            state: Some("failed".into()),
            raw_narrative: "rút tiền thất bại".into(),
            missing_slots: vec![SlotName::Bank],
            ..Default::default()
        };
        let questions = clarifying_questions(&slots);
        assert_eq!(
            questions,
            vec![
                BANK_QUESTION.to_string(),
                AMOUNT_QUESTION.to_string(),
                TIME_QUESTION.to_string(),
                ERROR_QUESTION.to_string(),
            ]
        );
    }

    #[test]
    fn test_low_confidence_service_is_asked_again() {
        let slots = CaseSlots {
            service: Some("thanh_toan".into()),
            service_confidence: 0.45,
            problem_type: Some("huong_dan".into()),
            problem_confidence: 0.8,
            ..Default::default()
        };
        assert_eq!(clarifying_questions(&slots), vec![SERVICE_QUESTION.to_string()]);
    }

    #[test]
    fn test_contradiction_and_generic() {
        let slots = CaseSlots {
            service: Some("chuyen_tien".into()),
            service_confidence: 0.9,
            problem_type: Some("that_bai".into()),
            problem_confidence: 0.8,
            amount: Some("1 triệu".into()),
            contradictions: vec!["transaction_status=success mâu thuẫn với problem_type=that_bai".into()],
            ..Default::default()
        };
        let questions = clarifying_questions(&slots);
        assert_eq!(questions.len(), 1);
        assert!(questions[0].starts_with(CONTRADICTION_PREFIX));

        let complete = CaseSlots {
            contradictions: Vec::new(),
            ..slots
        };
        assert_eq!(clarifying_questions(&complete), vec![GENERIC_QUESTION.to_string()]);
    }
}
