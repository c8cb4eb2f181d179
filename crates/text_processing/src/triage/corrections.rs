//! Post-processing corrections
//!
//! Fixes recurring mislabels after rules and fallback have been merged.
//! Rules run in a fixed order and later rules see the result of earlier
//! ones. Each rule that changes a slot records its name.

use wallet_support_core::CaseSlots;

use crate::normalize::MatchText;

/// Floor applied to the problem confidence when a correction changes it
pub const CORRECTION_CONFIDENCE: f32 = 0.75;

const ERROR_WORDS: &[&str] = &[
    "loi", "van de", "su co", "that bai", "khong duoc", "bi tru", "chua nhan", "tra soat",
];
const NAVIGATION: &[&str] = &["vao muc nao", "vao dau", "o dau"];
const CHECK_VERBS: &[&str] = &["xem", "kiem tra"];
const HOW_PHRASES: &[&str] = &["nhu the nao", "the nao"];
const HOW_TO: &[&str] = &["lam sao", "the nao", "huong dan", "chi tiet", "thu tuc", "cach de"];
const FEE_QUESTION: &[&str] = &[
    "co mat phi", "mat phi hay khong", "mat phi khong", "co phi khong",
];
const LIMIT: &[&str] = &["han muc"];
const EXCEEDED: &[&str] = &["qua", "vuot"];
const CAN: &[&str] = &["co the"];
const YES_NO: &[&str] = &["hay khong", "duoc khong", "duoc bao nhieu"];
const ON_BEHALF: &[&str] = &["ho"];
const CONDITIONS: &[&str] = &["dieu kien", "yeu cau"];
const COMPARISON: &[&str] = &["co diem gi", "khac gi", "hon"];
const WHY: &[&str] = &["tai sao", "vi sao"];
const SYSTEM_ERROR: &[&str] = &["he thong bao", "bao loi"];
const DEVICE: &[&str] = &["thiet bi", "nfc", "khong ho tro"];
const STATE_MENTIONS: &[&str] = &[
    "dang xu ly", "that bai", "thanh cong", "trang thai", "hien thi", "bao", "loi",
];
const DEDUCTED: &[&str] = &["bi tru", "da tru", "ngan hang tru"];
const FAILURE: &[&str] = &["that bai", "bi loi"];
const WRONG_RECIPIENT: &[&str] = &[
    "chuyen tien nham", "tien nham", "chuyen nham", "nham tai khoan", "sai tai khoan", "chuyen sai",
];
const MONEY_DEDUCTED: &[&str] = &["da tru tien", "bi tru tien", "tru tien"];
const DEBT_OPEN: &[&str] = &["van con no", "chua gach no", "khong gach no", "chua duoc gach no"];
const WAITING: &[&str] = &["dang cho xu ly", "dang cho", "dang xu ly", "cho xu ly"];
const WAITING_DEDUCTED: &[&str] = &["bi tru", "da tru", "tru tien"];
const LIMIT_EXCEEDED: &[&str] = &["qua han muc", "vuot han muc", "vuot qua han muc"];
const OTP_MISSING: &[&str] = &[
    "khong nhan otp", "khong nhan duoc otp", "chua nhan otp", "otp khong ve",
];
const NOT_REGISTERED: &[&str] = &["chua dang ky", "chua mo dich vu", "chua kich hoat", "khong dang ky"];
const ONLINE_PAYMENT: &[&str] = &["sms", "thanh toan truc tuyen"];
const CANCEL_REFUND: &[&str] = &["huy giao dich", "hoan tien", "hoan lai", "muon huy"];
const DISPLAY: &[&str] = &["khong hien thi", "khong thay", "so du khong cap nhat", "chua cap nhat"];

fn problem_is(slots: &CaseSlots, value: &str) -> bool {
    slots.problem_type.as_deref() == Some(value)
}

/// No problem type, or only the catch-all
fn problem_unset(slots: &CaseSlots) -> bool {
    matches!(slots.problem_type.as_deref(), None | Some("khac"))
}

fn state_is(slots: &CaseSlots, value: &str) -> bool {
    slots.state.as_deref() == Some(value)
}

fn set_problem(slots: &mut CaseSlots, applied: &mut Vec<&'static str>, rule: &'static str, value: &str) {
    if problem_is(slots, value) {
        return;
    }
    slots.problem_type = Some(value.to_string());
    slots.problem_confidence = slots.problem_confidence.max(CORRECTION_CONFIDENCE);
    applied.push(rule);
}

/// Apply all corrections in order, returning the names of rules that changed a slot
pub fn apply(text: &MatchText, slots: &mut CaseSlots) -> Vec<&'static str> {
    let mut applied = Vec::new();
    let has = |phrases: &[&str]| text.contains_any(phrases);
    let has_error = has(ERROR_WORDS);

    // How-to phrasing
    if has(NAVIGATION) {
        if !has_error {
            set_problem(slots, &mut applied, "navigation_question", "huong_dan");
        }
    } else if has(CHECK_VERBS) && has(HOW_PHRASES) {
        if !has_error {
            set_problem(slots, &mut applied, "check_how_to", "huong_dan");
        }
    } else if problem_unset(slots) && has(HOW_TO) && !has_error {
        set_problem(slots, &mut applied, "how_to", "huong_dan");
    }

    // Fees and limits
    if problem_unset(slots) {
        if has(FEE_QUESTION) {
            set_problem(slots, &mut applied, "fee_question", "chinh_sach");
        } else if has(LIMIT) && !has(EXCEEDED) {
            set_problem(slots, &mut applied, "limit_question", "chinh_sach");
        }
    }

    // Conditions, "có thể ... không" and comparisons
    if problem_unset(slots) || problem_is(slots, "huong_dan") {
        if has(CAN) {
            if has(YES_NO) || has(ON_BEHALF) {
                set_problem(slots, &mut applied, "permission_question", "chinh_sach");
            }
        } else if has(CONDITIONS) {
            set_problem(slots, &mut applied, "condition_question", "chinh_sach");
        } else if has(COMPARISON) {
            set_problem(slots, &mut applied, "comparison_question", "chinh_sach");
        }
    }

    if problem_is(slots, "loi_lien_ket") && has(WHY) {
        set_problem(slots, &mut applied, "why_link_fails", "chinh_sach");
    }

    if problem_is(slots, "chinh_sach") && has(SYSTEM_ERROR) && has(DEVICE) {
        set_problem(slots, &mut applied, "device_unsupported", "loi_thiet_bi");
    }

    // A state is kept only when the user talks about it
    if slots.state.as_deref().map(|s| s != "unknown").unwrap_or(false) && !has(STATE_MENTIONS) {
        slots.state = Some("unknown".to_string());
        slots.state_confidence = 0.0;
        applied.push("state_not_mentioned");
    }

    if (state_is(slots, "failed") || state_is(slots, "pending")) && has(DEDUCTED) {
        set_problem(slots, &mut applied, "status_with_deduction", "tra_soat");
    }

    if has(FAILURE) && has(DEDUCTED) {
        set_problem(slots, &mut applied, "failure_with_deduction", "tra_soat");
    }

    if has(WRONG_RECIPIENT) {
        set_problem(slots, &mut applied, "wrong_recipient", "tra_soat");
    }

    if has(MONEY_DEDUCTED) && has(DEBT_OPEN) {
        set_problem(slots, &mut applied, "debt_not_cleared", "tra_soat");
    }

    if has(WAITING) && has(WAITING_DEDUCTED) {
        set_problem(slots, &mut applied, "pending_with_deduction", "tra_soat");
    }

    let specific = ["tra_soat", "su_co_hien_thi", "loi_xac_thuc"];
    let is_specific = slots
        .problem_type
        .as_deref()
        .map(|p| specific.contains(&p))
        .unwrap_or(false);
    if !is_specific && has(LIMIT_EXCEEDED) {
        set_problem(slots, &mut applied, "limit_exceeded", "loi_han_muc");
    }

    if has(OTP_MISSING) {
        set_problem(slots, &mut applied, "otp_not_received", "loi_xac_thuc");
    }

    if has(NOT_REGISTERED) && has(ONLINE_PAYMENT) {
        set_problem(slots, &mut applied, "online_payment_not_registered", "loi_xac_thuc");
    }

    if !problem_is(slots, "huong_dan") && has(CANCEL_REFUND) {
        set_problem(slots, &mut applied, "cancel_or_refund", "chinh_sach");
    }

    if has(DISPLAY) && state_is(slots, "success") {
        set_problem(slots, &mut applied, "display_mismatch", "su_co_hien_thi");
    }

    applied
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(problem: &str, state: &str) -> CaseSlots {
        CaseSlots {
            problem_type: Some(problem.to_string()),
            state: Some(state.to_string()),
            problem_confidence: 0.2,
            ..Default::default()
        }
    }

    fn run(text: &str, slots: &mut CaseSlots) -> Vec<&'static str> {
        apply(&MatchText::new(text), slots)
    }

    #[test]
    fn test_navigation_becomes_how_to() {
        let mut s = slots("khac", "unknown");
        let applied = run("Xem lịch sử giao dịch ở đâu", &mut s);
        assert_eq!(s.problem_type.as_deref(), Some("huong_dan"));
        assert_eq!(applied, vec!["navigation_question"]);
        assert!((s.problem_confidence - CORRECTION_CONFIDENCE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_navigation_with_error_is_left_alone() {
        let mut s = slots("khac", "unknown");
        run("nạp tiền ở đâu mà bị lỗi", &mut s);
        assert_ne!(s.problem_type.as_deref(), Some("huong_dan"));
    }

    #[test]
    fn test_fee_question() {
        let mut s = slots("khac", "unknown");
        run("rút tiền có mất phí không", &mut s);
        assert_eq!(s.problem_type.as_deref(), Some("chinh_sach"));
    }

    #[test]
    fn test_limit_question_vs_exceeded() {
        let mut s = slots("khac", "unknown");
        run("hạn mức chuyển tiền một ngày", &mut s);
        assert_eq!(s.problem_type.as_deref(), Some("chinh_sach"));

        let mut s = slots("khac", "unknown");
        run("chuyển tiền báo vượt hạn mức", &mut s);
        assert_eq!(s.problem_type.as_deref(), Some("loi_han_muc"));
    }

    #[test]
    fn test_why_link_fails_is_policy() {
        let mut s = slots("loi_lien_ket", "unknown");
        run("tại sao không liên kết được thẻ", &mut s);
        assert_eq!(s.problem_type.as_deref(), Some("chinh_sach"));
    }

    #[test]
    fn test_unmentioned_state_reset() {
        let mut s = slots("tra_soat", "failed");
        s.state_confidence = 0.85;
        let applied = run("chuyển tiền không được", &mut s);
        assert_eq!(s.state.as_deref(), Some("unknown"));
        assert_eq!(s.state_confidence, 0.0);
        assert!(applied.contains(&"state_not_mentioned"));
    }

    #[test]
    fn test_failed_with_deduction() {
        let mut s = slots("that_bai", "failed");
        run("Tôi nạp tiền thất bại nhưng ngân hàng đã trừ tiền", &mut s);
        assert_eq!(s.problem_type.as_deref(), Some("tra_soat"));
        assert_eq!(s.state.as_deref(), Some("failed"));
    }

    #[test]
    fn test_otp_and_refund() {
        let mut s = slots("khac", "unknown");
        run("không nhận được otp khi thanh toán", &mut s);
        assert_eq!(s.problem_type.as_deref(), Some("loi_xac_thuc"));

        let mut s = slots("khac", "unknown");
        run("tôi muốn hủy giao dịch vừa rồi", &mut s);
        assert_eq!(s.problem_type.as_deref(), Some("chinh_sach"));
    }

    #[test]
    fn test_display_mismatch() {
        let mut s = slots("tra_soat", "success");
        run("giao dịch hiển thị thành công nhưng số dư không cập nhật", &mut s);
        assert_eq!(s.problem_type.as_deref(), Some("su_co_hien_thi"));
    }

    #[test]
    fn test_unchanged_value_is_not_recorded() {
        let mut s = slots("tra_soat", "unknown");
        let applied = run("chuyển nhầm tài khoản", &mut s);
        assert!(applied.is_empty());
    }
}
