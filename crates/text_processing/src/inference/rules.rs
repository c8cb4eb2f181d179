//! Default override tables
//!
//! Phrases are written in match form (folded, lowercase, single spaces).
//! Order matters: the first matching rule wins.

use super::{Condition, OverrideRule, ScoreBoost};

use super::Condition::{AllOf, AnyOf, GenericBelow, Phrases, ProblemIs};

pub const BIOMETRIC: &[&str] = &["sinh trac", "van tay", "face id", "khuon mat"];
pub const AUTH_CONTEXT: &[&str] = &["ngay sinh", "dinh danh", "xac thuc", "cccd", "cmnd"];
pub const AUTH_ERROR: &[&str] = &["loi", "bao", "khong hop le", "sai", "that bai"];
pub const TELECOM: &[&str] = &["ma the", "the cao", "goi cuoc", "data", "3g", "4g"];

pub const OTP: &[&str] = &["otp", "ma xac thuc", "xac thuc"];
pub const SYMPTOMS: &[&str] = &[
    "chua nhan",
    "khong nhan",
    "bi tru tien",
    "mat tien",
    "khong thay tien",
    "khong cong",
    "chua ve",
    "chua duoc",
    "chua toi",
    "khong thanh cong",
    "that bai",
    "pending",
    "chuyen nham",
    "chuyen sai",
    "gui nham",
];
pub const TRANSACTION_CONTEXT: &[&str] = &["tien", "giao dich", "thanh toan", "nap", "rut", "chuyen"];
pub const LINK_FAILURE: &[&str] = &["khong lien ket", "lien ket that bai", "loi lien ket"];
pub const INVALID_CARD: &[&str] = &[
    "thong tin the khong hop le",
    "thong tin tai khoan khong hop le",
    "the khong hop le",
    "tai khoan khong hop le",
    "thong tin khong hop le",
];
pub const DEDUCTED: &[&str] = &[
    "bi tru tien",
    "da tru tien",
    "ngan hang da tru",
    "mat tien",
    "tru oan",
    "da tru",
    "bi tru",
    "ngan hang tru",
];
pub const PENDING: &[&str] = &["dang xu ly", "cho xu ly", "pending"];
pub const FAILED: &[&str] = &["that bai", "khong thanh cong", "failed", "bao loi"];
pub const NOT_RECEIVED: &[&str] = &[
    "chua nhan duoc tien",
    "tien chua ve",
    "khong nhan duoc tien",
    "chua thay tien",
    "chua cong",
    "chua vao",
    "chua duoc cong",
];
pub const HOW_TO: &[&str] = &[
    "lam the nao",
    "nhu the nao",
    "cach",
    "lam sao",
    "thao tac",
    "huong dan",
    "chi dan",
    "phai lam gi",
];
pub const POLICY: &[&str] = &[
    "co duoc khong",
    "co the",
    "co cho phep",
    "dieu kien",
    "yeu cau",
    "han muc",
    "phi",
    "mat phi",
    "bao nhieu",
    "toi da",
    "toi thieu",
];
pub const STATE_FAILED: &[&str] = &[
    "khong duoc",
    "that bai",
    "bao loi",
    "khong thanh cong",
    "failed",
    "error",
    "khong the",
    "bi loi",
];

/// Generic scores at or above this are trusted over the how-to and policy rules
const STRONG_GENERIC: f32 = 8.0;

pub fn service_overrides() -> Vec<OverrideRule> {
    vec![
        OverrideRule {
            name: "biometric",
            when: Phrases(BIOMETRIC),
            value: "xac_thuc_dinh_danh",
            confidence: 0.85,
        },
        OverrideRule {
            name: "identity_error",
            when: AllOf(vec![Phrases(AUTH_CONTEXT), Phrases(AUTH_ERROR)]),
            value: "xac_thuc_dinh_danh",
            confidence: 0.85,
        },
    ]
}

pub fn service_boosts() -> Vec<ScoreBoost> {
    vec![ScoreBoost {
        name: "telecom_terms",
        target: "vien_thong",
        when: Phrases(TELECOM),
        factor: 2.0,
    }]
}

pub fn problem_overrides() -> Vec<OverrideRule> {
    vec![
        OverrideRule {
            name: "otp",
            when: Phrases(OTP),
            value: "loi_xac_thuc",
            confidence: 0.90,
        },
        OverrideRule {
            name: "transaction_symptom",
            when: AllOf(vec![Phrases(SYMPTOMS), Phrases(TRANSACTION_CONTEXT)]),
            value: "tra_soat",
            confidence: 0.85,
        },
        OverrideRule {
            name: "link_failure",
            when: Phrases(LINK_FAILURE),
            value: "loi_lien_ket",
            confidence: 0.90,
        },
        OverrideRule {
            name: "invalid_card_info",
            when: Phrases(INVALID_CARD),
            value: "loi_lien_ket",
            confidence: 0.85,
        },
        OverrideRule {
            name: "deducted_with_status",
            when: AllOf(vec![Phrases(DEDUCTED), AnyOf(vec![Phrases(PENDING), Phrases(FAILED)])]),
            value: "tra_soat",
            confidence: 0.90,
        },
        OverrideRule {
            name: "deducted",
            when: Phrases(DEDUCTED),
            value: "tra_soat",
            confidence: 0.85,
        },
        OverrideRule {
            name: "not_received",
            when: Phrases(NOT_RECEIVED),
            value: "tra_soat",
            confidence: 0.85,
        },
        OverrideRule {
            name: "how_to",
            when: AllOf(vec![GenericBelow(STRONG_GENERIC), Phrases(HOW_TO)]),
            value: "huong_dan",
            confidence: 0.75,
        },
        OverrideRule {
            name: "policy_question",
            when: AllOf(vec![GenericBelow(STRONG_GENERIC), Phrases(POLICY)]),
            value: "chinh_sach",
            confidence: 0.70,
        },
    ]
}

pub fn state_overrides() -> Vec<OverrideRule> {
    vec![OverrideRule {
        name: "failed_indicator",
        when: Phrases(STATE_FAILED),
        value: "failed",
        confidence: 0.85,
    }]
}

pub fn outcome_overrides() -> Vec<OverrideRule> {
    vec![
        OverrideRule {
            name: "instruction_request",
            when: ProblemIs("huong_dan"),
            value: "need_instruction",
            confidence: 0.80,
        },
        OverrideRule {
            name: "policy_question",
            when: ProblemIs("chinh_sach"),
            value: "unknown",
            confidence: 0.60,
        },
    ]
}
