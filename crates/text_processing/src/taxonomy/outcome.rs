//! User-visible symptoms

use super::{EntrySpec, Tier};

pub(super) const SPECS: &[EntrySpec] = &[
    EntrySpec {
        canonical_id: "UNKNOWN",
        slot_key: "unknown",
        display: "Không rõ",
        aliases: &["không rõ", "chưa biết", "unknown", "none"],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "NEED_INSTRUCTION",
        slot_key: "need_instruction",
        display: "Cần hướng dẫn",
        tier: Tier::Core,
        aliases: &[
            "cần hướng dẫn", "cần chỉ dẫn", "cần giúp đỡ", "hướng dẫn", "chỉ dẫn", "làm sao",
            "làm thế nào", "need instruction",
        ],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "MONEY_DEDUCTED",
        slot_key: "money_deducted",
        display: "Tiền đã bị trừ",
        tier: Tier::Core,
        aliases: &[
            "tiền đã bị trừ", "đã trừ tiền", "bị trừ tiền", "mất tiền", "trừ tiền", "money deducted",
            "ngân hàng đã trừ", "ngân hàng trừ", "ví đã bị trừ", "trừ 2 lần", "bị trừ 2 lần",
        ],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "MONEY_NOT_RECEIVED",
        slot_key: "money_not_received",
        display: "Chưa nhận được tiền/dịch vụ",
        tier: Tier::Core,
        aliases: &[
            "chưa nhận được tiền", "tiền chưa về", "không nhận được tiền", "chưa cộng tiền",
            "chưa nhận", "không thấy tiền", "chưa thấy tiền", "không có tiền", "money not received",
            "chưa nhận tiền", "chưa được cộng", "không nhận tiền",
        ],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "OTP_NOT_RECEIVED",
        slot_key: "otp_not_received",
        display: "Không nhận OTP",
        tier: Tier::Core,
        aliases: &[
            "không nhận otp", "otp không về", "chưa nhận otp", "otp không đến", "không có otp",
            "mã otp không về",
        ],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "CANNOT_CANCEL",
        slot_key: "cannot_cancel",
        display: "Không hủy được",
        tier: Tier::Core,
        aliases: &["không hủy được", "không thể hủy", "cannot cancel"],
        ..EntrySpec::EMPTY
    },
];
