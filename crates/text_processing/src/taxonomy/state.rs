//! Transaction status as displayed by the app

use super::{EntrySpec, Tier};

pub(super) const SPECS: &[EntrySpec] = &[
    EntrySpec {
        canonical_id: "UNKNOWN",
        slot_key: "unknown",
        display: "Không rõ trạng thái",
        aliases: &["không rõ", "chưa biết", "unknown", "không nói"],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "PENDING",
        slot_key: "pending",
        display: "Đang xử lý",
        tier: Tier::Core,
        // A bare "chờ" also appears in "chờ mãi không thấy tiền" and similar
        aliases: &["đang xử lý", "pending", "chờ xử lý", "đang chờ"],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "FAILED",
        slot_key: "failed",
        display: "Thất bại",
        tier: Tier::Core,
        aliases: &[
            "thất bại", "không thành công", "failed", "báo lỗi thất bại", "hiển thị thất bại",
            "không được", "không thực hiện được", "bị lỗi",
        ],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "SUCCESS",
        slot_key: "success",
        display: "Thành công",
        tier: Tier::Core,
        aliases: &[
            "thành công", "success", "đã thành công", "hoàn thành", "hiển thị thành công",
        ],
        ..EntrySpec::EMPTY
    },
];
