use super::{EntrySpec, Tier};

pub(super) const SPECS: &[EntrySpec] = &[
    EntrySpec {
        canonical_id: "INSTRUCTION",
        slot_key: "huong_dan",
        display: "Hướng dẫn",
        tier: Tier::Core,
        aliases: &[
            "hướng dẫn", "cách", "làm sao", "thế nào", "như thế nào", "how to", "hướng dẫn giúp",
            "chỉ giúp", "hướng dẫn cách",
        ],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "POLICY",
        slot_key: "chinh_sach",
        display: "Chính sách",
        tier: Tier::Core,
        aliases: &[
            "chính sách", "quy định", "điều khoản", "phí", "biểu phí", "mức phí", "hạn mức quy định",
        ],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "OTHER",
        slot_key: "khac",
        display: "Khác",
        aliases: &["khác", "thông tin", "có không", "được không", "hỏi"],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "FAILED",
        slot_key: "that_bai",
        display: "Thất bại",
        tier: Tier::Core,
        aliases: &[
            "thất bại", "không thành công", "failed", "fail", "báo lỗi", "giao dịch lỗi",
        ],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "INVESTIGATION",
        slot_key: "tra_soat",
        display: "Tra soát",
        tier: Tier::Core,
        aliases: &[
            "tra soát", "tra cứu giao dịch", "kiểm tra giao dịch", "xác minh giao dịch",
            "soát giao dịch", "khiếu nại",
        ],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "LINK_ERROR",
        slot_key: "loi_lien_ket",
        display: "Lỗi liên kết",
        tier: Tier::Core,
        aliases: &[
            "lỗi liên kết", "không liên kết được", "liên kết thất bại", "không thể liên kết", "lỗi lknh",
        ],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "LIMIT_ERROR",
        slot_key: "loi_han_muc",
        display: "Lỗi hạn mức",
        tier: Tier::Core,
        aliases: &[
            "lỗi hạn mức", "vượt hạn mức", "quá hạn mức", "giao dịch quá hạn mức",
            "quá hạn mức giao dịch",
        ],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "BALANCE_ERROR",
        slot_key: "loi_so_du",
        display: "Lỗi số dư",
        tier: Tier::Core,
        aliases: &["lỗi số dư", "số dư sai", "không đủ số dư", "thiếu số dư"],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "DEVICE_ERROR",
        slot_key: "loi_thiet_bi",
        display: "Lỗi thiết bị",
        tier: Tier::Core,
        aliases: &["lỗi thiết bị", "thiết bị lỗi", "không hỗ trợ nfc", "nfc lỗi"],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "DISPLAY_ERROR",
        slot_key: "su_co_hien_thi",
        display: "Sự cố hiển thị",
        tier: Tier::Core,
        aliases: &[
            "sự cố hiển thị", "không hiển thị", "hiển thị sai", "không thấy", "không hiện",
        ],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "BANK_NOT_SUPPORTED",
        slot_key: "khong_ho_tro_ngan_hang",
        display: "Không hỗ trợ ngân hàng",
        tier: Tier::Core,
        aliases: &[
            "không hỗ trợ ngân hàng", "ngân hàng không hỗ trợ", "không có ngân hàng",
        ],
        ..EntrySpec::EMPTY
    },
    EntrySpec {
        canonical_id: "AUTH_ERROR",
        slot_key: "loi_xac_thuc",
        display: "Lỗi xác thực/OTP",
        tier: Tier::Core,
        aliases: &[
            "lỗi xác thực", "không nhận otp", "otp không về", "chưa nhận otp", "otp không đến",
            "không có otp", "mã otp", "mã xác thực", "tài khoản chưa đăng ký dịch vụ thanh toán",
            "chưa đăng ký dịch vụ thanh toán",
        ],
        ..EntrySpec::EMPTY
    },
];
