//! Wallet service catalog

use super::{EntrySpec, Tier};

pub(super) const SPECS: &[EntrySpec] = &[
    EntrySpec {
        canonical_id: "TOPUP_WALLET",
        slot_key: "nap_tien",
        display: "Nạp tiền (ví)",
        priority: 1,
        tier: Tier::Core,
        anchors: &["nạp ví", "nạp vào ví", "nạp tiền vào ví", "nạp từ ngân hàng", "nạp tiền từ ngân hàng"],
        keywords: &["nạp tiền", "top up", "topup", "nạp"],
        aliases: &["nạp tiền", "top up", "topup", "nạp ví", "nạp vào ví"],
        negative_keywords: &[
            "tự động", "nạp tự động", "đơn hàng", "thuê bao", "điện thoại", "mã thẻ", "thẻ cào",
            "gói cước", "data", "voucher", "khuyến mại",
        ],
    },
    EntrySpec {
        canonical_id: "WITHDRAW_WALLET",
        slot_key: "rut_tien",
        display: "Rút tiền",
        priority: 1,
        tier: Tier::Core,
        anchors: &["rút tiền", "rút về ngân hàng", "rút về tk", "rút về tài khoản"],
        keywords: &["rút tiền", "withdraw", "rút"],
        aliases: &["rút", "rút tiền", "withdraw", "rút về ngân hàng", "rút ví"],
        negative_keywords: &["chuyển tiền", "chuyển khoản", "nạp tiền"],
    },
    EntrySpec {
        canonical_id: "TRANSFER_INTERNAL",
        slot_key: "chuyen_tien",
        display: "Chuyển tiền",
        priority: 1,
        tier: Tier::Core,
        anchors: &["chuyển tiền", "chuyển khoản", "gửi tiền", "chuyển cho", "chuyển tới"],
        keywords: &["chuyển tiền", "chuyển khoản", "gửi tiền", "transfer"],
        aliases: &["chuyển", "chuyển tiền", "chuyển khoản", "transfer", "gửi tiền", "chuyển cho bạn"],
        negative_keywords: &["rút tiền", "nạp tiền", "thuê bao", "mã thẻ"],
    },
    EntrySpec {
        canonical_id: "BANK_LINK",
        slot_key: "lien_ket_ngan_hang",
        display: "Liên kết ngân hàng",
        priority: 1,
        tier: Tier::Core,
        anchors: &["liên kết ngân hàng", "kết nối ngân hàng", "lknh", "lk nh"],
        keywords: &["liên kết ngân hàng", "kết nối ngân hàng", "thêm ngân hàng", "link bank"],
        aliases: &[
            "liên kết ngân hàng", "liên kết", "kết nối", "lk nh", "lknh", "link bank",
            "liên kết bank", "thêm ngân hàng",
        ],
        negative_keywords: &[],
    },
    EntrySpec {
        canonical_id: "BANK_UNLINK",
        slot_key: "huy_lien_ket_ngan_hang",
        display: "Hủy liên kết ngân hàng",
        priority: 1,
        tier: Tier::Core,
        anchors: &[
            "hủy liên kết", "bỏ liên kết", "xóa liên kết", "gỡ liên kết", "hủy liên kết ngân hàng",
            "hủy kết nối",
        ],
        keywords: &["hủy liên kết", "bỏ liên kết", "xóa liên kết", "unlink"],
        aliases: &[
            "hủy liên kết", "bỏ liên kết", "xóa liên kết", "gỡ liên kết", "unlink", "hủy kết nối",
            "bỏ kết nối",
        ],
        negative_keywords: &[],
    },
    EntrySpec {
        canonical_id: "FLIGHT_TICKET",
        slot_key: "ve_may_bay",
        display: "Vé máy bay",
        priority: 2,
        tier: Tier::Core,
        anchors: &["vé máy bay", "chuyến bay", "hãng bay", "đặt chỗ"],
        keywords: &["vé máy bay", "máy bay", "chuyến bay", "hãng bay", "đổi vé", "hủy vé", "đặt chỗ"],
        aliases: &[
            "vé máy bay", "máy bay", "chuyến bay", "vé mb", "đặt vé máy bay", "mua vé máy bay",
            "đặt chỗ máy bay", "kiểm tra đặt chỗ",
        ],
        negative_keywords: &[],
    },
    EntrySpec {
        canonical_id: "TRAIN_TICKET",
        slot_key: "ve_tau",
        display: "Vé tàu",
        priority: 2,
        tier: Tier::Core,
        anchors: &["vé tàu", "tàu hỏa"],
        keywords: &["vé tàu", "tàu hỏa", "đổi vé tàu", "hủy vé tàu", "mua vé tàu"],
        aliases: &["vé tàu", "tàu hỏa", "vé tàu hỏa", "đặt vé tàu"],
        negative_keywords: &[],
    },
    EntrySpec {
        canonical_id: "TICKET",
        slot_key: "ve_tham_quan",
        display: "Vé tham quan",
        priority: 3,
        tier: Tier::Core,
        anchors: &["vé tham quan", "vé vào cổng", "tham quan", "khu du lịch"],
        keywords: &["vé tham quan", "vào cổng", "khu du lịch"],
        aliases: &["vé tham quan", "vé vào cổng", "tham quan", "khu du lịch"],
        negative_keywords: &[],
    },
    EntrySpec {
        canonical_id: "BILL_PAYMENT",
        slot_key: "thanh_toan_hoa_don",
        display: "Thanh toán hóa đơn",
        priority: 2,
        tier: Tier::Core,
        anchors: &["tiền điện", "tiền nước", "hóa đơn", "hóa đơn cước", "cước trả sau", "cước trả trước"],
        keywords: &[
            "thanh toán hóa đơn", "hóa đơn", "tiền điện", "tiền nước", "cước internet",
            "hóa đơn cước", "cước trả trước", "cước trả sau",
        ],
        aliases: &[
            "thanh toán hóa đơn", "hóa đơn", "bill", "tiền điện", "tiền nước", "cước internet",
            "hóa đơn cước", "cước trả trước", "cước trả sau", "hóa đơn vnpt",
        ],
        negative_keywords: &["khoản vay", "trả nợ", "thanh toán khoản vay"],
    },
    EntrySpec {
        canonical_id: "LOAN_PAYMENT",
        slot_key: "thanh_toan_khoan_vay",
        display: "Thanh toán khoản vay",
        priority: 2,
        tier: Tier::Core,
        anchors: &["khoản vay", "thanh toán khoản vay", "trả nợ"],
        keywords: &["khoản vay", "trả nợ", "thanh toán khoản vay"],
        aliases: &["thanh toán khoản vay", "trả nợ", "khoản vay"],
        negative_keywords: &[],
    },
    EntrySpec {
        canonical_id: "SERVICE_PAYMENT",
        slot_key: "thanh_toan_dich_vu",
        display: "Thanh toán dịch vụ",
        priority: 10,
        tier: Tier::Core,
        anchors: &["thanh toán dịch vụ"],
        keywords: &["thanh toán dịch vụ"],
        aliases: &["thanh toán dịch vụ"],
        negative_keywords: &[
            "hóa đơn", "tiền điện", "tiền nước", "mytv", "truyền hình", "tv", "khoản vay", "trả nợ",
        ],
    },
    EntrySpec {
        canonical_id: "GOVERNMENT_SERVICE",
        slot_key: "hcc_dvc",
        display: "Dịch vụ công/Hành chính công",
        priority: 3,
        tier: Tier::Core,
        // Bare "thuế"/"phí" stay keywords: as anchors they would outrank any
        // fee question about another service
        anchors: &["dịch vụ công", "hành chính công", "dvcqg", "bhyt", "bhxh", "bảo hiểm"],
        keywords: &["dịch vụ công", "hành chính công", "dvcqg", "thuế", "phí", "bảo hiểm", "bhyt", "bhxh", "gia hạn"],
        aliases: &[
            "dịch vụ công", "hành chính công", "hcc dvc", "dvcqg", "thuế", "phí", "bảo hiểm",
            "bhyt", "bhxh", "bảo hiểm y tế", "bảo hiểm xã hội", "gia hạn bảo hiểm",
        ],
        negative_keywords: &["tích lũy", "siêu tích lũy"],
    },
    EntrySpec {
        canonical_id: "TELECOM_SERVICE",
        slot_key: "vien_thong",
        display: "Dịch vụ viễn thông",
        priority: 3,
        tier: Tier::Core,
        anchors: &["mã thẻ", "thẻ cào", "gói cước", "gói data"],
        keywords: &["mua mã thẻ", "mã thẻ cào", "thẻ cào", "gói cước", "data 3g", "data 4g", "gói data", "nạp data"],
        aliases: &["viễn thông", "mã thẻ", "thẻ cào", "gói cước", "data", "3g", "4g", "gói data"],
        negative_keywords: &["thuê bao", "nạp điện thoại", "nạp tiền điện thoại"],
    },
    EntrySpec {
        canonical_id: "PHONE_TOPUP",
        slot_key: "nap_tien_dien_thoai",
        display: "Nạp tiền điện thoại",
        priority: 2,
        tier: Tier::Core,
        anchors: &["nạp điện thoại", "nạp tiền điện thoại", "nạp thuê bao", "vào thuê bao"],
        keywords: &["nạp điện thoại", "nạp tiền điện thoại", "nạp thuê bao", "topup điện thoại", "tiền vào thuê bao"],
        aliases: &["nạp tiền điện thoại", "nạp đt", "nạp thuê bao", "topup điện thoại"],
        negative_keywords: &["mã thẻ", "thẻ cào", "gói cước"],
    },
    EntrySpec {
        canonical_id: "INVESTMENT",
        slot_key: "sieu_tich_luy",
        display: "Siêu tích lũy",
        priority: 3,
        tier: Tier::Core,
        anchors: &["siêu tích lũy", "tích lũy tự động"],
        keywords: &["siêu tích lũy", "tích lũy", "tiết kiệm", "gửi tiết kiệm", "chu kỳ"],
        aliases: &["siêu tích lũy", "tích lũy", "đầu tư", "tích lũy tự động"],
        negative_keywords: &[],
    },
    EntrySpec {
        canonical_id: "PROMO_VOUCHER",
        slot_key: "ctkm_voucher",
        display: "Khuyến mại/Voucher",
        priority: 3,
        tier: Tier::Core,
        anchors: &["voucher", "khuyến mại", "ưu đãi", "hoàn tiền", "cashback"],
        keywords: &["voucher", "khuyến mại", "ưu đãi", "mã giảm giá", "hoàn tiền", "cashback"],
        aliases: &[
            "voucher", "khuyến mại", "ưu đãi", "giảm giá", "quà tặng", "ctkm", "ctkm voucher",
            "chương trình khuyến mại", "hoàn tiền", "cashback",
        ],
        negative_keywords: &[],
    },
    EntrySpec {
        canonical_id: "APP_USAGE",
        slot_key: "ung_dung",
        display: "Sử dụng ứng dụng",
        priority: 5,
        tier: Tier::Platform,
        anchors: &["lỗi app", "không vào được", "đăng nhập", "đăng ký"],
        keywords: &["đăng nhập", "đăng ký", "lỗi app", "không vào được", "không đăng nhập được"],
        aliases: &["ứng dụng", "app", "đăng nhập", "đăng ký", "lỗi app", "không vào được"],
        negative_keywords: &[
            "mobile money", "vnpt pay", "mytv", "sinh trắc", "face id", "vân tay", "định danh", "ekyc",
        ],
    },
    EntrySpec {
        canonical_id: "WALLET_ACCOUNT",
        slot_key: "tai_khoan_vi",
        display: "Tài khoản ví",
        priority: 3,
        tier: Tier::Platform,
        anchors: &[
            "hủy ví", "khóa tài khoản", "mở khóa", "đổi mật khẩu", "quên mật khẩu", "lấy lại mật khẩu",
            "số dư",
        ],
        keywords: &["tài khoản ví", "thông tin ví", "số dư", "khóa", "mở khóa", "hủy ví", "đổi mật khẩu", "quên mật khẩu"],
        aliases: &[
            "tài khoản ví", "thông tin tài khoản", "mở khóa tài khoản", "khóa tài khoản", "hủy ví",
            "đổi mật khẩu", "lấy lại mật khẩu", "quên mật khẩu", "số dư",
        ],
        negative_keywords: &["mobile money", "tk mobile money"],
    },
    EntrySpec {
        canonical_id: "MOBILE_MONEY",
        slot_key: "mobile_money",
        display: "Mobile Money",
        priority: 2,
        tier: Tier::Platform,
        anchors: &["mobile money", "tk mobile money", "tài khoản mobile money", "ví mobile money"],
        keywords: &["mobile money", "đăng ký mobile money", "hủy mobile money", "mở khóa mobile money"],
        aliases: &[
            "mobile money", "ví mobile money", "tài khoản mobile money", "tk mobile money",
            "đăng ký mobile money", "hủy mobile money", "mở khóa mobile money",
        ],
        negative_keywords: &[],
    },
    EntrySpec {
        canonical_id: "IDENTITY_VERIFICATION",
        slot_key: "xac_thuc_dinh_danh",
        display: "Xác thực định danh (eKYC)",
        priority: 2,
        tier: Tier::Platform,
        anchors: &[
            "ekyc", "định danh", "cccd", "cmnd", "hộ chiếu", "xác thực định danh", "sinh trắc",
            "vân tay", "face id", "khuôn mặt",
        ],
        keywords: &["định danh", "ekyc", "xác thực", "cccd", "cmnd", "hộ chiếu", "sinh trắc học", "vân tay", "face id"],
        aliases: &[
            "xác thực định danh", "định danh", "ekyc", "cccd", "cmnd", "hộ chiếu", "sinh trắc học",
            "sinh trắc", "vân tay", "face id", "khuôn mặt",
        ],
        negative_keywords: &[],
    },
    EntrySpec {
        canonical_id: "VNPT_PAY",
        slot_key: "vnpt_pay",
        display: "VNPT Pay",
        priority: 2,
        tier: Tier::Platform,
        anchors: &["vnpt pay", "ví vnpt pay"],
        keywords: &["vnpt pay"],
        aliases: &["vnpt pay", "ví vnpt pay"],
        negative_keywords: &[],
    },
    EntrySpec {
        canonical_id: "VNPT_ORDER",
        slot_key: "hoa_don_vnpt",
        display: "Hóa đơn VNPT / Nạp tự động",
        priority: 2,
        tier: Tier::Core,
        anchors: &["nạp tiền tự động", "nạp tự động", "đơn hàng", "mytv", "gói cước mytv"],
        keywords: &["đơn hàng", "nạp tiền tự động", "nạp tự động", "hủy nạp tiền tự động", "đặt dịch vụ nạp", "mua gói mytv"],
        aliases: &[
            "hóa đơn vnpt", "đơn hàng", "nạp tiền tự động", "nạp tự động",
            "đặt dịch vụ nạp tiền tự động", "hủy nạp tiền tự động", "gói cước mytv",
        ],
        negative_keywords: &[],
    },
    EntrySpec {
        canonical_id: "THONG_TIN_CHUNG",
        slot_key: "thong_tin_chung",
        display: "Thông tin chung",
        priority: 50,
        tier: Tier::Platform,
        anchors: &["thông tin chung"],
        keywords: &["thông tin chung"],
        aliases: &["thông tin chung"],
        negative_keywords: &[],
    },
    EntrySpec {
        canonical_id: "OTHER_SERVICE",
        slot_key: "khac",
        display: "Dịch vụ khác",
        aliases: &["khác", "other"],
        ..EntrySpec::EMPTY
    },
];
