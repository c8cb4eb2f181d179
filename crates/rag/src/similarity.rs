//! Lexical similarity between an utterance and a stored solution
//!
//! The base signal is a TF-IDF cosine over word 1-3 grams, with the two
//! texts as the whole corpus. On top of it:
//! - domain keyword clusters reward a cluster seen on both sides and
//!   penalize one seen only in the utterance
//! - action verbs present in the utterance but absent from the solution
//!   are penalized
//! - utterance bigrams and trigrams found verbatim in the solution add a
//!   phrase bonus
//!
//! The result is clamped to `[0, 2]`. All comparisons run on match-formed
//! text, so diacritics and punctuation never matter.

use std::collections::HashMap;

use wallet_support_text_processing::MatchText;

const MAX_SIMILARITY: f32 = 2.0;
const CLUSTER_BOOST: f32 = 1.0;
const CLUSTER_PENALTY: f32 = 0.6;
const ACTION_PENALTY: f32 = 0.3;
const BIGRAM_BOOST: f32 = 0.15;
const TRIGRAM_BOOST: f32 = 0.30;

/// Keyword clusters that must agree between utterance and solution
const CRITICAL_CLUSTERS: &[(&str, &[&str])] = &[
    ("otp", &["otp", "ma xac thuc", "xac thuc", "khong nhan duoc otp", "khong nhan otp"]),
    (
        "money_issue",
        &[
            "bi tru tien", "da tru tien", "mat tien", "chua nhan tien", "tien chua ve",
            "khong nhan duoc tien", "bi tru", "da bi tru", "ngan hang da tru", "vi da bi tru",
            "chua duoc cong", "khong duoc cong", "ngan hang tru", "tru roi", "bi tru 2 lan",
            "that bai nhung", "that bai ma", "da tru", "tru tien",
        ],
    ),
    (
        "duplicate_charge",
        &[
            "2 lan", "hai lan", "trung", "gach no 2 lan", "tru 2 lan", "bi tru 2 lan",
            "thanh toan 2 lan", "1 giao dich thanh cong va 1 giao dich dang xu ly",
        ],
    ),
    (
        "limit",
        &[
            "han muc", "qua han muc", "vuot han muc", "toi da", "toi thieu", "bao nhieu",
            "khong du so du", "so du khong du", "tai khoan khong du so du", "giao dich qua han muc",
        ],
    ),
    (
        "invalid",
        &[
            "khong hop le", "thong tin khong hop le", "the khong hop le", "tai khoan khong hop le",
            "ma the cao bi loi", "the bi loi", "sai thong tin", "thong tin sai",
        ],
    ),
    (
        "voucher",
        &[
            "voucher", "ma giam gia", "uu dai", "khong su dung duoc voucher", "voucher khong dung",
            "mat voucher", "bi mat voucher",
        ],
    ),
    (
        "history",
        &[
            "lich su", "xem giao dich", "tra cuu", "trong thang", "giao dich trong thang",
            "lich su giao dich", "xem lich su",
        ],
    ),
    ("code", &["ma the", "chua nhan ma", "ma khong ve", "khong nhan duoc ma the", "thong tin ma the"]),
    (
        "link_issue",
        &[
            "khong lien ket", "lien ket khong duoc", "khong the lien ket", "loi lien ket",
            "khong lien ket duoc", "lien ket that bai",
        ],
    ),
    ("transfer_error", &["chuyen nham", "chuyen sai", "nham tai khoan", "sai so tien", "chuyen nhom"]),
    ("condition", &["dieu kien", "yeu cau", "can gi", "phai co gi"]),
    ("transportation", &["ve tau", "ve may bay", "khach san", "dat ve", "tau hoa"]),
    (
        "status_processing",
        &[
            "dang xu ly", "dang cho xu ly", "dang cho", "trang thai dang xu ly", "bao dang xu ly",
            "hien thi dang xu ly", "giao dich dang xu ly",
        ],
    ),
    (
        "status_failed",
        &[
            "that bai", "khong thanh cong", "bi loi", "bao loi", "loi", "khong duoc",
            "khong su dung duoc", "khong nap duoc", "giao dich that bai", "nap that bai",
        ],
    ),
    ("status_success", &["thanh cong", "da thanh cong", "hoan thanh", "trang thai thanh cong"]),
    (
        "not_registered",
        &[
            "chua dang ky", "khong dang ky", "chua dang ky dich vu",
            "chua dang ky thanh toan truc tuyen", "chua dang ky sms banking",
            "tai khoan chua dang ky",
        ],
    ),
    (
        "not_received",
        &[
            "chua nhan", "khong nhan duoc", "chua duoc cong", "chua ve", "khong nhan duoc thong tin",
            "thuong huong chua nhan", "chua nhan duoc uu dai",
        ],
    ),
    (
        "mismatch",
        &[
            "khong trung khop", "khong trung", "so dien thoai khong trung khop",
            "khuon mat khong trung khop", "khong khop",
        ],
    ),
    ("verification", &["dinh danh", "sinh trac", "sinh trac hoc", "xac thuc khuon mat", "cccd", "cmnd"]),
    ("cancel_close", &["huy vi", "khoa tai khoan", "huy tai khoan", "khoa vi", "huy giao dich", "huy dich vu"]),
    ("password", &["mat khau", "quen mat khau", "lay lai mat khau", "doi mat khau", "thay doi mat khau"]),
    (
        "bill_payment",
        &[
            "thanh toan hoa don", "hoa don", "gach no", "chua gach no", "chua duoc gach no",
            "da thanh toan nhung chua gach no",
        ],
    ),
    ("package_service", &["goi cuoc", "mua goi cuoc", "goi mytv", "goi cuoc truyen hinh", "dang ky goi"]),
    ("card_reload", &["mua ma the", "nap dien thoai", "ma the cao", "mua the cao", "the dien thoai"]),
    ("not_work", &["khong su dung duoc", "khong hoat dong", "khong chay", "khong dung duoc"]),
    (
        "bank_errors",
        &[
            "giao dich qua han muc", "vuot qua so tien toi da", "tai khoan chua dang ky dich vu",
            "chua dang ky thanh toan truc tuyen", "tai khoan da duoc lien ket voi vi dien tu khac",
            "chua mo dich vu", "chua kich hoat",
        ],
    ),
    ("auto_service", &["tu dong", "nap tu dong", "dang ky tu dong", "huy tu dong"]),
    (
        "display_issue",
        &[
            "khong hien thi", "khong thay", "so du khong cap nhat", "khong cap nhat", "chua cap nhat",
            "hien thi sai", "sai so du", "so du chua", "chua duoc cap nhat", "khong duoc cap nhat",
            "so du khong",
        ],
    ),
    ("account_issue", &["khoa tai khoan", "mo khoa", "khoa vi", "dong vi", "huy vi"]),
    ("mytv", &["mytv", "goi cuoc mytv", "truyen hinh", "goi truyen hinh"]),
    ("reward", &["thuong", "uu dai", "hoan tien", "cashback", "tich diem"]),
    ("investigation", &["tra soat", "khieu nai", "xu ly", "giai quyet"]),
];

/// Verbs that change the meaning of a request when missing from the answer
// "ban" (sell) is left out: after diacritic folding it collides with "bạn" (you)
const ACTION_WORDS: &[&str] = &[
    "huy", "thanh toan", "dang ky", "xem", "mua", "tao", "xoa", "nap", "rut", "chuyen",
];

/// Phrases that pin down a specific problem when both sides carry them
const LEXICAL_ANCHORS: &[&str] = &[
    "khong nhan duoc otp",
    "khong nhan otp",
    "chua nhan otp",
    "bi tru tien",
    "da tru tien",
    "ngan hang da tru",
    "gach no 2 lan",
    "tru 2 lan",
    "thanh toan 2 lan",
    "qua han muc",
    "vuot han muc",
    "han muc",
    "dang xu ly",
    "trang thai dang xu ly",
    "chuyen nham",
    "chuyen sai",
    "chua dang ky sms banking",
    "chua dang ky thanh toan truc tuyen",
    "khong lien ket",
    "loi lien ket",
    "dinh danh",
    "sinh trac",
    "ekyc",
    "voucher",
    "ma giam gia",
    "the cao",
    "ma the",
];

/// Word 1-3 gram counts, ignoring single-character tokens
fn ngram_counts(text: &MatchText) -> HashMap<String, f32> {
    let words: Vec<&str> = text
        .as_str()
        .split(' ')
        .filter(|w| w.chars().count() > 1)
        .collect();

    let mut counts = HashMap::new();
    for n in 1..=3 {
        for window in words.windows(n) {
            *counts.entry(window.join(" ")).or_insert(0.0) += 1.0;
        }
    }
    counts
}

/// Cosine of smoothed TF-IDF vectors over a two-document corpus
fn tfidf_cosine(query: &HashMap<String, f32>, doc: &HashMap<String, f32>) -> f32 {
    if query.is_empty() || doc.is_empty() {
        return 0.0;
    }
    // idf = ln((1 + n) / (1 + df)) + 1 with n = 2
    let shared_idf = 1.0_f32;
    let single_idf = (1.5_f32).ln() + 1.0;

    let idf = |term: &str, other: &HashMap<String, f32>| {
        if other.contains_key(term) {
            shared_idf
        } else {
            single_idf
        }
    };

    let norm = |counts: &HashMap<String, f32>, other: &HashMap<String, f32>| {
        counts
            .iter()
            .map(|(term, tf)| (tf * idf(term, other)).powi(2))
            .sum::<f32>()
            .sqrt()
    };

    let dot: f32 = query
        .iter()
        .filter_map(|(term, tf)| doc.get(term).map(|dtf| tf * dtf * shared_idf * shared_idf))
        .sum();

    let denom = norm(query, doc) * norm(doc, query);
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

/// Precomputed utterance side of the similarity
///
/// Build once per request and compare against every candidate title and
/// content.
#[derive(Debug, Clone)]
pub struct QueryProfile {
    text: MatchText,
    ngrams: HashMap<String, f32>,
    clusters: Vec<&'static [&'static str]>,
    actions: Vec<&'static str>,
    bigrams: Vec<String>,
    trigrams: Vec<String>,
}

impl QueryProfile {
    pub fn new(query: &str) -> Self {
        let text = MatchText::new(query);
        let ngrams = ngram_counts(&text);

        let clusters = CRITICAL_CLUSTERS
            .iter()
            .filter(|(_, words)| text.contains_any(words))
            .map(|(_, words)| *words)
            .collect();
        let actions = ACTION_WORDS
            .iter()
            .copied()
            .filter(|a| text.contains(a))
            .collect();

        let words: Vec<&str> = text.as_str().split(' ').filter(|w| !w.is_empty()).collect();
        let bigrams = words.windows(2).map(|w| w.join(" ")).collect();
        let trigrams = words.windows(3).map(|w| w.join(" ")).collect();

        Self {
            text,
            ngrams,
            clusters,
            actions,
            bigrams,
            trigrams,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Similarity of a solution text to this utterance, in `[0, 2]`
    pub fn similarity(&self, doc: &str) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let doc = MatchText::new(doc);
        if doc.is_empty() {
            return 0.0;
        }

        let mut score = tfidf_cosine(&self.ngrams, &ngram_counts(&doc));

        for words in &self.clusters {
            if doc.contains_any(words) {
                score += CLUSTER_BOOST;
            } else {
                score -= CLUSTER_PENALTY;
            }
        }

        for action in &self.actions {
            if !doc.contains(action) {
                score -= ACTION_PENALTY;
            }
        }

        score += self.bigrams.iter().filter(|b| doc.contains(b)).count() as f32 * BIGRAM_BOOST;
        score += self.trigrams.iter().filter(|t| doc.contains(t)).count() as f32 * TRIGRAM_BOOST;

        score.clamp(0.0, MAX_SIMILARITY)
    }

    /// Number of lexical anchors present in both the utterance and `doc`
    pub fn anchors(&self, doc: &str) -> usize {
        let doc = MatchText::new(doc);
        LEXICAL_ANCHORS
            .iter()
            .filter(|a| self.text.contains(a) && doc.contains(a))
            .count()
    }
}

/// One-shot similarity of `doc` to `query`
pub fn text_similarity(query: &str, doc: &str) -> f32 {
    QueryProfile::new(query).similarity(doc)
}

/// One-shot lexical anchor count
pub fn lexical_anchors(query: &str, doc: &str) -> usize {
    QueryProfile::new(query).anchors(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs() {
        assert_eq!(text_similarity("", "nạp tiền"), 0.0);
        assert_eq!(text_similarity("nạp tiền", ""), 0.0);
        assert_eq!(text_similarity("?!", "nạp tiền"), 0.0);
    }

    #[test]
    fn test_identical_text_saturates() {
        let text = "Nạp tiền thất bại nhưng ngân hàng đã trừ tiền";
        assert_eq!(text_similarity(text, text), 2.0);
    }

    #[test]
    fn test_tfidf_cosine_bounds() {
        let a = ngram_counts(&MatchText::new("nap tien vao vi"));
        let b = ngram_counts(&MatchText::new("nap tien vao vi"));
        assert!((tfidf_cosine(&a, &b) - 1.0).abs() < 1e-5);

        let c = ngram_counts(&MatchText::new("doi mat khau"));
        assert_eq!(tfidf_cosine(&a, &c), 0.0);
    }

    #[test]
    fn test_relevant_beats_irrelevant() {
        let query = "Không nhận được OTP khi liên kết ngân hàng";
        let relevant = text_similarity(query, "Không nhận được mã OTP khi liên kết ngân hàng thì làm thế nào?");
        let irrelevant = text_similarity(query, "Hướng dẫn mua vé máy bay trên ứng dụng");
        assert!(relevant > irrelevant);
        assert!(relevant > 1.0);
    }

    #[test]
    fn test_missing_cluster_penalized() {
        // Same wording, but only one answer mentions the deducted money
        let query = "nạp tiền bị trừ tiền";
        let with_cluster = text_similarity(query, "nạp tiền bị trừ tiền nhưng ví chưa nhận");
        let without = text_similarity(query, "nạp tiền vào ví");
        assert!(with_cluster > without + 1.0);
    }

    #[test]
    fn test_action_word_penalty() {
        let profile = QueryProfile::new("mua sim số đẹp");
        assert_eq!(profile.actions, vec!["mua"]);
        let without_verb = profile.similarity("sim số đẹp");
        assert!(without_verb < 1.5);
        assert!(without_verb < profile.similarity("mua sim số đẹp"));
    }

    #[test]
    fn test_lexical_anchors() {
        assert_eq!(
            lexical_anchors(
                "Ngân hàng đã trừ tiền nhưng giao dịch đang xử lý",
                "Giao dịch đang xử lý nhưng ngân hàng đã trừ tiền"
            ),
            3
        );
        assert_eq!(lexical_anchors("quá hạn mức", "hướng dẫn nạp tiền"), 0);
    }
}
