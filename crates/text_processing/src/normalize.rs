//! Text normalization
//!
//! [`normalize`] is the canonical form every other component compares
//! against: trimmed, lowercased, Vietnamese diacritics folded through a
//! fixed map (including `đ → d`) and whitespace collapsed.
//!
//! [`MatchText`] goes one step further for phrase matching: it keeps only
//! word tokens so that phrases match on word boundaries and punctuation
//! never blocks a hit.

use unicode_segmentation::UnicodeSegmentation;

/// Fold a lowercase Vietnamese character to its base letter
fn fold_char(c: char) -> Option<char> {
    let folded = match c {
        'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ằ' | 'ắ' | 'ẳ' | 'ẵ' | 'ặ' | 'â' | 'ầ' | 'ấ'
        | 'ẩ' | 'ẫ' | 'ậ' => 'a',
        'đ' => 'd',
        'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ề' | 'ế' | 'ể' | 'ễ' | 'ệ' => 'e',
        'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' => 'i',
        'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ồ' | 'ố' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ờ' | 'ớ'
        | 'ở' | 'ỡ' | 'ợ' => 'o',
        'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ừ' | 'ứ' | 'ử' | 'ữ' | 'ự' => 'u',
        'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' => 'y',
        // Combining marks left over from decomposed input
        '\u{0300}'..='\u{036F}' => return None,
        other => other,
    };
    Some(folded)
}

/// Normalize text for matching
///
/// Pure, total and idempotent.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .filter_map(fold_char)
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized text reduced to word tokens, for phrase containment checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchText {
    /// Tokens joined by single spaces, with a leading and trailing space
    padded: String,
}

impl MatchText {
    pub fn new(text: &str) -> Self {
        Self {
            padded: format!(" {} ", match_form(text)),
        }
    }

    /// Word-boundary containment of an already match-formed phrase
    pub fn contains(&self, phrase: &str) -> bool {
        if phrase.is_empty() {
            return false;
        }
        // Avoid the allocation when the phrase is absent anyway
        if !self.padded.contains(phrase) {
            return false;
        }
        self.padded.contains(&format!(" {} ", phrase))
    }

    pub fn contains_any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.contains(p))
    }

    /// Match-formed text without padding
    pub fn as_str(&self) -> &str {
        self.padded.trim()
    }

    pub fn word_count(&self) -> usize {
        self.as_str().split(' ').filter(|w| !w.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

/// Normalize and keep only word tokens
pub fn match_form(text: &str) -> String {
    normalize(text).unicode_words().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_vietnamese() {
        assert_eq!(
            normalize("  Tôi NẠP tiền   thất bại  "),
            "toi nap tien that bai"
        );
        assert_eq!(normalize("Đăng nhập"), "dang nhap");
        assert_eq!(normalize("Ngân hàng đã trừ tiền"), "ngan hang da tru tien");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Tôi nạp tiền thất bại nhưng ngân hàng đã trừ tiền",
            "OTP không về!!!",
            "\tLiên   kết\nVCB ",
            "",
            "ĐƯỜNG ưu đãi 500k",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_normalize_decomposed_input() {
        // "nạp" written with a combining dot below
        assert_eq!(normalize("na\u{0323}p"), "nap");
    }

    #[test]
    fn test_match_text_word_boundaries() {
        let text = MatchText::new("Xem phim có mất phí không?");
        assert!(text.contains("phi"));
        assert!(text.contains("mat phi"));
        assert!(text.contains("khong"));
        assert!(!text.contains("phi khong phi"));

        let text = MatchText::new("Tôi muốn xem phim");
        assert!(!text.contains("phi"));
    }

    #[test]
    fn test_match_text_ignores_punctuation() {
        let text = MatchText::new("Không nhận được OTP.");
        assert!(text.contains("otp"));
        assert!(text.contains("khong nhan duoc otp"));
        assert_eq!(text.word_count(), 4);
    }
}
