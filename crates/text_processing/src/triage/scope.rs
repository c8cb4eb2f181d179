//! Unsupported-service screen
//!
//! A keyword is out of scope when it occurs alone (empty modifier list) or
//! together with one of its modifiers, e.g. "đặt xe" but not "xe" alone.

use crate::normalize::MatchText;

struct ScopeRule {
    keyword: &'static str,
    modifiers: &'static [&'static str],
}

const RULES: &[ScopeRule] = &[
    // Food delivery
    ScopeRule { keyword: "do an", modifiers: &["goi", "dat", "giao", "mua"] },
    ScopeRule { keyword: "grab food", modifiers: &[] },
    ScopeRule { keyword: "shopee food", modifiers: &[] },
    ScopeRule { keyword: "now", modifiers: &["goi", "dat"] },
    // Ride hailing
    ScopeRule { keyword: "xe", modifiers: &["goi", "dat", "grab", "book"] },
    ScopeRule { keyword: "grab", modifiers: &["xe", "car", "bike"] },
    // E-commerce
    ScopeRule { keyword: "shopee", modifiers: &[] },
    ScopeRule { keyword: "lazada", modifiers: &[] },
    ScopeRule { keyword: "tiki", modifiers: &[] },
    ScopeRule { keyword: "sendo", modifiers: &[] },
    // Hotels and travel
    ScopeRule { keyword: "khach san", modifiers: &["dat", "book"] },
    ScopeRule { keyword: "phong", modifiers: &["dat"] },
    ScopeRule { keyword: "booking", modifiers: &[] },
    ScopeRule { keyword: "agoda", modifiers: &[] },
    // Restaurants
    ScopeRule { keyword: "nha hang", modifiers: &["dat ban", "book"] },
];

/// Reason string when the utterance asks for an unsupported service
pub fn detect_out_of_scope(text: &MatchText) -> Option<String> {
    for rule in RULES {
        if !text.contains(rule.keyword) {
            continue;
        }
        if rule.modifiers.is_empty() {
            return Some(format!("unsupported_service:{}", rule.keyword));
        }
        if let Some(modifier) = rule.modifiers.iter().find(|m| text.contains(m)) {
            return Some(format!("unsupported_service:{} {}", modifier, rule.keyword));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str) -> Option<String> {
        detect_out_of_scope(&MatchText::new(text))
    }

    #[test]
    fn test_keyword_with_modifier() {
        assert_eq!(check("Tôi muốn đặt xe về nhà").as_deref(), Some("unsupported_service:dat xe"));
        assert_eq!(check("gọi đồ ăn trưa").as_deref(), Some("unsupported_service:goi do an"));
        assert!(check("đặt bàn nhà hàng tối nay").is_some());
    }

    #[test]
    fn test_standalone_keyword() {
        assert_eq!(check("mua hàng shopee").as_deref(), Some("unsupported_service:shopee"));
    }

    #[test]
    fn test_in_scope_text() {
        assert!(check("nạp tiền vào ví thất bại").is_none());
        // "xe" without a booking verb
        assert!(check("thanh toán phí gửi xe").is_none());
        // "now" must be a whole word
        assert!(check("gọi tổng đài known issue").is_none());
    }
}
