//! Entity extraction
//!
//! Regex extractors for the free-form slots of a case:
//! - Amounts (`500k`, `1,5 triệu`, `100.000đ`) plus [`normalize_amount`]
//! - Relative or absolute time (`hôm qua`, `ngày 12/3`, `10 giờ`)
//! - Quoted or introduced error text (`"Giao dịch không hợp lệ"`, `lỗi ...`)
//! - Bank mentions, resolved through the [`BankCatalog`]
//!
//! Patterns run against the lowercased raw text so Vietnamese units keep
//! their diacritics; the first pattern that matches wins.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::normalize::{normalize, MatchText};
use crate::taxonomy::BankCatalog;

// Ordered most to least specific
static AMOUNT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\d+(?:[.,]\d+)?)\s*(?:triệu|tr|m)\b",
        r"(\d+(?:[.,]\d+)?)\s*(?:k|nghìn|ngàn)\b",
        r"(\d+(?:[.,]\d+)*)\s*(?:đồng|đ|vnd)\b",
        r"\d{1,3}(?:[.,]\d{3})+|\d{3,}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static TIME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"hôm\s+(?:nay|qua|kia)",
        r"ngày\s+\d{1,2}[/-]\d{1,2}(?:[/-]\d{2,4})?",
        r"\d{1,2}\s+giờ",
        r"tuần\s+(?:này|trước|sau)",
        r"tháng\s+(?:này|trước|sau)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static ERROR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#""([^"]+)""#,
        r"'([^']+)'",
        r"lỗi\s+([^.,;]+)",
        r"báo\s+([^.,;]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

// Runs on normalized text, so units are folded
static AMOUNT_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<num>[0-9]+(?:[.,][0-9]+)*)\s*(?:(?P<unit>k|nghin|ngan|canh|trieu|tr|cu|m|tyr|ty|ti|t)\b)?",
    )
    .unwrap()
});

/// Parse a Vietnamese amount expression into VND
///
/// `"500k"` → 500_000, `"1,5tr"` → 1_500_000, `"1.000.000đ"` → 1_000_000.
pub fn normalize_amount(text: &str) -> Option<u64> {
    let normalized = normalize(text);
    let caps = AMOUNT_VALUE.captures(&normalized)?;
    let num = caps.name("num")?.as_str();
    let unit = caps.name("unit").map(|m| m.as_str());

    let multiplier: f64 = match unit {
        Some("k" | "nghin" | "ngan" | "canh") => 1e3,
        Some("tr" | "trieu" | "cu" | "m") => 1e6,
        Some("ty" | "tyr" | "ti" | "t") => 1e9,
        _ => 1.0,
    };

    let separators = num.matches(&['.', ','][..]).count();
    let value: f64 = if unit.is_some() && separators == 1 {
        // "1,5tr": a single separator before a unit is a decimal point
        num.replace(',', ".").parse().ok()?
    } else {
        // "1.000.000": separators group thousands
        num.replace(&['.', ','][..], "").parse().ok()?
    };

    let amount = (value * multiplier).round();
    (amount.is_finite() && amount >= 0.0).then_some(amount as u64)
}

/// Entities found in one utterance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    /// Bank display name
    pub bank: Option<String>,
    pub bank_id: Option<String>,
    /// Amount as written by the user
    pub amount: Option<String>,
    pub time: Option<String>,
    pub error_message: Option<String>,
}

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.bank_id.is_none()
            && self.amount.is_none()
            && self.time.is_none()
            && self.error_message.is_none()
    }

    /// Amount in VND, when the written amount parses
    pub fn amount_vnd(&self) -> Option<u64> {
        self.amount.as_deref().and_then(normalize_amount)
    }
}

/// Regex and catalog based entity extractor
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    banks: Arc<BankCatalog>,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new(Arc::new(BankCatalog::default()))
    }
}

impl EntityExtractor {
    pub fn new(banks: Arc<BankCatalog>) -> Self {
        Self { banks }
    }

    pub fn banks(&self) -> &BankCatalog {
        &self.banks
    }

    pub fn extract(&self, text: &str, match_text: &MatchText) -> ExtractedEntities {
        let lower = text.to_lowercase();
        let bank = self.banks.find_in_text(match_text);

        ExtractedEntities {
            bank: bank.map(|b| b.name.clone()),
            bank_id: bank.map(|b| b.bank_id.clone()),
            amount: extract_amount(&lower),
            time: extract_time(&lower),
            error_message: extract_error_message(&lower),
        }
    }
}

fn extract_amount(lower: &str) -> Option<String> {
    AMOUNT_PATTERNS
        .iter()
        .find_map(|re| re.find(lower))
        .map(|m| m.as_str().trim().to_string())
}

fn extract_time(lower: &str) -> Option<String> {
    TIME_PATTERNS
        .iter()
        .find_map(|re| re.find(lower))
        .map(|m| m.as_str().to_string())
}

fn extract_error_message(lower: &str) -> Option<String> {
    ERROR_PATTERNS
        .iter()
        .find_map(|re| re.captures(lower))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
