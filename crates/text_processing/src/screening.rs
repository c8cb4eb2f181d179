//! Query screening
//!
//! Raises the flags the decision layer exits early on:
//! - `need_account_lookup`: the user asks about their own transactions,
//!   which only an agent with account access can answer
//! - `out_of_domain`: the question is about another bank's or wallet's own
//!   services, small talk, weather or the clock
//!
//! Wallet context ("liên kết", "vnpt money", "rút tiền về", ...) always
//! wins over an external-service mention.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use wallet_support_core::QueryFlags;

use crate::normalize::{match_form, MatchText};

const ACCOUNT_LOOKUP: &[&str] = &[
    "kiểm tra giao dịch",
    "xem giao dịch",
    "tiền của tôi",
    "giao dịch của tôi",
    "tra cứu",
    "đã chuyển chưa",
    "đã nhận chưa",
];

const WALLET_CONTEXT: &[&str] = &[
    "liên kết",
    "qua vnpt",
    "trên vnpt",
    "bằng vnpt",
    "vnpt money",
    "mobile money",
    "ví điện tử vnpt",
    "vnpt pay",
    "chuyển tiền từ",
    "chuyển tiền về",
    "nạp tiền từ",
    "rút tiền về",
    "thanh toán qua vnpt",
    "thanh toán bằng vnpt",
];

const EXTERNAL_SERVICES: &[&str] = &[
    "của mb", "của vietcombank", "của vcb", "của techcombank", "của tcb",
    "của bidv", "của vietinbank", "của vpbank", "của acb", "của tpbank",
    "của sacombank", "của momo", "của zalopay", "của shopee",
    "bên mb", "bên vietcombank", "bên vcb", "bên techcombank", "bên bidv",
    "bên momo", "bên zalopay", "bên shopee",
    "trên mb", "trên vietcombank", "trên vcb", "trên momo", "trên zalopay",
    "app mb", "app vcb", "app vietcombank", "app techcombank", "app bidv",
    "app momo", "app zalopay", "ứng dụng mb", "ứng dụng vcb",
    "chuyển tiền trên mb", "chuyển tiền trên vcb", "chuyển tiền trên momo",
];

const EXTERNAL_PROVIDERS: &[&str] = &[
    "mb bank", "mbbank", "mb", "vietcombank", "vcb", "techcombank", "tcb",
    "bidv", "vietinbank", "ctg", "vpbank", "vp bank", "acb", "tpbank",
    "sacombank", "scb", "shb", "msb", "hdbank", "ocb", "seabank",
    "eximbank", "nam a bank", "bac a bank", "pvcombank", "vib",
    "agribank", "lienvietpostbank", "lpb", "ncb", "abbank", "baoviet bank",
    "momo", "zalopay", "shopee pay", "shopeepay", "airpay", "grabpay",
    "vietnam airlines", "vietjet", "bamboo airways",
];

const WEATHER: &[&str] = &["thời tiết", "dự báo thời tiết", "trời mưa", "trời nắng"];
const CLOCK: &[&str] = &["mấy giờ", "bây giờ là", "thời gian hiện tại"];
const TRANSACTION: &[&str] = &["giao dịch"];

fn match_forms(phrases: &[&str]) -> Vec<String> {
    phrases.iter().map(|p| match_form(p)).collect()
}

static ACCOUNT_LOOKUP_FORMS: Lazy<Vec<String>> = Lazy::new(|| match_forms(ACCOUNT_LOOKUP));
static WALLET_CONTEXT_FORMS: Lazy<Vec<String>> = Lazy::new(|| match_forms(WALLET_CONTEXT));
static EXTERNAL_SERVICE_FORMS: Lazy<Vec<String>> = Lazy::new(|| match_forms(EXTERNAL_SERVICES));
static EXTERNAL_OWNER_FORMS: Lazy<Vec<(String, String)>> = Lazy::new(|| {
    EXTERNAL_PROVIDERS
        .iter()
        .flat_map(|p| {
            let form = match_form(p);
            [
                (format!("cua {}", form), form.clone()),
                (format!("ben {}", form), form),
            ]
        })
        .collect()
});
static WEATHER_FORMS: Lazy<Vec<String>> = Lazy::new(|| match_forms(WEATHER));
static CLOCK_FORMS: Lazy<Vec<String>> = Lazy::new(|| match_forms(CLOCK));
static TRANSACTION_FORMS: Lazy<Vec<String>> = Lazy::new(|| match_forms(TRANSACTION));

static GREETING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:xin chao|chao|hello|hi|hey|yo)(?: (?:ban|ad|admin|shop))?$").unwrap());

fn first_hit<'a>(text: &MatchText, phrases: &'a [String]) -> Option<&'a str> {
    phrases.iter().map(String::as_str).find(|p| text.contains(p))
}

/// Screens raw utterances before the decision layer
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryScreener;

impl QueryScreener {
    pub fn new() -> Self {
        Self
    }

    pub fn screen(&self, utterance: &str) -> QueryFlags {
        let text = MatchText::new(utterance);
        let out_of_domain_reason = self.out_of_domain(&text);
        let need_account_lookup =
            out_of_domain_reason.is_none() && first_hit(&text, &ACCOUNT_LOOKUP_FORMS).is_some();

        if let Some(reason) = &out_of_domain_reason {
            debug!(reason = %reason, "Query is out of domain");
        }

        QueryFlags {
            need_account_lookup,
            out_of_domain: out_of_domain_reason.is_some(),
            out_of_domain_reason,
        }
    }

    fn out_of_domain(&self, text: &MatchText) -> Option<String> {
        if text.is_empty() {
            return None;
        }
        if GREETING.is_match(text.as_str()) {
            return Some("greeting".to_string());
        }
        if first_hit(text, &WALLET_CONTEXT_FORMS).is_some() {
            return None;
        }
        if let Some(pattern) = first_hit(text, &EXTERNAL_SERVICE_FORMS) {
            return Some(format!("external_service:{}", pattern));
        }
        if let Some((_, provider)) = EXTERNAL_OWNER_FORMS.iter().find(|(p, _)| text.contains(p)) {
            return Some(format!("external_provider:{}", provider));
        }
        if first_hit(text, &WEATHER_FORMS).is_some() {
            return Some("weather".to_string());
        }
        if first_hit(text, &CLOCK_FORMS).is_some() && first_hit(text, &TRANSACTION_FORMS).is_none() {
            return Some("time_query".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(text: &str) -> QueryFlags {
        QueryScreener::new().screen(text)
    }

    #[test]
    fn test_account_lookup() {
        let flags = screen("Kiểm tra giao dịch của tôi hôm qua");
        assert!(flags.need_account_lookup);
        assert!(!flags.out_of_domain);
    }

    #[test]
    fn test_external_service_is_out_of_domain() {
        let flags = screen("Hình thức thanh toán của MB là gì?");
        assert!(flags.out_of_domain);
        assert_eq!(flags.out_of_domain_reason.as_deref(), Some("external_service:cua mb"));

        let flags = screen("phí chuyển tiền bên Sacombank bao nhiêu");
        assert_eq!(flags.out_of_domain_reason.as_deref(), Some("external_provider:sacombank"));
    }

    #[test]
    fn test_wallet_context_wins() {
        let flags = screen("Liên kết ví với tài khoản của MB bị lỗi");
        assert!(!flags.out_of_domain);
        let flags = screen("Rút tiền về Vietcombank chưa nhận được");
        assert!(!flags.out_of_domain);
    }

    #[test]
    fn test_small_talk() {
        assert_eq!(screen("Xin chào!").out_of_domain_reason.as_deref(), Some("greeting"));
        assert_eq!(
            screen("Hôm nay thời tiết thế nào?").out_of_domain_reason.as_deref(),
            Some("weather")
        );
        assert_eq!(screen("bây giờ là mấy giờ").out_of_domain_reason.as_deref(), Some("time_query"));
        // Clock words about a transaction stay in domain
        assert!(!screen("giao dịch lúc mấy giờ thì được hoàn").out_of_domain);
        // "mua" is not rain
        assert!(!screen("mua thẻ điện thoại bị lỗi").out_of_domain);
    }

    #[test]
    fn test_regular_question() {
        assert_eq!(screen("nạp tiền bị trừ tiền nhưng ví không cộng"), QueryFlags::default());
    }
}
