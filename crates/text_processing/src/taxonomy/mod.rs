//! Taxonomy registry
//!
//! Static catalogs mapping canonical concepts to slot keys, display names
//! and weighted phrase lists:
//! - [`services()`]: wallet services, split into core and platform tiers
//! - [`problems()`]: problem types
//! - [`states()`]: transaction states shown by the app
//! - [`outcomes()`]: user-visible symptoms
//! - [`BankCatalog`]: supported banks, loadable from a file
//!
//! Catalogs are built once on first use and never mutated. The lookup
//! index of each catalog is built lazily on the first lookup.

mod bank;
mod outcome;
mod problem;
mod service;
mod state;

pub use bank::{Bank, BankCatalog, BankCatalogError};

use once_cell::sync::{Lazy, OnceCell};
use serde::Serialize;
use std::collections::HashMap;

use crate::normalize::{match_form, normalize};

/// Which catalog an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyKind {
    Service,
    Problem,
    State,
    Outcome,
}

/// Entry tier used to discard platform concepts when a core action matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Concrete wallet actions (deposit, transfer, bill payment, ...)
    Core,
    /// Platform and meta concepts (account, app, identity, ...)
    Platform,
    Unranked,
}

/// Static definition of a taxonomy entry
///
/// Phrases may carry diacritics; they are normalized when the catalog is built.
#[derive(Debug, Clone, Copy)]
pub struct EntrySpec {
    pub canonical_id: &'static str,
    pub slot_key: &'static str,
    pub display: &'static str,
    pub priority: u8,
    pub tier: Tier,
    pub anchors: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub aliases: &'static [&'static str],
    pub negative_keywords: &'static [&'static str],
}

impl EntrySpec {
    pub const EMPTY: EntrySpec = EntrySpec {
        canonical_id: "",
        slot_key: "",
        display: "",
        priority: 99,
        tier: Tier::Unranked,
        anchors: &[],
        keywords: &[],
        aliases: &[],
        negative_keywords: &[],
    };
}

/// A match-formed phrase and its word count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Phrase {
    pub text: String,
    pub words: usize,
}

impl Phrase {
    fn new(raw: &str) -> Option<Self> {
        let text = match_form(raw);
        if text.is_empty() {
            return None;
        }
        let words = text.split(' ').count();
        Some(Self { text, words })
    }
}

/// Normalize and deduplicate a phrase list, preserving order
fn phrases(raw: &[&str]) -> Vec<Phrase> {
    let mut out: Vec<Phrase> = Vec::with_capacity(raw.len());
    for phrase in raw.iter().filter_map(|r| Phrase::new(r)) {
        if !out.iter().any(|p| p.text == phrase.text) {
            out.push(phrase);
        }
    }
    out
}

/// A catalog entry with normalized phrase lists
#[derive(Debug, Clone, Serialize)]
pub struct TaxonomyEntry {
    pub canonical_id: &'static str,
    pub slot_key: &'static str,
    pub display: &'static str,
    pub priority: u8,
    pub tier: Tier,
    pub anchors: Vec<Phrase>,
    pub keywords: Vec<Phrase>,
    pub aliases: Vec<Phrase>,
    pub negative_keywords: Vec<Phrase>,
}

impl From<&EntrySpec> for TaxonomyEntry {
    fn from(spec: &EntrySpec) -> Self {
        Self {
            canonical_id: spec.canonical_id,
            slot_key: spec.slot_key,
            display: spec.display,
            priority: spec.priority,
            tier: spec.tier,
            anchors: phrases(spec.anchors),
            keywords: phrases(spec.keywords),
            aliases: phrases(spec.aliases),
            negative_keywords: phrases(spec.negative_keywords),
        }
    }
}

#[derive(Debug, Default)]
struct TaxonomyIndex {
    by_slot: HashMap<String, usize>,
    by_display: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

/// An immutable catalog of entries with a lazily built lookup index
#[derive(Debug)]
pub struct Taxonomy {
    kind: TaxonomyKind,
    entries: Vec<TaxonomyEntry>,
    fallback_key: &'static str,
    index: OnceCell<TaxonomyIndex>,
}

impl Taxonomy {
    pub fn from_specs(kind: TaxonomyKind, specs: &[EntrySpec], fallback_key: &'static str) -> Self {
        Self {
            kind,
            entries: specs.iter().map(TaxonomyEntry::from).collect(),
            fallback_key,
            index: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> TaxonomyKind {
        self.kind
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    /// Slot key returned when nothing matched
    pub fn fallback_key(&self) -> &'static str {
        self.fallback_key
    }

    fn index(&self) -> &TaxonomyIndex {
        self.index.get_or_init(|| {
            let mut index = TaxonomyIndex::default();
            for (i, entry) in self.entries.iter().enumerate() {
                index.by_slot.entry(normalize(entry.slot_key)).or_insert(i);
                index.by_display.entry(normalize(entry.display)).or_insert(i);
                for alias in &entry.aliases {
                    index.by_alias.entry(alias.text.clone()).or_insert(i);
                }
            }
            index
        })
    }

    /// Resolve a slot key, display name or alias, in that order
    pub fn lookup(&self, key_or_alias: &str) -> Option<&TaxonomyEntry> {
        let index = self.index();
        let key = normalize(key_or_alias);
        index
            .by_slot
            .get(&key)
            .or_else(|| index.by_display.get(&key))
            .or_else(|| index.by_alias.get(&match_form(&key)))
            .map(|&i| &self.entries[i])
    }

    /// Canonical id for a slot key, display name or alias
    pub fn canonical_id(&self, key_or_alias: &str) -> Option<&'static str> {
        self.lookup(key_or_alias).map(|e| e.canonical_id)
    }

    /// Slot key for a slot key, display name or alias
    pub fn resolve(&self, key_or_alias: &str) -> Option<&'static str> {
        self.lookup(key_or_alias).map(|e| e.slot_key)
    }

    pub fn by_canonical_id(&self, canonical_id: &str) -> Option<&TaxonomyEntry> {
        self.entries.iter().find(|e| e.canonical_id == canonical_id)
    }

    pub fn to_slot_key(&self, canonical_id: &str) -> Option<&'static str> {
        self.by_canonical_id(canonical_id).map(|e| e.slot_key)
    }

    pub fn to_display(&self, canonical_id: &str) -> Option<&'static str> {
        self.by_canonical_id(canonical_id).map(|e| e.display)
    }

    /// Entry with exactly this slot key
    pub fn get(&self, slot_key: &str) -> Option<&TaxonomyEntry> {
        self.entries.iter().find(|e| e.slot_key == slot_key)
    }

    /// Whether the value is a registered slot key
    pub fn is_registered(&self, slot_key: &str) -> bool {
        self.get(slot_key).is_some()
    }

    pub fn slot_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.slot_key)
    }
}

static SERVICES: Lazy<Taxonomy> =
    Lazy::new(|| Taxonomy::from_specs(TaxonomyKind::Service, service::SPECS, "khac"));
static PROBLEMS: Lazy<Taxonomy> =
    Lazy::new(|| Taxonomy::from_specs(TaxonomyKind::Problem, problem::SPECS, "khac"));
static STATES: Lazy<Taxonomy> =
    Lazy::new(|| Taxonomy::from_specs(TaxonomyKind::State, state::SPECS, "unknown"));
static OUTCOMES: Lazy<Taxonomy> =
    Lazy::new(|| Taxonomy::from_specs(TaxonomyKind::Outcome, outcome::SPECS, "unknown"));

pub fn services() -> &'static Taxonomy {
    &SERVICES
}

pub fn problems() -> &'static Taxonomy {
    &PROBLEMS
}

pub fn states() -> &'static Taxonomy {
    &STATES
}

pub fn outcomes() -> &'static Taxonomy {
    &OUTCOMES
}

pub fn taxonomy(kind: TaxonomyKind) -> &'static Taxonomy {
    match kind {
        TaxonomyKind::Service => services(),
        TaxonomyKind::Problem => problems(),
        TaxonomyKind::State => states(),
        TaxonomyKind::Outcome => outcomes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_service_slot_keys() {
        let keys: HashSet<_> = services().slot_keys().collect();
        for key in [
            "nap_tien",
            "rut_tien",
            "chuyen_tien",
            "lien_ket_ngan_hang",
            "huy_lien_ket_ngan_hang",
            "nap_tien_dien_thoai",
            "vien_thong",
            "thanh_toan_hoa_don",
            "thanh_toan_dich_vu",
            "thanh_toan_khoan_vay",
            "hoa_don_vnpt",
            "ve_may_bay",
            "ve_tau",
            "ve_tham_quan",
            "sieu_tich_luy",
            "ctkm_voucher",
            "hcc_dvc",
            "tai_khoan_vi",
            "mobile_money",
            "ung_dung",
            "vnpt_pay",
            "thong_tin_chung",
            "xac_thuc_dinh_danh",
            "khac",
        ] {
            assert!(keys.contains(key), "missing service {}", key);
        }
        assert_eq!(keys.len(), 24);
    }

    #[test]
    fn test_slot_keys_and_ids_unique() {
        for kind in [
            TaxonomyKind::Service,
            TaxonomyKind::Problem,
            TaxonomyKind::State,
            TaxonomyKind::Outcome,
        ] {
            let tax = taxonomy(kind);
            let slots: HashSet<_> = tax.slot_keys().collect();
            let ids: HashSet<_> = tax.entries().iter().map(|e| e.canonical_id).collect();
            assert_eq!(slots.len(), tax.entries().len(), "{:?}", kind);
            assert_eq!(ids.len(), tax.entries().len(), "{:?}", kind);
            assert!(tax.is_registered(tax.fallback_key()), "{:?}", kind);
        }
    }

    #[test]
    fn test_lookup_priority() {
        // Slot key
        assert_eq!(services().canonical_id("nap_tien"), Some("TOPUP_WALLET"));
        // Display name, case and diacritic insensitive
        assert_eq!(services().canonical_id("RÚT TIỀN"), Some("WITHDRAW_WALLET"));
        // Alias
        assert_eq!(services().resolve("top up"), Some("nap_tien"));
        assert_eq!(problems().resolve("Tra soát"), Some("tra_soat"));
        assert_eq!(states().resolve("đang xử lý"), Some("pending"));
        assert_eq!(outcomes().resolve("money_deducted"), Some("money_deducted"));
        assert_eq!(services().resolve("không tồn tại"), None);
    }

    #[test]
    fn test_canonical_round_trip() {
        assert_eq!(problems().to_slot_key("INVESTIGATION"), Some("tra_soat"));
        assert_eq!(problems().to_display("INVESTIGATION"), Some("Tra soát"));
        assert_eq!(services().to_slot_key("NOPE"), None);
    }

    #[test]
    fn test_phrases_deduplicated_after_normalization() {
        let entry = services().get("nap_tien").unwrap();
        let aliases: Vec<_> = entry.aliases.iter().map(|p| p.text.as_str()).collect();
        let unique: HashSet<_> = aliases.iter().collect();
        assert_eq!(aliases.len(), unique.len());
        assert!(aliases.contains(&"nap tien"));
    }

    #[test]
    fn test_service_tiers() {
        assert_eq!(services().get("nap_tien").unwrap().tier, Tier::Core);
        assert_eq!(services().get("ve_may_bay").unwrap().tier, Tier::Core);
        assert_eq!(services().get("ung_dung").unwrap().tier, Tier::Platform);
        assert_eq!(services().get("khac").unwrap().tier, Tier::Unranked);
    }
}
