//! Bank catalog
//!
//! Unlike the other catalogs, banks are data: the list of partner banks
//! changes independently of the code, so it can be loaded from a JSON or
//! YAML file. A built-in default list is used when no file is configured.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::normalize::{match_form, normalize, MatchText};

#[derive(Error, Debug)]
pub enum BankCatalogError {
    #[error("Failed to read bank catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse bank catalog: {0}")]
    Parse(String),

    #[error("Bank catalog is empty")]
    Empty,
}

impl From<BankCatalogError> for wallet_support_core::Error {
    fn from(err: BankCatalogError) -> Self {
        wallet_support_core::Error::Config(err.to_string())
    }
}

/// A partner bank as stored in the catalog file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub bank_id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default = "default_supported")]
    pub supported: bool,
}

fn default_supported() -> bool {
    true
}

impl Bank {
    fn new(bank_id: &str, name: &str, aliases: &[&str]) -> Self {
        Self {
            bank_id: bank_id.to_string(),
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            supported: true,
        }
    }
}

/// Immutable bank lookup built once from a list of banks
#[derive(Debug, Clone)]
pub struct BankCatalog {
    banks: Vec<Bank>,
    by_code: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
    /// Match-formed alias and bank index, longest alias first
    scan_order: Vec<(String, usize)>,
}

impl BankCatalog {
    pub fn new(banks: Vec<Bank>) -> Result<Self, BankCatalogError> {
        let banks: Vec<Bank> = banks
            .into_iter()
            .filter(|b| !b.bank_id.trim().is_empty() && !b.name.trim().is_empty())
            .collect();
        if banks.is_empty() {
            return Err(BankCatalogError::Empty);
        }

        let mut by_code = HashMap::new();
        let mut by_name = HashMap::new();
        let mut by_alias = HashMap::new();
        let mut scan_order = Vec::new();

        for (i, bank) in banks.iter().enumerate() {
            by_code.entry(normalize(&bank.bank_id)).or_insert(i);
            by_name.entry(normalize(&bank.name)).or_insert(i);

            let phrases = bank
                .aliases
                .iter()
                .map(String::as_str)
                .chain([bank.bank_id.as_str(), bank.name.as_str()]);
            for phrase in phrases {
                let form = match_form(phrase);
                if form.is_empty() {
                    continue;
                }
                if by_alias.contains_key(&form) {
                    continue;
                }
                by_alias.insert(form.clone(), i);
                scan_order.push((form, i));
            }
        }

        scan_order.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Ok(Self {
            banks,
            by_code,
            by_name,
            by_alias,
            scan_order,
        })
    }

    /// Load from a JSON or YAML file, chosen by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BankCatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| BankCatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let banks: Vec<Bank> = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&raw).map_err(|e| BankCatalogError::Parse(e.to_string()))?
            }
            _ => serde_json::from_str(&raw).map_err(|e| BankCatalogError::Parse(e.to_string()))?,
        };

        tracing::debug!(path = %path.display(), banks = banks.len(), "Loaded bank catalog");
        Self::new(banks)
    }

    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    /// Resolve a code, display name or alias to the bank id
    pub fn from_any(&self, text: &str) -> Option<&str> {
        let key = normalize(text);
        self.by_code
            .get(&key)
            .or_else(|| self.by_name.get(&key))
            .or_else(|| self.by_alias.get(&match_form(&key)))
            .map(|&i| self.banks[i].bank_id.as_str())
    }

    pub fn get(&self, bank_id: &str) -> Option<&Bank> {
        self.banks.iter().find(|b| b.bank_id == bank_id)
    }

    pub fn contains(&self, bank_id: &str) -> bool {
        self.get(bank_id).is_some()
    }

    pub fn to_display(&self, bank_id: &str) -> Option<&str> {
        self.get(bank_id).map(|b| b.name.as_str())
    }

    /// Unknown banks are treated as supported
    pub fn is_supported(&self, bank_id: &str) -> bool {
        self.get(bank_id).map(|b| b.supported).unwrap_or(true)
    }

    /// First bank mentioned in the text, preferring the longest alias
    pub fn find_in_text(&self, text: &MatchText) -> Option<&Bank> {
        self.scan_order
            .iter()
            .find(|(alias, _)| text.contains(alias))
            .map(|&(_, i)| &self.banks[i])
    }
}

impl Default for BankCatalog {
    fn default() -> Self {
        let banks = vec![
            Bank::new("VCB", "Vietcombank", &["vcb", "vietcom", "ngoại thương"]),
            Bank::new("BIDV", "BIDV", &["đầu tư và phát triển"]),
            Bank::new("CTG", "VietinBank", &["vietin", "viettinbank", "công thương"]),
            Bank::new("AGRIBANK", "Agribank", &["agri", "nông nghiệp"]),
            Bank::new("TCB", "Techcombank", &["techcom", "tcb"]),
            Bank::new("MB", "MBBank", &["mb bank", "ngân hàng quân đội", "mbb"]),
            Bank::new("ACB", "ACB", &["á châu"]),
            Bank::new("VPB", "VPBank", &["vp bank", "vpb"]),
            Bank::new("TPB", "TPBank", &["tp bank", "tiên phong"]),
            Bank::new("STB", "Sacombank", &["sacom", "stb"]),
            Bank::new("VIB", "VIB", &[]),
            Bank::new("SHB", "SHB", &["sài gòn hà nội"]),
            Bank::new("HDB", "HDBank", &["hd bank", "hdb"]),
            Bank::new("MSB", "MSB", &["maritime", "hàng hải"]),
            Bank::new("OCB", "OCB", &["phương đông"]),
            Bank::new("SCB", "SCB", &[]),
            Bank::new("SEAB", "SeABank", &["sea bank", "đông nam á"]),
            Bank::new("EIB", "Eximbank", &["exim"]),
            Bank::new("LPB", "LPBank", &["lienvietpostbank", "liên việt", "bưu điện liên việt"]),
            Bank::new("NAB", "Nam A Bank", &["nam á", "namabank"]),
            Bank::new("BAB", "Bac A Bank", &["bắc á", "bacabank"]),
            Bank::new("ABB", "ABBank", &["an bình"]),
            Bank::new("PVCB", "PVcomBank", &["pvcom"]),
            Bank::new("VAB", "VietABank", &["việt á"]),
            Bank::new("KLB", "KienlongBank", &["kiên long"]),
            Bank::new("CAKE", "CAKE by VPBank", &["cake"]),
        ];
        // The built-in list is never empty
        Self::new(banks).unwrap_or_else(|_| unreachable!())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_any() {
        let catalog = BankCatalog::default();
        assert_eq!(catalog.from_any("vcb"), Some("VCB"));
        assert_eq!(catalog.from_any("Vietcombank"), Some("VCB"));
        assert_eq!(catalog.from_any("ngân hàng quân đội"), Some("MB"));
        assert_eq!(catalog.from_any("ngân hàng mặt trăng"), None);
    }

    #[test]
    fn test_find_in_text_prefers_longest_alias() {
        let catalog = BankCatalog::default();
        let text = MatchText::new("Liên kết CAKE by VPBank bị lỗi");
        assert_eq!(catalog.find_in_text(&text).map(|b| b.bank_id.as_str()), Some("CAKE"));

        let text = MatchText::new("rút tiền về techcombank chưa nhận");
        assert_eq!(catalog.find_in_text(&text).map(|b| b.bank_id.as_str()), Some("TCB"));

        let text = MatchText::new("rút tiền chưa nhận");
        assert!(catalog.find_in_text(&text).is_none());
    }

    #[test]
    fn test_load_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("banks.json");
        let mut file = std::fs::File::create(&json_path).unwrap();
        write!(
            file,
            r#"[{{"bank_id": "XB", "name": "Xanh Bank", "aliases": ["xanh"], "supported": false}},
                {{"bank_id": "", "name": "ignored"}}]"#
        )
        .unwrap();
        let catalog = BankCatalog::load(&json_path).unwrap();
        assert_eq!(catalog.banks().len(), 1);
        assert_eq!(catalog.from_any("xanh"), Some("XB"));
        assert!(!catalog.is_supported("XB"));
        assert!(catalog.is_supported("UNKNOWN"));

        let yaml_path = dir.path().join("banks.yaml");
        std::fs::write(&yaml_path, "- bank_id: DB\n  name: Do Bank\n").unwrap();
        let catalog = BankCatalog::load(&yaml_path).unwrap();
        assert_eq!(catalog.to_display("DB"), Some("Do Bank"));
    }

    #[test]
    fn test_load_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banks.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(BankCatalog::load(&path), Err(BankCatalogError::Empty)));
    }
}
