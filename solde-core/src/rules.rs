//! Keyword → category rules for automatic categorization.
//!
//! Rules live in insertion order and the first substring match wins, so the
//! order must survive save/reload; the book is persisted as an ordered list,
//! not a map.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::operation::UNCATEGORIZED;

// Category existence is the caller's concern: the book is persisted
// independently of any ledger, so it cannot check membership itself.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Upper-cased substring matched against operation names.
    pub keyword: String,
    pub category: String,
}

/// Starter rules of the original system, used when no rules file exists yet.
const SEED_RULES: &[(&str, &str)] = &[
    ("SALAIRE", "Revenus"),
    ("BLABLACAR", "Transport"),
    ("AUTOROUTE", "Transport"),
    ("VIAL", "Alimentation"),
    ("ALIM", "Alimentation"),
    ("FREE MOBILE", "Maison"),
    ("SANTE", "Santé"),
    ("RESTO", "Sortie"),
    ("ESL", "Maison"),
];

/// Ordered, key-unique keyword→category mapping, persisted independently of
/// the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleBook {
    rules: Vec<Rule>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl RuleBook {
    /// In-memory book with no backing file.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        Self {
            rules: SEED_RULES
                .iter()
                .map(|(keyword, category)| Rule {
                    keyword: keyword.to_string(),
                    category: category.to_string(),
                })
                .collect(),
            path: None,
        }
    }

    /// Load the book from `path` and keep writing back to it. A missing file
    /// yields the seeded starter set; a corrupt one yields an empty book.
    /// Neither is a fatal error.
    pub fn load(path: &Path) -> Self {
        let mut book = match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<RuleBook>(&json) {
                Ok(book) => book,
                Err(e) => {
                    log::warn!("rules file {} is corrupt ({e}); starting empty", path.display());
                    Self::new()
                }
            },
            Err(_) => Self::seeded(),
        };
        book.path = Some(path.to_path_buf());
        book
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Upper-case the keyword, overwrite any existing mapping for it (keeping
    /// its position), and persist immediately when file-backed.
    pub fn add_rule(&mut self, keyword: &str, category: &str) -> LedgerResult<()> {
        let keyword = keyword.trim().to_uppercase();
        match self.rules.iter_mut().find(|r| r.keyword == keyword) {
            Some(rule) => rule.category = category.to_string(),
            None => self.rules.push(Rule {
                keyword,
                category: category.to_string(),
            }),
        }
        self.persist()
    }

    /// Category of the first rule whose keyword appears in the upper-cased
    /// operation name; `"NC"` when none match.
    pub fn suggest(&self, operation_name: &str) -> &str {
        let name = operation_name.to_uppercase();
        self.rules
            .iter()
            .find(|r| name.contains(&r.keyword))
            .map(|r| r.category.as_str())
            .unwrap_or(UNCATEGORIZED)
    }

    fn persist(&self) -> LedgerResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(self).expect("rule book serializes");
        fs::write(path, json).map_err(|source| LedgerError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}
