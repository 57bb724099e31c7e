//! Ledger entry type shared by imports, manual entry and virtual transfers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Pseudo-account used solely for category-to-category transfers.
pub const VIRTUAL_ACCOUNT: &str = "Virtual";

/// Default category for operations that have not been classified yet.
pub const UNCATEGORIZED: &str = "NC";

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub date: NaiveDate,
    /// Free-text description, as exported by the bank.
    pub name: String,
    /// Account name, or [`VIRTUAL_ACCOUNT`].
    pub account: String,
    /// Negative = debit, positive = credit.
    pub amount: f64,
    #[serde(default = "default_category")]
    pub category: String,
    /// Recurring-classification flag, orthogonal to amount and category.
    #[serde(default)]
    pub monthly: bool,
}

fn default_category() -> String {
    UNCATEGORIZED.to_string()
}

impl Operation {
    pub fn new(date: NaiveDate, name: impl Into<String>, account: impl Into<String>, amount: f64) -> Self {
        Self {
            date,
            name: name.into(),
            account: account.into(),
            amount,
            category: UNCATEGORIZED.to_string(),
            monthly: false,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn is_virtual(&self) -> bool {
        self.account == VIRTUAL_ACCOUNT
    }

    /// True when the operation still needs a category.
    pub fn is_uncategorized(&self) -> bool {
        self.category == UNCATEGORIZED || self.category.is_empty()
    }
}

/// Round to two decimal places (cents).
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
