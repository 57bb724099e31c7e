//! The ledger: all accounts, categories and operations, plus the whole-state
//! JSON snapshot it persists to.

use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::account::{Account, BalanceSnapshot};
use crate::error::{LedgerError, LedgerResult};
use crate::operation::{Operation, UNCATEGORIZED, round_cents};

/// Category list every fresh ledger starts with. "Revenus" first: the
/// opening-balance back-calculation books its synthetic entry against the
/// first category of the list.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Revenus",
    "Maison",
    "Alimentation",
    "Transport",
    "Sortie",
    "Santé",
    "NC",
    "Interne",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    accounts: Vec<Account>,
    categories: Vec<String>,
    operations: Vec<Operation>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            operations: Vec::new(),
        }
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- accounts ----

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account(&self, name: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.name == name)
    }

    pub fn account_mut(&mut self, name: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.name == name)
    }

    /// Find an account by its institution identifier.
    pub fn account_by_number(&self, number: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.number == number)
    }

    pub fn add_account(&mut self, account: Account) -> LedgerResult<()> {
        if self.account(&account.name).is_some() {
            return Err(LedgerError::DuplicateAccountName {
                name: account.name,
            });
        }
        self.accounts.push(account);
        Ok(())
    }

    /// Latest bank-reported balance for an account.
    pub fn account_balance(&self, name: &str) -> LedgerResult<Option<f64>> {
        let account = self.account(name).ok_or_else(|| LedgerError::UnknownAccount {
            name: name.to_string(),
        })?;
        Ok(account.current_balance())
    }

    // ---- categories ----

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// First category of the list; target of synthetic opening entries.
    pub fn first_category(&self) -> &str {
        self.categories.first().map(String::as_str).unwrap_or(UNCATEGORIZED)
    }

    pub fn has_category(&self, name: &str) -> bool {
        name == UNCATEGORIZED || self.categories.iter().any(|c| c == name)
    }

    /// Append a new category. Duplicates and empty names are rejected; the
    /// list never reorders, so existing operations keep their meaning.
    pub fn add_category(&mut self, name: &str) -> LedgerResult<()> {
        if name.trim().is_empty() || self.categories.iter().any(|c| c == name) {
            return Err(LedgerError::InvalidCategory {
                name: name.to_string(),
            });
        }
        self.categories.push(name.to_string());
        Ok(())
    }

    // ---- operations ----

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Add one operation, validating its account and category references.
    ///
    /// The Virtual pseudo-account is no real account and is rejected here:
    /// one-sided virtual entries would break the zero-sum invariant, so only
    /// [`crate::transfer::transfer`] writes virtual rows, always in pairs.
    pub fn add_operation(&mut self, op: Operation) -> LedgerResult<()> {
        if self.account(&op.account).is_none() {
            return Err(LedgerError::UnknownAccount { name: op.account });
        }
        if !self.has_category(&op.category) {
            return Err(LedgerError::InvalidCategory { name: op.category });
        }
        self.operations.push(op);
        Ok(())
    }

    /// Append without reference checks. For the reconciliation engine (which
    /// validates the account once for the whole batch) and the transfer pair.
    pub(crate) fn push_operation_unchecked(&mut self, op: Operation) {
        self.operations.push(op);
    }

    pub fn operation(&self, index: usize) -> LedgerResult<&Operation> {
        self.operations
            .get(index)
            .ok_or(LedgerError::UnknownOperation { index })
    }

    /// Mutate one operation in place via `edit`. Category changes are
    /// re-validated; everything else is the caller's business.
    pub fn edit_operation(
        &mut self,
        index: usize,
        edit: impl FnOnce(&mut Operation),
    ) -> LedgerResult<()> {
        if index >= self.operations.len() {
            return Err(LedgerError::UnknownOperation { index });
        }
        let mut candidate = self.operations[index].clone();
        edit(&mut candidate);
        if !self.has_category(&candidate.category) {
            return Err(LedgerError::InvalidCategory {
                name: candidate.category,
            });
        }
        self.operations[index] = candidate;
        Ok(())
    }

    /// Explicit delete. Removed operations are never resurrected.
    pub fn delete_operation(&mut self, index: usize) -> LedgerResult<Operation> {
        if index >= self.operations.len() {
            return Err(LedgerError::UnknownOperation { index });
        }
        Ok(self.operations.remove(index))
    }

    /// Assign a category to one operation (categorization workflow commit).
    pub fn set_category(&mut self, index: usize, category: &str) -> LedgerResult<()> {
        if !self.has_category(category) {
            return Err(LedgerError::InvalidCategory {
                name: category.to_string(),
            });
        }
        let op = self
            .operations
            .get_mut(index)
            .ok_or(LedgerError::UnknownOperation { index })?;
        op.category = category.to_string();
        Ok(())
    }

    /// Indices of operations still needing a category, in order of first
    /// appearance in the ledger.
    pub fn uncategorized(&self) -> Vec<usize> {
        self.operations
            .iter()
            .enumerate()
            .filter(|(_, op)| op.is_uncategorized())
            .map(|(i, _)| i)
            .collect()
    }

    // ---- balances ----

    /// Sum of every operation amount tagged with `category`, real + virtual.
    pub fn category_balance(&self, category: &str) -> f64 {
        round_cents(
            self.operations
                .iter()
                .filter(|op| op.category == category)
                .map(|op| op.amount)
                .sum(),
        )
    }

    /// Category sum restricted to real accounts (`virtual_ops = false`) or to
    /// the Virtual pseudo-account, optionally filtered by year and month.
    pub fn category_balance_filtered(
        &self,
        category: &str,
        virtual_ops: bool,
        year: Option<i32>,
        month: Option<u32>,
    ) -> f64 {
        round_cents(
            self.operations
                .iter()
                .filter(|op| op.category == category && op.is_virtual() == virtual_ops)
                .filter(|op| year.is_none_or(|y| op.date.year() == y))
                .filter(|op| month.is_none_or(|m| op.date.month() == m))
                .map(|op| op.amount)
                .sum(),
        )
    }

    /// Sum of all Virtual-account amounts. Always 0.0 when transfers are the
    /// only writer of virtual entries.
    pub fn virtual_sum(&self) -> f64 {
        round_cents(
            self.operations
                .iter()
                .filter(|op| op.is_virtual())
                .map(|op| op.amount)
                .sum(),
        )
    }

    /// Latest operation date for an account, if it has any history.
    pub fn latest_operation_date(&self, account: &str) -> Option<NaiveDate> {
        self.operations
            .iter()
            .filter(|op| op.account == account)
            .map(|op| op.date)
            .max()
    }

    /// Record a statement snapshot against an existing account.
    pub fn record_snapshot(&mut self, account: &str, snapshot: BalanceSnapshot) -> LedgerResult<()> {
        let account = self
            .account_mut(account)
            .ok_or_else(|| LedgerError::UnknownAccount {
                name: account.to_string(),
            })?;
        account.push_snapshot(snapshot);
        Ok(())
    }

    // ---- persistence ----

    /// Whole-state save: everything since the last call is the durability
    /// unit, as accepted by the callers.
    pub fn save(&self, path: &Path) -> LedgerResult<()> {
        let json = serde_json::to_string_pretty(self).expect("ledger serializes");
        fs::write(path, json).map_err(|source| LedgerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("saved ledger to {}", path.display());
        Ok(())
    }

    /// Load a snapshot, falling back to an empty ledger when the file is
    /// missing or unreadable.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(ledger) => ledger,
                Err(e) => {
                    log::warn!("ledger snapshot {} is corrupt ({e}); starting empty", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::VIRTUAL_ACCOUNT;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger_with_account() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.add_account(Account::new("Courant", "00112233")).unwrap();
        ledger
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let mut ledger = ledger_with_account();
        let err = ledger.add_account(Account::new("Courant", "999")).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateAccountName { .. }));
    }

    #[test]
    fn test_operation_references_validated() {
        let mut ledger = ledger_with_account();
        let bad_account = Operation::new(date(2024, 1, 5), "x", "Nope", -1.0);
        assert!(matches!(
            ledger.add_operation(bad_account),
            Err(LedgerError::UnknownAccount { .. })
        ));

        let bad_category =
            Operation::new(date(2024, 1, 5), "x", "Courant", -1.0).with_category("Licornes");
        assert!(matches!(
            ledger.add_operation(bad_category),
            Err(LedgerError::InvalidCategory { .. })
        ));

        let ok = Operation::new(date(2024, 1, 5), "x", "Courant", -1.0);
        ledger.add_operation(ok).unwrap();
        assert_eq!(ledger.operations().len(), 1);
    }

    #[test]
    fn test_virtual_sentinel_rejected_on_direct_add() {
        // A one-sided virtual entry would break the zero-sum invariant; only
        // the transfer pair may write virtual rows.
        let mut ledger = Ledger::new();
        let op = Operation::new(date(2024, 3, 1), "one-sided", VIRTUAL_ACCOUNT, 100.0)
            .with_category("Maison");
        assert!(matches!(
            ledger.add_operation(op),
            Err(LedgerError::UnknownAccount { name }) if name == VIRTUAL_ACCOUNT
        ));
        assert!(ledger.operations().is_empty());
        assert_eq!(ledger.virtual_sum(), 0.0);
    }

    #[test]
    fn test_category_append_only() {
        let mut ledger = Ledger::new();
        ledger.add_category("Vacances").unwrap();
        assert!(ledger.add_category("Vacances").is_err());
        assert!(ledger.add_category("  ").is_err());
        assert_eq!(ledger.categories().last().unwrap(), "Vacances");
        assert_eq!(ledger.first_category(), "Revenus");
    }

    #[test]
    fn test_category_balance_additivity() {
        let mut ledger = ledger_with_account();
        ledger
            .add_operation(
                Operation::new(date(2024, 1, 5), "loyer", "Courant", -700.0)
                    .with_category("Maison"),
            )
            .unwrap();
        ledger
            .add_operation(
                Operation::new(date(2024, 1, 8), "edf", "Courant", -60.5).with_category("Maison"),
            )
            .unwrap();
        crate::transfer::transfer(&mut ledger, "Revenus", "Maison", 100.0, date(2024, 1, 20))
            .unwrap();
        assert_eq!(ledger.category_balance("Maison"), -660.5);
        assert_eq!(
            ledger.category_balance_filtered("Maison", false, Some(2024), Some(1)),
            -760.5
        );
        assert_eq!(
            ledger.category_balance_filtered("Maison", true, None, None),
            100.0
        );
    }

    #[test]
    fn test_edit_revalidates_category() {
        let mut ledger = ledger_with_account();
        ledger
            .add_operation(Operation::new(date(2024, 1, 5), "x", "Courant", -1.0))
            .unwrap();
        let err = ledger
            .edit_operation(0, |op| op.category = "Licornes".to_string())
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidCategory { .. }));
        // Failed edit left the row untouched.
        assert_eq!(ledger.operation(0).unwrap().category, UNCATEGORIZED);
    }

    #[test]
    fn test_delete_removes_for_good() {
        let mut ledger = ledger_with_account();
        ledger
            .add_operation(Operation::new(date(2024, 1, 5), "x", "Courant", -1.0))
            .unwrap();
        ledger.delete_operation(0).unwrap();
        assert!(ledger.operations().is_empty());
        assert!(matches!(
            ledger.delete_operation(0),
            Err(LedgerError::UnknownOperation { index: 0 })
        ));
    }

    #[test]
    fn test_load_missing_defaults_empty() {
        let ledger = Ledger::load(Path::new("/nonexistent/solde/ledger.json"));
        assert!(ledger.accounts().is_empty());
        assert_eq!(ledger.categories().len(), DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut ledger = ledger_with_account();
        ledger
            .add_operation(Operation::new(date(2024, 1, 5), "x", "Courant", -1.0))
            .unwrap();
        let path = std::env::temp_dir().join("solde-core-ledger-roundtrip.json");
        ledger.save(&path).unwrap();
        let reloaded = Ledger::load(&path);
        assert_eq!(reloaded.operations(), ledger.operations());
        assert_eq!(reloaded.accounts(), ledger.accounts());
        std::fs::remove_file(&path).ok();
    }
}
