//! solde-core: ledger domain for the solde budget engine
//!
//! Accounts, operations, categories, incremental reconciliation, keyword
//! categorization rules and category-to-category virtual transfers. Everything
//! here is synchronous and single-threaded; persistence is a whole-state JSON
//! snapshot written on explicit save.

pub mod account;
pub mod categorize;
pub mod error;
pub mod ledger;
pub mod operation;
pub mod reconcile;
pub mod rules;
pub mod transfer;

pub use account::{Account, BalanceSnapshot};
pub use categorize::{CategorizeSession, CategorizeStep};
pub use error::{LedgerError, LedgerResult};
pub use ledger::{DEFAULT_CATEGORIES, Ledger};
pub use operation::{Operation, UNCATEGORIZED, VIRTUAL_ACCOUNT, round_cents};
pub use reconcile::{ReconcileReport, merge_operations};
pub use rules::{Rule, RuleBook};
pub use transfer::transfer;
