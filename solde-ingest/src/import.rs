//! End-to-end import pipeline: file → table → statement → account → ledger.
//!
//! The pipeline is synchronous and runs to completion; its only suspension
//! points are the collaborator calls, which block until the surrounding UI
//! answers. Cancellation there is a first-class terminal outcome and leaves
//! the ledger untouched: nothing is written before resolution succeeds.

use std::path::Path;

use solde_core::{
    Account, BalanceSnapshot, Ledger, LedgerError, LedgerResult, Operation, ReconcileReport,
    merge_operations, round_cents,
};

use crate::statement::{ColumnMapping, Statement, parse_statement, parse_with_mapping};
use crate::table::load_table;

/// Label of the synthetic opening operation inserted for first-seen accounts.
const OPENING_LABEL: &str = "Initial balance";

/// Answer to [`Collaborator::resolve_unknown_account`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountResolution {
    /// Book this statement against an existing account (overrides the
    /// identifier match for this import only).
    Existing(String),
    /// Create a brand-new account under this name.
    Create(String),
    Cancelled,
}

/// What the surrounding UI must implement against this core. Calls block the
/// importing flow until answered; there is no timeout.
pub trait Collaborator {
    /// The statement carries an institution account number no account knows.
    /// `seed` is the statement's closing-balance snapshot, which becomes the
    /// first history entry of a newly created account.
    fn resolve_unknown_account(
        &mut self,
        number: &str,
        seed: &BalanceSnapshot,
    ) -> AccountResolution;

    /// No dialect matched; ask for a manual `{date, name, amount}` mapping
    /// over `columns`. `None` means the user declined.
    fn supply_column_mapping(&mut self, columns: &[String]) -> Option<ColumnMapping>;

    fn report_import_result(&mut self, report: &ReconcileReport);
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    /// Account the statement was booked against.
    pub account: String,
    pub dialect: Option<&'static str>,
    pub report: ReconcileReport,
}

/// Import a statement file, recognizing its dialect and resolving its
/// account. Unknown layouts fail with [`LedgerError::MappingRequired`]; the
/// caller may then retry through [`import_with_mapping`] with a mapping
/// obtained from [`Collaborator::supply_column_mapping`].
pub fn import_file(
    ledger: &mut Ledger,
    path: &Path,
    collaborator: &mut dyn Collaborator,
) -> LedgerResult<ImportOutcome> {
    let table = load_table(path)?;
    let parsed = parse_statement(&table)?;
    let seed = parsed.closing;

    let (account_name, created) = match ledger.account_by_number(&parsed.account_number) {
        Some(account) => (account.name.clone(), false),
        None => match collaborator.resolve_unknown_account(&parsed.account_number, &seed) {
            AccountResolution::Cancelled => return Err(LedgerError::ImportCancelled),
            AccountResolution::Existing(name) => {
                if ledger.account(&name).is_none() {
                    return Err(LedgerError::UnknownAccount { name });
                }
                (name, false)
            }
            AccountResolution::Create(name) => {
                let mut account = Account::new(name.clone(), parsed.account_number.clone());
                account.push_snapshot(seed);
                ledger.add_account(account)?;
                insert_opening_operation(ledger, &name, &parsed.statement, seed.balance)?;
                (name, true)
            }
        },
    };

    if !created {
        ledger.record_snapshot(&account_name, seed)?;
    }

    finish(ledger, &account_name, Some(parsed.dialect), parsed.statement, collaborator)
}

/// Manual-mapping path for unrecognized layouts. The target account is
/// pre-selected by the caller; no account metadata is inferred and no
/// opening balance is back-calculated.
pub fn import_with_mapping(
    ledger: &mut Ledger,
    path: &Path,
    mapping: &ColumnMapping,
    account: &str,
    collaborator: &mut dyn Collaborator,
) -> LedgerResult<ImportOutcome> {
    if ledger.account(account).is_none() {
        return Err(LedgerError::UnknownAccount {
            name: account.to_string(),
        });
    }
    let table = load_table(path)?;
    let statement = parse_with_mapping(&table, mapping)?;
    finish(ledger, account, None, statement, collaborator)
}

fn finish(
    ledger: &mut Ledger,
    account: &str,
    dialect: Option<&'static str>,
    statement: Statement,
    collaborator: &mut dyn Collaborator,
) -> LedgerResult<ImportOutcome> {
    let ops: Vec<Operation> = statement
        .rows
        .iter()
        .map(|row| Operation::new(row.date, row.label.clone(), account, row.amount))
        .collect();
    let mut report = merge_operations(ledger, ops)?;
    report.dropped = statement.dropped;
    collaborator.report_import_result(&report);
    Ok(ImportOutcome {
        account: account.to_string(),
        dialect,
        report,
    })
}

/// Back-calculate the opening balance of a first-seen account so that the
/// ledger's cumulative sum matches the bank-reported closing balance:
/// `opening = closing − Σ(parsed amounts)`, to the cent, booked at the
/// earliest imported date against the first category of the list.
fn insert_opening_operation(
    ledger: &mut Ledger,
    account: &str,
    statement: &Statement,
    closing_balance: f64,
) -> LedgerResult<()> {
    let total: f64 = statement.rows.iter().map(|r| r.amount).sum();
    let opening = round_cents(closing_balance - total);
    let date = statement
        .rows
        .iter()
        .map(|r| r.date)
        .min()
        .ok_or(LedgerError::EmptyImport)?;
    let category = ledger.first_category().to_string();
    log::info!("seeding account '{account}' with opening balance {opening:.2} at {date}");
    ledger.add_operation(
        Operation::new(date, OPENING_LABEL, account, opening).with_category(category),
    )
}
