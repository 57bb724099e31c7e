//! Terminal implementation of the collaborator surface: the blocking
//! questions an import can ask (unknown account, column mapping) and the
//! closing report.

use std::io::{self, Write};

use anyhow::Result;
use solde_core::{BalanceSnapshot, Ledger, ReconcileReport};
use solde_ingest::{AccountResolution, Collaborator, ColumnMapping};

pub fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Interactive collaborator. Holds the account names known at import start
/// so the association dialog can list them.
pub struct TerminalUi {
    existing_accounts: Vec<String>,
    pub currency: String,
}

impl TerminalUi {
    pub fn new(ledger: &Ledger, currency: &str) -> Self {
        Self {
            existing_accounts: ledger.accounts().iter().map(|a| a.name.clone()).collect(),
            currency: currency.to_string(),
        }
    }
}

impl Collaborator for TerminalUi {
    fn resolve_unknown_account(
        &mut self,
        number: &str,
        seed: &BalanceSnapshot,
    ) -> AccountResolution {
        println!("\nAccount number {number} is not recognized.");
        println!(
            "Statement balance: {:.2}{} as of {}",
            seed.balance, self.currency, seed.date
        );
        loop {
            let choice = if self.existing_accounts.is_empty() {
                prompt("[c]reate a new account, or [x] cancel the import")
            } else {
                println!("Known accounts: {}", self.existing_accounts.join(", "));
                prompt("[a]ssociate with an existing account, [c]reate a new one, or [x] cancel")
            };
            match choice.as_deref() {
                Ok("a") if !self.existing_accounts.is_empty() => {
                    match prompt("Account name") {
                        Ok(name) if !name.is_empty() => {
                            return AccountResolution::Existing(name);
                        }
                        _ => continue,
                    }
                }
                Ok("c") => match prompt("New account name") {
                    Ok(name) if !name.is_empty() => return AccountResolution::Create(name),
                    _ => continue,
                },
                Ok("x") | Err(_) => return AccountResolution::Cancelled,
                _ => continue,
            }
        }
    }

    fn supply_column_mapping(&mut self, columns: &[String]) -> Option<ColumnMapping> {
        println!("\nUnrecognized layout. Available columns:");
        for c in columns {
            println!("  - {c}");
        }
        let date = prompt("Date column").ok().filter(|s| !s.is_empty())?;
        let name = prompt("Name column").ok().filter(|s| !s.is_empty())?;
        let amount = prompt("Amount column").ok().filter(|s| !s.is_empty())?;
        Some(ColumnMapping { date, name, amount })
    }

    fn report_import_result(&mut self, report: &ReconcileReport) {
        println!(
            "Imported {} rows ({} duplicates discarded, {} unparseable dropped)",
            report.added, report.discarded, report.dropped
        );
    }
}
