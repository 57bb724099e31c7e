use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use solde_core::{
    Account, BalanceSnapshot, CategorizeSession, Ledger, LedgerError, Operation, RuleBook,
    transfer,
};
use solde_ingest::{import_file, import_with_mapping};

mod config;
mod prompt;
mod report;
mod state;

use config::Config;
use prompt::{TerminalUi, prompt};

#[derive(Parser, Debug)]
#[command(name = "solde", version, about = "Bank statement ingestion and envelope budgeting")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a bank statement (CSV or spreadsheet) into the ledger
    Import {
        file: PathBuf,

        /// Target account for layouts no dialect recognizes
        #[arg(long)]
        account: Option<String>,
    },

    /// List accounts and their latest bank-reported balances
    Accounts,

    /// Account management
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },

    /// Add one operation by hand
    Add {
        /// Date as YYYY-MM-DD
        date: String,
        name: String,
        account: String,
        /// Negative for a debit
        #[arg(allow_negative_numbers = true)]
        amount: f64,

        #[arg(long, default_value = "NC")]
        category: String,

        /// Mark as a recurring monthly operation
        #[arg(long)]
        monthly: bool,
    },

    /// List operations
    Ops {
        #[arg(long)]
        account: Option<String>,
    },

    /// Edit one operation by index (see `solde ops`)
    Edit {
        index: usize,

        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        amount: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        monthly: Option<bool>,
    },

    /// Delete one operation by index
    Delete { index: usize },

    /// Walk uncategorized operations interactively
    Categorize,

    /// List categories
    Categories,

    /// Append a new category
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },

    /// List categorization rules
    Rules,

    /// Rule management
    Rule {
        #[command(subcommand)]
        command: RuleCommand,
    },

    /// Move value between categories (virtual, no real account touched)
    Transfer {
        from: String,
        to: String,
        /// Always positive; direction comes from the category pair
        #[arg(allow_negative_numbers = true)]
        amount: f64,

        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Per-category balance summary (real / virtual / total)
    Report {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    /// Create an account: name, institution number, optional starting balance
    Add {
        name: String,
        number: String,

        #[arg(long, allow_negative_numbers = true)]
        balance: Option<f64>,
    },
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Add { name: String },
}

#[derive(Subcommand, Debug)]
enum RuleCommand {
    /// Map a keyword to a category (keyword is upper-cased and overwritten
    /// if already present)
    Add { keyword: String, category: String },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = config::load_config()?;

    let ledger_path = state::ledger_path()?;
    let rules_path = state::rules_path()?;
    let mut ledger = Ledger::load(&ledger_path);
    let mut rules = RuleBook::load(&rules_path);
    log::debug!(
        "state loaded from {}: {} accounts, {} operations, {} rules",
        ledger_path.display(),
        ledger.accounts().len(),
        ledger.operations().len(),
        rules.rules().len()
    );

    let changed = match cli.command {
        Command::Import { file, account } => run_import(&mut ledger, &cfg, &file, account)?,

        Command::Accounts => {
            report::print_accounts(&ledger, &cfg.currency);
            false
        }

        Command::Account {
            command: AccountCommand::Add { name, number, balance },
        } => {
            let mut account = Account::new(name.clone(), number);
            if let Some(balance) = balance {
                account.push_snapshot(BalanceSnapshot {
                    date: today(),
                    balance,
                });
            }
            ledger.add_account(account)?;
            println!("Added account '{name}'");
            true
        }

        Command::Add {
            date,
            name,
            account,
            amount,
            category,
            monthly,
        } => {
            let mut op = Operation::new(parse_date(&date)?, name, account, amount)
                .with_category(category);
            op.monthly = monthly;
            ledger.add_operation(op)?;
            true
        }

        Command::Ops { account } => {
            report::print_operations(&ledger, account.as_deref(), &cfg.currency);
            false
        }

        Command::Edit {
            index,
            date,
            name,
            amount,
            category,
            monthly,
        } => {
            let date = date.map(|d| parse_date(&d)).transpose()?;
            ledger.edit_operation(index, |op| {
                if let Some(date) = date {
                    op.date = date;
                }
                if let Some(name) = name {
                    op.name = name;
                }
                if let Some(amount) = amount {
                    op.amount = amount;
                }
                if let Some(category) = category {
                    op.category = category;
                }
                if let Some(monthly) = monthly {
                    op.monthly = monthly;
                }
            })?;
            true
        }

        Command::Delete { index } => {
            let op = ledger.delete_operation(index)?;
            println!("Deleted: {} {} {:.2}", op.date, op.name, op.amount);
            true
        }

        Command::Categorize => run_categorize(&mut ledger, &rules)?,

        Command::Categories => {
            for c in ledger.categories() {
                println!("{c}");
            }
            false
        }

        Command::Category {
            command: CategoryCommand::Add { name },
        } => {
            ledger.add_category(&name)?;
            println!("Added category '{name}'");
            true
        }

        Command::Rules => {
            for rule in rules.rules() {
                println!("{:<24} -> {}", rule.keyword, rule.category);
            }
            false
        }

        Command::Rule {
            command: RuleCommand::Add { keyword, category },
        } => {
            if keyword.trim().is_empty() {
                bail!("keyword must not be empty");
            }
            if !ledger.has_category(&category) {
                bail!("unknown category '{category}' (see `solde categories`)");
            }
            // The rule book persists itself immediately.
            rules.add_rule(&keyword, &category)?;
            false
        }

        Command::Transfer { from, to, amount, date } => {
            let date = match date {
                Some(d) => parse_date(&d)?,
                None => today(),
            };
            transfer(&mut ledger, &from, &to, amount, date)?;
            println!("Moved {:.2}{} from '{from}' to '{to}'", amount, cfg.currency);
            true
        }

        Command::Report { year, month } => {
            report::print_category_report(&ledger, year, month, &cfg.currency);
            false
        }
    };

    if changed {
        ledger.save(&ledger_path)?;
    }
    Ok(())
}

/// Dialect-based import, falling back to an interactive column mapping when
/// no dialect matches. Returns whether the ledger changed.
fn run_import(
    ledger: &mut Ledger,
    cfg: &Config,
    file: &Path,
    account: Option<String>,
) -> Result<bool> {
    let mut ui = TerminalUi::new(ledger, &cfg.currency);
    match import_file(ledger, file, &mut ui) {
        Ok(outcome) => {
            println!(
                "Booked against '{}' ({} dialect)",
                outcome.account,
                outcome.dialect.unwrap_or("unknown")
            );
            // Even a zero-row reimport records a fresh balance snapshot.
            Ok(true)
        }
        Err(LedgerError::ImportCancelled) => {
            println!("Import cancelled; ledger unchanged.");
            Ok(false)
        }
        Err(LedgerError::MappingRequired { columns }) => {
            use solde_ingest::Collaborator;
            let Some(mapping) = ui.supply_column_mapping(&columns) else {
                bail!("no column mapping supplied; nothing imported");
            };
            let target = match account.or_else(|| cfg.default_account.clone()) {
                Some(name) => name,
                None => prompt("Target account")?,
            };
            let outcome = import_with_mapping(ledger, file, &mapping, &target, &mut ui)?;
            println!("Booked against '{}' via manual mapping", outcome.account);
            Ok(true)
        }
        Err(e) => Err(e.into()),
    }
}

/// One step per loop turn: show the operation, pre-fill the rule engine's
/// suggestion, accept/override/skip. Quitting mid-backlog is fine; the next
/// run resumes with whatever is still uncategorized.
fn run_categorize(ledger: &mut Ledger, rules: &RuleBook) -> Result<bool> {
    let mut session = CategorizeSession::start(ledger);
    if session.remaining() == 0 {
        println!("No uncategorized operations.");
        return Ok(false);
    }
    println!(
        "{} operations to categorize. Enter accepts the suggestion, a category name overrides, 's' skips, 'q' stops.",
        session.remaining()
    );
    println!("Categories: {}\n", ledger.categories().join(", "));

    let mut changed = false;
    while let Some(step) = session.next_step(ledger, rules) {
        println!(
            "{} | {} | {:.2} ({} left)",
            step.operation.date,
            step.operation.name,
            step.operation.amount,
            session.remaining()
        );
        let answer = prompt(&format!("Category [{}]", step.suggestion))?;
        match answer.as_str() {
            "q" => break,
            "s" => session.skip(),
            "" => {
                session.assign(ledger, step.index, &step.suggestion)?;
                changed = true;
            }
            name => match session.assign(ledger, step.index, name) {
                Ok(()) => changed = true,
                Err(LedgerError::InvalidCategory { name }) => {
                    println!("Unknown category '{name}', try again.");
                }
                Err(e) => return Err(e.into()),
            },
        }
    }
    Ok(changed)
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{text}', expected YYYY-MM-DD"))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
