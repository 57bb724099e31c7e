//! Category summary: real, virtual and total balance per category, with an
//! optional year/month window.

use solde_core::Ledger;

pub fn print_category_report(ledger: &Ledger, year: Option<i32>, month: Option<u32>, currency: &str) {
    match (year, month) {
        (Some(y), Some(m)) => println!("Category balances for {y}-{m:02}\n"),
        (Some(y), None) => println!("Category balances for {y}\n"),
        _ => println!("Category balances (all time)\n"),
    }
    println!(
        "{:<16} {:>12} {:>12} {:>12}",
        "category", "real", "virtual", "total"
    );
    for category in ledger.categories() {
        let real = ledger.category_balance_filtered(category, false, year, month);
        let virt = ledger.category_balance_filtered(category, true, year, month);
        println!(
            "{:<16} {:>11.2}{c} {:>11.2}{c} {:>11.2}{c}",
            category,
            real,
            virt,
            real + virt,
            c = currency
        );
    }
}

pub fn print_accounts(ledger: &Ledger, currency: &str) {
    if ledger.accounts().is_empty() {
        println!("No accounts yet. Add one with `solde account add` or import a statement.");
        return;
    }
    for account in ledger.accounts() {
        match account.current_balance() {
            Some(balance) => println!(
                "{} ({}) - {:.2}{}",
                account.name, account.number, balance, currency
            ),
            None => println!("{} ({}) - no statement seen", account.name, account.number),
        }
    }
}

pub fn print_operations(ledger: &Ledger, account: Option<&str>, currency: &str) {
    for (index, op) in ledger.operations().iter().enumerate() {
        if account.is_some_and(|a| a != op.account) {
            continue;
        }
        let monthly = if op.monthly { " [monthly]" } else { "" };
        println!(
            "{index:>4}  {}  {:<32} {:>10.2}{}  {}  {}{monthly}",
            op.date, op.name, op.amount, currency, op.account, op.category
        );
    }
}
