//! Virtual transfers: move value between budget categories without touching
//! any real account.
//!
//! Every transfer books exactly two entries against the Virtual
//! pseudo-account, so the sum of all virtual amounts stays at zero
//! (double-entry) and a transfer shifts two category balances by equal and
//! opposite amounts.

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::operation::{Operation, VIRTUAL_ACCOUNT};

/// Record a transfer of `amount` from `from_category` to `to_category`.
///
/// Both categories must exist and differ and the amount must be positive and
/// finite; otherwise nothing is written and an [`LedgerError::InvalidTransfer`]
/// is returned.
pub fn transfer(
    ledger: &mut Ledger,
    from_category: &str,
    to_category: &str,
    amount: f64,
    date: NaiveDate,
) -> LedgerResult<()> {
    if !ledger.has_category(from_category) {
        return Err(invalid(format!("unknown category '{from_category}'")));
    }
    if !ledger.has_category(to_category) {
        return Err(invalid(format!("unknown category '{to_category}'")));
    }
    if from_category == to_category {
        return Err(invalid(format!(
            "source and destination are both '{from_category}'"
        )));
    }
    if amount <= 0.0 || !amount.is_finite() {
        return Err(invalid(format!("amount must be positive, got {amount}")));
    }

    let name = format!("Transfer {from_category} -> {to_category}");
    let debit = Operation::new(date, name.clone(), VIRTUAL_ACCOUNT, -amount)
        .with_category(from_category);
    let credit =
        Operation::new(date, name, VIRTUAL_ACCOUNT, amount).with_category(to_category);
    // The internal append: Virtual is rejected by `add_operation`, which
    // keeps one-sided virtual entries out of the ledger entirely.
    ledger.push_operation_unchecked(debit);
    ledger.push_operation_unchecked(credit);
    Ok(())
}

fn invalid(reason: String) -> LedgerError {
    LedgerError::InvalidTransfer { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_transfer_is_zero_sum() {
        let mut ledger = Ledger::new();
        transfer(&mut ledger, "Revenus", "Maison", 200.0, date(1)).unwrap();
        transfer(&mut ledger, "Maison", "Sortie", 50.0, date(2)).unwrap();
        transfer(&mut ledger, "Sortie", "Revenus", 12.34, date(3)).unwrap();
        assert_eq!(ledger.virtual_sum(), 0.0);
        assert_eq!(ledger.operations().len(), 6);
    }

    #[test]
    fn test_moves_equal_and_opposite() {
        let mut ledger = Ledger::new();
        transfer(&mut ledger, "Revenus", "Maison", 200.0, date(1)).unwrap();
        assert_eq!(ledger.category_balance("Revenus"), -200.0);
        assert_eq!(ledger.category_balance("Maison"), 200.0);
    }

    #[test]
    fn test_rejections_leave_no_partial_state() {
        let mut ledger = Ledger::new();
        for (from, to, amount) in [
            ("Revenus", "Revenus", 10.0),
            ("Revenus", "Licornes", 10.0),
            ("Licornes", "Maison", 10.0),
            ("Revenus", "Maison", 0.0),
            ("Revenus", "Maison", -5.0),
            ("Revenus", "Maison", f64::NAN),
        ] {
            let err = transfer(&mut ledger, from, to, amount, date(1)).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidTransfer { .. }));
        }
        assert!(ledger.operations().is_empty());
    }
}
