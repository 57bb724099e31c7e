//! Interactive categorization workflow over the uncategorized backlog.
//!
//! A session walks operations whose category is still `"NC"` in order of
//! first appearance, commits exactly one category per step, and can be
//! abandoned at any point; the next session simply picks up whatever is
//! still uncategorized.

use crate::error::LedgerResult;
use crate::ledger::Ledger;
use crate::operation::Operation;
use crate::rules::RuleBook;

/// One step of the workflow: the operation to classify and the rule engine's
/// pre-filled suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizeStep {
    /// Ledger index of the operation; pass back to [`CategorizeSession::assign`].
    pub index: usize,
    pub operation: Operation,
    pub suggestion: String,
}

/// Cursor over the uncategorized operations captured at session start.
///
/// The index snapshot is taken once, so rows categorized mid-session are not
/// revisited and nothing is reordered or duplicated. Deleting operations
/// while a session is open invalidates it; start a new one instead.
#[derive(Debug)]
pub struct CategorizeSession {
    pending: Vec<usize>,
    cursor: usize,
}

impl CategorizeSession {
    pub fn start(ledger: &Ledger) -> Self {
        Self {
            pending: ledger.uncategorized(),
            cursor: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len().saturating_sub(self.cursor)
    }

    /// Next operation to classify, with its suggested category. Returns
    /// `None` once the backlog captured at start is exhausted.
    pub fn next_step(&self, ledger: &Ledger, rules: &RuleBook) -> Option<CategorizeStep> {
        let index = *self.pending.get(self.cursor)?;
        let operation = ledger.operations().get(index)?.clone();
        let suggestion = rules.suggest(&operation.name).to_string();
        Some(CategorizeStep {
            index,
            operation,
            suggestion,
        })
    }

    /// Commit one category (accepted suggestion or override) and advance.
    pub fn assign(&mut self, ledger: &mut Ledger, index: usize, category: &str) -> LedgerResult<()> {
        ledger.set_category(index, category)?;
        self.cursor += 1;
        Ok(())
    }

    /// Leave the current operation uncategorized and advance.
    pub fn skip(&mut self) {
        self.cursor += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use crate::operation::UNCATEGORIZED;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn setup() -> (Ledger, RuleBook) {
        let mut ledger = Ledger::new();
        ledger.add_account(Account::new("Courant", "1")).unwrap();
        for (d, name) in [(5, "VIR SALAIRE"), (6, "CARTE VIAL"), (7, "PRLV EDF")] {
            ledger
                .add_operation(Operation::new(date(d), name, "Courant", -1.0))
                .unwrap();
        }
        (ledger, RuleBook::seeded())
    }

    #[test]
    fn test_walks_backlog_in_ledger_order() {
        let (mut ledger, rules) = setup();
        let mut session = CategorizeSession::start(&ledger);
        assert_eq!(session.remaining(), 3);

        let step = session.next_step(&ledger, &rules).unwrap();
        assert_eq!(step.operation.name, "VIR SALAIRE");
        assert_eq!(step.suggestion, "Revenus");
        session.assign(&mut ledger, step.index, &step.suggestion).unwrap();

        let step = session.next_step(&ledger, &rules).unwrap();
        assert_eq!(step.operation.name, "CARTE VIAL");
        assert_eq!(step.suggestion, "Alimentation");
        // Override the suggestion.
        session.assign(&mut ledger, step.index, "Sortie").unwrap();

        let step = session.next_step(&ledger, &rules).unwrap();
        assert_eq!(step.suggestion, UNCATEGORIZED);
        session.skip();

        assert!(session.next_step(&ledger, &rules).is_none());
        assert_eq!(ledger.operations()[0].category, "Revenus");
        assert_eq!(ledger.operations()[1].category, "Sortie");
        assert_eq!(ledger.operations()[2].category, UNCATEGORIZED);
    }

    #[test]
    fn test_resumable_across_sessions() {
        let (mut ledger, rules) = setup();
        let mut session = CategorizeSession::start(&ledger);
        let step = session.next_step(&ledger, &rules).unwrap();
        session.assign(&mut ledger, step.index, "Revenus").unwrap();
        drop(session); // abandon mid-backlog

        let resumed = CategorizeSession::start(&ledger);
        assert_eq!(resumed.remaining(), 2);
        let step = resumed.next_step(&ledger, &rules).unwrap();
        assert_eq!(step.operation.name, "CARTE VIAL");
    }

    #[test]
    fn test_bad_category_does_not_advance() {
        let (mut ledger, rules) = setup();
        let mut session = CategorizeSession::start(&ledger);
        let step = session.next_step(&ledger, &rules).unwrap();
        assert!(session.assign(&mut ledger, step.index, "Licornes").is_err());
        // Same operation is offered again.
        let retry = session.next_step(&ledger, &rules).unwrap();
        assert_eq!(retry.index, step.index);
    }
}
