//! Real-world bank account tracked by the ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One point of the bank-reported balance history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub date: NaiveDate,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// User-chosen, unique across the account set.
    pub name: String,
    /// Institution account identifier used to recognize future imports.
    pub number: String,
    /// Snapshots in non-decreasing date order; the last one is authoritative.
    pub balance_history: Vec<BalanceSnapshot>,
}

impl Account {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
            balance_history: Vec::new(),
        }
    }

    /// Append a snapshot, keeping the history ordered by date. A snapshot
    /// dated before the current tail is inserted at its sorted position
    /// rather than reordering what is already there.
    pub fn push_snapshot(&mut self, snapshot: BalanceSnapshot) {
        match self.balance_history.last() {
            Some(last) if snapshot.date < last.date => {
                let pos = self
                    .balance_history
                    .partition_point(|s| s.date <= snapshot.date);
                self.balance_history.insert(pos, snapshot);
            }
            _ => self.balance_history.push(snapshot),
        }
    }

    /// Latest bank-reported balance, if any statement has been seen.
    pub fn current_balance(&self) -> Option<f64> {
        self.balance_history.last().map(|s| s.balance)
    }
}
