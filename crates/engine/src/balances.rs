//! Balance projection.
//!
//! Balances are never stored; they are a pure fold of the ledger. The
//! same transaction set always yields the same balance, and point-in-time
//! queries come for free because there is no cached "current balance" to
//! invalidate.

use chrono::NaiveDate;

use crate::{EntityRef, Ledger, Money};

impl Ledger {
    /// Current balance of an entity: the sum of all signed effects.
    #[must_use]
    pub fn balance(&self, entity: EntityRef) -> Money {
        self.entries()
            .iter()
            .filter(|tx| tx.entity == entity)
            .map(|tx| tx.amount)
            .sum()
    }

    /// Balance as it stood at end of day `as_of`.
    ///
    /// Sums signed effects with `date <= as_of`. Used by the goal
    /// forecaster and for historical reporting.
    #[must_use]
    pub fn balance_as_of(&self, entity: EntityRef, as_of: NaiveDate) -> Money {
        self.entries()
            .iter()
            .filter(|tx| tx.entity == entity && tx.date <= as_of)
            .map(|tx| tx.amount)
            .sum()
    }
}
