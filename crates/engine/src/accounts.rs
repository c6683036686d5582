//! The module contains the `Account` struct and its implementation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Money, ResultEngine, Transaction};

/// A real-money container: a bank account, cash box or similar.
///
/// Like funds, accounts carry no authoritative balance field; the balance
/// is the ledger projection. The opening balance enters the ledger as an
/// `adjustment` dated `opened_on` (see [`Account::opening_entry`]), which
/// keeps the projector a plain fold with no special cases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub opening_balance: Money,
    pub opened_on: NaiveDate,
    pub archived: bool,
}

impl Account {
    #[must_use]
    pub fn new(name: impl Into<String>, opening_balance: Money, opened_on: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            opening_balance,
            opened_on,
            archived: false,
        }
    }

    /// Soft-deactivate. History stays intact.
    pub fn archive(&mut self) {
        self.archived = true;
    }

    /// Ledger reference for this account.
    #[must_use]
    pub fn entity(&self) -> crate::EntityRef {
        crate::EntityRef::account(self.id)
    }

    /// The adjustment transaction that seeds the ledger with the opening
    /// balance. `None` when the account opened empty.
    pub fn opening_entry(&self) -> ResultEngine<Option<Transaction>> {
        if self.opening_balance.is_zero() {
            return Ok(None);
        }
        Transaction::adjustment(
            self.entity(),
            self.opened_on,
            self.opening_balance,
            "opening balance",
        )
        .map(Some)
    }
}
