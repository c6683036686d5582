//! The module contains the `Fund` struct and its implementation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Money;

/// A virtual savings envelope.
///
/// A fund holds no real money; it earmarks part of the household's pooled
/// balance for a purpose ("Emergency", "Vacation"). Its balance is never
/// stored here — it is always derived by the ledger projection, so there
/// is no cached figure to drift out of sync.
///
/// Funds referenced by ledger history are never deleted, only archived.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    /// Stable identifier, generated once so the fund can be renamed
    /// without breaking ledger references.
    pub id: Uuid,
    pub name: String,
    /// Savings goal, if this fund is goal-bearing.
    pub target_amount: Option<Money>,
    pub target_date: Option<NaiveDate>,
    /// Display-only back-reference to the account the money nominally
    /// sits in; ownership is not enforced at the account level.
    pub primary_account_id: Option<Uuid>,
    pub archived: bool,
}

impl Fund {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target_amount: None,
            target_date: None,
            primary_account_id: None,
            archived: false,
        }
    }

    #[must_use]
    pub fn target(mut self, amount: Money) -> Self {
        self.target_amount = Some(amount);
        self
    }

    #[must_use]
    pub fn target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }

    #[must_use]
    pub fn primary_account(mut self, account_id: Uuid) -> Self {
        self.primary_account_id = Some(account_id);
        self
    }

    /// Soft-deactivate. History stays intact.
    pub fn archive(&mut self) {
        self.archived = true;
    }

    /// Ledger reference for this fund.
    #[must_use]
    pub fn entity(&self) -> crate::EntityRef {
        crate::EntityRef::fund(self.id)
    }
}
