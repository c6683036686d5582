//! Budget period models.
//!
//! A budget period is one calendar month of planning: expected income
//! events on one side, planned expense lines and fund allocations on the
//! other. The reconciler in [`crate::reconcile`] checks that the two
//! sides meet at exactly zero.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// Lifecycle of a budget period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Draft,
    Active,
    Closed,
}

impl PeriodStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

impl TryFrom<&str> for PeriodStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            other => Err(EngineError::Validation(format!(
                "invalid period status: {other}"
            ))),
        }
    }
}

/// One calendar month of budgeting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPeriod {
    pub year: i32,
    pub month: u32,
    pub status: PeriodStatus,
}

impl BudgetPeriod {
    /// Creates a draft period. `month` must be 1 through 12.
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::Validation(format!(
                "invalid month: {month}"
            )));
        }
        Ok(Self {
            year,
            month,
            status: PeriodStatus::Draft,
        })
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

/// Money that arrived (or is expected) on an account.
///
/// The raw input to allocation and reconciliation. `period_override`
/// replaces the counted amount during reconciliation when only part of
/// an event belongs to this month's plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeEvent {
    pub id: Uuid,
    pub source_id: Uuid,
    pub account_id: Uuid,
    pub date: NaiveDate,
    pub amount: Money,
    pub period_override: Option<Money>,
}

impl IncomeEvent {
    #[must_use]
    pub fn new(source_id: Uuid, account_id: Uuid, date: NaiveDate, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id,
            account_id,
            date,
            amount,
            period_override: None,
        }
    }

    #[must_use]
    pub fn override_for_period(mut self, amount: Money) -> Self {
        self.period_override = Some(amount);
        self
    }

    /// Amount counted when reconciling a period.
    #[must_use]
    pub fn counted_amount(&self) -> Money {
        self.period_override.unwrap_or(self.amount)
    }
}

/// How an expense line participates in the plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseLineKind {
    /// An ordinary planned outflow for a spending category.
    Standard,
    /// Money earmarked for a fund instead of spent. Counted under
    /// `fund_allocations`, never under `planned_expenses`.
    FundAllocation,
}

/// One planned outflow in a month's budget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseLine {
    pub id: Uuid,
    pub category_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub amount: Money,
    pub kind: ExpenseLineKind,
    pub note: Option<String>,
}

impl ExpenseLine {
    #[must_use]
    pub fn new(category_id: Uuid, year: i32, month: u32, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            year,
            month,
            amount,
            kind: ExpenseLineKind::Standard,
            note: None,
        }
    }

    /// Marks this line as an earmark for a fund.
    #[must_use]
    pub fn fund_allocation(mut self) -> Self {
        self.kind = ExpenseLineKind::FundAllocation;
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn in_period(&self, period: &BudgetPeriod) -> bool {
        self.year == period.year && self.month == period.month
    }
}
