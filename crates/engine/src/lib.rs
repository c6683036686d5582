//! Fund and allocation ledger engine for zero-based household budgeting.
//!
//! Real money lives in accounts; purpose lives in funds, the virtual
//! envelopes carved out of the pooled balance. Every movement is an
//! immutable [`Transaction`] in an append-only [`Ledger`], and balances
//! are always a pure fold over that history.
//!
//! On top of the ledger sit the planning components: [`allocate`] splits
//! an income event across funds and categories by standing
//! [`AllocationRule`]s, [`reconcile`] checks that a month's income is
//! fully assigned, [`forecast`] projects when a fund reaches its savings
//! target, and [`paycheck`] turns salaried income sources into the net
//! income events everything else consumes.
//!
//! The engine does no I/O. Persistence, transport and UI are
//! collaborators that exchange the serde representations of these types.

pub mod accounts;
pub mod allocation;
pub mod balances;
pub mod error;
pub mod forecast;
pub mod funds;
pub mod ledger;
pub mod money;
pub mod paycheck;
pub mod periods;
pub mod reconcile;
pub mod rules;
pub mod transactions;

pub use accounts::Account;
pub use allocation::{DisbursementPlan, PlanEntry, allocate};
pub use error::EngineError;
pub use forecast::{ForecastResult, forecast};
pub use funds::Fund;
pub use ledger::Ledger;
pub use money::Money;
pub use paycheck::{
    Deduction, DeductionKind, IncomeSource, PayFrequency, PaycheckBreakdown, income_events,
    net_pay, pay_dates,
};
pub use periods::{BudgetPeriod, ExpenseLine, ExpenseLineKind, IncomeEvent, PeriodStatus};
pub use reconcile::{ReconciliationResult, reconcile};
pub use rules::{AllocationRule, AllocationTarget, RuleKind};
pub use transactions::{EntityRef, Transaction, TransactionKind};

/// Convenience alias used across the engine.
pub type ResultEngine<T> = Result<T, EngineError>;
