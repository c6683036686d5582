//! Budget period reconciler.
//!
//! Zero-based check for one month: every unit of planned income must be
//! given a job. The reconciler only reads; running it twice changes
//! nothing, so it can sit behind a "check my budget" button.

use crate::{BudgetPeriod, ExpenseLine, ExpenseLineKind, IncomeEvent, Ledger, Money, TransactionKind};

/// The outcome of reconciling one budget period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub planned_income: Money,
    pub planned_expenses: Money,
    pub fund_allocations: Money,
    /// Income left without a job. Negative means over-planned.
    pub unallocated: Money,
    pub is_balanced: bool,
}

/// Reconciles a period against its income events, expense lines and the
/// fund allocations already recorded in the ledger.
///
/// Income events count when dated inside the period, using the override
/// amount when set. `fund_allocation` expense lines count under
/// `fund_allocations`, not under `planned_expenses`, so earmarked money
/// is never double counted. Recorded fund `allocation` transactions
/// dated inside the period are added on top.
///
/// `is_balanced` means `unallocated` is exactly zero. No epsilon: this
/// is integer cents.
#[must_use]
pub fn reconcile(
    period: &BudgetPeriod,
    income_events: &[IncomeEvent],
    expense_lines: &[ExpenseLine],
    ledger: &Ledger,
) -> ReconciliationResult {
    let planned_income: Money = income_events
        .iter()
        .filter(|event| period.contains(event.date))
        .map(IncomeEvent::counted_amount)
        .sum();

    let mut planned_expenses = Money::ZERO;
    let mut fund_allocations = Money::ZERO;
    for line in expense_lines.iter().filter(|line| line.in_period(period)) {
        match line.kind {
            ExpenseLineKind::Standard => planned_expenses += line.amount,
            ExpenseLineKind::FundAllocation => fund_allocations += line.amount,
        }
    }

    let recorded_allocations: Money = ledger
        .entries()
        .iter()
        .filter(|tx| {
            tx.kind == TransactionKind::Allocation
                && tx.entity.is_fund()
                && period.contains(tx.date)
        })
        .map(|tx| tx.amount)
        .sum();
    fund_allocations += recorded_allocations;

    let unallocated = planned_income - planned_expenses - fund_allocations;
    let result = ReconciliationResult {
        planned_income,
        planned_expenses,
        fund_allocations,
        unallocated,
        is_balanced: unallocated.is_zero(),
    };
    tracing::debug!(
        year = period.year,
        month = period.month,
        income = %result.planned_income,
        expenses = %result.planned_expenses,
        fund_allocations = %result.fund_allocations,
        unallocated = %result.unallocated,
        "period reconciled"
    );
    result
}
