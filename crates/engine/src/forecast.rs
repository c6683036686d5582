//! Goal forecaster.
//!
//! Answers "when will this fund hit its target?" from recent saving
//! behavior. The rate looks only at `allocation` credits: spends are a
//! fact about the past, not about how fast the household saves, so a
//! raided vacation fund still forecasts from its deposit pace.

use std::collections::BTreeSet;

use chrono::{Datelike, Months, NaiveDate};

use crate::{EngineError, Fund, Ledger, Money, ResultEngine, TransactionKind};

/// Number of trailing distinct months the rate is averaged over.
const RATE_WINDOW_MONTHS: usize = 6;

/// The projection for one goal-bearing fund.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForecastResult {
    pub current_balance: Money,
    pub target_amount: Money,
    /// Average `allocation` inflow per observed month.
    pub monthly_rate: Money,
    /// Projected completion date: `as_of` itself when the goal is
    /// already met, `None` when the fund is not growing.
    pub eta: Option<NaiveDate>,
}

/// Projects when `fund` reaches its target, judged at end of day `as_of`.
///
/// The monthly rate averages `allocation` amounts over the trailing
/// window: the lesser of six distinct calendar months with allocations
/// and the full history. A young fund with two months of deposits is
/// averaged over two months, not penalized for four empty ones.
///
/// Returns `NotApplicable` when the fund carries no target amount.
pub fn forecast(fund: &Fund, ledger: &Ledger, as_of: NaiveDate) -> ResultEngine<ForecastResult> {
    let target_amount = fund.target_amount.ok_or_else(|| {
        EngineError::NotApplicable(format!("fund {} has no target amount", fund.name))
    })?;

    let entity = fund.entity();
    let current_balance = ledger.balance_as_of(entity, as_of);

    let allocations: Vec<(NaiveDate, Money)> = ledger
        .entries()
        .iter()
        .filter(|tx| {
            tx.entity == entity && tx.kind == TransactionKind::Allocation && tx.date <= as_of
        })
        .map(|tx| (tx.date, tx.amount))
        .collect();

    let months: BTreeSet<(i32, u32)> = allocations
        .iter()
        .map(|(date, _)| (date.year(), date.month()))
        .collect();
    let window: BTreeSet<(i32, u32)> = months
        .iter()
        .rev()
        .take(RATE_WINDOW_MONTHS)
        .copied()
        .collect();

    let monthly_rate = if window.is_empty() {
        Money::ZERO
    } else {
        let total: Money = allocations
            .iter()
            .filter(|(date, _)| window.contains(&(date.year(), date.month())))
            .map(|(_, amount)| *amount)
            .sum();
        total.div_truncate(window.len() as i64)
    };

    // A met goal reports `as_of` rather than `None`, so callers can tell
    // "already there" apart from "no contribution history".
    let eta = if current_balance >= target_amount {
        Some(as_of)
    } else if monthly_rate.is_positive() {
        let gap = (target_amount - current_balance).cents();
        let rate = monthly_rate.cents();
        let months_needed = (gap + rate - 1) / rate;
        as_of.checked_add_months(Months::new(months_needed as u32))
    } else {
        None
    };

    Ok(ForecastResult {
        current_balance,
        target_amount,
        monthly_rate,
        eta,
    })
}
