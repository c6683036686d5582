//! Allocation rule engine.
//!
//! Splits an income amount across funds, categories and accounts by
//! standing rules. The computation is pure: it never reads or writes the
//! ledger, so the same amount and rule set always produce the same plan.
//! Recording a plan is a separate, explicit step.
//!
//! Conservation is the load-bearing invariant: the plan entries plus the
//! unassigned residue always equal the income amount to the cent.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    AllocationRule, AllocationTarget, EngineError, EntityRef, Ledger, Money, ResultEngine,
    RuleKind, Transaction, TransactionKind,
};

/// One line of a disbursement plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanEntry {
    pub rule_id: Uuid,
    pub target: AllocationTarget,
    pub amount: Money,
}

/// The computed split of a single income amount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisbursementPlan {
    pub entries: Vec<PlanEntry>,
    /// What no rule claimed. Zero whenever a remainder rule applies.
    pub unassigned: Money,
}

impl DisbursementPlan {
    /// Sum of all plan entries.
    #[must_use]
    pub fn assigned(&self) -> Money {
        self.entries.iter().map(|entry| entry.amount).sum()
    }
}

/// Computes the disbursement plan for one income amount.
///
/// Applicable rules (active, scope matching `source_id`) run in priority
/// order, lowest first, with insertion order breaking ties. Remainder
/// rules run last regardless of priority; among remainders a
/// source-scoped one beats a global one. Percentages are taken of the
/// original income amount, and every computed share is clamped to what
/// is still unassigned, so over-subscribed rule sets degrade to
/// zero-amount entries instead of going negative.
pub fn allocate(
    income_amount: Money,
    source_id: Uuid,
    rules: &[AllocationRule],
) -> ResultEngine<DisbursementPlan> {
    if !income_amount.is_positive() {
        return Err(EngineError::Validation(
            "income amount must be > 0".to_string(),
        ));
    }

    let applicable: Vec<&AllocationRule> = rules
        .iter()
        .filter(|rule| rule.applies_to(source_id))
        .collect();

    let scoped_remainders = applicable
        .iter()
        .filter(|rule| rule.is_remainder() && rule.source_scope.is_some())
        .count();
    let global_remainders = applicable
        .iter()
        .filter(|rule| rule.is_remainder() && rule.source_scope.is_none())
        .count();
    if scoped_remainders > 1 || global_remainders > 1 {
        return Err(EngineError::Configuration(
            "only one default/remainder rule allowed per income source".to_string(),
        ));
    }

    // Stable sort keeps insertion order for equal priorities. Remainders
    // sort after everything else, scoped remainder before the global one.
    let mut ordered = applicable;
    ordered.sort_by_key(|rule| {
        let band = match (rule.is_remainder(), rule.source_scope) {
            (false, _) => 0,
            (true, Some(_)) => 1,
            (true, None) => 2,
        };
        (band, rule.priority)
    });

    let mut remaining = income_amount;
    let mut entries = Vec::with_capacity(ordered.len());
    for rule in ordered {
        let computed = match rule.kind {
            RuleKind::Percentage { basis_points } => income_amount.percent_bp(basis_points),
            RuleKind::FixedAmount { amount } => amount,
            RuleKind::Remainder => remaining,
        };
        let amount = computed.min(remaining).max(Money::ZERO);
        remaining -= amount;
        entries.push(PlanEntry {
            rule_id: rule.id,
            target: rule.target,
            amount,
        });
    }

    tracing::debug!(
        income = %income_amount,
        %source_id,
        entries = entries.len(),
        unassigned = %remaining,
        "allocation plan computed"
    );
    Ok(DisbursementPlan {
        entries,
        unassigned: remaining,
    })
}

impl Ledger {
    /// Records a disbursement plan as ledger transactions.
    ///
    /// Fund entries become `allocation` credits and account entries
    /// become `income` credits, each linked to the originating income
    /// event via `related_event`. Category entries feed expense planning
    /// and are skipped, as are zero-amount clamps (nothing moved).
    pub fn record_plan(
        &mut self,
        plan: &DisbursementPlan,
        date: NaiveDate,
        event_id: Uuid,
    ) -> ResultEngine<Vec<Uuid>> {
        let mut ids = Vec::new();
        for entry in &plan.entries {
            if entry.amount.is_zero() {
                continue;
            }
            let (entity, kind) = match entry.target {
                AllocationTarget::Fund { fund_id } => {
                    (EntityRef::fund(fund_id), TransactionKind::Allocation)
                }
                AllocationTarget::Account { account_id } => {
                    (EntityRef::account(account_id), TransactionKind::Income)
                }
                AllocationTarget::Category { .. } => continue,
            };
            let tx = Transaction::new(entity, kind, date, entry.amount)?.related_event(event_id);
            ids.push(self.append(tx)?);
        }
        Ok(ids)
    }
}
