//! The module contains the `AllocationRule` model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Money;

/// Where an allocation rule sends money.
///
/// Funds and accounts are ledger entities; a category target feeds the
/// expense plan instead and never produces a ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum AllocationTarget {
    Fund { fund_id: Uuid },
    Category { category_id: Uuid },
    Account { account_id: Uuid },
}

impl AllocationTarget {
    #[must_use]
    pub const fn id(self) -> Uuid {
        match self {
            Self::Fund { fund_id } => fund_id,
            Self::Category { category_id } => category_id,
            Self::Account { account_id } => account_id,
        }
    }
}

/// How a rule computes its share of an income event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    /// Share of the original income amount, in basis points
    /// (1500 = 15%).
    Percentage { basis_points: i64 },
    FixedAmount { amount: Money },
    /// Catch-all: whatever is left after every other rule has run.
    Remainder,
}

/// A standing instruction for splitting incoming money.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRule {
    pub id: Uuid,
    /// `None` applies the rule to every income source.
    pub source_scope: Option<Uuid>,
    pub kind: RuleKind,
    pub target: AllocationTarget,
    /// Lower runs first. Ties keep insertion order.
    pub priority: i32,
    pub active: bool,
}

impl AllocationRule {
    #[must_use]
    pub fn new(kind: RuleKind, target: AllocationTarget, priority: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_scope: None,
            kind,
            target,
            priority,
            active: true,
        }
    }

    /// Restricts the rule to one income source.
    #[must_use]
    pub fn scoped_to(mut self, source_id: Uuid) -> Self {
        self.source_scope = Some(source_id);
        self
    }

    #[must_use]
    pub const fn is_remainder(&self) -> bool {
        matches!(self.kind, RuleKind::Remainder)
    }

    /// Whether the rule applies to an income event from `source_id`.
    #[must_use]
    pub fn applies_to(&self, source_id: Uuid) -> bool {
        self.active && self.source_scope.is_none_or(|scope| scope == source_id)
    }
}
