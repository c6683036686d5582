//! Transaction primitives.
//!
//! A [`Transaction`] is an immutable fact about a single fund or account:
//! once appended to the ledger it is never edited or deleted. Corrections
//! are new `adjustment` entries with the inverse amount.
//!
//! Amounts are stored as the **signed effect** on the owning entity's
//! balance: positive entries credit it, negative entries debit it. The
//! sign is fixed by the transaction kind at construction time, so a
//! `spend` can never accidentally increase a fund.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// Reference to the entity a transaction belongs to.
///
/// A tagged union rather than two nullable foreign keys, so a transaction
/// can never point at a fund and an account at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum EntityRef {
    Fund { fund_id: Uuid },
    Account { account_id: Uuid },
}

impl EntityRef {
    #[must_use]
    pub const fn fund(fund_id: Uuid) -> Self {
        Self::Fund { fund_id }
    }

    #[must_use]
    pub const fn account(account_id: Uuid) -> Self {
        Self::Account { account_id }
    }

    /// The referenced entity id, regardless of kind.
    #[must_use]
    pub const fn id(self) -> Uuid {
        match self {
            Self::Fund { fund_id } => fund_id,
            Self::Account { account_id } => account_id,
        }
    }

    #[must_use]
    pub const fn is_fund(self) -> bool {
        matches!(self, Self::Fund { .. })
    }

    /// `true` when both refs point at the same kind of entity.
    #[must_use]
    pub const fn same_kind(self, other: EntityRef) -> bool {
        self.is_fund() == other.is_fund()
    }
}

/// What a transaction did to its entity.
///
/// Fund entries use `allocation`/`spend`, account entries use
/// `income`/`expense`; transfers and adjustments apply to both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Allocation,
    Spend,
    Income,
    Expense,
    TransferIn,
    TransferOut,
    Adjustment,
}

impl TransactionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allocation => "allocation",
            Self::Spend => "spend",
            Self::Income => "income",
            Self::Expense => "expense",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
            Self::Adjustment => "adjustment",
        }
    }

    /// Whether this kind may appear on the given entity type.
    #[must_use]
    pub const fn valid_for(self, entity: EntityRef) -> bool {
        match self {
            Self::Allocation | Self::Spend => entity.is_fund(),
            Self::Income | Self::Expense => !entity.is_fund(),
            Self::TransferIn | Self::TransferOut | Self::Adjustment => true,
        }
    }

    /// Balance polarity fixed by the kind: `+1` credit, `-1` debit.
    ///
    /// `None` for adjustments, which carry either sign.
    #[must_use]
    pub const fn polarity(self) -> Option<i64> {
        match self {
            Self::Allocation | Self::Income | Self::TransferIn => Some(1),
            Self::Spend | Self::Expense | Self::TransferOut => Some(-1),
            Self::Adjustment => None,
        }
    }

    #[must_use]
    pub const fn is_transfer(self) -> bool {
        matches!(self, Self::TransferIn | Self::TransferOut)
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "allocation" => Ok(Self::Allocation),
            "spend" => Ok(Self::Spend),
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer_in" => Ok(Self::TransferIn),
            "transfer_out" => Ok(Self::TransferOut),
            "adjustment" => Ok(Self::Adjustment),
            other => Err(EngineError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// An immutable ledger fact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub entity: EntityRef,
    pub kind: TransactionKind,
    pub date: NaiveDate,
    /// Signed balance effect in cents.
    pub amount: Money,
    /// Insertion sequence, assigned by the ledger on append. Tie-break for
    /// same-day entries so replays are deterministic.
    pub seq: u64,
    /// Shared by the two legs of a transfer; `None` otherwise.
    pub transfer_id: Option<Uuid>,
    /// The other side of a transfer.
    pub counterparty: Option<EntityRef>,
    /// The income event or expense item this entry originated from.
    pub related_event: Option<Uuid>,
    pub note: Option<String>,
}

impl Transaction {
    /// Creates a non-transfer, non-adjustment transaction.
    ///
    /// `magnitude` must be strictly positive; the signed effect is derived
    /// from the kind's polarity. Transfers are created through
    /// [`Ledger::append_transfer`](crate::Ledger::append_transfer) and
    /// adjustments through [`Transaction::adjustment`].
    pub fn new(
        entity: EntityRef,
        kind: TransactionKind,
        date: NaiveDate,
        magnitude: Money,
    ) -> ResultEngine<Self> {
        if kind.is_transfer() {
            return Err(EngineError::Validation(
                "transfers must be created via append_transfer".to_string(),
            ));
        }
        if !kind.valid_for(entity) {
            return Err(EngineError::Validation(format!(
                "kind {} is not valid for this entity type",
                kind.as_str()
            )));
        }
        if !magnitude.is_positive() {
            return Err(EngineError::Validation("amount must be > 0".to_string()));
        }
        let polarity = kind
            .polarity()
            .ok_or_else(|| EngineError::Validation("use Transaction::adjustment".to_string()))?;
        Ok(Self {
            id: Uuid::new_v4(),
            entity,
            kind,
            date,
            amount: if polarity < 0 { -magnitude } else { magnitude },
            seq: 0,
            transfer_id: None,
            counterparty: None,
            related_event: None,
            note: None,
        })
    }

    /// Creates an `adjustment` transaction with an explicit signed amount.
    ///
    /// Adjustments are the only entries that carry either sign; they
    /// express corrections and opening balances without rewriting history.
    pub fn adjustment(
        entity: EntityRef,
        date: NaiveDate,
        amount: Money,
        note: impl Into<String>,
    ) -> ResultEngine<Self> {
        if amount.is_zero() {
            return Err(EngineError::Validation(
                "adjustment amount must be nonzero".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            entity,
            kind: TransactionKind::Adjustment,
            date,
            amount,
            seq: 0,
            transfer_id: None,
            counterparty: None,
            related_event: None,
            note: Some(note.into()),
        })
    }

    /// One leg of a transfer. Only the ledger builds these, in pairs.
    pub(crate) fn transfer_leg(
        entity: EntityRef,
        date: NaiveDate,
        signed_amount: Money,
        transfer_id: Uuid,
        counterparty: EntityRef,
        note: Option<String>,
    ) -> Self {
        let kind = if signed_amount.is_negative() {
            TransactionKind::TransferOut
        } else {
            TransactionKind::TransferIn
        };
        Self {
            id: Uuid::new_v4(),
            entity,
            kind,
            date,
            amount: signed_amount,
            seq: 0,
            transfer_id: Some(transfer_id),
            counterparty: Some(counterparty),
            related_event: None,
            note,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn related_event(mut self, event_id: Uuid) -> Self {
        self.related_event = Some(event_id);
        self
    }
}
