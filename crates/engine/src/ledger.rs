//! Append-only ledger store.
//!
//! The single source of truth for fund and account balances. Nothing in
//! here ever mutates or deletes history: corrections are compensating
//! `adjustment` entries, transfers are two legs committed together, and
//! recovery quarantines rather than repairs.
//!
//! Durability belongs to the storage collaborator: it persists the serde
//! representation of [`Ledger::entries`] and hands it back to
//! [`Ledger::restore`] on startup.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{EngineError, EntityRef, Money, ResultEngine, Transaction, TransactionKind};

/// Append-only, immutable sequence of fund and account transactions.
#[derive(Debug, Default)]
pub struct Ledger {
    entries: Vec<Transaction>,
    next_seq: u64,
    /// Entities with a detected history invariant violation. Writes to
    /// them fail with [`EngineError::Consistency`] until released.
    quarantined: HashSet<Uuid>,
}

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from stored records.
    ///
    /// Verifies the transfer-pairing invariant: every `transfer_id` must
    /// appear on exactly two legs with equal and opposite amounts. An
    /// orphaned or unbalanced pair — the trace of a partial multi-row
    /// write upstream — quarantines the entities it touches instead of
    /// failing the whole restore, so the rest of the ledger stays
    /// readable while an operator resolves it.
    #[must_use]
    pub fn restore(records: Vec<Transaction>) -> Self {
        let next_seq = records.iter().map(|tx| tx.seq + 1).max().unwrap_or(0);

        let mut quarantined = HashSet::new();
        let mut transfer_groups: HashMap<Uuid, Vec<&Transaction>> = HashMap::new();
        for tx in &records {
            if validate_record(tx).is_err() {
                tracing::warn!(
                    entity = %tx.entity.id(),
                    txn = %tx.id,
                    "invalid stored transaction, quarantining entity"
                );
                quarantined.insert(tx.entity.id());
            }
            if let Some(transfer_id) = tx.transfer_id {
                transfer_groups.entry(transfer_id).or_default().push(tx);
            }
        }

        for (transfer_id, legs) in &transfer_groups {
            let balanced = legs.len() == 2
                && (legs[0].amount + legs[1].amount).is_zero()
                && legs[0].entity.same_kind(legs[1].entity);
            if !balanced {
                tracing::warn!(
                    %transfer_id,
                    legs = legs.len(),
                    "orphaned or unbalanced transfer, quarantining entities"
                );
                for leg in legs {
                    quarantined.insert(leg.entity.id());
                    if let Some(counterparty) = leg.counterparty {
                        quarantined.insert(counterparty.id());
                    }
                }
            }
        }

        Self {
            entries: records,
            next_seq,
            quarantined,
        }
    }

    /// Appends a single non-transfer transaction, returning its id.
    ///
    /// Fails with `Validation` on a zero amount, a kind that does not
    /// match the entity type, a signed effect that contradicts the kind,
    /// or a transfer kind (those must go through [`append_transfer`]);
    /// fails with `Consistency` when the entity is quarantined.
    ///
    /// [`append_transfer`]: Ledger::append_transfer
    pub fn append(&mut self, tx: Transaction) -> ResultEngine<Uuid> {
        if tx.kind.is_transfer() {
            return Err(EngineError::Validation(
                "transfer legs must be appended via append_transfer".to_string(),
            ));
        }
        validate_record(&tx)?;
        self.ensure_writable(tx.entity)?;

        tracing::debug!(
            entity = %tx.entity.id(),
            kind = tx.kind.as_str(),
            amount = %tx.amount,
            date = %tx.date,
            "ledger append"
        );
        Ok(self.push(tx))
    }

    /// Atomically appends both legs of a transfer.
    ///
    /// The legs share a fresh `transfer_id` and carry equal and opposite
    /// amounts; everything is validated before either leg is pushed, so a
    /// partial transfer is never observable. `amount` is the positive
    /// magnitude moved from `from` to `to`.
    pub fn append_transfer(
        &mut self,
        from: EntityRef,
        to: EntityRef,
        amount: Money,
        date: NaiveDate,
        note: Option<&str>,
    ) -> ResultEngine<(Uuid, Uuid)> {
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "transfer amount must be > 0".to_string(),
            ));
        }
        if from == to {
            return Err(EngineError::Validation(
                "transfer source and destination must differ".to_string(),
            ));
        }
        if !from.same_kind(to) {
            return Err(EngineError::Validation(
                "transfers move money fund-to-fund or account-to-account".to_string(),
            ));
        }
        self.ensure_writable(from)?;
        self.ensure_writable(to)?;

        let transfer_id = Uuid::new_v4();
        let note = note.map(str::to_string);
        let out_leg = Transaction::transfer_leg(from, date, -amount, transfer_id, to, note.clone());
        let in_leg = Transaction::transfer_leg(to, date, amount, transfer_id, from, note);

        tracing::debug!(
            %transfer_id,
            from = %from.id(),
            to = %to.id(),
            amount = %amount,
            "ledger transfer"
        );
        let out_id = self.push(out_leg);
        let in_id = self.push(in_leg);
        Ok((out_id, in_id))
    }

    /// Expresses "undo" as new compensating `adjustment` entries.
    ///
    /// The original entry stays in history; the reversal is dated `date`
    /// and carries the caller's note. Reversing one leg of a transfer
    /// reverses both, keeping the pair's net effect at zero.
    pub fn reverse(
        &mut self,
        txn_id: Uuid,
        date: NaiveDate,
        note: &str,
    ) -> ResultEngine<Vec<Uuid>> {
        let target = self
            .entries
            .iter()
            .find(|tx| tx.id == txn_id)
            .ok_or_else(|| EngineError::Validation(format!("transaction {txn_id} not found")))?;

        let legs: Vec<(EntityRef, Money, Uuid)> = match target.transfer_id {
            Some(transfer_id) => self
                .entries
                .iter()
                .filter(|tx| tx.transfer_id == Some(transfer_id))
                .map(|tx| (tx.entity, tx.amount, tx.id))
                .collect(),
            None => vec![(target.entity, target.amount, target.id)],
        };

        for (entity, _, _) in &legs {
            self.ensure_writable(*entity)?;
        }

        let mut ids = Vec::with_capacity(legs.len());
        for (entity, amount, original_id) in legs {
            let adjustment = Transaction::adjustment(
                entity,
                date,
                -amount,
                format!("reversal of {original_id}: {note}"),
            )?;
            ids.push(self.push(adjustment));
        }
        Ok(ids)
    }

    /// Transactions for one entity, oldest first.
    ///
    /// Ordered by `(date, seq)`: the insertion sequence breaks same-day
    /// ties, so the order is deterministic and replayable. `from`/`to`
    /// bound the dates inclusively when present.
    #[must_use]
    pub fn history(
        &self,
        entity: EntityRef,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Vec<&Transaction> {
        let mut out: Vec<&Transaction> = self
            .entries
            .iter()
            .filter(|tx| tx.entity == entity)
            .filter(|tx| from.is_none_or(|d| tx.date >= d))
            .filter(|tx| to.is_none_or(|d| tx.date <= d))
            .collect();
        out.sort_by_key(|tx| (tx.date, tx.seq));
        out
    }

    /// Looks up a transaction by id.
    #[must_use]
    pub fn get(&self, txn_id: Uuid) -> Option<&Transaction> {
        self.entries.iter().find(|tx| tx.id == txn_id)
    }

    /// Every stored record, in insertion order. This is what the storage
    /// collaborator persists.
    #[must_use]
    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entity ids currently blocked from writes.
    pub fn quarantined(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.quarantined.iter().copied()
    }

    #[must_use]
    pub fn is_quarantined(&self, entity: EntityRef) -> bool {
        self.quarantined.contains(&entity.id())
    }

    /// Operator action: lift the write block after the history has been
    /// corrected out of band (e.g. the missing transfer leg re-appended
    /// by the storage collaborator).
    pub fn release(&mut self, entity_id: Uuid) {
        self.quarantined.remove(&entity_id);
    }

    fn ensure_writable(&self, entity: EntityRef) -> ResultEngine<()> {
        if self.quarantined.contains(&entity.id()) {
            return Err(EngineError::Consistency {
                entity_id: entity.id(),
                reason: "entity is quarantined pending operator resolution".to_string(),
            });
        }
        Ok(())
    }

    fn push(&mut self, mut tx: Transaction) -> Uuid {
        tx.seq = self.next_seq;
        self.next_seq += 1;
        let id = tx.id;
        self.entries.push(tx);
        id
    }
}

/// Invariants every stored record must satisfy, used both on append and
/// when replaying history on restore.
fn validate_record(tx: &Transaction) -> ResultEngine<()> {
    if tx.amount.is_zero() {
        return Err(EngineError::Validation(
            "transaction amount must be nonzero".to_string(),
        ));
    }
    if !tx.kind.valid_for(tx.entity) {
        return Err(EngineError::Validation(format!(
            "kind {} is not valid for this entity type",
            tx.kind.as_str()
        )));
    }
    if let Some(polarity) = tx.kind.polarity() {
        if tx.amount.cents().signum() != polarity {
            return Err(EngineError::Validation(format!(
                "signed effect contradicts kind {}",
                tx.kind.as_str()
            )));
        }
    }
    if tx.kind.is_transfer() && tx.transfer_id.is_none() {
        return Err(EngineError::Validation(
            "transfer leg is missing its transfer id".to_string(),
        ));
    }
    Ok(())
}
