//! End-to-end coverage of the ledger store and balance projection.

use chrono::NaiveDate;
use engine::{
    Account, EngineError, EntityRef, Fund, Ledger, Money, Transaction, TransactionKind,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn credit(ledger: &mut Ledger, entity: EntityRef, on: NaiveDate, cents: i64) {
    let kind = if entity.is_fund() {
        TransactionKind::Allocation
    } else {
        TransactionKind::Income
    };
    ledger
        .append(Transaction::new(entity, kind, on, Money::new(cents)).unwrap())
        .unwrap();
}

#[test]
fn balances_derive_from_history_alone() {
    let mut ledger = Ledger::new();
    let groceries = Fund::new("Groceries");
    let entity = groceries.entity();

    credit(&mut ledger, entity, date(2024, 1, 1), 60_000);
    ledger
        .append(
            Transaction::new(
                entity,
                TransactionKind::Spend,
                date(2024, 1, 8),
                Money::new(12_350),
            )
            .unwrap(),
        )
        .unwrap();
    ledger
        .append(
            Transaction::new(
                entity,
                TransactionKind::Spend,
                date(2024, 1, 15),
                Money::new(8_000),
            )
            .unwrap(),
        )
        .unwrap();

    assert_eq!(ledger.balance(entity), Money::new(39_650));
    assert_eq!(
        ledger.balance_as_of(entity, date(2024, 1, 8)),
        Money::new(47_650)
    );
    // The fund itself carries no balance field to disagree with.
    assert_eq!(ledger.history(entity, None, None).len(), 3);
}

#[test]
fn opening_balance_seeds_account_via_adjustment() {
    let mut ledger = Ledger::new();
    let account = Account::new("Checking", Money::new(150_000), date(2024, 1, 1));
    if let Some(entry) = account.opening_entry().unwrap() {
        ledger.append(entry).unwrap();
    }
    assert_eq!(ledger.balance(account.entity()), Money::new(150_000));

    let empty = Account::new("New savings", Money::ZERO, date(2024, 1, 1));
    assert!(empty.opening_entry().unwrap().is_none());
}

#[test]
fn transfer_between_funds_nets_to_zero() {
    let mut ledger = Ledger::new();
    let vacation = Fund::new("Vacation").entity();
    let emergency = Fund::new("Emergency").entity();
    credit(&mut ledger, vacation, date(2024, 1, 1), 50_000);

    let (out_id, in_id) = ledger
        .append_transfer(
            vacation,
            emergency,
            Money::new(20_000),
            date(2024, 1, 10),
            Some("rebalance"),
        )
        .unwrap();

    assert_eq!(ledger.balance(vacation), Money::new(30_000));
    assert_eq!(ledger.balance(emergency), Money::new(20_000));

    let out_leg = ledger.get(out_id).unwrap();
    let in_leg = ledger.get(in_id).unwrap();
    assert_eq!(out_leg.transfer_id, in_leg.transfer_id);
    assert_eq!(out_leg.amount + in_leg.amount, Money::ZERO);
    assert_eq!(out_leg.counterparty, Some(emergency));
    assert_eq!(in_leg.counterparty, Some(vacation));
}

#[test]
fn failed_transfer_leaves_no_trace() {
    let mut ledger = Ledger::new();
    let fund = Fund::new("Vacation").entity();
    let account = Account::new("Checking", Money::ZERO, date(2024, 1, 1)).entity();

    let err = ledger
        .append_transfer(fund, account, Money::new(10_000), date(2024, 1, 5), None)
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(ledger.is_empty());
}

#[test]
fn history_orders_same_day_entries_by_insertion() {
    let mut ledger = Ledger::new();
    let entity = Fund::new("Bills").entity();
    let day = date(2024, 3, 1);

    credit(&mut ledger, entity, day, 10_000);
    ledger
        .append(
            Transaction::new(entity, TransactionKind::Spend, day, Money::new(4_000)).unwrap(),
        )
        .unwrap();
    credit(&mut ledger, entity, day, 2_500);

    let history = ledger.history(entity, None, None);
    let amounts: Vec<Money> = history.iter().map(|tx| tx.amount).collect();
    assert_eq!(
        amounts,
        vec![Money::new(10_000), Money::new(-4_000), Money::new(2_500)]
    );
    assert!(history.windows(2).all(|w| w[0].seq < w[1].seq));
}

#[test]
fn history_range_is_inclusive() {
    let mut ledger = Ledger::new();
    let entity = Fund::new("Bills").entity();
    credit(&mut ledger, entity, date(2024, 1, 31), 100);
    credit(&mut ledger, entity, date(2024, 2, 1), 200);
    credit(&mut ledger, entity, date(2024, 2, 29), 300);
    credit(&mut ledger, entity, date(2024, 3, 1), 400);

    let feb = ledger.history(entity, Some(date(2024, 2, 1)), Some(date(2024, 2, 29)));
    let amounts: Vec<Money> = feb.iter().map(|tx| tx.amount).collect();
    assert_eq!(amounts, vec![Money::new(200), Money::new(300)]);
}

#[test]
fn reversal_compensates_without_rewriting() {
    let mut ledger = Ledger::new();
    let entity = Fund::new("Groceries").entity();
    credit(&mut ledger, entity, date(2024, 1, 1), 50_000);
    let spend = Transaction::new(
        entity,
        TransactionKind::Spend,
        date(2024, 1, 5),
        Money::new(9_999),
    )
    .unwrap();
    let spend_id = ledger.append(spend).unwrap();

    let ids = ledger
        .reverse(spend_id, date(2024, 1, 6), "entered twice")
        .unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(ledger.balance(entity), Money::new(50_000));

    // The original spend is untouched; the reversal is a new adjustment.
    let original = ledger.get(spend_id).unwrap();
    assert_eq!(original.amount, Money::new(-9_999));
    let reversal = ledger.get(ids[0]).unwrap();
    assert_eq!(reversal.kind, TransactionKind::Adjustment);
    assert_eq!(reversal.amount, Money::new(9_999));
    assert!(reversal.note.as_deref().unwrap().contains("entered twice"));
}

#[test]
fn reversing_unknown_transaction_fails() {
    let mut ledger = Ledger::new();
    let err = ledger
        .reverse(Uuid::new_v4(), date(2024, 1, 1), "nope")
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[test]
fn stored_records_round_trip_through_serde() {
    init_tracing();
    let mut ledger = Ledger::new();
    let from = Fund::new("A").entity();
    let to = Fund::new("B").entity();
    credit(&mut ledger, from, date(2024, 1, 1), 75_000);
    ledger
        .append_transfer(from, to, Money::new(25_000), date(2024, 1, 2), Some("seed"))
        .unwrap();

    let json = serde_json::to_string(ledger.entries()).unwrap();
    let records: Vec<Transaction> = serde_json::from_str(&json).unwrap();
    let restored = Ledger::restore(records);

    assert_eq!(restored.quarantined().count(), 0);
    assert_eq!(restored.balance(from), Money::new(50_000));
    assert_eq!(restored.balance(to), Money::new(25_000));
}

#[test]
fn quarantine_blocks_writes_until_released() {
    init_tracing();
    let mut ledger = Ledger::new();
    let from = Fund::new("A").entity();
    let to = Fund::new("B").entity();
    ledger
        .append_transfer(from, to, Money::new(5_000), date(2024, 1, 2), None)
        .unwrap();

    let mut records = ledger.entries().to_vec();
    records.retain(|tx| tx.kind != TransactionKind::TransferOut);
    let mut restored = Ledger::restore(records);

    let tx = Transaction::new(
        to,
        TransactionKind::Allocation,
        date(2024, 1, 3),
        Money::new(100),
    )
    .unwrap();
    match restored.append(tx.clone()) {
        Err(EngineError::Consistency { entity_id, .. }) => assert_eq!(entity_id, to.id()),
        other => panic!("expected Consistency, got {other:?}"),
    }

    restored.release(to.id());
    restored.release(from.id());
    restored.append(tx).unwrap();
}
