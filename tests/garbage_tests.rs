//! Garbage tests - delivery counters, the ledger and materialization

use std::sync::Arc;

use proptest::prelude::*;
use puyo_duel::core::{Field, GarbageGroup, GarbageLedger, SimpleRng};
use puyo_duel::types::{Puyo, FIELD_WIDTH, GARBAGE_MAX_DROP};

fn ledger_owing(units: usize) -> GarbageLedger {
    let mut ledger = GarbageLedger::new();
    ledger.push(Arc::new(GarbageGroup::new(units)));
    ledger
}

#[test]
fn test_score_converts_at_seventy_per_unit() {
    let mut ledger = GarbageLedger::new();
    assert_eq!(ledger.commit(700), 10);
    assert_eq!(ledger.commit(1000), 14);
    assert_eq!(ledger.score_remainder(), 20);
    assert_eq!(ledger.commit(50), 1);
    assert_eq!(ledger.score_remainder(), 0);
}

#[test]
fn test_cancel_oldest_first() {
    let first = Arc::new(GarbageGroup::new(4));
    let second = Arc::new(GarbageGroup::new(6));
    let mut ledger = GarbageLedger::new();
    ledger.push(first.clone());
    ledger.push(second.clone());

    assert_eq!(ledger.cancel(7), 7);
    assert!(first.is_done());
    assert_eq!(second.cancelled(), 3);
    assert_eq!(ledger.outstanding_total(), 3);
    assert_eq!(ledger.deliveries().len(), 1);

    assert_eq!(ledger.cancel(10), 3);
    assert!(ledger.deliveries().is_empty());
}

#[test]
fn test_materialize_partial_row() {
    for units in 1..FIELD_WIDTH {
        let mut ledger = ledger_owing(units);
        let mut field = Field::new();
        let drop = ledger.materialize(&mut field, &mut SimpleRng::new(9));
        assert_eq!(drop.count, units);
        assert_eq!(drop.cells.len(), units);
        assert_eq!(field.count(Puyo::Garbage), units);
        // scattered units go to distinct columns
        assert!((0..FIELD_WIDTH).all(|x| field.column_height(x) <= 1));
    }
}

#[test]
fn test_materialize_rows_then_scatter() {
    let mut ledger = ledger_owing(14);
    let mut field = Field::new();
    let drop = ledger.materialize(&mut field, &mut SimpleRng::new(3));
    assert_eq!(drop.count, 14);
    assert!((0..FIELD_WIDTH).all(|x| (2..=3).contains(&field.column_height(x))));
    assert_eq!(
        (0..FIELD_WIDTH).filter(|&x| field.column_height(x) == 3).count(),
        2
    );
    assert_eq!(ledger.outstanding_total(), 0);
}

#[test]
fn test_thirty_units_fill_five_rows() {
    let mut ledger = ledger_owing(30);
    let mut field = Field::new();
    let drop = ledger.materialize(&mut field, &mut SimpleRng::new(2));
    assert_eq!(drop.count, 30);
    assert!((0..FIELD_WIDTH).all(|x| field.column_height(x) == 5));
    assert!(ledger.deliveries().is_empty());
}

#[test]
fn test_materialize_caps_at_five_rows() {
    let group = Arc::new(GarbageGroup::new(36));
    let mut ledger = GarbageLedger::new();
    ledger.push(group.clone());
    let mut field = Field::new();

    let drop = ledger.materialize(&mut field, &mut SimpleRng::new(1));
    assert_eq!(drop.count, GARBAGE_MAX_DROP);
    assert!((0..FIELD_WIDTH).all(|x| field.column_height(x) == 5));
    assert_eq!(group.fallen(), 30);
    assert_eq!(ledger.outstanding_total(), 6);
}

#[test]
fn test_full_column_discards_units() {
    let mut ledger = ledger_owing(6);
    let mut field = Field::from_rows(&["X....."; 13]);
    let drop = ledger.materialize(&mut field, &mut SimpleRng::new(1));
    assert_eq!(drop.count, 6);
    assert_eq!(drop.cells.len(), 5);
    assert_eq!(field.count(Puyo::Garbage), 13 + 5);
    assert_eq!(ledger.outstanding_total(), 0);
}

#[test]
fn test_materialize_is_seeded() {
    let place = |seed| {
        let mut ledger = ledger_owing(4);
        let mut field = Field::new();
        ledger.materialize(&mut field, &mut SimpleRng::new(seed));
        field
    };
    assert_eq!(place(77).to_rows(), place(77).to_rows());
}

#[derive(Debug, Clone)]
enum Op {
    Cancel(usize),
    Fall(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![(0usize..20).prop_map(Op::Cancel), (0usize..20).prop_map(Op::Fall)]
}

proptest! {
    #[test]
    fn prop_delivery_never_over_resolves(total in 0usize..60, ops in prop::collection::vec(op_strategy(), 0..20)) {
        let group = GarbageGroup::new(total);
        for op in ops {
            let before = group.remaining();
            let done = match op {
                Op::Cancel(n) => group.cancel(n),
                Op::Fall(n) => group.fall(n),
            };
            prop_assert!(done <= before);
            prop_assert_eq!(group.remaining(), before - done);
            prop_assert!(group.cancelled() + group.fallen() <= group.total());
        }
    }

    #[test]
    fn prop_materialize_takes_at_most_thirty(units in 1usize..80, seed in any::<u32>()) {
        let mut ledger = ledger_owing(units);
        let mut field = Field::new();
        let drop = ledger.materialize(&mut field, &mut SimpleRng::new(seed));
        prop_assert_eq!(drop.count, units.min(GARBAGE_MAX_DROP));
        prop_assert_eq!(field.count(Puyo::Garbage), drop.cells.len());
        prop_assert_eq!(ledger.outstanding_total(), units - drop.count);
    }
}
