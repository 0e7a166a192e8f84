use super::reconciler::*;
use crate::game_data::MIN_BAG_ITEMS_FOR_INIT;
use crate::game_log::{ItemId, LogChunk, SlotWrite};

/// 25 bulk-init entries spread over 8 items (ids 1..=8), page 1.
fn sort_dump() -> Vec<SlotWrite> {
    (0..25u32)
        .map(|slot| SlotWrite::new(1, slot, (slot % 8 + 1) as u64, slot + 1))
        .collect()
}

fn ready_reconciler(writes: &[SlotWrite]) -> InventoryReconciler {
    let mut rec = InventoryReconciler::new();
    rec.start_initialization();
    let mut dump = writes.to_vec();
    // pad with filler items so the dump clears the size threshold
    let filler = MIN_FILLER_START;
    while dump.len() < 20 {
        dump.push(SlotWrite::new(9, dump.len() as u32, filler + dump.len() as u64, 1));
    }
    rec.on_bulk_init_writes(&dump).expect("dump accepted");
    rec
}

const MIN_FILLER_START: u64 = 900_000;

fn chunk(writes: Vec<SlotWrite>) -> LogChunk {
    LogChunk {
        slot_writes: writes,
        ..Default::default()
    }
}

// initialization
#[test]
fn test_bulk_init_scenario() {
    let mut rec = InventoryReconciler::new();
    assert_eq!(rec.state(), ReconcilerState::Uninitialized);
    assert_eq!(rec.start_initialization(), InitRequest::Started);

    let dump = sort_dump();
    assert_eq!(rec.on_bulk_init_writes(&dump), Some(8));
    assert_eq!(rec.state(), ReconcilerState::Ready(BaselineKind::Established));
    assert!(rec.has_baseline());

    for item in 1..=8u64 {
        let expected: i64 = dump
            .iter()
            .filter(|w| w.item_id == ItemId(item))
            .map(|w| w.quantity as i64)
            .sum();
        assert_eq!(rec.baseline_for(ItemId(item)), Some(expected));
    }
}

#[test]
fn test_bulk_init_threshold() {
    let mut rec = InventoryReconciler::new();
    rec.start_initialization();

    let nineteen: Vec<SlotWrite> = (0..19u32).map(|s| SlotWrite::new(1, s, s as u64, 1)).collect();
    assert_eq!(rec.on_bulk_init_writes(&nineteen), None);
    assert_eq!(rec.state(), ReconcilerState::AwaitingBulkInit);
    assert_eq!(rec.slot_count(), 0);

    let twenty: Vec<SlotWrite> = (0..20u32).map(|s| SlotWrite::new(1, s, s as u64, 1)).collect();
    assert_eq!(rec.on_bulk_init_writes(&twenty), Some(20));
    assert_eq!(rec.state(), ReconcilerState::Ready(BaselineKind::Established));
}

#[test]
fn test_bulk_init_ignored_unless_awaiting() {
    let mut rec = InventoryReconciler::new();
    assert_eq!(rec.on_bulk_init_writes(&sort_dump()), None);
    assert_eq!(rec.state(), ReconcilerState::Uninitialized);
}

#[test]
fn test_start_initialization_twice_reports_in_progress() {
    let mut rec = InventoryReconciler::new();
    assert_eq!(rec.start_initialization(), InitRequest::Started);
    assert_eq!(rec.start_initialization(), InitRequest::AlreadyInProgress);
    assert_eq!(rec.state(), ReconcilerState::AwaitingBulkInit);
}

#[test]
fn test_reinitialization_replaces_ledger() {
    let mut rec = ready_reconciler(&[SlotWrite::new(1, 0, 50, 10)]);
    assert_eq!(rec.start_initialization(), InitRequest::Started);

    let dump: Vec<SlotWrite> = (0..20u32).map(|s| SlotWrite::new(2, s, 60, 1)).collect();
    assert_eq!(rec.on_bulk_init_writes(&dump), Some(1));
    assert_eq!(rec.slot_count(), 20);
    assert_eq!(rec.baseline_for(ItemId(60)), Some(20));
    assert_eq!(rec.baseline_for(ItemId(50)), None);
}

// reconciliation
#[test]
fn test_single_slot_gain() {
    let mut rec = ready_reconciler(&[SlotWrite::new(1, 0, 50, 10)]);
    assert_eq!(rec.baseline_for(ItemId(50)), Some(10));

    let deltas = rec.reconcile(&[SlotWrite::new(1, 0, 50, 13)]);
    assert_eq!(deltas, vec![Delta::new(50, 3)]);
    assert_eq!(rec.baseline_for(ItemId(50)), Some(13));
}

#[test]
fn test_identical_chunk_is_idempotent() {
    let mut rec = ready_reconciler(&[SlotWrite::new(1, 0, 50, 10), SlotWrite::new(1, 1, 51, 4)]);
    let same = [SlotWrite::new(1, 0, 50, 10), SlotWrite::new(1, 1, 51, 4)];
    assert!(rec.reconcile(&same).is_empty());
    assert!(rec.reconcile(&same).is_empty());
}

#[test]
fn test_stack_split_is_not_a_gain() {
    let mut rec = ready_reconciler(&[SlotWrite::new(1, 0, 50, 10)]);

    // 10 split into 6 + 4 across two slots
    let deltas = rec.reconcile(&[SlotWrite::new(1, 0, 50, 6), SlotWrite::new(1, 5, 50, 4)]);
    assert!(deltas.is_empty());
    assert_eq!(rec.baseline_for(ItemId(50)), Some(10));
}

#[test]
fn test_conflicting_writes_in_one_chunk() {
    let mut rec = ready_reconciler(&[SlotWrite::new(1, 0, 50, 10)]);

    // later write supersedes the earlier one for the same slot
    let deltas = rec.reconcile(&[
        SlotWrite::new(1, 0, 50, 30),
        SlotWrite::new(1, 0, 50, 12),
        SlotWrite::new(1, 3, 50, 1),
    ]);
    assert_eq!(deltas, vec![Delta::new(50, 3)]);
}

#[test]
fn test_consumption_reports_negative_delta() {
    let mut rec = ready_reconciler(&[SlotWrite::new(1, 0, 50, 10), SlotWrite::new(1, 1, 50, 5)]);
    let deltas = rec.reconcile(&[SlotWrite::new(1, 1, 50, 0)]);
    assert_eq!(deltas, vec![Delta::new(50, -5)]);
}

#[test]
fn test_conservation_over_many_chunks() {
    let mut rec = ready_reconciler(&[SlotWrite::new(1, 0, 50, 10), SlotWrite::new(1, 1, 51, 2)]);
    let chunks = [
        vec![SlotWrite::new(1, 0, 50, 14)],
        vec![SlotWrite::new(1, 0, 50, 9), SlotWrite::new(1, 2, 50, 5)],
        vec![SlotWrite::new(1, 1, 51, 0), SlotWrite::new(1, 2, 50, 0)],
        vec![SlotWrite::new(2, 0, 51, 7)],
        vec![SlotWrite::new(1, 0, 50, 21)],
    ];

    let mut sum_50 = 0;
    let mut sum_51 = 0;
    for writes in &chunks {
        for delta in rec.reconcile(writes) {
            match delta.item_id.0 {
                50 => sum_50 += delta.change,
                51 => sum_51 += delta.change,
                other => panic!("unexpected item {other}"),
            }
        }
    }

    assert_eq!(sum_50, 21 - 10);
    assert_eq!(sum_51, 7 - 2);
}

#[test]
fn test_new_item_gained_after_init() {
    let mut rec = ready_reconciler(&[SlotWrite::new(1, 0, 50, 10)]);
    let deltas = rec.reconcile(&[SlotWrite::new(3, 8, 77, 2)]);
    assert_eq!(deltas, vec![Delta::new(77, 2)]);
}

#[test]
fn test_reconcile_requires_baseline() {
    let mut rec = InventoryReconciler::new();
    assert!(rec.reconcile(&[SlotWrite::new(1, 0, 50, 10)]).is_empty());
    assert_eq!(rec.slot_count(), 0);
}

// map baseline
#[test]
fn test_map_isolation_scenario() {
    let mut rec = ready_reconciler(&[SlotWrite::new(1, 0, 60, 5)]);
    // stock gained before the map must not leak into the map's deltas
    rec.reconcile(&[SlotWrite::new(1, 1, 61, 9)]);
    rec.reset_map_baseline();

    let deltas = rec.reconcile(&[SlotWrite::new(1, 0, 60, 5), SlotWrite::new(1, 2, 70, 2)]);
    assert_eq!(deltas, vec![Delta::new(70, 2)]);
    assert_eq!(rec.map_net_changes(), vec![Delta::new(70, 2)]);
}

#[test]
fn test_awaiting_init_withholds_deltas() {
    let mut rec = ready_reconciler(&[SlotWrite::new(1, 0, 60, 5)]);
    // writes seen while waiting for a re-init are applied without deltas
    rec.start_initialization();
    let waiting = chunk(vec![SlotWrite::new(1, 0, 60, 8)]);
    assert!(rec.scan_for_changes(&waiting).is_empty());
    assert_eq!(rec.slot_count(), 20);
}

// state routing
#[test]
fn test_legacy_bootstrap_adopts_large_snapshot() {
    let mut rec = InventoryReconciler::new();
    let writes: Vec<SlotWrite> = (0..11u32).map(|s| SlotWrite::new(1, s, 40, 1)).collect();

    assert!(rec.scan_for_changes(&chunk(writes)).is_empty());
    assert_eq!(rec.state(), ReconcilerState::Ready(BaselineKind::Absent));
    assert!(!rec.has_baseline());

    // without a baseline only increases are reported
    let deltas = rec.scan_for_changes(&chunk(vec![SlotWrite::new(1, 0, 40, 4), SlotWrite::new(1, 1, 40, 0)]));
    assert_eq!(deltas, vec![Delta::new(40, 2)]);
    let deltas = rec.scan_for_changes(&chunk(vec![SlotWrite::new(1, 0, 40, 0)]));
    assert!(deltas.is_empty());
}

#[test]
fn test_legacy_bootstrap_runs_once() {
    let mut rec = InventoryReconciler::new();
    let few: Vec<SlotWrite> = (0..10u32).map(|s| SlotWrite::new(1, s, 40, 1)).collect();
    assert_eq!(rec.legacy_bootstrap(&few, false), BootstrapOutcome::NotEnough);

    let many: Vec<SlotWrite> = (0..30u32).map(|s| SlotWrite::new(1, s, 40, 1)).collect();
    assert_eq!(rec.legacy_bootstrap(&many, false), BootstrapOutcome::NotApplicable);
    assert_eq!(rec.state(), ReconcilerState::Uninitialized);
}

#[test]
fn test_login_clears_and_stays_uninitialized() {
    let mut rec = InventoryReconciler::new();
    let login = LogChunk {
        slot_writes: (0..15u32).map(|s| SlotWrite::new(1, s, 40, 1)).collect(),
        login_detected: true,
        ..Default::default()
    };

    assert!(rec.scan_for_changes(&login).is_empty());
    assert_eq!(rec.state(), ReconcilerState::Uninitialized);
    assert_eq!(rec.slot_count(), 0);

    // the formal path is still available
    assert_eq!(rec.start_initialization(), InitRequest::Started);
}

#[test]
fn test_untracked_fallback_reports_increases_only() {
    let mut rec = InventoryReconciler::new();
    // first chunk consumes the legacy bootstrap and falls through
    let deltas = rec.scan_for_changes(&chunk(vec![SlotWrite::new(1, 0, 40, 3)]));
    assert_eq!(deltas, vec![Delta::new(40, 3)]);

    let deltas = rec.scan_for_changes(&chunk(vec![SlotWrite::new(1, 0, 40, 1), SlotWrite::new(1, 1, 41, 2)]));
    assert_eq!(deltas, vec![Delta::new(41, 2)]);
}

#[test]
fn test_reset_returns_to_uninitialized() {
    let mut rec = ready_reconciler(&[SlotWrite::new(1, 0, 50, 10)]);
    rec.reset();
    assert_eq!(rec.state(), ReconcilerState::Uninitialized);
    assert_eq!(rec.slot_count(), 0);
    assert_eq!(rec.baseline_for(ItemId(50)), None);
    assert!(rec.bag_summary().is_empty());
}

#[test]
fn test_bag_summary_sorted_totals() {
    let rec = ready_reconciler(&[SlotWrite::new(1, 0, 50, 10), SlotWrite::new(1, 1, 50, 2)]);
    let summary = rec.bag_summary();
    assert_eq!(summary[0], (ItemId(50), 12));
    assert!(summary.windows(2).all(|w| w[0].0 < w[1].0));
}
