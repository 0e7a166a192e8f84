use super::ledger::{ItemBaseline, SlotLedger};
use crate::game_data::{MIN_BAG_ITEMS_FOR_INIT, MIN_BAG_ITEMS_LEGACY};
use crate::game_log::{ItemId, LogChunk, SlotWrite};
use hashbrown::HashMap;

/// How a `Ready` reconciler got there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineKind {
    /// Formal bulk-init: every item has a trusted reference total.
    Established,
    /// Legacy bootstrap adopted whatever slots it saw; there is no baseline,
    /// so only increases can be inferred.
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilerState {
    #[default]
    Uninitialized,
    AwaitingBulkInit,
    Ready(BaselineKind),
}

/// Result of asking for a (re)initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitRequest {
    Started,
    AlreadyInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// A login marker was seen; the ledger was cleared and the state stays
    /// `Uninitialized`.
    LoginReset,
    /// The slot writes were adopted as the ledger without a baseline.
    Adopted { slots: usize },
    /// Too few writes to trust as a bag snapshot.
    NotEnough,
    /// The bootstrap already ran or the reconciler is not `Uninitialized`.
    NotApplicable,
}

/// Net change of one item reported by a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub item_id: ItemId,
    pub change: i64,
}

impl Delta {
    pub fn new(item_id: impl Into<ItemId>, change: i64) -> Self {
        Self {
            item_id: item_id.into(),
            change,
        }
    }
}

/// Infers per-item gains and losses from absolute slot writes.
///
/// The log only ever states "slot S now holds Q". Slot movement is used to
/// pick which items to re-examine; the reported delta is always a full
/// recompute of the item's held total against its baseline, which keeps the
/// result correct across stack splits, cross-slot moves and several writes to
/// the same item within one chunk.
#[derive(Debug, Clone, Default)]
pub struct InventoryReconciler {
    state: ReconcilerState,
    ledger: SlotLedger,
    /// Reference totals as of the last reported delta (or map entry).
    baseline: ItemBaseline,
    /// Totals snapshotted at the most recent map entry or bulk init.
    map_baseline: ItemBaseline,
    legacy_evaluated: bool,
}

impl InventoryReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ReconcilerState {
        self.state
    }

    pub fn is_awaiting_init(&self) -> bool {
        self.state == ReconcilerState::AwaitingBulkInit
    }

    pub fn has_baseline(&self) -> bool {
        self.state == ReconcilerState::Ready(BaselineKind::Established)
    }

    pub fn slot_count(&self) -> usize {
        self.ledger.len()
    }

    pub fn baseline_for(&self, item_id: ItemId) -> Option<i64> {
        self.baseline
            .contains(item_id)
            .then(|| self.baseline.get(item_id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Initialization
    // ─────────────────────────────────────────────────────────────────────────

    /// Begin waiting for the in-game sort dump.
    pub fn start_initialization(&mut self) -> InitRequest {
        if self.state == ReconcilerState::AwaitingBulkInit {
            tracing::warn!("Initialization already in progress");
            return InitRequest::AlreadyInProgress;
        }
        self.state = ReconcilerState::AwaitingBulkInit;
        tracing::info!("Initialization started, waiting for bag sort");
        InitRequest::Started
    }

    /// Accept a bulk dump as the new ledger and baseline. Returns the number
    /// of distinct items when the dump was large enough to be trusted.
    pub fn on_bulk_init_writes(&mut self, writes: &[SlotWrite]) -> Option<usize> {
        if self.state != ReconcilerState::AwaitingBulkInit {
            return None;
        }
        if writes.len() < MIN_BAG_ITEMS_FOR_INIT {
            if !writes.is_empty() {
                tracing::debug!(entries = writes.len(), "Bulk dump too small, still waiting");
            }
            return None;
        }

        self.ledger.clear();
        for write in writes {
            self.ledger.write(write);
        }

        self.baseline.clear();
        let unique_items = self.baseline.refresh_from(&self.ledger);
        self.map_baseline = self.baseline.clone();
        self.state = ReconcilerState::Ready(BaselineKind::Established);

        tracing::info!(
            unique_items,
            slots = writes.len(),
            "Initialization complete"
        );
        Some(unique_items)
    }

    /// One-shot heuristic bootstrap for sessions that never sort the bag.
    pub fn legacy_bootstrap(&mut self, writes: &[SlotWrite], login_detected: bool) -> BootstrapOutcome {
        if self.state != ReconcilerState::Uninitialized || self.legacy_evaluated {
            return BootstrapOutcome::NotApplicable;
        }
        self.legacy_evaluated = true;

        if login_detected {
            tracing::info!("Player login detected, clearing bag state");
            self.ledger.clear();
            return BootstrapOutcome::LoginReset;
        }

        if writes.len() > MIN_BAG_ITEMS_LEGACY {
            for write in writes {
                self.ledger.write(write);
            }
            self.state = ReconcilerState::Ready(BaselineKind::Absent);
            tracing::info!(slots = writes.len(), "Bag state adopted without baseline");
            return BootstrapOutcome::Adopted { slots: writes.len() };
        }

        BootstrapOutcome::NotEnough
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reconciliation
    // ─────────────────────────────────────────────────────────────────────────

    /// Route a chunk's slot writes through whichever path the current state
    /// trusts. Bulk-init handling is separate (`on_bulk_init_writes`) so the
    /// caller can reset the map baseline in between.
    pub fn scan_for_changes(&mut self, chunk: &LogChunk) -> Vec<Delta> {
        match self.state {
            ReconcilerState::Ready(BaselineKind::Established) => self.reconcile(&chunk.slot_writes),
            ReconcilerState::Ready(BaselineKind::Absent) => {
                self.reconcile_untracked(&chunk.slot_writes)
            }
            ReconcilerState::AwaitingBulkInit => {
                for write in &chunk.slot_writes {
                    self.ledger.write(write);
                }
                Vec::new()
            }
            ReconcilerState::Uninitialized => {
                match self.legacy_bootstrap(&chunk.slot_writes, chunk.login_detected) {
                    BootstrapOutcome::LoginReset | BootstrapOutcome::Adopted { .. } => Vec::new(),
                    BootstrapOutcome::NotEnough | BootstrapOutcome::NotApplicable => {
                        self.reconcile_untracked(&chunk.slot_writes)
                    }
                }
            }
        }
    }

    /// Apply writes in arrival order and report every item whose held total
    /// moved away from its baseline. Only valid with an established baseline.
    pub fn reconcile(&mut self, writes: &[SlotWrite]) -> Vec<Delta> {
        if !self.has_baseline() {
            tracing::debug!(state = ?self.state, "Reconcile skipped without baseline");
            return Vec::new();
        }

        let moved = self.apply_writes(writes);
        let mut deltas = Vec::new();

        for (item_id, slot_delta) in moved {
            if slot_delta == 0 {
                continue;
            }
            let current_total = self.ledger.total_for(item_id);
            let net_change = current_total - self.baseline.get(item_id);
            if net_change != 0 {
                tracing::debug!(item = %item_id, net_change, current_total, "Item changed");
                deltas.push(Delta::new(item_id, net_change));
                self.baseline.set(item_id, current_total);
            }
        }

        deltas
    }

    /// Change detection without a baseline: compare held totals before and
    /// after the writes and report increases only.
    pub fn reconcile_untracked(&mut self, writes: &[SlotWrite]) -> Vec<Delta> {
        if writes.is_empty() {
            return Vec::new();
        }

        let mut previous: Vec<(ItemId, i64)> = Vec::new();
        for write in writes {
            if !previous.iter().any(|(id, _)| *id == write.item_id) {
                previous.push((write.item_id, self.ledger.total_for(write.item_id)));
            }
        }

        self.apply_writes(writes);

        previous
            .into_iter()
            .filter_map(|(item_id, before)| {
                let gained = self.ledger.total_for(item_id) - before;
                (gained > 0).then(|| Delta::new(item_id, gained))
            })
            .collect()
    }

    /// Overwrite slots in order, accumulating slot movement per item in
    /// first-touched order.
    fn apply_writes(&mut self, writes: &[SlotWrite]) -> Vec<(ItemId, i64)> {
        let mut order: Vec<(ItemId, i64)> = Vec::new();
        let mut index: HashMap<ItemId, usize> = HashMap::new();

        for write in writes {
            let slot_delta = self.ledger.write(write);
            let idx = *index.entry(write.item_id).or_insert_with(|| {
                order.push((write.item_id, 0));
                order.len() - 1
            });
            order[idx].1 += slot_delta;
        }
        order
    }

    /// Re-anchor every held item at its current total. Called on map entry so
    /// later deltas measure only what happened inside the map.
    pub fn reset_map_baseline(&mut self) -> usize {
        let count = self.baseline.refresh_from(&self.ledger);
        self.map_baseline.clear();
        self.map_baseline.refresh_from(&self.ledger);
        tracing::info!(items = count, "Map baseline reset");
        count
    }

    /// Drop all state; a fresh initialization is required afterwards.
    pub fn reset(&mut self) {
        *self = Self::default();
        tracing::info!("Inventory reconciler reset");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read projections
    // ─────────────────────────────────────────────────────────────────────────

    /// Held total per item, sorted by item id.
    pub fn bag_summary(&self) -> Vec<(ItemId, i64)> {
        let mut summary: Vec<(ItemId, i64)> = self.ledger.totals().into_iter().collect();
        summary.sort_unstable_by_key(|(id, _)| *id);
        summary
    }

    /// Net change per item since the last map entry, sorted by item id.
    pub fn map_net_changes(&self) -> Vec<Delta> {
        let totals = self.ledger.totals();
        let mut items: Vec<ItemId> = totals.keys().copied().collect();
        items.extend(self.map_baseline.iter().map(|(id, _)| id));
        items.sort_unstable();
        items.dedup();

        items
            .into_iter()
            .filter_map(|item_id| {
                let now = totals.get(&item_id).copied().unwrap_or(0);
                let change = now - self.map_baseline.get(item_id);
                (change != 0).then(|| Delta::new(item_id, change))
            })
            .collect()
    }
}
