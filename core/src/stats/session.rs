use super::audit::{AuditSink, DropEntry};
use super::summary::{MapStats, TotalStats};
use crate::catalog::PriceCatalog;
use crate::game_data::{EXEMPT_ITEM_ID, TAX_RATE};
use crate::game_log::ItemId;
use crate::inventory::Delta;
use chrono::{DateTime, Local, TimeDelta};
use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};
use std::collections::BTreeMap;

/// A delta after valuation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuedChange {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: i64,
    /// Unit price after tax.
    pub unit_price: f64,
}

impl ValuedChange {
    pub fn value(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Per-map and whole-session drop and income counters.
pub struct SessionStatistics {
    in_map: bool,
    map_start: DateTime<Local>,
    /// Time spent in completed maps.
    completed_duration: TimeDelta,
    map_count: u32,

    map_drops: BTreeMap<ItemId, i64>,
    session_drops: BTreeMap<ItemId, i64>,
    map_income: f64,
    session_income: f64,

    tax_enabled: bool,
    excluded: HashSet<String>,
    /// Changes for items the catalog did not know yet.
    pending: HashMap<ItemId, i64>,
    audit: Option<Box<dyn AuditSink + Send>>,
}

impl std::fmt::Debug for SessionStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStatistics")
            .field("in_map", &self.in_map)
            .field("map_count", &self.map_count)
            .field("session_income", &self.session_income)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl SessionStatistics {
    pub fn new(tax_enabled: bool, now: DateTime<Local>) -> Self {
        Self {
            in_map: false,
            map_start: now,
            completed_duration: TimeDelta::zero(),
            map_count: 0,
            map_drops: BTreeMap::new(),
            session_drops: BTreeMap::new(),
            map_income: 0.0,
            session_income: 0.0,
            tax_enabled,
            excluded: HashSet::new(),
            pending: HashMap::new(),
            audit: None,
        }
    }

    pub fn with_audit(mut self, sink: impl AuditSink + Send + 'static) -> Self {
        self.audit = Some(Box::new(sink));
        self
    }

    pub fn set_tax_enabled(&mut self, enabled: bool) {
        self.tax_enabled = enabled;
    }

    pub fn tax_enabled(&self) -> bool {
        self.tax_enabled
    }

    /// Item names skipped entirely by valuation.
    pub fn set_excluded<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = names.into_iter().map(Into::into).collect();
    }

    pub fn is_in_map(&self) -> bool {
        self.in_map
    }

    pub fn map_count(&self) -> u32 {
        self.map_count
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Map lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    pub fn enter_map(&mut self, now: DateTime<Local>) {
        self.in_map = true;
        self.map_start = now;
        self.map_drops.clear();
        self.map_income = 0.0;
        self.map_count += 1;
        tracing::info!(map = self.map_count, "Entered map");
    }

    pub fn exit_map(&mut self, now: DateTime<Local>) {
        if !self.in_map {
            return;
        }
        let elapsed = now - self.map_start;
        self.completed_duration += elapsed;
        self.in_map = false;
        tracing::info!(
            duration_secs = elapsed.num_milliseconds() as f64 / 1_000.0,
            "Exited map"
        );
    }

    /// Changes arrived with no map active: treat the player as inside one
    /// without counting a new run. Returns `true` if the state changed.
    pub fn mark_in_map(&mut self, now: DateTime<Local>) -> bool {
        if self.in_map {
            return false;
        }
        self.in_map = true;
        self.map_start = now;
        tracing::debug!("Changes outside a map, assuming map is active");
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Valuation
    // ─────────────────────────────────────────────────────────────────────────

    /// Value reconciler deltas against the catalog. Changes for the same item
    /// are consolidated first.
    pub fn apply_deltas(
        &mut self,
        deltas: &[Delta],
        catalog: &PriceCatalog,
        now: DateTime<Local>,
    ) -> Vec<ValuedChange> {
        let mut consolidated: Vec<(ItemId, i64)> = Vec::new();
        for delta in deltas {
            match consolidated.iter_mut().find(|(id, _)| *id == delta.item_id) {
                Some((_, qty)) => *qty += delta.change,
                None => consolidated.push((delta.item_id, delta.change)),
            }
        }

        let mut valued = Vec::new();
        for (item_id, quantity) in consolidated {
            if quantity == 0 {
                continue;
            }
            if !catalog.contains(item_id) {
                match self.pending.entry(item_id) {
                    Entry::Occupied(mut entry) => {
                        *entry.get_mut() += quantity;
                        if *entry.get() == 0 {
                            entry.remove();
                        }
                    }
                    Entry::Vacant(entry) => {
                        tracing::warn!(item = %item_id, quantity, "Unknown item, buffering");
                        entry.insert(quantity);
                    }
                }
                continue;
            }
            if let Some(change) = self.value_change(item_id, quantity, catalog, now) {
                valued.push(change);
            }
        }
        valued
    }

    /// Re-value buffered changes for items the catalog has since learned.
    pub fn resolve_pending(
        &mut self,
        catalog: &PriceCatalog,
        now: DateTime<Local>,
    ) -> Vec<ValuedChange> {
        let mut known: Vec<(ItemId, i64)> = self
            .pending
            .iter()
            .filter(|(id, _)| catalog.contains(**id))
            .map(|(id, qty)| (*id, *qty))
            .collect();
        known.sort_unstable_by_key(|(id, _)| *id);

        let mut valued = Vec::new();
        for (item_id, quantity) in known {
            self.pending.remove(&item_id);
            if quantity == 0 {
                continue;
            }
            if let Some(change) = self.value_change(item_id, quantity, catalog, now) {
                valued.push(change);
            }
        }
        if !valued.is_empty() {
            tracing::info!(items = valued.len(), "Resolved pending items");
        }
        valued
    }

    /// Buffered changes for items not yet in the catalog, by item id.
    pub fn pending(&self) -> Vec<(ItemId, i64)> {
        let mut pending: Vec<(ItemId, i64)> =
            self.pending.iter().map(|(id, qty)| (*id, *qty)).collect();
        pending.sort_unstable_by_key(|(id, _)| *id);
        pending
    }

    fn value_change(
        &mut self,
        item_id: ItemId,
        quantity: i64,
        catalog: &PriceCatalog,
        now: DateTime<Local>,
    ) -> Option<ValuedChange> {
        let record = catalog.get(item_id)?;
        if self.excluded.contains(&record.name) {
            tracing::debug!(name = %record.name, quantity, "Excluded item");
            return None;
        }

        *self.map_drops.entry(item_id).or_insert(0) += quantity;
        *self.session_drops.entry(item_id).or_insert(0) += quantity;

        let mut unit_price = record.price;
        if self.tax_enabled && item_id.0 != EXEMPT_ITEM_ID {
            unit_price *= TAX_RATE;
        }
        let value = unit_price * quantity as f64;
        self.map_income += value;
        self.session_income += value;

        let entry = DropEntry {
            timestamp: now,
            name: record.name.clone(),
            quantity,
            unit_price,
        };
        tracing::info!("{}", entry);
        if let Some(audit) = self.audit.as_mut()
            && let Err(e) = audit.record(&entry)
        {
            tracing::error!(error = %e, "Failed to write drop log");
        }

        Some(ValuedChange {
            item_id,
            name: entry.name,
            quantity,
            unit_price,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Projections
    // ─────────────────────────────────────────────────────────────────────────

    pub fn current_map_stats(&self, now: DateTime<Local>) -> MapStats {
        MapStats {
            drops: self.map_drops.clone(),
            income: self.map_income,
            duration: self.running_map_duration(now),
            active: self.in_map,
        }
    }

    pub fn total_stats(&self, now: DateTime<Local>) -> TotalStats {
        TotalStats {
            drops: self.session_drops.clone(),
            income: self.session_income,
            duration: self.completed_duration + self.running_map_duration(now),
            map_count: self.map_count,
        }
    }

    fn running_map_duration(&self, now: DateTime<Local>) -> TimeDelta {
        if self.in_map {
            (now - self.map_start).max(TimeDelta::zero())
        } else {
            TimeDelta::zero()
        }
    }

    /// Clear all counters. Tax, exclusions and the audit sink are kept.
    pub fn reset(&mut self, now: DateTime<Local>) {
        self.in_map = false;
        self.map_start = now;
        self.completed_duration = TimeDelta::zero();
        self.map_count = 0;
        self.map_drops.clear();
        self.session_drops.clear();
        self.map_income = 0.0;
        self.session_income = 0.0;
        self.pending.clear();
        tracing::info!("Statistics reset");
    }
}
