use crate::game_log::{ItemId, SlotKey, SlotWrite};
use hashbrown::HashMap;

/// Current occupancy of every bag slot seen so far. Slots are only ever
/// overwritten, never removed; an emptied slot simply holds zero.
#[derive(Debug, Clone, Default)]
pub struct SlotLedger {
    slots: HashMap<SlotKey, u32>,
}

impl SlotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, key: &SlotKey) -> u32 {
        self.slots.get(key).copied().unwrap_or(0)
    }

    /// Overwrite a slot and return how much it moved.
    pub fn write(&mut self, write: &SlotWrite) -> i64 {
        let previous = self.slots.insert(write.key(), write.quantity).unwrap_or(0);
        write.quantity as i64 - previous as i64
    }

    /// Held total of one item across every slot it occupies.
    pub fn total_for(&self, item_id: ItemId) -> i64 {
        self.slots
            .iter()
            .filter(|(key, _)| key.item_id == item_id)
            .map(|(_, &qty)| qty as i64)
            .sum()
    }

    /// Held totals for every item represented in the ledger.
    pub fn totals(&self) -> HashMap<ItemId, i64> {
        let mut totals: HashMap<ItemId, i64> = HashMap::new();
        for (key, &qty) in &self.slots {
            *totals.entry(key.item_id).or_insert(0) += qty as i64;
        }
        totals
    }
}

/// Reference totals future totals are diffed against.
#[derive(Debug, Clone, Default)]
pub struct ItemBaseline {
    totals: HashMap<ItemId, i64>,
}

impl ItemBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.totals.clear();
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn get(&self, item_id: ItemId) -> i64 {
        self.totals.get(&item_id).copied().unwrap_or(0)
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.totals.contains_key(&item_id)
    }

    pub fn set(&mut self, item_id: ItemId, total: i64) {
        self.totals.insert(item_id, total);
    }

    /// Refresh every item currently held in `ledger` to its held total.
    /// Items absent from the ledger keep their previous entry.
    pub fn refresh_from(&mut self, ledger: &SlotLedger) -> usize {
        let totals = ledger.totals();
        let count = totals.len();
        self.totals.extend(totals);
        count
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, i64)> + '_ {
        self.totals.iter().map(|(&id, &total)| (id, total))
    }
}
