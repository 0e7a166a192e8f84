use serde::{Deserialize, Serialize};
use std::fmt;

/// Game-side item template id (`ConfigBaseId` in the log). Many slots may
/// hold the same item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        ItemId(id)
    }
}

/// One physical bag slot holding one item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub page_id: u32,
    pub slot_id: u32,
    pub item_id: ItemId,
}

/// An absolute "slot now holds `quantity`" statement from the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWrite {
    pub page_id: u32,
    pub slot_id: u32,
    pub item_id: ItemId,
    pub quantity: u32,
}

impl SlotWrite {
    pub fn new(page_id: u32, slot_id: u32, item_id: impl Into<ItemId>, quantity: u32) -> Self {
        Self {
            page_id,
            slot_id,
            item_id: item_id.into(),
            quantity,
        }
    }

    pub fn key(&self) -> SlotKey {
        SlotKey {
            page_id: self.page_id,
            slot_id: self.slot_id,
            item_id: self.item_id,
        }
    }
}

/// Average market price parsed from one completed price search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub item_id: ItemId,
    /// Mean of the sampled listings, or [`crate::game_data::UNKNOWN_PRICE`]
    /// when the response carried none.
    pub price: f64,
}

impl PriceQuote {
    pub fn is_unknown(&self) -> bool {
        self.price < 0.0
    }
}

/// Scene markers seen in one chunk. Both flags may be set at once (a quick
/// map that was entered and left between two polls).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapTransition {
    pub entering: bool,
    pub exiting: bool,
}

/// Everything the engine consumes from one chunk of appended log text.
#[derive(Debug, Clone, Default)]
pub struct LogChunk {
    pub slot_writes: Vec<SlotWrite>,
    /// How many of `slot_writes` were logged before the last sort dump line.
    pub slot_writes_before_bulk_init: usize,
    pub bulk_init_writes: Vec<SlotWrite>,
    pub price_quotes: Vec<PriceQuote>,
    pub map_transition: MapTransition,
    pub login_detected: bool,
}

impl LogChunk {
    /// Slot writes logged after the chunk's sort dump; all of them when the
    /// chunk holds no dump.
    pub fn slot_writes_after_bulk_init(&self) -> &[SlotWrite] {
        let from = self.slot_writes_before_bulk_init.min(self.slot_writes.len());
        &self.slot_writes[from..]
    }

    pub fn is_empty(&self) -> bool {
        self.slot_writes.is_empty()
            && self.bulk_init_writes.is_empty()
            && self.price_quotes.is_empty()
            && self.map_transition == MapTransition::default()
            && !self.login_detected
    }
}
