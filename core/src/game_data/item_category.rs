//! Item type strings as they appear in the price catalog, grouped into the
//! categories the drop view filters by.
//!
//! The catalog has been populated from several translations over time, so
//! most categories carry more than one spelling.

use phf::phf_map;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Currency,
    Ashes,
    Compass,
    Glow,
    Others,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 5] = [
        ItemCategory::Currency,
        ItemCategory::Ashes,
        ItemCategory::Compass,
        ItemCategory::Glow,
        ItemCategory::Others,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ItemCategory::Currency => "Currency",
            ItemCategory::Ashes => "Ashes",
            ItemCategory::Compass => "Compass",
            ItemCategory::Glow => "Memory Glow",
            ItemCategory::Others => "Others",
        }
    }
}

static ITEM_TYPES: phf::Map<&'static str, ItemCategory> = phf_map! {
    "Currency" => ItemCategory::Currency,
    "Hard Currency" => ItemCategory::Currency,
    "Equipment Material" => ItemCategory::Ashes,
    "Ashes" => ItemCategory::Ashes,
    "Compass" => ItemCategory::Compass,
    "Memory Glow" => ItemCategory::Glow,
    "Memory Fluorescence" => ItemCategory::Glow,
    "Special Item" => ItemCategory::Others,
    "Memory Material" => ItemCategory::Others,
    "Gameplay Ticket" => ItemCategory::Others,
    "Game Ticket" => ItemCategory::Others,
    "Map Ticket" => ItemCategory::Others,
    "Cube Material" => ItemCategory::Others,
    "Magic Cube Material" => ItemCategory::Others,
    "Magic Cube Materials" => ItemCategory::Others,
    "Corruption Material" => ItemCategory::Others,
    "Corrosion Material" => ItemCategory::Others,
    "Erosion Material" => ItemCategory::Others,
    "Dream Material" => ItemCategory::Others,
    "Tower Material" => ItemCategory::Others,
    "Tower Materials" => ItemCategory::Others,
    "BOSS Ticket" => ItemCategory::Others,
    "Boss Ticket" => ItemCategory::Others,
    "Divine Emblem" => ItemCategory::Others,
    "God's Emblem" => ItemCategory::Others,
    "Overlap Material" => ItemCategory::Others,
    "Overlay Material" => ItemCategory::Others,
    "Remembrance Material" => ItemCategory::Others,
};

/// Map a catalog item type to its drop-view category. Unrecognized types
/// return `None` and are only shown by the unfiltered view.
pub fn category_for_type(item_type: &str) -> Option<ItemCategory> {
    ITEM_TYPES.get(item_type).copied()
}
