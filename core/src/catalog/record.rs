use crate::game_data::{ItemCategory, category_for_type};
use serde::{Deserialize, Serialize};

/// Seconds a price stays fresh after its last update.
pub const FRESH_WINDOW_SECS: i64 = 7_200;
/// Seconds after which a price is considered old.
pub const STALE_WINDOW_SECS: i64 = 86_400;

/// Stored metadata for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub name: String,
    #[serde(rename = "type", default = "default_item_type")]
    pub item_type: String,
    #[serde(default)]
    pub price: f64,
    /// Unix seconds of the last accepted price write; 0 if never priced.
    #[serde(default)]
    pub last_update: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

fn default_item_type() -> String {
    "Unknown".to_string()
}

impl PriceRecord {
    pub fn new(name: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            item_type: item_type.into(),
            price: 0.0,
            last_update: 0,
            from: None,
        }
    }

    pub fn with_price(mut self, price: f64, last_update: i64) -> Self {
        self.price = price;
        self.last_update = last_update;
        self
    }

    pub fn category(&self) -> Option<ItemCategory> {
        category_for_type(&self.item_type)
    }

    pub fn freshness(&self, now: i64) -> Freshness {
        Freshness::of(self.last_update, now)
    }
}

/// Age bucket of a stored price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Old,
}

impl Freshness {
    pub fn of(last_update: i64, now: i64) -> Self {
        let age = now.saturating_sub(last_update);
        if age < FRESH_WINDOW_SECS {
            Freshness::Fresh
        } else if age < STALE_WINDOW_SECS {
            Freshness::Stale
        } else {
            Freshness::Old
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Freshness::Fresh => "✔",
            Freshness::Stale => "◯",
            Freshness::Old => "✘",
        }
    }
}
