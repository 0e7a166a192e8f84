//! Item metadata and market prices, with a throttled write policy.

mod error;
mod record;
mod store;

pub use error::CatalogError;
pub use record::{FRESH_WINDOW_SECS, Freshness, PriceRecord, STALE_WINDOW_SECS};
pub use store::{CatalogStore, JsonCatalogStore, seed_from_en_table};

use crate::game_log::{ItemId, PriceQuote};
use hashbrown::HashMap;

/// Default throttle window for price writes (one hour).
pub const DEFAULT_THROTTLE_SECS: i64 = 3_600;

/// Source tag stored with prices taken from the local game log.
pub const LOCAL_SOURCE: &str = "Local";

/// Fields accepted by [`PriceCatalog::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub price: f64,
    pub from: String,
}

impl PriceUpdate {
    pub fn local(price: f64) -> Self {
        Self {
            price,
            from: LOCAL_SOURCE.to_string(),
        }
    }
}

/// What happened to one [`PriceCatalog::update`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record was rewritten.
    Persisted,
    /// Within the throttle window of the previous write; nothing changed.
    Throttled,
    /// The item has no catalog entry; prices are only tracked for known items.
    UnknownItem,
}

/// Keyed item records plus an optional persistence collaborator.
///
/// A price write is accepted only when more than the throttle window has
/// elapsed since the stored `last_update`. Anything sooner is a successful
/// no-op, so repeated searches of the same item inside a session do not
/// thrash the store.
pub struct PriceCatalog {
    records: HashMap<ItemId, PriceRecord>,
    throttle_secs: i64,
    store: Option<Box<dyn CatalogStore + Send>>,
}

impl Default for PriceCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_SECS)
    }
}

impl std::fmt::Debug for PriceCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceCatalog")
            .field("records", &self.records.len())
            .field("throttle_secs", &self.throttle_secs)
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

impl PriceCatalog {
    /// In-memory catalog with no persistence.
    pub fn new(throttle_secs: i64) -> Self {
        Self {
            records: HashMap::new(),
            throttle_secs,
            store: None,
        }
    }

    /// Load all records from `store` and keep it for later writes.
    pub fn open(
        store: impl CatalogStore + Send + 'static,
        throttle_secs: i64,
    ) -> Result<Self, CatalogError> {
        let records = store.load()?;
        tracing::info!(items = records.len(), "Price catalog loaded");
        Ok(Self {
            records,
            throttle_secs,
            store: Some(Box::new(store)),
        })
    }

    pub fn insert(&mut self, item_id: ItemId, record: PriceRecord) {
        self.records.insert(item_id, record);
    }

    pub fn get(&self, item_id: ItemId) -> Option<&PriceRecord> {
        self.records.get(&item_id)
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.records.contains_key(&item_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn throttle_secs(&self) -> i64 {
        self.throttle_secs
    }

    /// Throttled write of one item's price. `now` is unix seconds.
    pub fn update(&mut self, item_id: ItemId, update: PriceUpdate, now: i64) -> UpdateOutcome {
        let outcome = self.update_record(item_id, update, now);
        if outcome == UpdateOutcome::Persisted {
            self.persist();
        }
        outcome
    }

    /// Apply every parsed quote and write the store once. Quotes for unknown
    /// items and quotes without listings are skipped. Returns the number of
    /// records rewritten.
    pub fn apply_quotes(&mut self, quotes: &[PriceQuote], now: i64) -> usize {
        let mut persisted = 0;
        for quote in quotes {
            if quote.is_unknown() {
                tracing::debug!(item = %quote.item_id, "Price search returned no listings");
                continue;
            }
            if self.update_record(quote.item_id, PriceUpdate::local(quote.price), now)
                == UpdateOutcome::Persisted
            {
                persisted += 1;
            }
        }
        if persisted > 0 {
            self.persist();
        }
        persisted
    }

    fn update_record(&mut self, item_id: ItemId, update: PriceUpdate, now: i64) -> UpdateOutcome {
        let Some(record) = self.records.get_mut(&item_id) else {
            tracing::debug!(item = %item_id, "Price update for item not in catalog");
            return UpdateOutcome::UnknownItem;
        };

        let elapsed = now.saturating_sub(record.last_update);
        if elapsed <= self.throttle_secs {
            tracing::debug!(item = %item_id, elapsed, price = update.price, "Price update throttled");
            return UpdateOutcome::Throttled;
        }

        record.price = update.price;
        record.last_update = now;
        record.from = Some(update.from);
        tracing::info!(item = %item_id, name = %record.name, price = record.price, "Updated price");
        UpdateOutcome::Persisted
    }

    fn persist(&mut self) {
        if let Some(store) = self.store.as_mut()
            && let Err(e) = store.save(&self.records)
        {
            tracing::error!(error = %e, "Failed to persist price catalog");
        }
    }
}
