//! Read projections handed to the presentation layer.

use crate::catalog::PriceCatalog;
use crate::game_data::ItemCategory;
use crate::game_log::ItemId;
use chrono::TimeDelta;
use std::collections::BTreeMap;

/// Current map run. `duration` is zero while no map is active.
#[derive(Debug, Clone, PartialEq)]
pub struct MapStats {
    pub drops: BTreeMap<ItemId, i64>,
    pub income: f64,
    pub duration: TimeDelta,
    pub active: bool,
}

/// Whole session, including the running map if any.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalStats {
    pub drops: BTreeMap<ItemId, i64>,
    pub income: f64,
    pub duration: TimeDelta,
    pub map_count: u32,
}

impl MapStats {
    pub fn income_per_minute(&self) -> f64 {
        per_minute(self.income, self.duration)
    }

    pub fn income_per_hour(&self) -> f64 {
        self.income_per_minute() * 60.0
    }

    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration)
    }

    pub fn drops_in(&self, catalog: &PriceCatalog, categories: &[ItemCategory]) -> Vec<(ItemId, i64)> {
        drops_in_categories(&self.drops, catalog, categories)
    }
}

impl TotalStats {
    pub fn income_per_minute(&self) -> f64 {
        per_minute(self.income, self.duration)
    }

    pub fn income_per_hour(&self) -> f64 {
        self.income_per_minute() * 60.0
    }

    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration)
    }

    pub fn drops_in(&self, catalog: &PriceCatalog, categories: &[ItemCategory]) -> Vec<(ItemId, i64)> {
        drops_in_categories(&self.drops, catalog, categories)
    }
}

// Zero when no time has elapsed; otherwise the denominator is at least one
// second so a drop right after map entry does not explode the rate.
fn per_minute(income: f64, duration: TimeDelta) -> f64 {
    let millis = duration.num_milliseconds();
    if millis <= 0 {
        return 0.0;
    }
    let secs = (millis as f64 / 1_000.0).max(1.0);
    income / (secs / 60.0)
}

/// `XmYs`, minutes unbounded.
pub fn format_duration(duration: TimeDelta) -> String {
    let secs = duration.num_seconds().max(0);
    format!("{}m{}s", secs / 60, secs % 60)
}

/// Drops whose catalog type falls in any of `categories`. Items without a
/// catalog entry or with an unrecognized type are left out.
pub fn drops_in_categories(
    drops: &BTreeMap<ItemId, i64>,
    catalog: &PriceCatalog,
    categories: &[ItemCategory],
) -> Vec<(ItemId, i64)> {
    drops
        .iter()
        .filter(|(id, _)| {
            catalog
                .get(**id)
                .and_then(|record| record.category())
                .is_some_and(|category| categories.contains(&category))
        })
        .map(|(id, qty)| (*id, *qty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PriceRecord;

    #[test]
    fn rate_is_zero_without_elapsed_time() {
        assert_eq!(per_minute(100.0, TimeDelta::zero()), 0.0);
    }

    #[test]
    fn rate_floors_denominator_at_one_second() {
        // 10 income in 200ms counts as 10 per second
        assert_eq!(per_minute(10.0, TimeDelta::milliseconds(200)), 600.0);
        assert_eq!(per_minute(30.0, TimeDelta::seconds(120)), 15.0);
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_duration(TimeDelta::seconds(0)), "0m0s");
        assert_eq!(format_duration(TimeDelta::seconds(125)), "2m5s");
        assert_eq!(format_duration(TimeDelta::seconds(3_725)), "62m5s");
    }

    #[test]
    fn filters_drops_by_category() {
        let mut catalog = PriceCatalog::default();
        catalog.insert(ItemId(1), PriceRecord::new("Flame Elementium", "Currency"));
        catalog.insert(ItemId(2), PriceRecord::new("Compass of Fate", "Compass"));
        catalog.insert(ItemId(3), PriceRecord::new("Strange Thing", "Unlisted Type"));

        let drops: BTreeMap<ItemId, i64> =
            [(ItemId(1), 5), (ItemId(2), 1), (ItemId(3), 2), (ItemId(4), 9)].into();

        assert_eq!(
            drops_in_categories(&drops, &catalog, &[ItemCategory::Currency]),
            vec![(ItemId(1), 5)]
        );
        assert_eq!(
            drops_in_categories(&drops, &catalog, &ItemCategory::ALL),
            vec![(ItemId(1), 5), (ItemId(2), 1)]
        );
    }
}
