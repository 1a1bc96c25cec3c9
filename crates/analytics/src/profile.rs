//! Per-block volume profile: price -> accumulated buy/sell/total volume.
//!
//! Prices are exact-match keys, not bins: levels from different bars share a
//! profile row only when their price values are exactly equal. Missing keys
//! initialize at zero on first touch.

use crate::volume::BreakoutPolicy;
use blockvol_core::{DominantLevel, Error, LevelVolume, ProfileMap, Result};
use blockvol_core::BarRecord;
use blockvol_ingestion::BlockSlice;
use ordered_float::OrderedFloat;

/// Volume profile for one block.
#[derive(Debug, Clone, Default)]
pub struct VolumeProfile {
    rows: ProfileMap,
}

impl VolumeProfile {
    /// Create an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a block's profile over the bars admitted by `policy`.
    pub fn build(slice: &BlockSlice, policy: BreakoutPolicy) -> Self {
        let mut profile = Self::new();
        for bar in slice.bars.iter().filter(|b| policy.admits(b)) {
            profile.add_bar(bar);
        }
        profile
    }

    /// Accumulate one bar's (price, buy, sell) triples.
    pub fn add_bar(&mut self, bar: &BarRecord) {
        for (price, buy, sell) in bar.levels() {
            self.rows.entry(OrderedFloat(price)).or_default().add(buy, sell);
        }
    }

    /// The profile row at an exact price, if present.
    pub fn get(&self, price: f64) -> Option<&LevelVolume> {
        self.rows.get(&OrderedFloat(price))
    }

    /// The profile row at an exact price; absence at read time is an
    /// internal invariant violation, not a recoverable miss.
    pub fn get_required(&self, price: f64) -> Result<&LevelVolume> {
        self.get(price)
            .ok_or_else(|| Error::invariant(format!("profile row missing at price {price}")))
    }

    /// Profile rows in ascending price order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &LevelVolume)> {
        self.rows.iter().map(|(k, v)| (k.0, v))
    }

    /// Number of distinct price rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if no volume was accumulated.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of row totals across all prices.
    pub fn total_volume(&self) -> f64 {
        self.rows.values().map(|v| v.total).sum()
    }

    /// Price of the row with the greatest total volume.
    ///
    /// Ties resolve to the lowest price: rows iterate in ascending price
    /// order and only a strictly greater total displaces the current best.
    pub fn dominant_price(&self) -> Option<f64> {
        let mut best: Option<(f64, f64)> = None;
        for (price, row) in self.iter() {
            match best {
                Some((_, total)) if row.total <= total => {}
                _ => best = Some((price, row.total)),
            }
        }
        best.map(|(price, _)| price)
    }

    /// The dominant row, read back from the profile at its max-volume price.
    ///
    /// The price comes from scanning this same profile, so a lookup miss
    /// here is an internal invariant violation, not a recoverable absence.
    pub fn dominant_level(&self) -> Result<Option<DominantLevel>> {
        let Some(price) = self.dominant_price() else {
            return Ok(None);
        };
        let row = self.get_required(price)?;
        Ok(Some(DominantLevel {
            price,
            buy: row.buy,
            sell: row.sell,
            total: row.total,
            vol_diff: row.buy - row.sell,
        }))
    }
}
