//! Core data types for the blockvol system.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque identifier grouping bars into a block.
pub type BlockId = String;

/// Price type with ordering support, used as a profile key.
pub type Price = OrderedFloat<f64>;

/// Volume/size type.
pub type Volume = f64;

/// Sentinel `bar_number` marking a breakout bar.
pub const BREAKOUT_BAR: i64 = -1;

/// Number of price levels sampled within a bar.
pub const LEVELS_PER_BAR: usize = 7;

/// One row of raw input: a sub-interval of a block with per-level volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarRecord {
    /// Identifier of the block this bar belongs to.
    pub block_id: BlockId,
    /// Bar index within the block; `-1` marks a breakout bar.
    pub bar_number: i64,
    /// Price points sampled within the bar.
    pub price_levels: Vec<f64>,
    /// Buy volume per price level, index-aligned with `price_levels`.
    pub buy_volume: Vec<f64>,
    /// Sell volume per price level, index-aligned with `price_levels`.
    pub sell_volume: Vec<f64>,
    /// Open price of the bar.
    pub open: f64,
    /// Close price of the bar.
    pub close: f64,
}

impl BarRecord {
    /// True if this bar carries the breakout sentinel.
    #[inline]
    pub fn is_breakout(&self) -> bool {
        self.bar_number == BREAKOUT_BAR
    }

    /// Direction of the bar's close relative to its open.
    #[inline]
    pub fn close_direction(&self) -> CloseDirection {
        CloseDirection::from_prices(self.open, self.close)
    }

    /// Iterate the (price, buy, sell) triples of this bar in lock-step.
    pub fn levels(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.price_levels
            .iter()
            .zip(self.buy_volume.iter())
            .zip(self.sell_volume.iter())
            .map(|((&p, &b), &s)| (p, b, s))
    }
}

/// Price direction of a bar's close relative to its open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseDirection {
    /// Close above open.
    Up,
    /// Close below open.
    Down,
    /// Close equal to open.
    Equal,
}

impl CloseDirection {
    /// Classify `sign(close - open)`.
    #[inline]
    pub fn from_prices(open: f64, close: f64) -> Self {
        if close > open {
            CloseDirection::Up
        } else if close < open {
            CloseDirection::Down
        } else {
            CloseDirection::Equal
        }
    }
}

/// Per-bar volume sums over all price levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarVolume {
    /// Sum of per-level buy volume.
    pub buy: Volume,
    /// Sum of per-level sell volume.
    pub sell: Volume,
    /// `buy + sell`.
    pub total: Volume,
}

impl BarVolume {
    /// Zero volume.
    pub fn zero() -> Self {
        Self {
            buy: 0.0,
            sell: 0.0,
            total: 0.0,
        }
    }
}

/// Accumulated buy/sell/total volume at a single profile price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelVolume {
    pub buy: Volume,
    pub sell: Volume,
    pub total: Volume,
}

impl LevelVolume {
    /// Accumulate one (buy, sell) contribution into this row.
    #[inline]
    pub fn add(&mut self, buy: Volume, sell: Volume) {
        self.buy += buy;
        self.sell += sell;
        self.total += buy + sell;
    }
}

/// Price-keyed volume profile for one block.
///
/// Keys are exact prices (no binning): two levels from different bars land in
/// the same row only when their price values are exactly equal.
pub type ProfileMap = BTreeMap<Price, LevelVolume>;

/// The profile row with the greatest total volume in a block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DominantLevel {
    /// Price of the dominant row. Ties resolve to the lowest price.
    pub price: f64,
    /// Buy volume at the dominant price.
    pub buy: Volume,
    /// Sell volume at the dominant price.
    pub sell: Volume,
    /// Total volume at the dominant price.
    pub total: Volume,
    /// `buy - sell` at the dominant price.
    pub vol_diff: Volume,
}

/// A bar ranked by total volume within its block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedBar {
    /// Bar number of the ranked bar.
    pub bar_number: i64,
    /// The bar's total volume.
    pub total_volume: Volume,
    /// Direction of the bar's close.
    pub close_direction: CloseDirection,
}

/// Divergence between dominant-level volume imbalance and close direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DivergenceLabel {
    /// Buyers dominated the key level yet price closed lower.
    #[serde(rename = "Positive_Volume_Negative_Close")]
    PositiveVolumeNegativeClose,
    /// Sellers dominated the key level yet price closed higher.
    #[serde(rename = "Negative_Volume_Positive_Close")]
    NegativeVolumePositiveClose,
}

/// Block-wide volume totals, broadcast onto every bar of the block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockAggregate {
    /// Buy volume summed over admitted bars.
    pub buy_total: Volume,
    /// Sell volume summed over admitted bars.
    pub sell_total: Volume,
    /// `buy_total + sell_total`.
    pub total_volume: Volume,
    /// Total volume over breakout bars only.
    pub breakout_volume: Volume,
}

impl BlockAggregate {
    /// An empty aggregate (block with no admitted bars).
    pub fn empty() -> Self {
        Self {
            buy_total: 0.0,
            sell_total: 0.0,
            total_volume: 0.0,
            breakout_volume: 0.0,
        }
    }
}

/// An input bar augmented with its per-bar and per-block analytics.
///
/// Optional fields are genuinely absent when the block cannot produce them
/// (empty block, single-bar block, no divergence) rather than zero-filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentedBar {
    pub block_id: BlockId,
    pub bar_number: i64,
    pub price_levels: Vec<f64>,
    pub buy_volume: Vec<f64>,
    pub sell_volume: Vec<f64>,
    pub open: f64,
    pub close: f64,
    pub bar_buy_vol: Volume,
    pub bar_sell_vol: Volume,
    pub bar_total_vol: Volume,
    pub block_buy_vol: Volume,
    pub block_sell_vol: Volume,
    pub block_total_vol: Volume,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_vol_at_high_price: Option<Volume>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_vol_at_high_price: Option<Volume>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vol_diff_at_high_price: Option<Volume>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_direction_highest: Option<CloseDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_with_greatest_total_vol: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_direction_2nd_highest: Option<CloseDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_with_2nd_greatest_total_vol: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divergence_of_highest_vol: Option<DivergenceLabel>,
    pub breakout_vol: Volume,
}
