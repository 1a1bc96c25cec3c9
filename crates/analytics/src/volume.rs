//! Per-bar and per-block volume aggregation.
//!
//! Per-bar sums are pure functions of one record; block totals broadcast the
//! same value onto every bar of the block. Breakout bars are excluded from
//! block totals under the default policy and tracked as a separate scalar.

use blockvol_core::{BarRecord, BarVolume, BlockAggregate};
use blockvol_ingestion::BlockSlice;

/// Which bars a block-level aggregation admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakoutPolicy {
    /// Breakout bars are kept out of totals, profile and ranking; their
    /// volume is reported only as the separate breakout scalar.
    Exclude,
    /// Breakout bars are folded into the same aggregations.
    Include,
}

impl BreakoutPolicy {
    /// True if the policy admits this bar to normal aggregation.
    #[inline]
    pub fn admits(self, bar: &BarRecord) -> bool {
        match self {
            BreakoutPolicy::Exclude => !bar.is_breakout(),
            BreakoutPolicy::Include => true,
        }
    }
}

/// Sum a bar's buy/sell volume over its price levels.
pub fn bar_volume(bar: &BarRecord) -> BarVolume {
    let buy: f64 = bar.buy_volume.iter().sum();
    let sell: f64 = bar.sell_volume.iter().sum();
    BarVolume {
        buy,
        sell,
        total: buy + sell,
    }
}

/// Total volume of a block's breakout bars. Zero when there are none.
pub fn breakout_volume(slice: &BlockSlice) -> f64 {
    slice.breakout().map(|bar| bar_volume(bar).total).sum()
}

/// Block-wide totals over the bars admitted by `policy`.
pub fn block_aggregate(slice: &BlockSlice, policy: BreakoutPolicy) -> BlockAggregate {
    let mut buy_total = 0.0;
    let mut sell_total = 0.0;

    for bar in slice.bars.iter().filter(|b| policy.admits(b)) {
        let v = bar_volume(bar);
        buy_total += v.buy;
        sell_total += v.sell;
    }

    BlockAggregate {
        buy_total,
        sell_total,
        total_volume: buy_total + sell_total,
        breakout_volume: breakout_volume(slice),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockvol_core::BarRecord;

    fn make_bar(bar_number: i64, buy: [f64; 7], sell: [f64; 7]) -> BarRecord {
        BarRecord {
            block_id: "B1".to_string(),
            bar_number,
            price_levels: (0..7).map(|i| 100.0 + i as f64).collect(),
            buy_volume: buy.to_vec(),
            sell_volume: sell.to_vec(),
            open: 100.0,
            close: 101.0,
        }
    }

    fn slice(bars: Vec<BarRecord>) -> BlockSlice {
        BlockSlice {
            block_id: "B1".to_string(),
            bars,
        }
    }

    #[test]
    fn test_bar_volume_identity() {
        let bar = make_bar(0, [30.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], [5.0; 7]);
        let v = bar_volume(&bar);
        assert!((v.buy - 30.0).abs() < 1e-10);
        assert!((v.sell - 35.0).abs() < 1e-10);
        assert!((v.total - (v.buy + v.sell)).abs() < 1e-10);
    }

    #[test]
    fn test_block_totals_exclude_breakout() {
        let s = slice(vec![
            make_bar(0, [10.0; 7], [1.0; 7]),
            make_bar(-1, [100.0; 7], [100.0; 7]),
            make_bar(1, [20.0; 7], [2.0; 7]),
        ]);
        let agg = block_aggregate(&s, BreakoutPolicy::Exclude);
        assert!((agg.buy_total - 210.0).abs() < 1e-10);
        assert!((agg.sell_total - 21.0).abs() < 1e-10);
        assert!((agg.total_volume - 231.0).abs() < 1e-10);
        assert!((agg.breakout_volume - 1400.0).abs() < 1e-10);
    }

    #[test]
    fn test_include_policy_folds_breakout() {
        let s = slice(vec![
            make_bar(0, [10.0; 7], [1.0; 7]),
            make_bar(-1, [100.0; 7], [100.0; 7]),
        ]);
        let agg = block_aggregate(&s, BreakoutPolicy::Include);
        assert!((agg.buy_total - 770.0).abs() < 1e-10);
        assert!((agg.sell_total - 707.0).abs() < 1e-10);
        // Breakout scalar still reported under either policy.
        assert!((agg.breakout_volume - 1400.0).abs() < 1e-10);
    }

    #[test]
    fn test_partition_identity() {
        // block_total + breakout_vol == sum over all bars.
        let s = slice(vec![
            make_bar(0, [10.0; 7], [1.0; 7]),
            make_bar(-1, [3.0; 7], [4.0; 7]),
            make_bar(1, [5.0; 7], [6.0; 7]),
        ]);
        let agg = block_aggregate(&s, BreakoutPolicy::Exclude);
        let all: f64 = s.bars.iter().map(|b| bar_volume(b).total).sum();
        assert!((agg.total_volume + agg.breakout_volume - all).abs() < 1e-10);
    }

    #[test]
    fn test_no_breakout_bars_zero_scalar() {
        let s = slice(vec![make_bar(0, [1.0; 7], [1.0; 7])]);
        assert!((breakout_volume(&s) - 0.0).abs() < 1e-10);
    }
}
