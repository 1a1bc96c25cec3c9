//! Bar ranking by total volume within a block.
//!
//! The block must be fully materialized before ranking. One stable sort
//! serves both ranks: equal-volume bars keep their original source order.

use crate::volume::{bar_volume, BreakoutPolicy};
use blockvol_core::RankedBar;
use blockvol_ingestion::BlockSlice;

/// Bars of a block ordered by descending total volume.
#[derive(Debug, Clone, Default)]
pub struct BarRanking {
    ranked: Vec<RankedBar>,
}

impl BarRanking {
    /// Rank the bars admitted by `policy`, highest total volume first.
    pub fn build(slice: &BlockSlice, policy: BreakoutPolicy) -> Self {
        let mut ranked: Vec<RankedBar> = slice
            .bars
            .iter()
            .filter(|b| policy.admits(b))
            .map(|bar| RankedBar {
                bar_number: bar.bar_number,
                total_volume: bar_volume(bar).total,
                close_direction: bar.close_direction(),
            })
            .collect();

        // Stable: ties keep original bar order.
        ranked.sort_by(|a, b| {
            b.total_volume
                .partial_cmp(&a.total_volume)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Self { ranked }
    }

    /// The highest-volume bar, if the block has any admitted bars.
    pub fn first(&self) -> Option<&RankedBar> {
        self.ranked.first()
    }

    /// The second-highest-volume bar; absent for blocks with fewer than
    /// two admitted bars.
    pub fn second(&self) -> Option<&RankedBar> {
        self.ranked.get(1)
    }

    /// All ranked bars, highest volume first.
    pub fn bars(&self) -> &[RankedBar] {
        &self.ranked
    }

    /// Number of ranked bars.
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// True if the block had no admitted bars.
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}
