//! Per-block analysis engine.
//!
//! Ties aggregation, profile construction, ranking and divergence together
//! into one `BlockAnalysis` value object per block, then merges the results
//! back onto per-bar output records. Blocks are independent units of work;
//! each analysis reads only its own slice.

use crate::divergence;
use crate::profile::VolumeProfile;
use crate::ranking::BarRanking;
use crate::volume::{bar_volume, block_aggregate, BreakoutPolicy};
use blockvol_core::{
    AugmentedBar, BlockAggregate, BlockId, DivergenceLabel, DominantLevel, Result,
};
use blockvol_ingestion::{BarStore, BlockSlice};
use tracing::debug;

/// Everything derived from one block, computed once after the block is
/// fully materialized.
#[derive(Debug, Clone)]
pub struct BlockAnalysis {
    /// The analyzed block.
    pub block_id: BlockId,
    /// Broadcast volume totals.
    pub aggregate: BlockAggregate,
    /// Price-keyed volume profile.
    pub profile: VolumeProfile,
    /// Dominant price level; absent for blocks with no admitted bars.
    pub dominant: Option<DominantLevel>,
    /// Bars by descending total volume.
    pub ranking: BarRanking,
    /// Divergence of the highest-volume bar; absent when no signal.
    pub divergence: Option<DivergenceLabel>,
}

/// One complete analysis pass over a store.
#[derive(Debug)]
pub struct AnalysisRun {
    /// The inclusion policy the pass ran under.
    pub policy: BreakoutPolicy,
    /// Per-block analyses in first-seen block order.
    pub blocks: Vec<BlockAnalysis>,
    /// Augmented output records: blocks in first-seen order, bars in
    /// original source order within each block.
    pub records: Vec<AugmentedBar>,
}

/// Block analysis engine, parameterized by a breakout inclusion policy.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisEngine {
    policy: BreakoutPolicy,
}

impl AnalysisEngine {
    /// Create an engine for the given policy.
    pub fn new(policy: BreakoutPolicy) -> Self {
        Self { policy }
    }

    /// The active inclusion policy.
    pub fn policy(&self) -> BreakoutPolicy {
        self.policy
    }

    /// Analyze a single fully materialized block.
    pub fn analyze_block(&self, slice: &BlockSlice) -> Result<BlockAnalysis> {
        let aggregate = block_aggregate(slice, self.policy);
        let profile = VolumeProfile::build(slice, self.policy);
        let dominant = profile.dominant_level()?;
        let ranking = BarRanking::build(slice, self.policy);

        let divergence = match (&dominant, ranking.first()) {
            (Some(dom), Some(first)) => divergence::classify(dom.vol_diff, first.close_direction),
            _ => None,
        };

        debug!(
            block = %slice.block_id,
            bars = slice.bars.len(),
            profile_rows = profile.len(),
            "analyzed block"
        );

        Ok(BlockAnalysis {
            block_id: slice.block_id.clone(),
            aggregate,
            profile,
            dominant,
            ranking,
            divergence,
        })
    }

    /// Merge a block's analysis onto its bars as augmented output records.
    ///
    /// Every bar of the block (breakout bars included) receives the same
    /// broadcast block-level fields; absent analytics stay absent.
    pub fn augment_block(&self, slice: &BlockSlice, analysis: &BlockAnalysis) -> Vec<AugmentedBar> {
        let first = analysis.ranking.first();
        let second = analysis.ranking.second();

        slice
            .bars
            .iter()
            .map(|bar| {
                let v = bar_volume(bar);
                AugmentedBar {
                    block_id: bar.block_id.clone(),
                    bar_number: bar.bar_number,
                    price_levels: bar.price_levels.clone(),
                    buy_volume: bar.buy_volume.clone(),
                    sell_volume: bar.sell_volume.clone(),
                    open: bar.open,
                    close: bar.close,
                    bar_buy_vol: v.buy,
                    bar_sell_vol: v.sell,
                    bar_total_vol: v.total,
                    block_buy_vol: analysis.aggregate.buy_total,
                    block_sell_vol: analysis.aggregate.sell_total,
                    block_total_vol: analysis.aggregate.total_volume,
                    buy_vol_at_high_price: analysis.dominant.map(|d| d.buy),
                    sell_vol_at_high_price: analysis.dominant.map(|d| d.sell),
                    vol_diff_at_high_price: analysis.dominant.map(|d| d.vol_diff),
                    close_direction_highest: first.map(|r| r.close_direction),
                    bar_with_greatest_total_vol: first.map(|r| r.bar_number),
                    close_direction_2nd_highest: second.map(|r| r.close_direction),
                    bar_with_2nd_greatest_total_vol: second.map(|r| r.bar_number),
                    divergence_of_highest_vol: analysis.divergence,
                    breakout_vol: analysis.aggregate.breakout_volume,
                }
            })
            .collect()
    }

    /// Run the full pass over every block in the store.
    pub fn run(&self, store: &BarStore) -> Result<AnalysisRun> {
        let mut blocks = Vec::with_capacity(store.block_count());
        let mut records = Vec::with_capacity(store.bar_count());

        for slice in store.blocks() {
            let analysis = self.analyze_block(slice)?;
            records.extend(self.augment_block(slice, &analysis));
            blocks.push(analysis);
        }

        Ok(AnalysisRun {
            policy: self.policy,
            blocks,
            records,
        })
    }
}
