//! Block analytics for the blockvol system.
//!
//! This crate handles:
//! - Per-bar and per-block volume aggregation
//! - Volume profile construction (price -> buy/sell/total)
//! - Dominant-level and bar-ranking analysis
//! - Divergence classification
//! - Breakout volume aggregation

pub mod divergence;
pub mod engine;
pub mod profile;
pub mod ranking;
pub mod volume;

pub use engine::{AnalysisEngine, AnalysisRun, BlockAnalysis};
pub use profile::VolumeProfile;
pub use ranking::BarRanking;
pub use volume::{bar_volume, block_aggregate, breakout_volume, BreakoutPolicy};
