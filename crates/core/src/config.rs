//! Configuration structures for the blockvol system.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for a block analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input schema discovery configuration.
    pub schema: SchemaConfig,
    /// Aggregation engine configuration.
    pub engine: EngineConfig,
    /// Artifact export configuration.
    pub export: ExportConfig,
}

/// How input columns are located in the source table's header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Exact name of the block identifier column.
    pub block_id_column: String,
    /// Exact name of the bar index column.
    pub bar_number_column: String,
    /// Exact name of the bar open price column.
    pub open_column: String,
    /// Exact name of the bar close price column.
    pub close_column: String,
    /// Substring identifying a price-level column.
    pub price_token: String,
    /// Substring identifying a per-level buy volume column.
    /// Columns containing an underscore are derived outputs, not levels.
    pub buy_token: String,
    /// Substring identifying a per-level sell volume column.
    pub sell_token: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            block_id_column: "block_id".to_string(),
            bar_number_column: "bar_number".to_string(),
            open_column: "open".to_string(),
            close_column: "close".to_string(),
            price_token: "price".to_string(),
            buy_token: "buy".to_string(),
            sell_token: "sell".to_string(),
        }
    }
}

/// Aggregation engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Expected number of price levels per bar.
    pub levels_per_bar: usize,
    /// `bar_number` value marking a breakout bar.
    pub breakout_sentinel: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            levels_per_bar: crate::types::LEVELS_PER_BAR,
            breakout_sentinel: crate::types::BREAKOUT_BAR,
        }
    }
}

/// Artifact export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving per-block volume-profile artifacts.
    pub profile_dir: PathBuf,
    /// File name of the augmented-record dataset.
    pub records_file: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            profile_dir: PathBuf::from("profiles"),
            records_file: "augmented_bars.json".to_string(),
        }
    }
}
