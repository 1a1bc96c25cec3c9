//! Bar record store with explicit block partitioning.
//!
//! All rows are loaded before any block is processed: bars of one block may
//! be scattered non-contiguously in source order. Partitioning happens once
//! on insert; downstream stages consume ready-made per-block slices instead
//! of re-filtering the full table.

use crate::schema::{RawRow, Schema};
use blockvol_core::{BarRecord, BlockId, Error, Result};
use std::collections::HashMap;
use tracing::warn;

/// All bars of one block, in original source order.
#[derive(Debug, Clone)]
pub struct BlockSlice {
    /// The block identifier shared by every bar in the slice.
    pub block_id: BlockId,
    /// Bars in the order they appeared in the input.
    pub bars: Vec<BarRecord>,
}

impl BlockSlice {
    /// Bars admitted to normal aggregation (breakout bars excluded).
    pub fn non_breakout(&self) -> impl Iterator<Item = &BarRecord> {
        self.bars.iter().filter(|b| !b.is_breakout())
    }

    /// Breakout bars only.
    pub fn breakout(&self) -> impl Iterator<Item = &BarRecord> {
        self.bars.iter().filter(|b| b.is_breakout())
    }
}

/// In-memory store of bar records grouped by block.
///
/// Blocks keep first-seen order; bars within a block keep source order.
#[derive(Debug, Default)]
pub struct BarStore {
    blocks: Vec<BlockSlice>,
    index: HashMap<BlockId, usize>,
}

impl BarStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bar, creating its block slice on first sight.
    pub fn insert(&mut self, bar: BarRecord) {
        match self.index.get(&bar.block_id) {
            Some(&idx) => self.blocks[idx].bars.push(bar),
            None => {
                self.index.insert(bar.block_id.clone(), self.blocks.len());
                self.blocks.push(BlockSlice {
                    block_id: bar.block_id.clone(),
                    bars: vec![bar],
                });
            }
        }
    }

    /// Block slices in first-seen order.
    pub fn blocks(&self) -> &[BlockSlice] {
        &self.blocks
    }

    /// Look up a block by id.
    pub fn get(&self, block_id: &str) -> Option<&BlockSlice> {
        self.index.get(block_id).map(|&idx| &self.blocks[idx])
    }

    /// Number of distinct blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total number of stored bars.
    pub fn bar_count(&self) -> usize {
        self.blocks.iter().map(|b| b.bars.len()).sum()
    }

    /// True if no bars are stored.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Statistics about an ingest pass.
#[derive(Debug, Default)]
pub struct IngestStats {
    /// Total raw rows seen.
    pub total_rows: u64,
    /// Rows accepted into the store.
    pub accepted_rows: u64,
    /// Rows rejected as malformed.
    pub rejected_rows: u64,
    /// Accepted rows carrying the breakout sentinel.
    pub breakout_bars: u64,
    /// Rejection errors, with the zero-based source row index.
    pub row_errors: Vec<(u64, Error)>,
}

impl IngestStats {
    /// Fraction of rows rejected.
    pub fn rejected_frac(&self) -> f64 {
        if self.total_rows > 0 {
            self.rejected_rows as f64 / self.total_rows as f64
        } else {
            0.0
        }
    }
}

/// Drives schema extraction over raw rows, partitioning accepted bars into
/// a [`BarStore`] and collecting skip-and-report statistics.
pub struct Ingestor {
    schema: Schema,
    store: BarStore,
    stats: IngestStats,
}

impl Ingestor {
    /// Create an ingestor for a discovered schema.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            store: BarStore::new(),
            stats: IngestStats::default(),
        }
    }

    /// Ingest one raw row. Malformed rows are reported and skipped; the run
    /// continues.
    pub fn ingest_row(&mut self, row: &RawRow) {
        let row_idx = self.stats.total_rows;
        self.stats.total_rows += 1;

        match self.schema.extract(row) {
            Ok(bar) => {
                self.stats.accepted_rows += 1;
                if bar.is_breakout() {
                    self.stats.breakout_bars += 1;
                }
                self.store.insert(bar);
            }
            Err(err) => {
                warn!(row = row_idx, %err, "rejected malformed row");
                self.stats.rejected_rows += 1;
                self.stats.row_errors.push((row_idx, err));
            }
        }
    }

    /// Ingest a batch of raw rows.
    pub fn ingest_rows<'a>(&mut self, rows: impl IntoIterator<Item = &'a RawRow>) {
        for row in rows {
            self.ingest_row(row);
        }
    }

    /// Finish ingestion, yielding the partitioned store and statistics.
    pub fn finish(self) -> (BarStore, IngestStats) {
        (self.store, self.stats)
    }
}

/// Load a full raw table in one call.
///
/// Fails fast only on an unrecognized schema; row-level problems are
/// reported in the returned statistics.
pub fn load_table(
    headers: &[String],
    rows: &[RawRow],
    schema_config: &blockvol_core::config::SchemaConfig,
    engine_config: &blockvol_core::config::EngineConfig,
) -> Result<(BarStore, IngestStats)> {
    let schema = Schema::discover(headers, schema_config, engine_config)?;
    let mut ingestor = Ingestor::new(schema);
    ingestor.ingest_rows(rows);
    Ok(ingestor.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Cell;
    use blockvol_core::config::{EngineConfig, SchemaConfig};

    fn headers() -> Vec<String> {
        let mut h = vec!["block_id".to_string(), "bar_number".to_string()];
        for i in 0..7 {
            h.push(format!("price{i}"));
        }
        for i in 0..7 {
            h.push(format!("buy{i}"));
        }
        for i in 0..7 {
            h.push(format!("sell{i}"));
        }
        h.push("open".to_string());
        h.push("close".to_string());
        h
    }

    fn row(block: &str, bar: f64) -> RawRow {
        let mut cells = vec![Cell::Text(block.to_string()), Cell::Number(bar)];
        for i in 0..7 {
            cells.push(Cell::Number(100.0 + i as f64));
        }
        for _ in 0..7 {
            cells.push(Cell::Number(1.0));
        }
        for _ in 0..7 {
            cells.push(Cell::Number(2.0));
        }
        cells.push(Cell::Number(100.0));
        cells.push(Cell::Number(101.0));
        RawRow::new(cells)
    }

    #[test]
    fn test_partition_scattered_blocks() {
        // Bars of B1 and B2 interleaved in source order.
        let rows = vec![
            row("B1", 0.0),
            row("B2", 0.0),
            row("B1", 1.0),
            row("B2", 1.0),
            row("B1", 2.0),
        ];
        let (store, stats) = load_table(
            &headers(),
            &rows,
            &SchemaConfig::default(),
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(store.block_count(), 2);
        assert_eq!(stats.accepted_rows, 5);

        // First-seen block order, source bar order within blocks.
        assert_eq!(store.blocks()[0].block_id, "B1");
        assert_eq!(store.blocks()[1].block_id, "B2");
        let b1: Vec<i64> = store.get("B1").unwrap().bars.iter().map(|b| b.bar_number).collect();
        assert_eq!(b1, vec![0, 1, 2]);
    }

    #[test]
    fn test_malformed_rows_skipped_not_fatal() {
        let mut bad = row("B1", 1.0);
        bad.cells[9] = Cell::Empty;
        let rows = vec![row("B1", 0.0), bad, row("B1", 2.0)];

        let (store, stats) = load_table(
            &headers(),
            &rows,
            &SchemaConfig::default(),
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.accepted_rows, 2);
        assert_eq!(stats.rejected_rows, 1);
        assert_eq!(stats.row_errors.len(), 1);
        assert_eq!(stats.row_errors[0].0, 1);
        assert_eq!(store.bar_count(), 2);
    }

    #[test]
    fn test_row_errors_keep_full_context() {
        // Rejection errors are stored as-is (including wrapped io errors
        // elsewhere in the taxonomy), not rendered copies.
        let mut bad = row("B9", 4.0);
        bad.cells[9] = Cell::Empty;
        let (_, stats) = load_table(
            &headers(),
            &[bad],
            &SchemaConfig::default(),
            &EngineConfig::default(),
        )
        .unwrap();

        match &stats.row_errors[0].1 {
            Error::MalformedRow {
                block_id,
                bar_number,
                ..
            } => {
                assert_eq!(block_id, "B9");
                assert_eq!(bar_number, "4");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_breakout_split() {
        let rows = vec![row("B1", 0.0), row("B1", -1.0), row("B1", 1.0)];
        let (store, stats) = load_table(
            &headers(),
            &rows,
            &SchemaConfig::default(),
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(stats.breakout_bars, 1);
        let slice = store.get("B1").unwrap();
        assert_eq!(slice.non_breakout().count(), 2);
        assert_eq!(slice.breakout().count(), 1);
    }

    #[test]
    fn test_unrecognized_schema_is_fatal() {
        let err = load_table(
            &["foo".to_string(), "bar".to_string()],
            &[],
            &SchemaConfig::default(),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }
}
