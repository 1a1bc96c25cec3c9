//! Input schema discovery and row extraction.
//!
//! The external loader hands us a header row and header-aligned raw rows.
//! Columns are located by name, not position: any column whose name contains
//! `price` is a price level; any column containing `buy` (or `sell`) without
//! an underscore is a per-level volume column, which keeps raw `buy0` distinct
//! from derived outputs such as `bar_buy_vol`.

use blockvol_core::config::{EngineConfig, SchemaConfig};
use blockvol_core::{BarRecord, Error, Result};

/// One cell of a raw input row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Textual cell (identifiers).
    Text(String),
    /// Numeric cell.
    Number(f64),
    /// Missing value.
    Empty,
}

impl Cell {
    fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            Cell::Empty => None,
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Empty => None,
        }
    }
}

/// A header-aligned raw row from the external loader.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// Cells in header order.
    pub cells: Vec<Cell>,
}

impl RawRow {
    /// Build a row from cells.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}

/// Column positions discovered from the header row.
#[derive(Debug, Clone)]
pub struct Schema {
    block_id: usize,
    bar_number: usize,
    open: usize,
    close: usize,
    price_cols: Vec<usize>,
    buy_cols: Vec<usize>,
    sell_cols: Vec<usize>,
    headers: Vec<String>,
}

impl Schema {
    /// Discover the schema from a header row.
    ///
    /// An unrecognized schema (missing named column, mismatched level column
    /// counts) is fatal for the whole run and reported once.
    pub fn discover(
        headers: &[String],
        schema_config: &SchemaConfig,
        engine_config: &EngineConfig,
    ) -> Result<Self> {
        let find_exact = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| Error::schema(format!("missing required column '{name}'")))
        };

        let block_id = find_exact(&schema_config.block_id_column)?;
        let bar_number = find_exact(&schema_config.bar_number_column)?;
        let open = find_exact(&schema_config.open_column)?;
        let close = find_exact(&schema_config.close_column)?;

        let price_cols: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.contains(&schema_config.price_token))
            .map(|(i, _)| i)
            .collect();

        // Raw level columns carry no underscore; derived names like
        // `bar_buy_vol` do.
        let level_cols = |token: &str| -> Vec<usize> {
            headers
                .iter()
                .enumerate()
                .filter(|(_, h)| h.contains(token) && !h.contains('_'))
                .map(|(i, _)| i)
                .collect()
        };
        let buy_cols = level_cols(&schema_config.buy_token);
        let sell_cols = level_cols(&schema_config.sell_token);

        let expected = engine_config.levels_per_bar;
        if price_cols.len() != expected {
            return Err(Error::schema(format!(
                "expected {expected} price columns, found {}",
                price_cols.len()
            )));
        }
        if buy_cols.len() != expected || sell_cols.len() != expected {
            return Err(Error::schema(format!(
                "level column counts misaligned: {} price, {} buy, {} sell",
                price_cols.len(),
                buy_cols.len(),
                sell_cols.len()
            )));
        }

        Ok(Self {
            block_id,
            bar_number,
            open,
            close,
            price_cols,
            buy_cols,
            sell_cols,
            headers: headers.to_vec(),
        })
    }

    /// Number of price levels per bar.
    pub fn levels(&self) -> usize {
        self.price_cols.len()
    }

    /// Extract a bar record from a raw row.
    ///
    /// A row that cannot be extracted is rejected with identifying context;
    /// missing cells are never zero-filled.
    pub fn extract(&self, row: &RawRow) -> Result<BarRecord> {
        // Best-effort identity for error context before full validation.
        let block_ctx = row
            .cells
            .get(self.block_id)
            .and_then(Cell::as_text)
            .unwrap_or_else(|| "?".to_string());
        let bar_ctx = row
            .cells
            .get(self.bar_number)
            .and_then(Cell::as_text)
            .unwrap_or_else(|| "?".to_string());

        let reject =
            |reason: String| Error::malformed_row(block_ctx.clone(), bar_ctx.clone(), reason);

        if row.cells.len() != self.headers.len() {
            return Err(reject(format!(
                "row has {} cells, header has {}",
                row.cells.len(),
                self.headers.len()
            )));
        }

        let block_id = row.cells[self.block_id]
            .as_text()
            .ok_or_else(|| reject("missing block id".to_string()))?;

        let bar_number_raw = row.cells[self.bar_number]
            .as_number()
            .ok_or_else(|| reject("missing bar number".to_string()))?;
        if bar_number_raw.fract() != 0.0 {
            return Err(reject(format!("non-integer bar number {bar_number_raw}")));
        }
        let bar_number = bar_number_raw as i64;

        let numeric_at = |idx: usize| -> Result<f64> {
            let value = row.cells[idx].as_number().ok_or_else(|| {
                reject(format!("missing cell in column '{}'", self.headers[idx]))
            })?;
            if value.is_nan() {
                return Err(reject(format!(
                    "NaN in column '{}'",
                    self.headers[idx]
                )));
            }
            Ok(value)
        };

        let open = numeric_at(self.open)?;
        let close = numeric_at(self.close)?;

        let mut price_levels = Vec::with_capacity(self.levels());
        let mut buy_volume = Vec::with_capacity(self.levels());
        let mut sell_volume = Vec::with_capacity(self.levels());

        for &idx in &self.price_cols {
            price_levels.push(numeric_at(idx)?);
        }
        for &idx in &self.buy_cols {
            let v = numeric_at(idx)?;
            if v < 0.0 {
                return Err(reject(format!(
                    "negative volume in column '{}'",
                    self.headers[idx]
                )));
            }
            buy_volume.push(v);
        }
        for &idx in &self.sell_cols {
            let v = numeric_at(idx)?;
            if v < 0.0 {
                return Err(reject(format!(
                    "negative volume in column '{}'",
                    self.headers[idx]
                )));
            }
            sell_volume.push(v);
        }

        Ok(BarRecord {
            block_id,
            bar_number,
            price_levels,
            buy_volume,
            sell_volume,
            open,
            close,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn schema() -> Schema {
        Schema::discover(&headers(), &SchemaConfig::default(), &EngineConfig::default()).unwrap()
    }

    fn row(block: &str, bar: f64) -> RawRow {
        let mut cells = vec![Cell::Text(block.to_string()), Cell::Number(bar)];
        for i in 0..7 {
            cells.push(Cell::Number(100.0 + i as f64)); // prices
        }
        for _ in 0..7 {
            cells.push(Cell::Number(1.0)); // buys
        }
        for _ in 0..7 {
            cells.push(Cell::Number(2.0)); // sells
        }
        cells.push(Cell::Number(100.0)); // open
        cells.push(Cell::Number(101.0)); // close
        RawRow::new(cells)
    }

    #[test]
    fn test_discover_schema() {
        let s = schema();
        assert_eq!(s.levels(), 7);
    }

    #[test]
    fn test_derived_columns_not_levels() {
        // A header that already carries derived output columns: the
        // underscore rule must keep them out of the level sets.
        let mut h = headers();
        h.push("bar_buy_vol".to_string());
        h.push("block_sell_vol".to_string());
        let s = Schema::discover(&h, &SchemaConfig::default(), &EngineConfig::default()).unwrap();
        assert_eq!(s.levels(), 7);
        assert_eq!(s.buy_cols.len(), 7);
        assert_eq!(s.sell_cols.len(), 7);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let mut h = headers();
        h.retain(|c| c != "bar_number");
        let err =
            Schema::discover(&h, &SchemaConfig::default(), &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_misaligned_level_counts_are_fatal() {
        let mut h = headers();
        h.retain(|c| c != "sell6");
        let err =
            Schema::discover(&h, &SchemaConfig::default(), &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_extract_row() {
        let s = schema();
        let bar = s.extract(&row("B1", 3.0)).unwrap();
        assert_eq!(bar.block_id, "B1");
        assert_eq!(bar.bar_number, 3);
        assert_eq!(bar.price_levels.len(), 7);
        assert!((bar.price_levels[2] - 102.0).abs() < 1e-10);
        assert!((bar.open - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_missing_cell_rejected_with_context() {
        let s = schema();
        let mut r = row("B7", 2.0);
        r.cells[4] = Cell::Empty; // price2
        let err = s.extract(&r).unwrap_err();
        match err {
            Error::MalformedRow {
                block_id,
                bar_number,
                reason,
            } => {
                assert_eq!(block_id, "B7");
                assert_eq!(bar_number, "2");
                assert!(reason.contains("price2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_volume_rejected() {
        let s = schema();
        let mut r = row("B1", 0.0);
        r.cells[9] = Cell::Number(-1.0); // buy0
        assert!(matches!(
            s.extract(&r),
            Err(Error::MalformedRow { .. })
        ));
    }

    #[test]
    fn test_short_row_rejected() {
        let s = schema();
        let mut r = row("B1", 0.0);
        r.cells.pop();
        assert!(matches!(s.extract(&r), Err(Error::MalformedRow { .. })));
    }

    #[test]
    fn test_breakout_sentinel_extracts() {
        let s = schema();
        let bar = s.extract(&row("B1", -1.0)).unwrap();
        assert!(bar.is_breakout());
    }
}
