//! Volume-profile and augmented-record artifacts.
//!
//! One JSON artifact per block for the profile, named by a sanitized block
//! identifier, plus a single dataset file for the augmented records.

use blockvol_analytics::VolumeProfile;
use blockvol_core::{AugmentedBar, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One row of a per-block volume-profile artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub price: f64,
    pub buy: f64,
    pub sell: f64,
    pub total_vol: f64,
    pub block_id: String,
}

/// Replace characters unsafe for file/identifier names (e.g. colons in
/// timestamp-style block ids) with underscores.
pub fn sanitize_block_id(block_id: &str) -> String {
    block_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Flatten a block's profile into artifact rows, ascending by price.
pub fn profile_rows(block_id: &str, profile: &VolumeProfile) -> Vec<ProfileRow> {
    profile
        .iter()
        .map(|(price, row)| ProfileRow {
            price,
            buy: row.buy,
            sell: row.sell,
            total_vol: row.total,
            block_id: block_id.to_string(),
        })
        .collect()
}

/// Write one block's profile artifact into `dir`, creating it if needed.
///
/// Returns the path of the written file.
pub fn write_profile(dir: &Path, block_id: &str, profile: &VolumeProfile) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", sanitize_block_id(block_id)));
    let file = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(file, &profile_rows(block_id, profile))?;
    debug!(block = %block_id, path = %path.display(), "wrote profile artifact");
    Ok(path)
}

/// Write the augmented-record dataset to `path`.
pub fn write_records(path: &Path, records: &[AugmentedBar]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, records)?;
    debug!(path = %path.display(), records = records.len(), "wrote record dataset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockvol_analytics::{BreakoutPolicy, VolumeProfile};
    use blockvol_core::BarRecord;
    use blockvol_ingestion::BlockSlice;

    fn sample_profile() -> VolumeProfile {
        let bar = BarRecord {
            block_id: "2024-01-05:A".to_string(),
            bar_number: 0,
            price_levels: vec![100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0],
            buy_volume: vec![3.0; 7],
            sell_volume: vec![1.0; 7],
            open: 100.0,
            close: 101.0,
        };
        let slice = BlockSlice {
            block_id: bar.block_id.clone(),
            bars: vec![bar],
        };
        VolumeProfile::build(&slice, BreakoutPolicy::Exclude)
    }

    #[test]
    fn test_sanitize_block_id() {
        assert_eq!(sanitize_block_id("2024-01-05:A"), "2024-01-05_A");
        assert_eq!(sanitize_block_id("a b/c:d"), "a_b_c_d");
        assert_eq!(sanitize_block_id("plain_id.1"), "plain_id.1");
    }

    #[test]
    fn test_profile_rows_ascending() {
        let rows = profile_rows("2024-01-05:A", &sample_profile());
        assert_eq!(rows.len(), 7);
        assert!((rows[0].price - 100.0).abs() < 1e-10);
        assert!((rows[6].price - 106.0).abs() < 1e-10);
        assert!((rows[0].total_vol - 4.0).abs() < 1e-10);
        assert_eq!(rows[0].block_id, "2024-01-05:A");
    }

    #[test]
    fn test_write_profile_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_profile(dir.path(), "2024-01-05:A", &sample_profile()).unwrap();

        assert_eq!(path.file_name().unwrap(), "2024-01-05_A.json");
        let rows: Vec<ProfileRow> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].block_id, "2024-01-05:A");
    }

    #[test]
    fn test_write_profile_idempotent_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let profile = sample_profile();
        let p1 = write_profile(dir.path(), "B", &profile).unwrap();
        let first = std::fs::read(&p1).unwrap();
        let p2 = write_profile(dir.path(), "B", &profile).unwrap();
        let second = std::fs::read(&p2).unwrap();
        assert_eq!(first, second);
    }
}
