//! Two-mode analysis runner.
//!
//! Runs the engine once per breakout policy over the same store, writing the
//! two parallel datasets and the per-block profile artifacts for each mode.

use crate::artifact::{write_profile, write_records};
use anyhow::Context;
use blockvol_analytics::{AnalysisEngine, AnalysisRun, BreakoutPolicy};
use blockvol_core::Config;
use blockvol_ingestion::{load_table, IngestStats, RawRow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Directory tag for a mode's artifacts.
fn mode_tag(policy: BreakoutPolicy) -> &'static str {
    match policy {
        BreakoutPolicy::Exclude => "breakout_excluded",
        BreakoutPolicy::Include => "breakout_included",
    }
}

/// Summary of one complete job.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// When the job started.
    pub started_at: DateTime<Utc>,
    /// Raw rows seen by ingestion.
    pub total_rows: u64,
    /// Rows accepted into the store.
    pub accepted_rows: u64,
    /// Rows rejected as malformed.
    pub rejected_rows: u64,
    /// Distinct blocks analyzed.
    pub blocks: usize,
    /// Profile artifacts written across both modes.
    pub profile_artifacts: usize,
}

/// Output of one complete job: both mode passes plus ingest statistics.
#[derive(Debug)]
pub struct JobOutput {
    /// Pass with breakout bars excluded from aggregation.
    pub excluded: AnalysisRun,
    /// Pass with breakout bars folded in.
    pub included: AnalysisRun,
    /// Ingest statistics (shared by both passes).
    pub stats: IngestStats,
    /// Job summary.
    pub summary: RunSummary,
}

/// One-shot batch job: ingest, analyze under both policies, export.
pub struct AnalysisJob {
    config: Config,
}

impl AnalysisJob {
    /// Create a job from configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Artifact directory for a mode's profiles.
    fn profile_dir(&self, policy: BreakoutPolicy) -> PathBuf {
        self.config.export.profile_dir.join(mode_tag(policy))
    }

    /// Dataset file path for a mode's augmented records.
    fn records_path(&self, policy: BreakoutPolicy) -> PathBuf {
        let name = &self.config.export.records_file;
        match policy {
            BreakoutPolicy::Exclude => PathBuf::from(name),
            BreakoutPolicy::Include => {
                let path = PathBuf::from(name);
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "augmented_bars".to_string());
                let ext = path
                    .extension()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "json".to_string());
                path.with_file_name(format!("{stem}_{}.{ext}", mode_tag(policy)))
            }
        }
    }

    /// Run one engine pass and write its artifacts.
    fn run_mode(
        &self,
        store: &blockvol_ingestion::BarStore,
        policy: BreakoutPolicy,
    ) -> anyhow::Result<(AnalysisRun, usize)> {
        let run = AnalysisEngine::new(policy)
            .run(store)
            .with_context(|| format!("{} analysis pass failed", mode_tag(policy)))?;

        let dir = self.profile_dir(policy);
        let mut written = 0usize;
        for analysis in &run.blocks {
            write_profile(&dir, &analysis.block_id, &analysis.profile)
                .with_context(|| format!("writing profile for block {}", analysis.block_id))?;
            written += 1;
        }

        let records_path = self.records_path(policy);
        write_records(&records_path, &run.records)
            .with_context(|| format!("writing records to {}", records_path.display()))?;

        info!(
            mode = mode_tag(policy),
            blocks = run.blocks.len(),
            records = run.records.len(),
            "mode pass complete"
        );
        Ok((run, written))
    }

    /// Execute the full job over a raw table.
    ///
    /// Fails fast only on an unrecognized schema or an export failure;
    /// malformed rows are reported in the returned statistics.
    pub fn run(&self, headers: &[String], rows: &[RawRow]) -> anyhow::Result<JobOutput> {
        let started_at = Utc::now();

        let (store, stats) = load_table(
            headers,
            rows,
            &self.config.schema,
            &self.config.engine,
        )
        .context("schema discovery failed")?;

        info!(
            rows = stats.total_rows,
            accepted = stats.accepted_rows,
            rejected = stats.rejected_rows,
            blocks = store.block_count(),
            "ingest complete"
        );

        let (excluded, wrote_excl) = self.run_mode(&store, BreakoutPolicy::Exclude)?;
        let (included, wrote_incl) = self.run_mode(&store, BreakoutPolicy::Include)?;

        let summary = RunSummary {
            started_at,
            total_rows: stats.total_rows,
            accepted_rows: stats.accepted_rows,
            rejected_rows: stats.rejected_rows,
            blocks: store.block_count(),
            profile_artifacts: wrote_excl + wrote_incl,
        };

        Ok(JobOutput {
            excluded,
            included,
            stats,
            summary,
        })
    }
}
