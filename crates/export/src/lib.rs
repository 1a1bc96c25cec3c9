//! Result export for the blockvol system.
//!
//! This crate handles:
//! - Per-block volume-profile artifacts (JSON, sanitized block-id names)
//! - The augmented-record dataset
//! - The two-mode (breakout excluded/included) analysis runner

pub mod artifact;
pub mod runner;

pub use artifact::{profile_rows, sanitize_block_id, write_profile, write_records, ProfileRow};
pub use runner::{AnalysisJob, JobOutput, RunSummary};
