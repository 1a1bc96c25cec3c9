//! Data ingestion and partitioning for the blockvol system.
//!
//! This crate handles:
//! - Schema discovery from header names
//! - Raw row extraction and validation (skip-and-report)
//! - The bar record store, partitioned by block

pub mod schema;
pub mod store;

pub use schema::{Cell, RawRow, Schema};
pub use store::{BarStore, BlockSlice, IngestStats, Ingestor, load_table};
