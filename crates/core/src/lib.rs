//! Core types and configuration for the blockvol system.
//!
//! This crate provides shared types used across all other crates:
//! - Bar record and derived analytics types
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
