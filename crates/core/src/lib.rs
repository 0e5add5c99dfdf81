//! Core types and configuration for the mercato analyzer.
//!
//! This crate provides shared types used across all other crates:
//! - Auction records (transactions, bids, item attributes)
//! - Per-participant item records (won and lost items)
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
