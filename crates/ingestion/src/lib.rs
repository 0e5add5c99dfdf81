//! Data ingestion and normalization for the mercato analyzer.
//!
//! This crate handles:
//! - Raw item payload validation
//! - Transaction normalization (unresolved items, malformed losing bids)
//! - Participant and owning-group name resolution
//! - Performance stats join
//! - The export document read by the command-line tool

pub mod directory;
pub mod export;
pub mod normalizer;

pub use directory::Directory;
pub use export::{MarketExport, TeamEntry};
pub use normalizer::{
    ItemOutcome, NormalizationReport, Normalizer, RawMercato, RawStats, RejectReason, StatsPool,
};
