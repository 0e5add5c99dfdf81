//! Market analytics for the mercato analyzer.
//!
//! This crate handles:
//! - Per-participant account aggregation
//! - Metric derivation (win rate, quality score, value efficiency)
//! - Deterministic leaderboards
//! - Awards (superlatives over items and participants)
//! - Rule-based behavioral profiles and roast commentary

pub mod aggregator;
pub mod metrics;
pub mod ranker;
pub mod awards;
pub mod rules;
pub mod profile;
pub mod roasts;
pub mod engine;

pub use aggregator::{Account, AccountBook, CategoryTally};
pub use metrics::{MetricRecord, MetricsCalculator};
pub use ranker::{RankKey, Ranker};
pub use awards::{AwardEngine, AwardKey, AwardRecord};
pub use profile::{Archetype, Personality, Profile, ProfileClassifier, SpendingStyle, SquadFocus};
pub use roasts::{Roast, RoastEngine, RoastLine};
pub use rules::{first_match, Rule};
pub use engine::{AnalysisEngine, AnalysisReport};
