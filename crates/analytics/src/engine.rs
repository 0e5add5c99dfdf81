//! Analysis engine.
//!
//! Runs the whole pipeline: transactions are folded into accounts, accounts
//! become metric records, and the records feed the leaderboard, the awards,
//! the profiles and the roasts.

use crate::aggregator::AccountBook;
use crate::awards::{AwardEngine, AwardKey, AwardRecord};
use crate::metrics::{MetricRecord, MetricsCalculator};
use crate::profile::{Profile, ProfileClassifier};
use crate::ranker::{RankKey, Ranker};
use crate::roasts::{RoastEngine, RoastLine};
use mercato_core::{Config, Result, Transaction};
use mercato_ingestion::{Directory, MarketExport, NormalizationReport};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Metric records in leaderboard order.
    pub leaderboard: Vec<MetricRecord>,
    /// Awards with a qualifying winner.
    pub awards: BTreeMap<AwardKey, AwardRecord>,
    /// Profiles keyed by participant display name.
    pub profiles: BTreeMap<String, Profile>,
    /// Comment lines, keyed like the profiles.
    pub roasts: BTreeMap<String, Vec<RoastLine>>,
    /// Resolved transactions folded in.
    pub transactions: u64,
}

impl AnalysisReport {
    /// Leaderboard entry of one participant.
    pub fn record(&self, participant_id: &str) -> Option<&MetricRecord> {
        self.leaderboard
            .iter()
            .find(|r| r.participant_id == participant_id)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Analysis pipeline.
pub struct AnalysisEngine {
    directory: Directory,
    metrics: MetricsCalculator,
    ranker: Ranker,
    awards: AwardEngine,
    profiles: ProfileClassifier,
    roasts: RoastEngine,
}

impl AnalysisEngine {
    /// Create an engine, validating the configuration.
    pub fn new(config: Config, directory: Directory) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            directory,
            metrics: MetricsCalculator::new(&config),
            ranker: Ranker::new(RankKey::QualityScore),
            awards: AwardEngine::new(&config),
            profiles: ProfileClassifier::new(&config),
            roasts: RoastEngine::new(&config),
        })
    }

    /// Engine using the names carried by an export document.
    pub fn for_export(config: Config, export: &MarketExport) -> Result<Self> {
        Self::new(config, export.directory())
    }

    /// Use a different leaderboard key.
    pub fn with_rank_key(mut self, key: RankKey) -> Self {
        self.ranker = Ranker::new(key);
        self
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Fold transactions into per-participant accounts.
    pub fn aggregate(&self, transactions: &[Transaction]) -> AccountBook {
        AccountBook::from_transactions(transactions)
    }

    /// Analyze a set of resolved transactions.
    pub fn run(&self, transactions: &[Transaction]) -> AnalysisReport {
        self.run_book(&self.aggregate(transactions))
    }

    /// Analyze an already folded book.
    pub fn run_book(&self, book: &AccountBook) -> AnalysisReport {
        let records = self.metrics.calculate_all(book, &self.directory);
        let awards = self.awards.evaluate(&records, book);
        let profiles = self.profiles.profile_all(&records, book);
        let leaderboard = self.ranker.rank(records);
        let roasts = self.roasts.roast_all(&leaderboard, book);

        info!(
            participants = leaderboard.len(),
            transactions = book.transaction_count(),
            awards = awards.len(),
            profiles = profiles.len(),
            "Analysis complete"
        );

        AnalysisReport {
            leaderboard,
            awards,
            profiles,
            roasts,
            transactions: book.transaction_count(),
        }
    }

    /// Normalize an export's auction history and analyze it.
    pub fn run_export(&self, export: &MarketExport) -> (AnalysisReport, NormalizationReport) {
        let mut normalizer = export.normalizer();
        let transactions = normalizer.normalize(&export.mercato);
        let report = self.run(&transactions);
        (report, normalizer.report().clone())
    }
}
