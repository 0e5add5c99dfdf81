//! Leaderboards over metric records.

use crate::metrics::MetricRecord;
use mercato_core::Score;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Field a leaderboard is sorted by. Every key sorts descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankKey {
    #[default]
    QualityScore,
    WinRate,
    ValueEfficiency,
    TotalBids,
    Spent,
    Won,
}

impl RankKey {
    /// Sort value of a record under this key.
    pub fn score(self, record: &MetricRecord) -> Score {
        OrderedFloat(match self {
            RankKey::QualityScore => record.quality_score,
            RankKey::WinRate => record.win_rate,
            RankKey::ValueEfficiency => record.value_efficiency,
            RankKey::TotalBids => f64::from(record.total_bids),
            RankKey::Spent => record.spent as f64,
            RankKey::Won => f64::from(record.won),
        })
    }
}

/// Produces a total, reproducible order over participants.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker {
    key: RankKey,
}

impl Ranker {
    pub fn new(key: RankKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> RankKey {
        self.key
    }

    /// Compare two records: key descending, then participant id ascending.
    ///
    /// Distinct participants never compare equal.
    pub fn order(&self, a: &MetricRecord, b: &MetricRecord) -> Ordering {
        self.key
            .score(b)
            .cmp(&self.key.score(a))
            .then_with(|| a.participant_id.cmp(&b.participant_id))
    }

    /// Sort records into leaderboard order, dropping participants with no bids.
    pub fn rank(&self, records: Vec<MetricRecord>) -> Vec<MetricRecord> {
        let mut ranked: Vec<MetricRecord> = records.into_iter().filter(|r| r.total_bids > 0).collect();
        ranked.sort_by(|a, b| self.order(a, b));
        ranked
    }

    /// The first `n` entries of the leaderboard.
    pub fn top<'a>(&self, records: &'a [MetricRecord], n: usize) -> Vec<&'a MetricRecord> {
        let mut ranked: Vec<&MetricRecord> = records.iter().filter(|r| r.total_bids > 0).collect();
        ranked.sort_by(|a, b| self.order(a, b));
        ranked.truncate(n);
        ranked
    }
}
