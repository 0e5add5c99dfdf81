//! Participant performance metrics.
//!
//! Derives ratios and scores from a folded [`Account`]. Every ratio is
//! guarded: a zero denominator yields `0.0` instead of a NaN or an error.

use crate::aggregator::{Account, AccountBook, CategoryTally};
use mercato_core::config::ScoringConfig;
use mercato_core::{Config, ParticipantId, Position};
use mercato_ingestion::Directory;
use serde::Serialize;
use std::collections::BTreeMap;

/// `numerator / denominator`, or `0.0` when the denominator is zero.
#[inline]
pub fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Win rate as a percentage in `[0, 100]`.
#[inline]
pub fn win_rate(won: u32, total_bids: u32) -> f64 {
    guarded_ratio(f64::from(won), f64::from(total_bids)) * 100.0
}

/// Derived, read-only statistics for one participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub participant_id: ParticipantId,
    /// Resolved display name.
    pub name: String,
    pub total_bids: u32,
    pub won: u32,
    pub lost: u32,
    pub spent: u64,
    pub lost_unspent: u64,
    /// Won over total bids, as a percentage.
    pub win_rate: f64,
    /// Spend per won item.
    pub average_price: f64,
    /// Mean of the won items' average ratings.
    pub average_rating: f64,
    /// Mean of the won items' average points.
    pub average_points: f64,
    /// Goals summed over won items.
    pub total_goals: u32,
    /// Weighted composite of rating, points and goals.
    pub quality_score: f64,
    /// Sum of item values (quotation minus price).
    pub total_value: i64,
    /// Mean item value; negative means the participant paid above quotation.
    pub value_efficiency: f64,
    /// Distinct named owning groups among won items.
    pub diversity: usize,
    /// Won items and spend per category.
    pub positions: BTreeMap<Position, CategoryTally>,
    /// Won items that drew a contested auction.
    pub contested_won: u32,
    pub total_matches: u32,
    /// Yellow cards summed over won items.
    pub total_cards: u32,
    pub total_red_cards: u32,
}

impl MetricRecord {
    /// Won items in one category.
    pub fn position_count(&self, position: Position) -> u32 {
        self.positions.get(&position).map_or(0, |t| t.count)
    }

    /// Share of won items in one category, as a percentage.
    pub fn position_pct(&self, position: Position) -> f64 {
        guarded_ratio(f64::from(self.position_count(position)), f64::from(self.won)) * 100.0
    }

    /// Share of forwards among won items.
    pub fn forward_pct(&self) -> f64 {
        self.position_pct(Position::Forward)
    }

    /// Share of goalkeepers and defenders among won items.
    pub fn defensive_pct(&self) -> f64 {
        self.position_pct(Position::Goalkeeper) + self.position_pct(Position::Defender)
    }

    /// Goalkeepers plus defenders won.
    pub fn defensive_count(&self) -> u32 {
        self.position_count(Position::Goalkeeper) + self.position_count(Position::Defender)
    }

    /// Absolute value efficiency: how far from quotation the participant paid on average.
    pub fn average_overpay(&self) -> f64 {
        self.value_efficiency.abs()
    }
}

/// Metrics calculator.
pub struct MetricsCalculator {
    scoring: ScoringConfig,
    contested_min_bidders: u32,
}

impl MetricsCalculator {
    /// Create a new metrics calculator.
    pub fn new(config: &Config) -> Self {
        Self {
            scoring: config.scoring.clone(),
            contested_min_bidders: config.contest.contested_min_bidders,
        }
    }

    /// Quality score from its three components.
    pub fn quality_score(&self, average_rating: f64, average_points: f64, total_goals: u32) -> f64 {
        average_rating * self.scoring.rating_weight
            + average_points * self.scoring.points_weight
            + f64::from(total_goals) * self.scoring.goals_weight
    }

    /// Calculate the metric record of one account.
    pub fn calculate(&self, account: &Account, name: impl Into<String>) -> MetricRecord {
        let won = f64::from(account.won);
        let total_value = account.total_value();

        let average_rating = guarded_ratio(account.rating_sum(), won);
        let average_points = guarded_ratio(account.points_sum(), won);

        let mut positions = account.categories.clone();
        for position in Position::KNOWN {
            positions.entry(position).or_default();
        }

        MetricRecord {
            participant_id: account.participant_id.clone(),
            name: name.into(),
            total_bids: account.total_bids,
            won: account.won,
            lost: account.lost,
            spent: account.spent,
            lost_unspent: account.lost_unspent,
            win_rate: win_rate(account.won, account.total_bids),
            average_price: guarded_ratio(account.spent as f64, won),
            average_rating,
            average_points,
            total_goals: account.total_goals,
            quality_score: self.quality_score(average_rating, average_points, account.total_goals),
            total_value,
            value_efficiency: guarded_ratio(total_value as f64, won),
            diversity: account.groups.len(),
            positions,
            contested_won: account.contested_won(self.contested_min_bidders),
            total_matches: account.total_matches,
            total_cards: account.total_yellow_cards,
            total_red_cards: account.total_red_cards,
        }
    }

    /// Calculate records for every participant that placed at least one bid,
    /// in participant-id order.
    pub fn calculate_all(&self, book: &AccountBook, directory: &Directory) -> Vec<MetricRecord> {
        book.accounts()
            .filter(|account| account.total_bids > 0)
            .map(|account| {
                let name = directory.participant_name(&account.participant_id);
                self.calculate(account, name)
            })
            .collect()
    }
}
