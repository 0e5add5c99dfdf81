//! Configuration structures for the mercato analyzer.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the analysis pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quality score weights.
    pub scoring: ScoringConfig,
    /// Contested-auction detection.
    pub contest: ContestConfig,
    /// Award guards.
    pub awards: AwardConfig,
    /// Profile classification thresholds.
    pub profile: ProfileConfig,
    /// Commentary thresholds.
    pub roasts: RoastConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every threshold is usable.
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("scoring.rating_weight", self.scoring.rating_weight),
            ("scoring.points_weight", self.scoring.points_weight),
            ("scoring.goals_weight", self.scoring.goals_weight),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() {
                return Err(Error::config(format!("{name} must be finite, got {weight}")));
            }
        }

        let p = &self.profile;
        let percentages = [
            ("profile.sniper_win_rate", p.sniper_win_rate),
            ("profile.strategist_win_rate", p.strategist_win_rate),
            ("profile.balanced_win_rate", p.balanced_win_rate),
            ("profile.gambler_win_rate", p.gambler_win_rate),
            ("profile.forward_heavy_pct", p.forward_heavy_pct),
            ("profile.defense_heavy_pct", p.defense_heavy_pct),
            ("profile.showboat_forward_pct", p.showboat_forward_pct),
            ("profile.professor_win_rate", p.professor_win_rate),
            ("profile.chaos_win_rate", p.chaos_win_rate),
            ("profile.fortress_defense_pct", p.fortress_defense_pct),
        ];
        for (name, pct) in percentages {
            if !(0.0..=100.0).contains(&pct) {
                return Err(Error::config(format!("{name} must be within 0..=100, got {pct}")));
            }
        }

        let thresholds = [
            ("roasts.poor_rating", self.roasts.poor_rating),
            ("roasts.strong_rating", self.roasts.strong_rating),
            ("roasts.severe_overpay", self.roasts.severe_overpay),
            ("roasts.heavy_overpay", self.roasts.heavy_overpay),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() {
                return Err(Error::config(format!("{name} must be finite, got {value}")));
            }
        }

        if self.contest.contested_min_bidders < 2 {
            return Err(Error::config(
                "contest.contested_min_bidders must be at least 2",
            ));
        }

        Ok(())
    }
}

/// Weights of the composite quality score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the average rating.
    pub rating_weight: f64,
    /// Weight of the average points.
    pub points_weight: f64,
    /// Weight of the squad goal total.
    pub goals_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rating_weight: 10.0,
            points_weight: 5.0,
            goals_weight: 2.0,
        }
    }
}

/// Contested auction detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContestConfig {
    /// Minimum bidders (winner included) for an auction to count as contested.
    pub contested_min_bidders: u32,
}

impl Default for ContestConfig {
    fn default() -> Self {
        Self {
            contested_min_bidders: 3,
        }
    }
}

/// Award guard thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwardConfig {
    /// Minimum price for an item to compete for the best-value award.
    pub bargain_min_price: u32,
    /// Minimum bids for a participant to compete for the lowest-win-rate award.
    pub active_min_bids: u32,
}

impl Default for AwardConfig {
    fn default() -> Self {
        Self {
            bargain_min_price: 10,
            active_min_bids: 20,
        }
    }
}

/// Profile classification thresholds.
///
/// Win rates and category shares are percentages; overpay thresholds apply to
/// the absolute value efficiency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    // Archetype (win rate)
    pub sniper_win_rate: f64,
    pub strategist_win_rate: f64,
    pub balanced_win_rate: f64,
    pub gambler_win_rate: f64,

    // Spending (absolute value efficiency)
    pub deep_pockets_overpay: f64,
    pub premium_overpay: f64,
    pub fair_market_overpay: f64,

    // Squad focus (category share)
    pub forward_heavy_pct: f64,
    pub defense_heavy_pct: f64,

    // Personality
    pub showboat_overpay: f64,
    pub showboat_forward_pct: f64,
    pub professor_win_rate: f64,
    pub professor_overpay: f64,
    pub chaos_min_bids: u32,
    pub chaos_win_rate: f64,
    pub fortress_defense_pct: f64,
    pub fortress_overpay: f64,
    pub warrior_contested_won: u32,

    // Traits
    pub goal_machine_goals: u32,
    pub low_goals: u32,
    pub super_fan_items: u32,
    pub globe_trotter_groups: usize,
    pub loyalist_groups: usize,
    pub battle_contested_won: u32,
    pub trigger_happy_bids: u32,
    pub patient_bids: u32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            sniper_win_rate: 90.0,
            strategist_win_rate: 75.0,
            balanced_win_rate: 60.0,
            gambler_win_rate: 50.0,

            deep_pockets_overpay: 15.0,
            premium_overpay: 10.0,
            fair_market_overpay: 5.0,

            forward_heavy_pct: 40.0,
            defense_heavy_pct: 50.0,

            showboat_overpay: 12.0,
            showboat_forward_pct: 35.0,
            professor_win_rate: 75.0,
            professor_overpay: 8.0,
            chaos_min_bids: 40,
            chaos_win_rate: 55.0,
            fortress_defense_pct: 45.0,
            fortress_overpay: 10.0,
            warrior_contested_won: 4,

            goal_machine_goals: 35,
            low_goals: 15,
            super_fan_items: 4,
            globe_trotter_groups: 18,
            loyalist_groups: 10,
            battle_contested_won: 5,
            trigger_happy_bids: 35,
            patient_bids: 25,
        }
    }
}

/// Commentary thresholds, applied to participants with at least one won item.
///
/// Overpay thresholds compare against the negated value efficiency, so
/// `severe_overpay = 15` fires below an efficiency of -15.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoastConfig {
    // Value efficiency
    pub severe_overpay: f64,
    pub heavy_overpay: f64,

    // Squad goals
    pub goal_drought: u32,
    pub goal_fest: u32,

    // Distinct owning groups
    pub local_bias_groups: usize,
    pub sticker_collector_groups: usize,

    // Average rating
    pub poor_rating: f64,
    pub strong_rating: f64,

    // Single items
    pub donation_value: i64,
    pub smart_buy_price: u32,
    pub splurge_price: u32,

    // Favourite owning group
    pub obsession_items: u32,
    pub fan_items: u32,
}

impl Default for RoastConfig {
    fn default() -> Self {
        Self {
            severe_overpay: 15.0,
            heavy_overpay: 10.0,

            goal_drought: 5,
            goal_fest: 30,

            local_bias_groups: 10,
            sticker_collector_groups: 18,

            poor_rating: 4.5,
            strong_rating: 5.5,

            donation_value: -30,
            smart_buy_price: 1,
            splurge_price: 50,

            obsession_items: 4,
            fan_items: 3,
        }
    }
}
