//! Raw auction payload normalization.
//!
//! Validates each raw item payload against an explicit schema and turns it
//! into a [`Transaction`], or reports why it could not be used. Nothing in
//! here is fatal: unresolved items and broken payloads are counted and
//! skipped, and a losing bid without a bidder is dropped on its own.

use crate::directory::Directory;
use chrono::{DateTime, Utc};
use mercato_core::{
    Amount, Bid, Day, ItemAttributes, ItemId, ItemKey, PerformanceStats, Position, Transaction,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Raw auction history: day -> item id -> raw item payload.
pub type RawMercato = BTreeMap<Day, BTreeMap<ItemId, Value>>;

/// Performance stats keyed by item id, joined onto items without inline stats.
pub type StatsPool = BTreeMap<ItemId, PerformanceStats>;

/// Raw bid as it appears in the payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBid {
    #[serde(default)]
    team_id: Option<String>,
    #[serde(default)]
    price: Option<Amount>,
    #[serde(default)]
    bid_date: Option<String>,
}

impl RawBid {
    fn participant(&self) -> Option<&str> {
        self.team_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Raw performance counters. Every field is optional and defaults to zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStats {
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub average_points: Option<f64>,
    #[serde(default)]
    pub total_goals: Option<u32>,
    #[serde(default)]
    pub total_played_matches: Option<u32>,
    #[serde(default)]
    pub total_clean_sheets: Option<u32>,
    #[serde(default)]
    pub total_yellow_cards: Option<u32>,
    #[serde(default)]
    pub total_red_cards: Option<u32>,
}

impl RawStats {
    /// Convert to the canonical counters, defaulting missing values to zero.
    pub fn into_stats(self) -> PerformanceStats {
        PerformanceStats {
            average_rating: self.average_rating.unwrap_or(0.0),
            average_points: self.average_points.unwrap_or(0.0),
            total_goals: self.total_goals.unwrap_or(0),
            matches_played: self.total_played_matches.unwrap_or(0),
            clean_sheets: self.total_clean_sheets.unwrap_or(0),
            yellow_cards: self.total_yellow_cards.unwrap_or(0),
            red_cards: self.total_red_cards.unwrap_or(0),
        }
    }
}

/// Raw item payload schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    quotation: Option<Amount>,
    #[serde(default)]
    position: Option<i64>,
    #[serde(default)]
    club_id: Option<String>,
    #[serde(default)]
    won_bid: Option<RawBid>,
    #[serde(default)]
    lost_bids: Option<Vec<Value>>,
    #[serde(default)]
    stats: Option<RawStats>,
}

impl RawItem {
    fn display_name(&self, item_id: &str) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        let name = format!("{first} {last}").trim().to_string();
        if name.is_empty() {
            item_id.to_string()
        } else {
            name
        }
    }
}

/// Why an item payload could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// The payload does not match the item schema.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Result of normalizing one raw item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// A usable transaction.
    Resolved(Transaction),
    /// No winning bid: the item was never sold. Skipped, not an error.
    Unresolved { key: ItemKey },
    /// The payload failed validation.
    Rejected { key: ItemKey, reason: RejectReason },
}

/// Counters describing one or more normalization passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationReport {
    /// Items turned into transactions.
    pub resolved: u64,
    /// Items skipped because nobody won them.
    pub unresolved: u64,
    /// Items whose payload failed validation.
    pub rejected: u64,
    /// Losing bids dropped for lacking a participant id or being malformed.
    pub dropped_losing_bids: u64,
    /// Winning bids without a price, counted as a price of 0.
    pub defaulted_winning_prices: u64,
    /// Rejected items with their reasons, in processing order.
    pub rejections: Vec<(ItemKey, RejectReason)>,
}

impl NormalizationReport {
    /// Total items seen.
    pub fn total_items(&self) -> u64 {
        self.resolved + self.unresolved + self.rejected
    }

    /// Reset counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Parse an RFC 3339 timestamp, keeping unreadable values as `None`.
fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
}

/// Normalizer turning raw auction payloads into transactions.
pub struct Normalizer {
    /// Name lookup for owning groups.
    directory: Directory,
    /// Stats joined onto items without inline stats.
    stats_pool: StatsPool,
    /// Running counters.
    report: NormalizationReport,
}

impl Normalizer {
    /// Create a normalizer with the given group directory.
    pub fn new(directory: Directory) -> Self {
        Self {
            directory,
            stats_pool: StatsPool::new(),
            report: NormalizationReport::default(),
        }
    }

    /// Attach a stats pool for items that carry no inline stats.
    pub fn with_stats_pool(mut self, stats_pool: StatsPool) -> Self {
        self.stats_pool = stats_pool;
        self
    }

    /// Normalize a single raw item payload.
    pub fn normalize_item(&mut self, day: &str, item_id: &str, payload: &Value) -> ItemOutcome {
        let key = ItemKey::new(day, item_id);

        let raw: RawItem = match RawItem::deserialize(payload) {
            Ok(raw) => raw,
            Err(e) => return self.reject(key, RejectReason::InvalidPayload(e.to_string())),
        };

        let won = match raw.won_bid.as_ref() {
            Some(bid) => bid,
            None => return self.unresolved(key),
        };
        let winner = match won.participant() {
            Some(id) => id.to_string(),
            None => return self.unresolved(key),
        };
        let price = match won.price {
            Some(price) => price,
            None => {
                debug!(day, item_id, "Winning bid has no price, using 0");
                self.report.defaulted_winning_prices += 1;
                0
            }
        };

        let winning_bid = Bid {
            participant_id: winner,
            price,
            placed_at: parse_timestamp(won.bid_date.as_deref()),
        };

        let mut losing_bids = Vec::new();
        for entry in raw.lost_bids.as_deref().unwrap_or_default() {
            let lost = match RawBid::deserialize(entry) {
                Ok(lost) => lost,
                Err(e) => {
                    debug!(day, item_id, error = %e, "Dropping malformed losing bid");
                    self.report.dropped_losing_bids += 1;
                    continue;
                }
            };
            match lost.participant() {
                Some(id) => losing_bids.push(Bid {
                    participant_id: id.to_string(),
                    price: lost.price.unwrap_or(0),
                    placed_at: parse_timestamp(lost.bid_date.as_deref()),
                }),
                None => {
                    debug!(day, item_id, "Dropping losing bid without participant id");
                    self.report.dropped_losing_bids += 1;
                }
            }
        }

        let stats = match raw.stats.clone() {
            Some(inline) => inline.into_stats(),
            None => self.stats_pool.get(item_id).cloned().unwrap_or_default(),
        };

        let item = ItemAttributes {
            name: raw.display_name(item_id),
            quotation: raw.quotation.unwrap_or(0),
            position: raw.position.map(Position::from_code).unwrap_or(Position::Unknown),
            group: self.directory.resolve_group(raw.club_id.as_deref()),
            stats,
        };

        self.report.resolved += 1;
        ItemOutcome::Resolved(Transaction {
            key,
            item,
            winning_bid,
            losing_bids,
        })
    }

    /// Normalize a whole auction history, keeping only resolved transactions.
    ///
    /// Days and items are visited in key order, so the output is stable for
    /// identical input.
    pub fn normalize(&mut self, mercato: &RawMercato) -> Vec<Transaction> {
        let before = self.report.clone();
        let mut transactions = Vec::new();

        for (day, items) in mercato {
            for (item_id, payload) in items {
                if let ItemOutcome::Resolved(txn) = self.normalize_item(day, item_id, payload) {
                    transactions.push(txn);
                }
            }
        }

        let rejected = self.report.rejected - before.rejected;
        info!(
            days = mercato.len(),
            resolved = self.report.resolved - before.resolved,
            unresolved = self.report.unresolved - before.unresolved,
            rejected,
            dropped_losing_bids = self.report.dropped_losing_bids - before.dropped_losing_bids,
            defaulted_winning_prices =
                self.report.defaulted_winning_prices - before.defaulted_winning_prices,
            "Normalized auction history"
        );
        if rejected > 0 {
            warn!(rejected, "Some item payloads failed validation and were skipped");
        }

        transactions
    }

    fn unresolved(&mut self, key: ItemKey) -> ItemOutcome {
        debug!(day = %key.day, item_id = %key.item_id, "Skipping unresolved item");
        self.report.unresolved += 1;
        ItemOutcome::Unresolved { key }
    }

    fn reject(&mut self, key: ItemKey, reason: RejectReason) -> ItemOutcome {
        debug!(day = %key.day, item_id = %key.item_id, %reason, "Rejecting item payload");
        self.report.rejected += 1;
        self.report.rejections.push((key.clone(), reason.clone()));
        ItemOutcome::Rejected { key, reason }
    }

    /// Get normalization counters.
    pub fn report(&self) -> &NormalizationReport {
        &self.report
    }

    /// Reset normalization counters.
    pub fn reset_report(&mut self) {
        self.report.reset();
    }
}
