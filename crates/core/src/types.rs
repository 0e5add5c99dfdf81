//! Core data types for the mercato analyzer.

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Opaque participant (team) identifier.
pub type ParticipantId = String;

/// Opaque item (player) identifier.
pub type ItemId = String;

/// Time-bucket key ("day") an auction round belongs to.
pub type Day = String;

/// Whole-unit currency amount (prices and quotations are never negative).
pub type Amount = u32;

/// Floating-point score with total ordering, used as a sort key.
pub type Score = OrderedFloat<f64>;

/// Difference between an item's quotation and the price paid for it.
///
/// Positive means a bargain, negative means an overpay.
#[inline]
pub fn item_value(quotation: Amount, price: Amount) -> i64 {
    i64::from(quotation) - i64::from(price)
}

/// Playing position of an auctioned item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD")]
    Forward,
    #[serde(rename = "UNK")]
    Unknown,
}

impl Position {
    /// All positions that carry a known code, in squad order.
    pub const KNOWN: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Map a raw position code (1 = GK, 2 = DEF, 3 = MID, 4 = FWD).
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Position::Goalkeeper,
            2 => Position::Defender,
            3 => Position::Midfielder,
            4 => Position::Forward,
            _ => Position::Unknown,
        }
    }

    /// Short label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
            Position::Unknown => "UNK",
        }
    }

    /// Goalkeepers and defenders.
    #[inline]
    pub fn is_defensive(self) -> bool {
        matches!(self, Position::Goalkeeper | Position::Defender)
    }
}

/// A single offer on an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    /// Bidding participant.
    pub participant_id: ParticipantId,
    /// Offered price.
    pub price: Amount,
    /// When the offer was placed, if the timestamp was readable.
    pub placed_at: Option<DateTime<Utc>>,
}

/// Owning group (club) of an item, with its resolved display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: String,
    pub name: String,
}

/// Performance counters attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    /// Average match rating.
    pub average_rating: f64,
    /// Average fantasy points per match.
    pub average_points: f64,
    /// Goals scored.
    pub total_goals: u32,
    /// Matches played.
    pub matches_played: u32,
    /// Clean sheets kept.
    pub clean_sheets: u32,
    /// Yellow cards received.
    pub yellow_cards: u32,
    /// Red cards received.
    pub red_cards: u32,
}

/// Descriptive attributes of an auctioned item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAttributes {
    /// Display name.
    pub name: String,
    /// Reference price (0 when unknown).
    pub quotation: Amount,
    /// Playing position.
    pub position: Position,
    /// Owning group, `None` when unknown.
    pub group: Option<GroupRef>,
    /// Performance counters.
    pub stats: PerformanceStats,
}

/// Identifies one auctioned item within one time bucket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub day: Day,
    pub item_id: ItemId,
}

impl ItemKey {
    pub fn new(day: impl Into<Day>, item_id: impl Into<ItemId>) -> Self {
        Self {
            day: day.into(),
            item_id: item_id.into(),
        }
    }
}

/// A resolved auction: one item, one winning bid, zero or more losing bids.
///
/// Items without a winning bid never become a `Transaction`; the normalizer
/// reports them as unresolved instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Day and item identifier.
    pub key: ItemKey,
    /// Item attributes.
    pub item: ItemAttributes,
    /// Accepted offer.
    pub winning_bid: Bid,
    /// Rejected offers, in source order.
    pub losing_bids: Vec<Bid>,
}

impl Transaction {
    /// Total number of bidders (winner plus losers).
    #[inline]
    pub fn bidder_count(&self) -> u32 {
        1 + self.losing_bids.len() as u32
    }

    /// Whether the auction drew at least `min_bidders` bidders.
    #[inline]
    pub fn is_contested(&self, min_bidders: u32) -> bool {
        self.bidder_count() >= min_bidders
    }

    /// Quotation minus winning price.
    #[inline]
    pub fn value(&self) -> i64 {
        item_value(self.item.quotation, self.winning_bid.price)
    }
}

/// An item a participant won, as recorded in their account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WonItem {
    pub key: ItemKey,
    pub name: String,
    pub price: Amount,
    pub quotation: Amount,
    /// Quotation minus price.
    pub value: i64,
    pub position: Position,
    /// Resolved owning-group name, `None` when unknown.
    pub group: Option<String>,
    pub stats: PerformanceStats,
    pub placed_at: Option<DateTime<Utc>>,
    /// Bidders competing for the item, winner included.
    pub bidder_count: u32,
}

impl WonItem {
    /// Build the record for the winner of a transaction.
    pub fn from_transaction(txn: &Transaction) -> Self {
        Self {
            key: txn.key.clone(),
            name: txn.item.name.clone(),
            price: txn.winning_bid.price,
            quotation: txn.item.quotation,
            value: txn.value(),
            position: txn.item.position,
            group: txn.item.group.as_ref().map(|g| g.name.clone()),
            stats: txn.item.stats.clone(),
            placed_at: txn.winning_bid.placed_at,
            bidder_count: txn.bidder_count(),
        }
    }
}

/// An item a participant bid on and lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LostItem {
    pub key: ItemKey,
    pub name: String,
    /// The participant's own (rejected) offer.
    pub bid_price: Amount,
    /// The price the item actually went for.
    pub winning_price: Amount,
    pub quotation: Amount,
    pub placed_at: Option<DateTime<Utc>>,
}

impl LostItem {
    /// Build the record for one losing bid of a transaction.
    pub fn from_bid(txn: &Transaction, bid: &Bid) -> Self {
        Self {
            key: txn.key.clone(),
            name: txn.item.name.clone(),
            bid_price: bid.price,
            winning_price: txn.winning_bid.price,
            quotation: txn.item.quotation,
            placed_at: bid.placed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bid(participant: &str, price: Amount) -> Bid {
        Bid {
            participant_id: participant.to_string(),
            price,
            placed_at: None,
        }
    }

    fn make_txn(quotation: Amount, price: Amount, losers: usize) -> Transaction {
        Transaction {
            key: ItemKey::new("1", "player_1"),
            item: ItemAttributes {
                name: "Test Player".to_string(),
                quotation,
                position: Position::Forward,
                group: Some(GroupRef {
                    id: "club_1".to_string(),
                    name: "Lyon".to_string(),
                }),
                stats: PerformanceStats::default(),
            },
            winning_bid: make_bid("team_a", price),
            losing_bids: (0..losers).map(|i| make_bid(&format!("team_{i}"), 1)).collect(),
        }
    }

    #[test]
    fn test_position_codes() {
        assert_eq!(Position::from_code(1), Position::Goalkeeper);
        assert_eq!(Position::from_code(4), Position::Forward);
        assert_eq!(Position::from_code(9), Position::Unknown);
        assert!(Position::Defender.is_defensive());
        assert!(!Position::Midfielder.is_defensive());
    }

    #[test]
    fn test_value_sign() {
        // Bargain: quotation above price
        assert_eq!(make_txn(15, 10, 0).value(), 5);
        // Overpay
        assert_eq!(make_txn(3, 5, 0).value(), -2);
        // Unknown quotation counts as full overpay
        assert_eq!(make_txn(0, 7, 0).value(), -7);
    }

    #[test]
    fn test_contested() {
        assert_eq!(make_txn(10, 10, 2).bidder_count(), 3);
        assert!(make_txn(10, 10, 2).is_contested(3));
        assert!(!make_txn(10, 10, 1).is_contested(3));
    }

    #[test]
    fn test_won_item_from_transaction() {
        let txn = make_txn(15, 10, 1);
        let won = WonItem::from_transaction(&txn);
        assert_eq!(won.value, 5);
        assert_eq!(won.group.as_deref(), Some("Lyon"));
        assert_eq!(won.bidder_count, 2);
    }

    #[test]
    fn test_position_serializes_as_label() {
        let json = serde_json::to_string(&Position::Defender).unwrap();
        assert_eq!(json, "\"DEF\"");
    }
}
