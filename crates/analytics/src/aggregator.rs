//! Per-participant account aggregation.
//!
//! Folds resolved transactions into one [`Account`] per participant. Every
//! field is either an integer sum, a set, or a list kept sorted by item key,
//! so the resulting accounts do not depend on the order transactions arrive in.

use chrono::{DateTime, Utc};
use mercato_core::{Bid, ItemKey, LostItem, ParticipantId, Position, Transaction, WonItem};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Won-item count and spend for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
    pub count: u32,
    pub spent: u64,
}

/// Running totals for one participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub participant_id: ParticipantId,
    /// Bids placed, won or lost.
    pub total_bids: u32,
    pub won: u32,
    pub lost: u32,
    /// Sum of winning prices.
    pub spent: u64,
    /// Sum of losing bid prices (money offered but never spent).
    pub lost_unspent: u64,
    /// Won items, sorted by item key.
    pub won_items: Vec<WonItem>,
    /// Lost items, sorted by item key then offered price.
    pub lost_items: Vec<LostItem>,
    /// Won items per category.
    pub categories: BTreeMap<Position, CategoryTally>,
    /// Distinct named owning groups among won items.
    pub groups: BTreeSet<String>,
    pub total_goals: u32,
    pub total_matches: u32,
    pub total_clean_sheets: u32,
    pub total_yellow_cards: u32,
    pub total_red_cards: u32,
}

/// Insert keeping `items` sorted by `key`; equal keys go after existing ones.
fn insert_sorted<T, K: Ord>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> K) {
    let k = key(&item);
    let idx = items.partition_point(|existing| key(existing) <= k);
    items.insert(idx, item);
}

fn won_item_order(item: &WonItem) -> ItemKey {
    item.key.clone()
}

fn lost_item_order(item: &LostItem) -> (ItemKey, u32, Option<DateTime<Utc>>) {
    (item.key.clone(), item.bid_price, item.placed_at)
}

impl Account {
    /// Create an empty account.
    pub fn new(participant_id: impl Into<ParticipantId>) -> Self {
        Self {
            participant_id: participant_id.into(),
            total_bids: 0,
            won: 0,
            lost: 0,
            spent: 0,
            lost_unspent: 0,
            won_items: Vec::new(),
            lost_items: Vec::new(),
            categories: BTreeMap::new(),
            groups: BTreeSet::new(),
            total_goals: 0,
            total_matches: 0,
            total_clean_sheets: 0,
            total_yellow_cards: 0,
            total_red_cards: 0,
        }
    }

    /// Record a won transaction.
    pub fn record_win(&mut self, txn: &Transaction) {
        let item = WonItem::from_transaction(txn);

        self.total_bids += 1;
        self.won += 1;
        self.spent += u64::from(item.price);

        self.total_goals += item.stats.total_goals;
        self.total_matches += item.stats.matches_played;
        self.total_clean_sheets += item.stats.clean_sheets;
        self.total_yellow_cards += item.stats.yellow_cards;
        self.total_red_cards += item.stats.red_cards;

        let tally = self.categories.entry(item.position).or_default();
        tally.count += 1;
        tally.spent += u64::from(item.price);

        if let Some(group) = &item.group {
            self.groups.insert(group.clone());
        }

        insert_sorted(&mut self.won_items, item, won_item_order);
    }

    /// Record one losing bid on a transaction.
    pub fn record_loss(&mut self, txn: &Transaction, bid: &Bid) {
        self.total_bids += 1;
        self.lost += 1;
        self.lost_unspent += u64::from(bid.price);
        insert_sorted(&mut self.lost_items, LostItem::from_bid(txn, bid), lost_item_order);
    }

    /// Fold a transaction into this account.
    ///
    /// Only the parts of the transaction that involve this participant are
    /// applied; an unrelated transaction leaves the account unchanged.
    pub fn fold(mut self, txn: &Transaction) -> Self {
        if txn.winning_bid.participant_id == self.participant_id {
            self.record_win(txn);
        }
        for bid in &txn.losing_bids {
            if bid.participant_id == self.participant_id {
                self.record_loss(txn, bid);
            }
        }
        self
    }

    /// Merge another partial account for the same participant.
    pub fn merge(&mut self, other: Account) {
        self.total_bids += other.total_bids;
        self.won += other.won;
        self.lost += other.lost;
        self.spent += other.spent;
        self.lost_unspent += other.lost_unspent;
        self.total_goals += other.total_goals;
        self.total_matches += other.total_matches;
        self.total_clean_sheets += other.total_clean_sheets;
        self.total_yellow_cards += other.total_yellow_cards;
        self.total_red_cards += other.total_red_cards;

        for (position, tally) in other.categories {
            let entry = self.categories.entry(position).or_default();
            entry.count += tally.count;
            entry.spent += tally.spent;
        }
        self.groups.extend(other.groups);

        for item in other.won_items {
            insert_sorted(&mut self.won_items, item, won_item_order);
        }
        for item in other.lost_items {
            insert_sorted(&mut self.lost_items, item, lost_item_order);
        }
    }

    /// Won items in one category.
    pub fn category_count(&self, position: Position) -> u32 {
        self.categories.get(&position).map_or(0, |t| t.count)
    }

    /// Goalkeepers plus defenders won.
    pub fn defensive_count(&self) -> u32 {
        self.category_count(Position::Goalkeeper) + self.category_count(Position::Defender)
    }

    /// Sum of item values (quotation minus price) over won items.
    pub fn total_value(&self) -> i64 {
        self.won_items.iter().map(|w| w.value).sum()
    }

    /// Sum of average ratings over won items, in item-key order.
    pub fn rating_sum(&self) -> f64 {
        self.won_items.iter().map(|w| w.stats.average_rating).sum()
    }

    /// Sum of average points over won items, in item-key order.
    pub fn points_sum(&self) -> f64 {
        self.won_items.iter().map(|w| w.stats.average_points).sum()
    }

    /// Won items per named owning group.
    pub fn group_counts(&self) -> BTreeMap<&str, u32> {
        let mut counts = BTreeMap::new();
        for group in self.won_items.iter().filter_map(|w| w.group.as_deref()) {
            *counts.entry(group).or_insert(0) += 1;
        }
        counts
    }

    /// The owning group with the most won items. Ties go to the group name
    /// that sorts first.
    pub fn top_group(&self) -> Option<(&str, u32)> {
        let mut best: Option<(&str, u32)> = None;
        // BTreeMap iteration is name-ascending, so a strict `>` keeps the first name on ties.
        for (group, count) in self.group_counts() {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((group, count));
            }
        }
        best
    }

    /// Won items bought against at least `min_bidders` bidders.
    pub fn contested_won(&self, min_bidders: u32) -> u32 {
        self.won_items
            .iter()
            .filter(|w| w.bidder_count >= min_bidders)
            .count() as u32
    }
}

/// All accounts of one analysis run, keyed by participant id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountBook {
    accounts: BTreeMap<ParticipantId, Account>,
    transactions: u64,
}

impl AccountBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one transaction: the winner and every losing bidder.
    pub fn apply(&mut self, txn: &Transaction) {
        let winner = &txn.winning_bid.participant_id;
        self.accounts
            .entry(winner.clone())
            .or_insert_with(|| Account::new(winner.clone()))
            .record_win(txn);

        for bid in &txn.losing_bids {
            self.accounts
                .entry(bid.participant_id.clone())
                .or_insert_with(|| Account::new(bid.participant_id.clone()))
                .record_loss(txn, bid);
        }

        self.transactions += 1;
    }

    /// Fold one transaction into the book, returning the updated book.
    pub fn fold(mut self, txn: &Transaction) -> Self {
        self.apply(txn);
        self
    }

    /// Fold a sequence of transactions into a fresh book.
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        transactions.into_iter().fold(Self::new(), Self::fold)
    }

    /// Merge a book built from another partition of the transactions.
    pub fn merge(mut self, other: AccountBook) -> Self {
        for (id, account) in other.accounts {
            match self.accounts.get_mut(&id) {
                Some(existing) => existing.merge(account),
                None => {
                    self.accounts.insert(id, account);
                }
            }
        }
        self.transactions += other.transactions;
        self
    }

    /// Account of one participant.
    pub fn get(&self, participant_id: &str) -> Option<&Account> {
        self.accounts.get(participant_id)
    }

    /// Accounts in participant-id order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Number of participants seen.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether no participant has been seen.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Number of transactions folded in.
    pub fn transaction_count(&self) -> u64 {
        self.transactions
    }
}
