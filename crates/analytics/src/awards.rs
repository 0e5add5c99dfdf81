//! Awards: named extremal selections over participants and won items.
//!
//! Each award is an [`AwardDefinition`] whose evaluator filters a candidate
//! set, picks the extremal candidate, and formats the result. An empty
//! candidate set (or a failed guard) omits the award; it is never an error.
//! Ties always resolve to the lowest participant id, then the lowest item key.

use crate::aggregator::{Account, AccountBook};
use crate::metrics::MetricRecord;
use mercato_core::config::AwardConfig;
use mercato_core::{Config, ParticipantId, WonItem};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Identifier of each award, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardKey {
    /// Highest single price paid.
    MoneyBags,
    /// Largest overpay on a single item.
    Charity,
    /// Best value among items above the bargain price floor.
    Bargain,
    GoalMachine,
    /// Most goalkeepers and defenders.
    Defensive,
    /// Most distinct owning groups.
    Traveler,
    /// Most items from a single owning group.
    LocalHero,
    /// Lowest win rate among active bidders.
    Gambler,
    /// Highest win rate.
    Sniper,
    /// Fewest matches played across the squad.
    Benchwarmer,
    YellowCards,
}

impl AwardKey {
    pub const ALL: [AwardKey; 11] = [
        AwardKey::MoneyBags,
        AwardKey::Charity,
        AwardKey::Bargain,
        AwardKey::GoalMachine,
        AwardKey::Defensive,
        AwardKey::Traveler,
        AwardKey::LocalHero,
        AwardKey::Gambler,
        AwardKey::Sniper,
        AwardKey::Benchwarmer,
        AwardKey::YellowCards,
    ];

    pub fn title(self) -> &'static str {
        match self {
            AwardKey::MoneyBags => "Money Bags",
            AwardKey::Charity => "Charity Case",
            AwardKey::Bargain => "Bargain Hunter",
            AwardKey::GoalMachine => "Goal Machine",
            AwardKey::Defensive => "Defensive Masterclass",
            AwardKey::Traveler => "World Traveler",
            AwardKey::LocalHero => "Local Hero",
            AwardKey::Gambler => "The Gambler",
            AwardKey::Sniper => "Sniper",
            AwardKey::Benchwarmer => "Benchwarmer Brigade",
            AwardKey::YellowCards => "Card Collector",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            AwardKey::MoneyBags => "💰",
            AwardKey::Charity => "🎁",
            AwardKey::Bargain => "🛒",
            AwardKey::GoalMachine => "⚽",
            AwardKey::Defensive => "🛡️",
            AwardKey::Traveler => "🌍",
            AwardKey::LocalHero => "🏟️",
            AwardKey::Gambler => "🎲",
            AwardKey::Sniper => "🎯",
            AwardKey::Benchwarmer => "🪑",
            AwardKey::YellowCards => "🟨",
        }
    }
}

/// One awarded superlative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AwardRecord {
    pub key: AwardKey,
    pub title: String,
    pub winner_id: ParticipantId,
    pub winner_name: String,
    pub description: String,
    pub emoji: String,
}

/// Direction of an extremal selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Max,
    Min,
}

/// Pick the extremal candidate by `key`, breaking ties on the smallest `tie_break`.
///
/// Returns `None` for an empty candidate set.
pub fn select_extremal<T, K, B>(
    candidates: impl IntoIterator<Item = T>,
    direction: Direction,
    key: impl Fn(&T) -> K,
    tie_break: impl Fn(&T) -> B,
) -> Option<T>
where
    K: Ord,
    B: Ord,
{
    let mut best: Option<(K, T)> = None;
    for candidate in candidates {
        let k = key(&candidate);
        let better = match &best {
            None => true,
            Some((best_key, best_candidate)) => {
                let by_key = match direction {
                    Direction::Max => k.cmp(best_key),
                    Direction::Min => best_key.cmp(&k),
                };
                by_key.is_gt() || (by_key.is_eq() && tie_break(&candidate) < tie_break(best_candidate))
            }
        };
        if better {
            best = Some((k, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}

/// A participant eligible for awards: its metrics and its folded account.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub record: &'a MetricRecord,
    pub account: &'a Account,
}

impl<'a> Candidate<'a> {
    fn id(&self) -> &'a str {
        &self.record.participant_id
    }
}

/// Inputs every award evaluator sees.
pub struct AwardContext<'a> {
    pub candidates: Vec<Candidate<'a>>,
    pub config: &'a AwardConfig,
}

impl<'a> AwardContext<'a> {
    /// Pair each record that won at least one item with its account.
    pub fn new(records: &'a [MetricRecord], book: &'a AccountBook, config: &'a AwardConfig) -> Self {
        let mut candidates: Vec<Candidate<'a>> = records
            .iter()
            .filter(|record| record.won > 0)
            .filter_map(|record| {
                book.get(&record.participant_id)
                    .map(|account| Candidate { record, account })
            })
            .collect();
        candidates.sort_by(|a, b| a.id().cmp(b.id()));
        Self { candidates, config }
    }

    /// Every won item of every candidate, with its owner.
    pub fn won_items(&self) -> impl Iterator<Item = (Candidate<'a>, &'a WonItem)> + '_ {
        self.candidates
            .iter()
            .flat_map(|c| c.account.won_items.iter().map(move |item| (*c, item)))
    }

    fn participant_extremal<K: Ord>(
        &self,
        direction: Direction,
        key: impl Fn(&Candidate<'a>) -> K,
    ) -> Option<Candidate<'a>> {
        select_extremal(self.candidates.iter().copied(), direction, key, |c| c.id())
    }

    fn item_extremal<K: Ord>(
        &self,
        items: impl IntoIterator<Item = (Candidate<'a>, &'a WonItem)>,
        direction: Direction,
        key: impl Fn(&WonItem) -> K,
    ) -> Option<(Candidate<'a>, &'a WonItem)> {
        select_extremal(items, direction, |(_, item)| key(*item), |(c, item)| (c.id(), item.key.clone()))
    }
}

/// Winner and description produced by an evaluator.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub winner: &'a MetricRecord,
    pub description: String,
}

impl<'a> Selection<'a> {
    fn new(candidate: Candidate<'a>, description: String) -> Self {
        Self {
            winner: candidate.record,
            description,
        }
    }
}

/// One declared award.
#[derive(Clone, Copy)]
pub struct AwardDefinition {
    pub key: AwardKey,
    pub evaluate: for<'a> fn(&AwardContext<'a>) -> Option<Selection<'a>>,
}

fn club_label(item: &WonItem) -> &str {
    item.group.as_deref().unwrap_or("unknown club")
}

fn money_bags<'a>(ctx: &AwardContext<'a>) -> Option<Selection<'a>> {
    let (owner, item) = ctx.item_extremal(ctx.won_items(), Direction::Max, |item| item.price)?;
    Some(Selection::new(
        owner,
        format!("Paid {} for {} ({})", item.price, item.name, club_label(item)),
    ))
}

fn charity<'a>(ctx: &AwardContext<'a>) -> Option<Selection<'a>> {
    let (owner, item) = ctx.item_extremal(ctx.won_items(), Direction::Min, |item| item.value)?;
    let description = if item.value < 0 {
        format!(
            "Paid {} over quotation for {} ({})",
            item.value.unsigned_abs(),
            item.name,
            club_label(item)
        )
    } else {
        format!(
            "Worst deal was {} ({}) and it still came in at or under quotation",
            item.name,
            club_label(item)
        )
    };
    Some(Selection::new(owner, description))
}

fn bargain<'a>(ctx: &AwardContext<'a>) -> Option<Selection<'a>> {
    let min_price = ctx.config.bargain_min_price;
    let priced = ctx.won_items().filter(|(_, item)| item.price >= min_price);
    let (owner, item) = ctx.item_extremal(priced, Direction::Max, |item| item.value)?;
    if item.value < 0 {
        return None;
    }
    Some(Selection::new(
        owner,
        format!(
            "{} ({}) for {} against a quotation of {}",
            item.name,
            club_label(item),
            item.price,
            item.quotation
        ),
    ))
}

fn goal_machine<'a>(ctx: &AwardContext<'a>) -> Option<Selection<'a>> {
    let winner = ctx.participant_extremal(Direction::Max, |c| c.record.total_goals)?;
    let description = format!("{} goals across the squad", winner.record.total_goals);
    Some(Selection::new(winner, description))
}

fn defensive<'a>(ctx: &AwardContext<'a>) -> Option<Selection<'a>> {
    let winner = ctx.participant_extremal(Direction::Max, |c| c.record.defensive_count())?;
    let description = format!("{} goalkeepers and defenders", winner.record.defensive_count());
    Some(Selection::new(winner, description))
}

fn traveler<'a>(ctx: &AwardContext<'a>) -> Option<Selection<'a>> {
    let winner = ctx.participant_extremal(Direction::Max, |c| c.record.diversity)?;
    let description = format!("{} different clubs in one squad", winner.record.diversity);
    Some(Selection::new(winner, description))
}

fn local_hero<'a>(ctx: &AwardContext<'a>) -> Option<Selection<'a>> {
    let with_group = ctx
        .candidates
        .iter()
        .filter_map(|c| c.account.top_group().map(|(group, count)| (*c, group, count)));
    let (winner, group, count) =
        select_extremal(with_group, Direction::Max, |(_, _, count)| *count, |(c, _, _)| c.id())?;
    Some(Selection::new(winner, format!("{count} players from {group}")))
}

fn gambler<'a>(ctx: &AwardContext<'a>) -> Option<Selection<'a>> {
    let min_bids = ctx.config.active_min_bids;
    let active = ctx
        .candidates
        .iter()
        .copied()
        .filter(|c| c.record.total_bids >= min_bids);
    let winner = select_extremal(
        active,
        Direction::Min,
        |c| OrderedFloat(c.record.win_rate),
        |c| c.id(),
    )?;
    let description = format!(
        "Only {:.1}% win rate from {} bids",
        winner.record.win_rate, winner.record.total_bids
    );
    Some(Selection::new(winner, description))
}

fn sniper<'a>(ctx: &AwardContext<'a>) -> Option<Selection<'a>> {
    let winner = ctx.participant_extremal(Direction::Max, |c| OrderedFloat(c.record.win_rate))?;
    let description = format!("{:.1}% win rate", winner.record.win_rate);
    Some(Selection::new(winner, description))
}

fn benchwarmer<'a>(ctx: &AwardContext<'a>) -> Option<Selection<'a>> {
    let winner = ctx.participant_extremal(Direction::Min, |c| c.record.total_matches)?;
    let description = format!("Squad totals only {} matches played", winner.record.total_matches);
    Some(Selection::new(winner, description))
}

fn yellow_cards<'a>(ctx: &AwardContext<'a>) -> Option<Selection<'a>> {
    let winner = ctx.participant_extremal(Direction::Max, |c| c.record.total_cards)?;
    if winner.record.total_cards == 0 {
        return None;
    }
    let description = format!("{} yellow cards in the squad", winner.record.total_cards);
    Some(Selection::new(winner, description))
}

/// The full award catalogue, in [`AwardKey`] order.
pub fn default_awards() -> Vec<AwardDefinition> {
    vec![
        AwardDefinition { key: AwardKey::MoneyBags, evaluate: money_bags },
        AwardDefinition { key: AwardKey::Charity, evaluate: charity },
        AwardDefinition { key: AwardKey::Bargain, evaluate: bargain },
        AwardDefinition { key: AwardKey::GoalMachine, evaluate: goal_machine },
        AwardDefinition { key: AwardKey::Defensive, evaluate: defensive },
        AwardDefinition { key: AwardKey::Traveler, evaluate: traveler },
        AwardDefinition { key: AwardKey::LocalHero, evaluate: local_hero },
        AwardDefinition { key: AwardKey::Gambler, evaluate: gambler },
        AwardDefinition { key: AwardKey::Sniper, evaluate: sniper },
        AwardDefinition { key: AwardKey::Benchwarmer, evaluate: benchwarmer },
        AwardDefinition { key: AwardKey::YellowCards, evaluate: yellow_cards },
    ]
}

/// Evaluates a list of award definitions.
pub struct AwardEngine {
    config: AwardConfig,
    definitions: Vec<AwardDefinition>,
}

impl AwardEngine {
    /// Engine with the full award catalogue.
    pub fn new(config: &Config) -> Self {
        Self::with_definitions(config, default_awards())
    }

    pub fn with_definitions(config: &Config, definitions: Vec<AwardDefinition>) -> Self {
        Self {
            config: config.awards.clone(),
            definitions,
        }
    }

    /// Evaluate every definition. Awards without a qualifying candidate are omitted.
    pub fn evaluate(&self, records: &[MetricRecord], book: &AccountBook) -> BTreeMap<AwardKey, AwardRecord> {
        let ctx = AwardContext::new(records, book, &self.config);
        let mut awards = BTreeMap::new();

        for definition in &self.definitions {
            match (definition.evaluate)(&ctx) {
                Some(selection) => {
                    awards.insert(
                        definition.key,
                        AwardRecord {
                            key: definition.key,
                            title: definition.key.title().to_string(),
                            winner_id: selection.winner.participant_id.clone(),
                            winner_name: selection.winner.name.clone(),
                            description: selection.description,
                            emoji: definition.key.emoji().to_string(),
                        },
                    );
                }
                None => debug!(award = ?definition.key, "No qualifying candidate, award omitted"),
            }
        }

        awards
    }
}
