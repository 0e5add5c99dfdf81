//! Roast commentary.
//!
//! Each participant with at least one won item gets a list of short comment
//! lines. Comments come from groups of [`RoastRule`]s; groups are evaluated in
//! order and at most one rule fires per group.

use crate::aggregator::{Account, AccountBook};
use crate::awards::{select_extremal, Direction};
use crate::metrics::MetricRecord;
use crate::profile::unique_key;
use crate::rules::{first_match, Rule};
use mercato_core::config::RoastConfig;
use mercato_core::{Amount, Config, WonItem};
use serde::Serialize;
use std::collections::BTreeMap;

/// Kind of comment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Roast {
    Champion,
    WoodenSpoon,
    SevereOverpay,
    HeavyOverpay,
    GoalDrought,
    GoalFest,
    LocalBias,
    StickerCollector,
    PoorRating,
    StrongRating,
    Donation,
    SmartBuy,
    Splurge,
    ClubObsession,
    ClubFan,
}

impl Roast {
    pub fn emoji(self) -> &'static str {
        match self {
            Roast::Champion => "🏆",
            Roast::WoodenSpoon => "🤡",
            Roast::SevereOverpay => "💸",
            Roast::HeavyOverpay => "💰",
            Roast::GoalDrought | Roast::GoalFest => "⚽",
            Roast::LocalBias => "🏟️",
            Roast::StickerCollector => "🌍",
            Roast::PoorRating => "📉",
            Roast::StrongRating => "⭐",
            Roast::Donation => "🤦",
            Roast::SmartBuy => "🛒",
            Roast::Splurge => "💎",
            Roast::ClubObsession => "🏟️",
            Roast::ClubFan => "👀",
        }
    }

    /// Comment text for the participant described by `inputs`.
    pub fn text(self, inputs: &RoastInputs) -> String {
        let overpay = -inputs.value_efficiency;
        match self {
            Roast::Champion => "Top of the table. The squad actually holds together.".to_string(),
            Roast::WoodenSpoon => "Bottom of the table. Were the bids placed blindfolded?".to_string(),
            Roast::SevereOverpay => {
                format!("Paid {overpay:.1} over quotation per player on average. Generous to a fault.")
            }
            Roast::HeavyOverpay => format!("Overpaid by {overpay:.1} per player. Money is no object."),
            Roast::GoalDrought => {
                format!("Only {} goals in the whole squad. Expect a lot of goalless draws.", inputs.total_goals)
            }
            Roast::GoalFest => format!("{} goals in the squad. Was the whole front line on sale?", inputs.total_goals),
            Roast::LocalBias => format!("Just {} different clubs. Never strays far from home.", inputs.diversity),
            Roast::StickerCollector => {
                format!("{} different clubs. Completing a sticker album?", inputs.diversity)
            }
            Roast::PoorRating => format!("Average rating {:.2}. Room for improvement.", inputs.average_rating),
            Roast::StrongRating => format!("Average rating {:.2}. Genuinely solid.", inputs.average_rating),
            Roast::Donation => describe(inputs.worst_value.as_ref(), |n| {
                format!(
                    "{} ({}) for {} against a quotation of {}. That was a donation.",
                    n.name, n.club, n.price, n.quotation
                )
            }),
            Roast::SmartBuy => describe(inputs.cheapest.as_ref(), |n| {
                format!("{} ({}) for {}. One shrewd purchase at least.", n.name, n.club, n.price)
            }),
            Roast::Splurge => describe(inputs.priciest.as_ref(), |n| {
                format!("{} ({}) for {}. Big spender.", n.name, n.club, n.price)
            }),
            Roast::ClubObsession => describe_group(inputs, |group, count| {
                format!("{count} players from {group}. On commission?")
            }),
            Roast::ClubFan => describe_group(inputs, |group, count| {
                format!("{count} players from {group}. Clearly a fan.")
            }),
        }
    }
}

fn describe(note: Option<&ItemNote>, text: impl Fn(&ItemNote) -> String) -> String {
    note.map(text).unwrap_or_default()
}

fn describe_group(inputs: &RoastInputs, text: impl Fn(&str, u32) -> String) -> String {
    inputs
        .favourite_group
        .as_ref()
        .map(|(group, count)| text(group, *count))
        .unwrap_or_default()
}

/// A won item singled out by a comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemNote {
    pub name: String,
    /// Owning-group name, or "unknown club".
    pub club: String,
    pub price: Amount,
    pub quotation: Amount,
    pub value: i64,
}

impl ItemNote {
    fn from_item(item: &WonItem) -> Self {
        Self {
            name: item.name.clone(),
            club: item.group.clone().unwrap_or_else(|| "unknown club".to_string()),
            price: item.price,
            quotation: item.quotation,
            value: item.value,
        }
    }
}

/// Everything a roast rule looks at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoastInputs {
    /// 1-based leaderboard position among participants with a won item.
    pub rank: usize,
    pub field_size: usize,
    pub value_efficiency: f64,
    pub total_goals: u32,
    pub diversity: usize,
    pub average_rating: f64,
    /// Item with the lowest value.
    pub worst_value: Option<ItemNote>,
    /// Item with the lowest price.
    pub cheapest: Option<ItemNote>,
    /// Item with the highest price.
    pub priciest: Option<ItemNote>,
    pub favourite_group: Option<(String, u32)>,
}

impl RoastInputs {
    pub fn new(record: &MetricRecord, account: &Account, rank: usize, field_size: usize) -> Self {
        let items = &account.won_items;
        Self {
            rank,
            field_size,
            value_efficiency: record.value_efficiency,
            total_goals: record.total_goals,
            diversity: record.diversity,
            average_rating: record.average_rating,
            worst_value: pick(items, Direction::Min, |item| item.value),
            cheapest: pick(items, Direction::Min, |item| i64::from(item.price)),
            priciest: pick(items, Direction::Max, |item| i64::from(item.price)),
            favourite_group: account
                .top_group()
                .map(|(group, count)| (group.to_string(), count)),
        }
    }
}

/// Extremal won item by `key`, ties going to the smallest item key.
fn pick(items: &[WonItem], direction: Direction, key: impl Fn(&WonItem) -> i64) -> Option<ItemNote> {
    select_extremal(items.iter(), direction, |item| key(*item), |item| item.key.clone()).map(ItemNote::from_item)
}

/// Decision-list entry over roast inputs.
pub type RoastRule = Rule<Roast, RoastInputs, RoastConfig>;

pub fn standing_rules() -> Vec<RoastRule> {
    vec![
        Rule { label: Roast::Champion, when: |i, _| i.rank == 1 },
        Rule { label: Roast::WoodenSpoon, when: |i, _| i.rank == i.field_size },
    ]
}

pub fn value_rules() -> Vec<RoastRule> {
    vec![
        Rule { label: Roast::SevereOverpay, when: |i, c| i.value_efficiency < -c.severe_overpay },
        Rule { label: Roast::HeavyOverpay, when: |i, c| i.value_efficiency < -c.heavy_overpay },
    ]
}

pub fn goal_rules() -> Vec<RoastRule> {
    vec![
        Rule { label: Roast::GoalDrought, when: |i, c| i.total_goals < c.goal_drought },
        Rule { label: Roast::GoalFest, when: |i, c| i.total_goals > c.goal_fest },
    ]
}

pub fn club_spread_rules() -> Vec<RoastRule> {
    vec![
        Rule { label: Roast::LocalBias, when: |i, c| i.diversity < c.local_bias_groups },
        Rule { label: Roast::StickerCollector, when: |i, c| i.diversity > c.sticker_collector_groups },
    ]
}

pub fn rating_rules() -> Vec<RoastRule> {
    vec![
        Rule { label: Roast::PoorRating, when: |i, c| i.average_rating < c.poor_rating },
        Rule { label: Roast::StrongRating, when: |i, c| i.average_rating > c.strong_rating },
    ]
}

pub fn item_rules() -> Vec<Vec<RoastRule>> {
    vec![
        vec![Rule {
            label: Roast::Donation,
            when: |i, c| i.worst_value.as_ref().is_some_and(|n| n.value < c.donation_value),
        }],
        vec![Rule {
            label: Roast::SmartBuy,
            when: |i, c| i.cheapest.as_ref().is_some_and(|n| n.price <= c.smart_buy_price),
        }],
        vec![Rule {
            label: Roast::Splurge,
            when: |i, c| i.priciest.as_ref().is_some_and(|n| n.price > c.splurge_price),
        }],
    ]
}

pub fn favourite_club_rules() -> Vec<RoastRule> {
    vec![
        Rule {
            label: Roast::ClubObsession,
            when: |i, c| i.favourite_group.as_ref().is_some_and(|(_, n)| *n >= c.obsession_items),
        },
        Rule {
            label: Roast::ClubFan,
            when: |i, c| i.favourite_group.as_ref().is_some_and(|(_, n)| *n >= c.fan_items),
        },
    ]
}

/// Rule groups in output order.
pub fn default_roast_groups() -> Vec<Vec<RoastRule>> {
    let mut groups = vec![standing_rules(), value_rules(), goal_rules(), club_spread_rules(), rating_rules()];
    groups.extend(item_rules());
    groups.push(favourite_club_rules());
    groups
}

/// One comment line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoastLine {
    pub kind: Roast,
    pub emoji: &'static str,
    pub text: String,
}

/// Produces comment lines from metric records.
pub struct RoastEngine {
    config: RoastConfig,
    groups: Vec<Vec<RoastRule>>,
}

impl RoastEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.roasts.clone(),
            groups: default_roast_groups(),
        }
    }

    /// Comment lines for one participant, in group order.
    pub fn roast(&self, inputs: &RoastInputs) -> Vec<RoastLine> {
        self.groups
            .iter()
            .filter_map(|group| first_match(group, inputs, &self.config))
            .map(|kind| RoastLine {
                kind,
                emoji: kind.emoji(),
                text: kind.text(inputs),
            })
            .collect()
    }

    /// Comment lines keyed like the profiles. `leaderboard` must already be
    /// ranked; participants without a won item are skipped.
    pub fn roast_all(&self, leaderboard: &[MetricRecord], book: &AccountBook) -> BTreeMap<String, Vec<RoastLine>> {
        let mut field: Vec<(usize, &MetricRecord, &Account)> = leaderboard
            .iter()
            .filter(|record| record.won > 0)
            .filter_map(|record| book.get(&record.participant_id).map(|account| (record, account)))
            .enumerate()
            .map(|(i, (record, account))| (i + 1, record, account))
            .collect();
        let field_size = field.len();
        field.sort_by(|a, b| a.1.participant_id.cmp(&b.1.participant_id));

        let mut roasts = BTreeMap::new();
        for (rank, record, account) in field {
            let inputs = RoastInputs::new(record, account, rank, field_size);
            let key = unique_key(&roasts, &record.name, &record.participant_id);
            roasts.insert(key, self.roast(&inputs));
        }
        roasts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_inputs(rank: usize, field_size: usize) -> RoastInputs {
        RoastInputs {
            rank,
            field_size,
            value_efficiency: 0.0,
            total_goals: 10,
            diversity: 12,
            average_rating: 5.0,
            worst_value: None,
            cheapest: None,
            priciest: None,
            favourite_group: None,
        }
    }

    fn note(name: &str, price: u32, quotation: u32) -> ItemNote {
        ItemNote {
            name: name.to_string(),
            club: "Lyon".to_string(),
            price,
            quotation,
            value: i64::from(quotation) - i64::from(price),
        }
    }

    fn kinds(inputs: &RoastInputs) -> Vec<Roast> {
        RoastEngine::new(&Config::default())
            .roast(inputs)
            .into_iter()
            .map(|line| line.kind)
            .collect()
    }

    #[test]
    fn test_quiet_middle_of_the_table() {
        assert!(kinds(&make_inputs(2, 3)).is_empty());
    }

    #[test]
    fn test_standing() {
        assert_eq!(kinds(&make_inputs(1, 3)), vec![Roast::Champion]);
        assert_eq!(kinds(&make_inputs(3, 3)), vec![Roast::WoodenSpoon]);
        // A field of one is only the champion.
        assert_eq!(kinds(&make_inputs(1, 1)), vec![Roast::Champion]);
    }

    #[test]
    fn test_one_line_per_group() {
        let mut inputs = make_inputs(2, 3);
        inputs.value_efficiency = -20.0;
        inputs.total_goals = 2;
        inputs.diversity = 19;
        inputs.average_rating = 4.0;
        assert_eq!(
            kinds(&inputs),
            vec![Roast::SevereOverpay, Roast::GoalDrought, Roast::StickerCollector, Roast::PoorRating]
        );

        inputs.value_efficiency = -12.0;
        inputs.total_goals = 31;
        inputs.diversity = 9;
        inputs.average_rating = 5.6;
        assert_eq!(
            kinds(&inputs),
            vec![Roast::HeavyOverpay, Roast::GoalFest, Roast::LocalBias, Roast::StrongRating]
        );
    }

    #[test]
    fn test_boundaries_are_strict() {
        let mut inputs = make_inputs(2, 3);
        inputs.value_efficiency = -10.0;
        inputs.total_goals = 5;
        inputs.diversity = 10;
        inputs.average_rating = 4.5;
        assert!(kinds(&inputs).is_empty());
    }

    #[test]
    fn test_item_and_club_lines() {
        let mut inputs = make_inputs(2, 3);
        inputs.worst_value = Some(note("Costly", 45, 10));
        inputs.cheapest = Some(note("Steal", 1, 8));
        inputs.priciest = Some(note("Costly", 51, 10));
        inputs.favourite_group = Some(("Lyon".to_string(), 3));

        let lines = RoastEngine::new(&Config::default()).roast(&inputs);
        let got: Vec<Roast> = lines.iter().map(|l| l.kind).collect();
        assert_eq!(got, vec![Roast::Donation, Roast::SmartBuy, Roast::Splurge, Roast::ClubFan]);
        assert!(lines[0].text.starts_with("Costly (Lyon) for 45"));
        assert_eq!(lines[3].text, "3 players from Lyon. Clearly a fan.");
        assert_eq!(lines[3].emoji, "👀");

        inputs.favourite_group = Some(("Lyon".to_string(), 4));
        assert_eq!(kinds(&inputs).last(), Some(&Roast::ClubObsession));
    }

    #[test]
    fn test_custom_thresholds() {
        let mut config = Config::default();
        config.roasts.goal_fest = 8;
        let engine = RoastEngine::new(&config);
        let lines = engine.roast(&make_inputs(2, 3));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].kind, Roast::GoalFest);
        assert!(lines[0].text.starts_with("10 goals"));
    }

    #[test]
    fn test_group_order() {
        let groups = default_roast_groups();
        assert_eq!(groups.len(), 9);
        assert_eq!(groups[0][0].label, Roast::Champion);
        assert_eq!(groups[8][1].label, Roast::ClubFan);
    }
}
