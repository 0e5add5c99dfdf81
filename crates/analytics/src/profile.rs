//! Behavioral profiles.
//!
//! Every classification axis is an ordered list of [`ProfileRule`]s; the first
//! matching rule decides the label. The lists are plain data so they can be
//! inspected and tested on their own.

use crate::aggregator::{Account, AccountBook};
use crate::metrics::MetricRecord;
use crate::rules::{first_match, Rule};
use mercato_core::config::ProfileConfig;
use mercato_core::{Config, ParticipantId, Position};
use serde::Serialize;
use std::collections::BTreeMap;

/// Metric vector a profile is classified from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileInputs {
    pub win_rate: f64,
    /// Absolute value efficiency.
    pub average_overpay: f64,
    pub total_bids: u32,
    pub forward_pct: f64,
    pub defensive_pct: f64,
    pub total_goals: u32,
    pub diversity: usize,
    pub contested_won: u32,
    pub forwards: u32,
    pub midfielders: u32,
    pub defenders: u32,
    /// Owning group with the most won items, and that count.
    pub favourite_group: Option<(String, u32)>,
}

impl ProfileInputs {
    pub fn from_record(record: &MetricRecord, account: &Account) -> Self {
        Self {
            win_rate: record.win_rate,
            average_overpay: record.average_overpay(),
            total_bids: record.total_bids,
            forward_pct: record.forward_pct(),
            defensive_pct: record.defensive_pct(),
            total_goals: record.total_goals,
            diversity: record.diversity,
            contested_won: record.contested_won,
            forwards: record.position_count(Position::Forward),
            midfielders: record.position_count(Position::Midfielder),
            defenders: record.position_count(Position::Defender),
            favourite_group: account
                .top_group()
                .map(|(group, count)| (group.to_string(), count)),
        }
    }
}

/// Decision-list entry over profile inputs.
pub type ProfileRule<L> = Rule<L, ProfileInputs, ProfileConfig>;

/// Bidding selectivity, decided by win rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Highly selective.
    Sniper,
    /// Calculated.
    Strategist,
    Balanced,
    /// High-risk, opportunistic.
    Gambler,
    /// Competitive, mixed results.
    Competitor,
}

impl Archetype {
    pub fn label(self) -> &'static str {
        match self {
            Archetype::Sniper => "The Sniper",
            Archetype::Strategist => "The Strategist",
            Archetype::Balanced => "The Balanced Player",
            Archetype::Gambler => "The Gambler",
            Archetype::Competitor => "The Competitor",
        }
    }

    fn traits(self) -> [&'static str; 2] {
        match self {
            Archetype::Sniper => ["Extremely selective", "Waits for a sure thing"],
            Archetype::Strategist => ["Calculated risk-taker", "High success rate"],
            Archetype::Balanced => ["Wins some, loses some", "Measured approach"],
            Archetype::Gambler => ["Bids on everything", "High risk tolerance"],
            Archetype::Competitor => ["Enjoys the contest", "Mixed results"],
        }
    }

    fn strategy(self) -> &'static str {
        match self {
            Archetype::Sniper => "Only bids when the win is all but guaranteed.",
            Archetype::Strategist => "Chooses targets carefully and knows when to walk away.",
            Archetype::Balanced => "Competes for what matters without overreaching.",
            Archetype::Gambler => "Spreads bids widely and hopes enough of them land.",
            Archetype::Competitor => "Happy to lose a fight as long as it was a good one.",
        }
    }
}

/// Spending behavior, decided by average overpay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingStyle {
    DeepPockets,
    Premium,
    FairMarket,
    ValueFocused,
}

impl SpendingStyle {
    pub fn label(self) -> &'static str {
        match self {
            SpendingStyle::DeepPockets => "Deep pockets",
            SpendingStyle::Premium => "Premium buyer",
            SpendingStyle::FairMarket => "Fair market buyer",
            SpendingStyle::ValueFocused => "Value hunter",
        }
    }

    fn outlook(self) -> &'static str {
        match self {
            SpendingStyle::DeepPockets => "Pays whatever it takes to win.",
            SpendingStyle::Premium => "Accepts a markup for the players they want.",
            SpendingStyle::FairMarket => "Pays close to market rate.",
            SpendingStyle::ValueFocused => "Rarely pays above quotation.",
        }
    }
}

/// Squad composition, decided by category shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SquadFocus {
    ForwardHeavy,
    DefenseHeavy,
    Balanced,
}

impl SquadFocus {
    pub fn label(self) -> &'static str {
        match self {
            SquadFocus::ForwardHeavy => "Attack-minded",
            SquadFocus::DefenseHeavy => "Defensive mastermind",
            SquadFocus::Balanced => "Balanced squad",
        }
    }
}

/// Combined personality, decided by compound predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    Showboat,
    Professor,
    ChaosAgent,
    FortressBuilder,
    Warrior,
    Pragmatist,
}

impl Personality {
    pub fn label(self) -> &'static str {
        match self {
            Personality::Showboat => "The Showboat",
            Personality::Professor => "The Professor",
            Personality::ChaosAgent => "The Chaos Agent",
            Personality::FortressBuilder => "The Fortress Builder",
            Personality::Warrior => "The Warrior",
            Personality::Pragmatist => "The Pragmatist",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Personality::Showboat => "Pays top money for attacking stars.",
            Personality::Professor => "Wins most auctions without overpaying.",
            Personality::ChaosAgent => "Bids constantly and loses more than they win.",
            Personality::FortressBuilder => "Builds from the back at sensible prices.",
            Personality::Warrior => "Thrives in crowded auctions.",
            Personality::Pragmatist => "No flashy moves, just steady decisions.",
        }
    }
}

/// Bidding activity trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    LovesTheBattle,
    TriggerHappy,
    PatientObserver,
}

impl Activity {
    fn label(self) -> &'static str {
        match self {
            Activity::LovesTheBattle => "Loves the battle",
            Activity::TriggerHappy => "Trigger happy",
            Activity::PatientObserver => "Patient observer",
        }
    }

    fn outlook(self, inputs: &ProfileInputs) -> String {
        match self {
            Activity::LovesTheBattle => {
                format!("Won {} contested auctions.", inputs.contested_won)
            }
            Activity::TriggerHappy => format!("Placed {} bids.", inputs.total_bids),
            Activity::PatientObserver => {
                format!("Only {} bids, picking moments carefully.", inputs.total_bids)
            }
        }
    }
}

pub fn archetype_rules() -> Vec<ProfileRule<Archetype>> {
    vec![
        Rule { label: Archetype::Sniper, when: |i, c| i.win_rate > c.sniper_win_rate },
        Rule { label: Archetype::Strategist, when: |i, c| i.win_rate > c.strategist_win_rate },
        Rule { label: Archetype::Balanced, when: |i, c| i.win_rate > c.balanced_win_rate },
        Rule { label: Archetype::Gambler, when: |i, c| i.win_rate < c.gambler_win_rate },
    ]
}

pub fn spending_rules() -> Vec<ProfileRule<SpendingStyle>> {
    vec![
        Rule { label: SpendingStyle::DeepPockets, when: |i, c| i.average_overpay > c.deep_pockets_overpay },
        Rule { label: SpendingStyle::Premium, when: |i, c| i.average_overpay > c.premium_overpay },
        Rule { label: SpendingStyle::FairMarket, when: |i, c| i.average_overpay > c.fair_market_overpay },
    ]
}

pub fn squad_rules() -> Vec<ProfileRule<SquadFocus>> {
    vec![
        Rule { label: SquadFocus::ForwardHeavy, when: |i, c| i.forward_pct > c.forward_heavy_pct },
        Rule { label: SquadFocus::DefenseHeavy, when: |i, c| i.defensive_pct > c.defense_heavy_pct },
    ]
}

pub fn personality_rules() -> Vec<ProfileRule<Personality>> {
    vec![
        Rule {
            label: Personality::Showboat,
            when: |i, c| i.average_overpay > c.showboat_overpay && i.forward_pct > c.showboat_forward_pct,
        },
        Rule {
            label: Personality::Professor,
            when: |i, c| i.win_rate > c.professor_win_rate && i.average_overpay < c.professor_overpay,
        },
        Rule {
            label: Personality::ChaosAgent,
            when: |i, c| i.total_bids > c.chaos_min_bids && i.win_rate < c.chaos_win_rate,
        },
        Rule {
            label: Personality::FortressBuilder,
            when: |i, c| i.defensive_pct > c.fortress_defense_pct && i.average_overpay < c.fortress_overpay,
        },
        Rule {
            label: Personality::Warrior,
            when: |i, c| i.contested_won >= c.warrior_contested_won,
        },
    ]
}

pub fn activity_rules() -> Vec<ProfileRule<Activity>> {
    vec![
        Rule { label: Activity::LovesTheBattle, when: |i, c| i.contested_won >= c.battle_contested_won },
        Rule { label: Activity::TriggerHappy, when: |i, c| i.total_bids >= c.trigger_happy_bids },
        Rule { label: Activity::PatientObserver, when: |i, c| i.total_bids <= c.patient_bids },
    ]
}

/// Classification result for one participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub participant_id: ParticipantId,
    pub name: String,
    pub archetype: Archetype,
    pub spending: SpendingStyle,
    pub squad_focus: SquadFocus,
    pub personality: Personality,
    pub traits: Vec<String>,
    pub strategy: String,
    pub spending_outlook: String,
    pub squad_description: String,
}

/// Unused map key for a participant: the name, then `"name (id)"`, then
/// `"name (id) #2"`, `#3`, and so on.
pub(crate) fn unique_key<V>(map: &BTreeMap<String, V>, name: &str, participant_id: &str) -> String {
    if !map.contains_key(name) {
        return name.to_string();
    }
    let base = format!("{name} ({participant_id})");
    let mut key = base.clone();
    let mut n = 2;
    while map.contains_key(&key) {
        key = format!("{base} #{n}");
        n += 1;
    }
    key
}

/// Maps metric vectors to profiles.
pub struct ProfileClassifier {
    config: ProfileConfig,
    archetypes: Vec<ProfileRule<Archetype>>,
    spending: Vec<ProfileRule<SpendingStyle>>,
    squads: Vec<ProfileRule<SquadFocus>>,
    personalities: Vec<ProfileRule<Personality>>,
    activities: Vec<ProfileRule<Activity>>,
}

impl ProfileClassifier {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.profile.clone(),
            archetypes: archetype_rules(),
            spending: spending_rules(),
            squads: squad_rules(),
            personalities: personality_rules(),
            activities: activity_rules(),
        }
    }

    pub fn archetype(&self, inputs: &ProfileInputs) -> Archetype {
        first_match(&self.archetypes, inputs, &self.config).unwrap_or(Archetype::Competitor)
    }

    pub fn spending(&self, inputs: &ProfileInputs) -> SpendingStyle {
        first_match(&self.spending, inputs, &self.config).unwrap_or(SpendingStyle::ValueFocused)
    }

    pub fn squad_focus(&self, inputs: &ProfileInputs) -> SquadFocus {
        first_match(&self.squads, inputs, &self.config).unwrap_or(SquadFocus::Balanced)
    }

    pub fn personality(&self, inputs: &ProfileInputs) -> Personality {
        first_match(&self.personalities, inputs, &self.config).unwrap_or(Personality::Pragmatist)
    }

    /// Classify one metric vector.
    pub fn classify(&self, participant_id: &str, name: &str, inputs: &ProfileInputs) -> Profile {
        let cfg = &self.config;
        let archetype = self.archetype(inputs);
        let spending = self.spending(inputs);
        let squad_focus = self.squad_focus(inputs);
        let personality = self.personality(inputs);

        let mut traits: Vec<String> = archetype.traits().iter().map(|t| t.to_string()).collect();
        traits.push(spending.label().to_string());

        let mut squad_description = match squad_focus {
            SquadFocus::ForwardHeavy => {
                traits.push(squad_focus.label().to_string());
                format!("Built around attack with {} forwards.", inputs.forwards)
            }
            SquadFocus::DefenseHeavy => {
                traits.push(squad_focus.label().to_string());
                format!("Stacked the back line with {} defenders.", inputs.defenders)
            }
            SquadFocus::Balanced => format!(
                "Balanced squad: {} forwards, {} midfielders, {} defenders.",
                inputs.forwards, inputs.midfielders, inputs.defenders
            ),
        };

        if inputs.total_goals > cfg.goal_machine_goals {
            traits.push("Goal machine collector".to_string());
            squad_description.push_str(&format!(" The squad carries {} goals.", inputs.total_goals));
        } else if inputs.total_goals < cfg.low_goals {
            traits.push("Under-powered attack".to_string());
            squad_description.push_str(&format!(" Only {} goals in the squad.", inputs.total_goals));
        }

        if let Some((group, count)) = &inputs.favourite_group {
            if *count >= cfg.super_fan_items {
                traits.push(format!("{group} super fan"));
                squad_description.push_str(&format!(" {count} players come from {group}."));
            }
        }

        if inputs.diversity >= cfg.globe_trotter_groups {
            traits.push("Globe trotter".to_string());
            squad_description.push_str(&format!(" Shopped at {} different clubs.", inputs.diversity));
        } else if inputs.diversity <= cfg.loyalist_groups {
            traits.push("Local loyalist".to_string());
            squad_description.push_str(&format!(" Kept to {} clubs.", inputs.diversity));
        }

        let mut spending_outlook = spending.outlook().to_string();
        if let Some(activity) = first_match(&self.activities, inputs, cfg) {
            traits.push(activity.label().to_string());
            spending_outlook.push(' ');
            spending_outlook.push_str(&activity.outlook(inputs));
        }

        Profile {
            participant_id: participant_id.to_string(),
            name: name.to_string(),
            archetype,
            spending,
            squad_focus,
            personality,
            traits,
            strategy: archetype.strategy().to_string(),
            spending_outlook,
            squad_description,
        }
    }

    /// Profile of one participant, or `None` if they never won an item.
    pub fn profile(&self, record: &MetricRecord, account: &Account) -> Option<Profile> {
        if record.won == 0 {
            return None;
        }
        let inputs = ProfileInputs::from_record(record, account);
        Some(self.classify(&record.participant_id, &record.name, &inputs))
    }

    /// Profiles keyed by display name. A name shared by two participants is
    /// disambiguated with the participant id, see [`unique_key`].
    pub fn profile_all(&self, records: &[MetricRecord], book: &AccountBook) -> BTreeMap<String, Profile> {
        let mut sorted: Vec<&MetricRecord> = records.iter().collect();
        sorted.sort_by(|a, b| a.participant_id.cmp(&b.participant_id));

        let mut profiles = BTreeMap::new();
        for record in sorted {
            let Some(account) = book.get(&record.participant_id) else {
                continue;
            };
            if let Some(profile) = self.profile(record, account) {
                let key = unique_key(&profiles, &record.name, &record.participant_id);
                profiles.insert(key, profile);
            }
        }
        profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_inputs(win_rate: f64, overpay: f64, total_bids: u32) -> ProfileInputs {
        ProfileInputs {
            win_rate,
            average_overpay: overpay,
            total_bids,
            forward_pct: 20.0,
            defensive_pct: 30.0,
            total_goals: 20,
            diversity: 12,
            contested_won: 0,
            forwards: 2,
            midfielders: 3,
            defenders: 2,
            favourite_group: None,
        }
    }

    fn classifier() -> ProfileClassifier {
        ProfileClassifier::new(&Config::default())
    }

    #[test]
    fn test_archetype_first_match_wins() {
        let c = classifier();
        // 95 also exceeds 75 and 60; only the first rule counts.
        assert_eq!(c.archetype(&make_inputs(95.0, 0.0, 30)), Archetype::Sniper);
        assert_eq!(c.archetype(&make_inputs(80.0, 0.0, 30)), Archetype::Strategist);
        assert_eq!(c.archetype(&make_inputs(61.0, 0.0, 30)), Archetype::Balanced);
        assert_eq!(c.archetype(&make_inputs(40.0, 0.0, 30)), Archetype::Gambler);
        assert_eq!(c.archetype(&make_inputs(55.0, 0.0, 30)), Archetype::Competitor);
        // Boundaries are strict.
        assert_eq!(c.archetype(&make_inputs(90.0, 0.0, 30)), Archetype::Strategist);
        assert_eq!(c.archetype(&make_inputs(50.0, 0.0, 30)), Archetype::Competitor);
    }

    #[test]
    fn test_spending_bands() {
        let c = classifier();
        assert_eq!(c.spending(&make_inputs(50.0, 16.0, 30)), SpendingStyle::DeepPockets);
        assert_eq!(c.spending(&make_inputs(50.0, 11.0, 30)), SpendingStyle::Premium);
        assert_eq!(c.spending(&make_inputs(50.0, 6.0, 30)), SpendingStyle::FairMarket);
        assert_eq!(c.spending(&make_inputs(50.0, 5.0, 30)), SpendingStyle::ValueFocused);
    }

    #[test]
    fn test_squad_focus_prefers_forwards() {
        let c = classifier();
        let mut inputs = make_inputs(50.0, 0.0, 30);
        inputs.forward_pct = 45.0;
        inputs.defensive_pct = 55.0;
        assert_eq!(c.squad_focus(&inputs), SquadFocus::ForwardHeavy);

        inputs.forward_pct = 10.0;
        assert_eq!(c.squad_focus(&inputs), SquadFocus::DefenseHeavy);

        inputs.defensive_pct = 50.0;
        assert_eq!(c.squad_focus(&inputs), SquadFocus::Balanced);
    }

    #[test]
    fn test_personality_priority() {
        let c = classifier();

        // Matches both showboat and warrior; showboat comes first.
        let mut inputs = make_inputs(50.0, 13.0, 30);
        inputs.forward_pct = 40.0;
        inputs.contested_won = 6;
        assert_eq!(c.personality(&inputs), Personality::Showboat);

        assert_eq!(c.personality(&make_inputs(80.0, 2.0, 30)), Personality::Professor);
        assert_eq!(c.personality(&make_inputs(40.0, 9.0, 45)), Personality::ChaosAgent);

        let mut fortress = make_inputs(60.0, 9.0, 30);
        fortress.defensive_pct = 50.0;
        assert_eq!(c.personality(&fortress), Personality::FortressBuilder);

        let mut warrior = make_inputs(60.0, 9.0, 30);
        warrior.contested_won = 4;
        assert_eq!(c.personality(&warrior), Personality::Warrior);

        assert_eq!(c.personality(&make_inputs(60.0, 9.0, 30)), Personality::Pragmatist);
    }

    #[test]
    fn test_traits_and_rationale() {
        let c = classifier();
        let mut inputs = make_inputs(95.0, 3.0, 20);
        inputs.total_goals = 40;
        inputs.diversity = 19;
        inputs.favourite_group = Some(("Lyon".to_string(), 4));

        let profile = c.classify("p1", "Les Canaris", &inputs);
        assert_eq!(
            profile.traits,
            vec![
                "Extremely selective",
                "Waits for a sure thing",
                "Value hunter",
                "Goal machine collector",
                "Lyon super fan",
                "Globe trotter",
                "Patient observer",
            ]
        );
        assert_eq!(profile.strategy, Archetype::Sniper.strategy());
        assert!(profile.squad_description.contains("40 goals"));
        assert!(profile.spending_outlook.contains("Only 20 bids"));
    }

    #[test]
    fn test_activity_battle_beats_bid_count() {
        let c = classifier();
        let mut inputs = make_inputs(50.0, 0.0, 50);
        inputs.contested_won = 5;
        let profile = c.classify("p1", "p1", &inputs);
        assert!(profile.traits.iter().any(|t| t == "Loves the battle"));
        assert!(!profile.traits.iter().any(|t| t == "Trigger happy"));
    }

    #[test]
    fn test_middle_activity_has_no_trait() {
        let c = classifier();
        let profile = c.classify("p1", "p1", &make_inputs(50.0, 0.0, 30));
        assert_eq!(profile.spending_outlook, SpendingStyle::ValueFocused.outlook());
    }

    #[test]
    fn test_rule_lists_are_ordered() {
        let labels: Vec<Archetype> = archetype_rules().iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec![Archetype::Sniper, Archetype::Strategist, Archetype::Balanced, Archetype::Gambler]
        );
        assert_eq!(personality_rules().len(), 5);
    }

    #[test]
    fn test_unique_key_never_overwrites() {
        let mut map: BTreeMap<String, u32> = BTreeMap::new();
        for (i, (name, id)) in [("X", "c"), ("X (c)", "a"), ("X", "c"), ("X", "c")].iter().enumerate() {
            let key = unique_key(&map, name, id);
            map.insert(key, i as u32);
        }
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["X", "X (c)", "X (c) #2", "X (c) #3"]);
    }

    #[test]
    fn test_profile_all_keeps_colliding_names() {
        use mercato_core::{Bid, ItemAttributes, ItemKey, Transaction};
        use mercato_ingestion::Directory;

        let txn = |item: &str, winner: &str| Transaction {
            key: ItemKey::new("1", item),
            item: ItemAttributes {
                name: item.to_string(),
                quotation: 5,
                position: Position::Midfielder,
                group: None,
                stats: Default::default(),
            },
            winning_bid: Bid {
                participant_id: winner.to_string(),
                price: 5,
                placed_at: None,
            },
            losing_bids: Vec::new(),
        };
        let book = AccountBook::from_transactions(&[txn("i1", "a"), txn("i2", "b"), txn("i3", "c")]);
        let config = Config::default();
        let mut records = crate::metrics::MetricsCalculator::new(&config).calculate_all(&book, &Directory::new());
        // "a" takes the literal key that "c" would fall back to.
        for record in &mut records {
            record.name = match record.participant_id.as_str() {
                "a" => "X (c)".to_string(),
                _ => "X".to_string(),
            };
        }

        let profiles = classifier().profile_all(&records, &book);
        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles["X (c)"].participant_id, "a");
        assert_eq!(profiles["X"].participant_id, "b");
        assert_eq!(profiles["X (c) #2"].participant_id, "c");
    }
}
