//! End-to-end pipeline tests, driven from export JSON.

use approx::assert_abs_diff_eq;
use mercato_analytics::{AnalysisEngine, AwardKey, Roast};
use mercato_core::Config;
use mercato_ingestion::MarketExport;
use serde_json::{json, Value};

fn scenario_export() -> Value {
    json!({
        "mercato": {
            "1": {
                "item_a": {
                    "firstName": "Alpha", "lastName": "One",
                    "quotation": 15, "position": 4,
                    "clubId": "mpg_championship_club_1",
                    "stats": {"averageRating": 6.0, "totalGoals": 2},
                    "wonBid": {"teamId": "P1", "price": 10, "bidDate": "2024-08-01T10:00:00Z"},
                    "lostBids": [
                        {"teamId": "P2", "price": 8, "bidDate": "not a date"},
                        {"price": 7}
                    ]
                },
                "item_b": {
                    "lastName": "Bravo",
                    "quotation": 3, "position": 2,
                    "clubId": "mpg_championship_club_2",
                    "stats": {"averageRating": 4.0, "totalGoals": 0},
                    "wonBid": {"teamId": "P1", "price": 5}
                },
                "item_unsold": {
                    "lastName": "Nobody",
                    "quotation": 9,
                    "lostBids": [{"teamId": "P2", "price": 4}]
                }
            },
            "2": {
                "item_c": {
                    "lastName": "Charlie",
                    "quotation": 18, "position": 1,
                    "clubId": "mpg_championship_club_2",
                    "wonBid": {"teamId": "P2", "price": 20}
                },
                "item_broken": {"quotation": "lots"}
            }
        },
        "teams": [
            {"id": "P1", "name": "Alpha Club"},
            {"id": "P2", "name": "Beta Club"}
        ],
        "groups": {"mpg_championship_club_1": "Lyon"},
        "stats": {
            "item_c": {"averageRating": 5.0, "totalGoals": 1, "totalYellowCards": 2}
        }
    })
}

fn export_from(value: &Value) -> MarketExport {
    MarketExport::from_json_str(&value.to_string()).unwrap()
}

#[test]
fn test_scenario_end_to_end() {
    let export = export_from(&scenario_export());
    let engine = AnalysisEngine::for_export(Config::default(), &export).unwrap();
    let (report, normalization) = engine.run_export(&export);

    assert_eq!(normalization.resolved, 3);
    assert_eq!(normalization.unresolved, 1);
    assert_eq!(normalization.rejected, 1);
    assert_eq!(normalization.dropped_losing_bids, 1);

    let ids: Vec<&str> = report.leaderboard.iter().map(|r| r.participant_id.as_str()).collect();
    assert_eq!(ids, vec!["P1", "P2"]);

    let p1 = report.record("P1").unwrap();
    assert_eq!(p1.name, "Alpha Club");
    assert_eq!(p1.total_bids, 2);
    assert_eq!(p1.won, 2);
    assert_abs_diff_eq!(p1.win_rate, 100.0, epsilon = 1e-10);
    assert_abs_diff_eq!(p1.value_efficiency, 1.5, epsilon = 1e-10);
    assert_abs_diff_eq!(p1.quality_score, 54.0, epsilon = 1e-10);
    assert_eq!(p1.diversity, 2);

    let p2 = report.record("P2").unwrap();
    assert_eq!(p2.total_bids, 2);
    assert_eq!(p2.won, 1);
    assert_eq!(p2.lost, 1);
    assert_abs_diff_eq!(p2.win_rate, 50.0, epsilon = 1e-10);
    assert_abs_diff_eq!(p2.value_efficiency, -2.0, epsilon = 1e-10);
    assert_abs_diff_eq!(p2.quality_score, 52.0, epsilon = 1e-10);
    assert_eq!(p2.total_cards, 2);

    for record in &report.leaderboard {
        assert_eq!(record.won + record.lost, record.total_bids);
        assert!((0.0..=100.0).contains(&record.win_rate));
    }

    assert!(report.profiles.contains_key("Alpha Club"));
    assert!(report.profiles.contains_key("Beta Club"));

    let champion = &report.roasts["Alpha Club"];
    assert_eq!(champion[0].kind, Roast::Champion);
    assert!(champion.iter().any(|line| line.kind == Roast::GoalDrought));
    assert_eq!(report.roasts["Beta Club"][0].kind, Roast::WoodenSpoon);
}

#[test]
fn test_award_guards_hold() {
    let export = export_from(&scenario_export());
    let engine = AnalysisEngine::for_export(Config::default(), &export).unwrap();
    let (report, _) = engine.run_export(&export);

    let bargain = &report.awards[&AwardKey::Bargain];
    assert_eq!(bargain.winner_name, "Alpha Club");
    assert!(bargain.description.contains("Alpha One"));

    let cards = &report.awards[&AwardKey::YellowCards];
    assert_eq!(cards.winner_name, "Beta Club");

    assert!(!report.awards.contains_key(&AwardKey::Gambler));
    assert_eq!(report.awards[&AwardKey::MoneyBags].winner_name, "Beta Club");
}

#[test]
fn test_permutation_invariance() {
    let original = scenario_export();

    // Same items, regrouped under different days and inserted in another order.
    let mut permuted = original.clone();
    let mercato = permuted["mercato"].as_object_mut().unwrap();
    let day_one = mercato.remove("1").unwrap();
    let day_two = mercato.remove("2").unwrap();
    let mut merged = serde_json::Map::new();
    for day in [&day_two, &day_one] {
        for (id, item) in day.as_object().unwrap() {
            merged.insert(id.clone(), item.clone());
        }
    }
    mercato.insert("1".to_string(), Value::Object(merged));

    let run = |value: &Value| {
        let export = export_from(value);
        let engine = AnalysisEngine::for_export(Config::default(), &export).unwrap();
        engine.run_export(&export).0
    };

    let a = run(&original);
    let b = run(&permuted);

    assert_eq!(a.leaderboard.len(), b.leaderboard.len());
    for (x, y) in a.leaderboard.iter().zip(&b.leaderboard) {
        assert_eq!(x.participant_id, y.participant_id);
        assert_eq!(x.total_bids, y.total_bids);
        assert_eq!(x.won, y.won);
        assert_eq!(x.lost, y.lost);
        assert_eq!(x.spent, y.spent);
        assert_abs_diff_eq!(x.quality_score, y.quality_score, epsilon = 1e-10);
        assert_abs_diff_eq!(x.value_efficiency, y.value_efficiency, epsilon = 1e-10);
    }
    let winners = |r: &mercato_analytics::AnalysisReport| -> Vec<(AwardKey, String)> {
        r.awards.values().map(|a| (a.key, a.winner_id.clone())).collect()
    };
    assert_eq!(winners(&a), winners(&b));
}

#[test]
fn test_reruns_are_byte_identical() {
    let export = export_from(&scenario_export());
    let engine = AnalysisEngine::for_export(Config::default(), &export).unwrap();

    let first = engine.run_export(&export).0.to_json().unwrap();
    let second = engine.run_export(&export).0.to_json().unwrap();
    assert_eq!(first, second);

    let fresh = AnalysisEngine::for_export(Config::default(), &export).unwrap();
    assert_eq!(first, fresh.run_export(&export).0.to_json().unwrap());
}

#[test]
fn test_participant_without_wins_has_no_profile() {
    let export = export_from(&json!({
        "mercato": {
            "1": {
                "x": {"quotation": 5, "wonBid": {"teamId": "winner", "price": 5},
                      "lostBids": [{"teamId": "loser", "price": 4}]}
            }
        }
    }));
    let engine = AnalysisEngine::for_export(Config::default(), &export).unwrap();
    let (report, _) = engine.run_export(&export);

    assert_eq!(report.leaderboard.len(), 2);
    assert_eq!(report.profiles.len(), 1);
    assert!(report.profiles.contains_key("winner"));
    assert_eq!(report.roasts.len(), 1);
    assert_eq!(report.record("loser").unwrap().win_rate, 0.0);
}
