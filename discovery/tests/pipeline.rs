//! End-to-end pipeline tests over realistic export fixtures.

use std::fs;
use std::path::PathBuf;

use rally_stats_core::{Outcome, Skill, Weights};
use rally_stats_discovery::analysis::{Analysis, analyze_document};
use rally_stats_discovery::canonical::pseudo_match_id;
use rally_stats_discovery::discover::DiscoveryConfig;
use rally_stats_discovery::load::{LoadError, parse_document, read_document};
use serde_json::{Value, json};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn analyze_fixture(name: &str) -> Analysis {
    let doc = read_document(fixture(name)).expect("fixture must load");
    analyze_document(&doc, &DiscoveryConfig::default())
}

fn analyze(doc: &Value) -> Analysis {
    analyze_document(doc, &DiscoveryConfig::default())
}

// ---- envelope export ----

#[test]
fn test_envelope_export_skips_null_root_candidate() {
    let analysis = analyze_fixture("envelope_export.json");

    assert_eq!(analysis.exported_at.as_deref(), Some("2024-06-02T08:30:00Z"));
    assert_eq!(analysis.discovery.collections, 2);
    assert_eq!(analysis.summary.total, 7);
    assert_eq!(analysis.events.len(), 6);
    assert_eq!(analysis.dropped, 1);
}

#[test]
fn test_envelope_export_key_listing() {
    let analysis = analyze_fixture("envelope_export.json");
    let listing: Vec<(&str, &str)> = analysis
        .keys
        .iter()
        .map(|k| (k.key.as_str(), k.kind.as_str()))
        .collect();
    assert_eq!(
        listing,
        vec![
            ("launchCount", "number"),
            ("settings", "string"),
            ("tutorialDone", "boolean"),
            ("valleyPwa.db.v2", "object"),
            ("volleyPwa.db.v2", "object"),
        ]
    );
}

#[test]
fn test_envelope_export_summary_tables() {
    let analysis = analyze_fixture("envelope_export.json");
    let summary = &analysis.summary;

    assert_eq!(summary.by_type[0], ("spike".to_string(), 2));
    assert_eq!(summary.by_type[1], ("block".to_string(), 2));
    // Nested `player: {"id": ..}` objects are compound labels.
    assert_eq!(summary.by_player[0], ("unknown".to_string(), 4));
    assert_eq!(summary.by_player[1], ("p7".to_string(), 2));

    let players: Vec<&str> = analysis.players.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(players, vec!["p7", "p9"]);
}

#[test]
fn test_envelope_export_matches_and_dates() {
    let analysis = analyze_fixture("envelope_export.json");
    assert_eq!(analysis.matches.len(), 2);
    assert_eq!(analysis.matches[0].id, "m-final");
    assert_eq!(analysis.matches[0].date_iso.as_deref(), Some("2024-06-01"));
    assert_eq!(analysis.matches[1].name, "league day 3");
}

#[test]
fn test_envelope_export_player_stats_sorted_by_name() {
    let analysis = analyze_fixture("envelope_export.json");
    let stats = analysis.player_stats(Some("p7"), &Weights::default());

    let names: Vec<&str> = stats.iter().map(|s| s.match_name.as_str()).collect();
    assert_eq!(names, vec!["league day 3", "Spring Cup Final"]);
    for stat in &stats {
        assert_eq!(stat.total, 2);
        assert_eq!(stat.decision_rate, 0.5);
        assert_eq!(stat.effect_rate, 0.5);
    }
    assert!(stats[0].by_skill.contains_key(&Skill::Block));
    assert!(stats[1].by_skill.contains_key(&Skill::Spike));
}

#[test]
fn test_envelope_export_unassigned_and_localized_labels() {
    let analysis = analyze_fixture("envelope_export.json");

    let unassigned = analysis.player_stats(None, &Weights::default());
    assert_eq!(unassigned.len(), 1);
    let receive = &unassigned[0].by_skill[&Skill::Receive];
    assert_eq!(receive.counts.continued, 1);
    assert_eq!(receive.decision_rate, 0.0);
    assert_eq!(receive.effect_rate, 0.5);

    let p9 = analysis.player_stats(Some("p9"), &Weights::default());
    let serve = &p9[0].by_skill[&Skill::Serve];
    assert_eq!(serve.counts.effective, 1);
    assert!((serve.effect_rate - 0.6).abs() < 1e-9);
}

// ---- bare store without envelope ----

#[test]
fn test_bare_store_is_its_own_root() {
    let analysis = analyze_fixture("bare_store.json");
    assert!(analysis.exported_at.is_none());
    assert_eq!(analysis.keys.len(), 3);
    assert_eq!(analysis.summary.total, 4);

    let skills: Vec<Skill> = analysis.events.iter().map(|e| e.skill).collect();
    assert_eq!(
        skills,
        vec![Skill::Serve, Skill::Serve, Skill::Set, Skill::Receive]
    );
    let outcomes: Vec<Outcome> = analysis.events.iter().map(|e| e.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            Outcome::Point,
            Outcome::Miss,
            Outcome::Effective,
            Outcome::Effective
        ]
    );
}

#[test]
fn test_bare_store_numeric_players_and_pseudo_ids() {
    let analysis = analyze_fixture("bare_store.json");

    // The summary folds the falsy `0` into the unknown bucket, while the
    // canonical record keeps it as a concrete id.
    assert_eq!(analysis.summary.by_player[0], ("4".to_string(), 2));
    assert_eq!(analysis.summary.by_player[1], ("unknown".to_string(), 2));
    assert_eq!(analysis.events[2].player_id.as_deref(), Some("0"));
    assert_eq!(analysis.events[3].player_id, None);

    assert_eq!(analysis.matches[0].id, pseudo_match_id("Practice A"));
    assert_eq!(analysis.matches[1].id, pseudo_match_id("Practice B"));
}

#[test]
fn test_no_events_fixture_is_empty_not_an_error() {
    let analysis = analyze_fixture("no_events.json");
    assert!(analysis.is_empty());
    assert!(analysis.events.is_empty());
    assert!(analysis.matches.is_empty());
    assert!(!analysis.discovery.budget_exhausted);
    assert!(analysis.player_stats(None, &Weights::default()).is_empty());
}

// ---- documented scenarios ----

#[test]
fn test_scenario_half_point_half_miss() {
    let doc = json!({"events": [
        {"type": "spike", "result": "point", "player": "A"},
        {"type": "spike", "result": "miss", "player": "A"}
    ]});
    let stats = analyze(&doc).player_stats(Some("A"), &Weights::default());
    let spike = &stats[0].by_skill[&Skill::Spike];
    assert_eq!(spike.decision_rate, 0.5);
    assert_eq!(spike.effect_rate, 0.5);
}

#[test]
fn test_scenario_synonyms_are_included() {
    let doc = json!({"events": [{"type": "atk", "result": "inplay", "player": "A"}]});
    let analysis = analyze(&doc);
    assert_eq!(analysis.events[0].skill, Skill::Spike);
    assert_eq!(analysis.events[0].outcome, Outcome::Continue);
    let stats = analysis.player_stats(Some("A"), &Weights::default());
    assert_eq!(stats[0].total, 1);
}

#[test]
fn test_scenario_missing_result_is_dropped() {
    // Both records are event-like (string `type` and `outcome`), but only
    // one outcome maps to the closed vocabulary.
    let doc = json!({"events": [
        {"type": "spike", "outcome": "?", "player": "A", "matchName": "Cup"},
        {"type": "spike", "outcome": "point", "player": "A", "matchName": "Cup"}
    ]});
    let analysis = analyze(&doc);
    assert_eq!(analysis.summary.total, 2);
    let stats = analysis.player_stats(Some("A"), &Weights::default());
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].total, 1);
}

#[test]
fn test_every_synonym_folds_to_the_same_skill() {
    let labels = ["spike", "ATK", "attack", "hit", "スパイク", "アタック", " Spike "];
    let records: Vec<Value> = labels
        .iter()
        .map(|label| json!({"type": label, "result": "point", "player": "A"}))
        .collect();
    let analysis = analyze(&json!({ "events": records }));
    assert_eq!(analysis.events.len(), labels.len());
    assert!(analysis.events.iter().all(|e| e.skill == Skill::Spike));
}

// ---- robustness ----

#[test]
fn test_pipeline_is_idempotent() {
    let doc = read_document(fixture("envelope_export.json")).unwrap();
    let first = analyze(&doc);
    let second = analyze(&doc);
    assert_eq!(first, second);

    let weights = Weights::default();
    assert_eq!(
        first.player_stats(Some("p7"), &weights),
        second.player_stats(Some("p7"), &weights)
    );
}

#[test]
fn test_rates_stay_in_unit_interval() {
    let analysis = analyze_fixture("envelope_export.json");
    let mut filters: Vec<Option<&str>> = analysis
        .players
        .iter()
        .map(|p| Some(p.id.as_str()))
        .collect();
    filters.push(None);

    for filter in filters {
        for stat in analysis.player_stats(filter, &Weights::default()) {
            assert!((0.0..=1.0).contains(&stat.decision_rate));
            assert!((0.0..=1.0).contains(&stat.effect_rate));
            for per_skill in stat.by_skill.values() {
                assert!((0.0..=1.0).contains(&per_skill.decision_rate));
                assert!((0.0..=1.0).contains(&per_skill.effect_rate));
            }
        }
    }
}

#[test]
fn test_odd_but_valid_json_never_panics() {
    let inputs = [
        "null",
        "0",
        "\"keys\"",
        "[]",
        "[[[[]]]]",
        r#"{"keys": null}"#,
        r#"{"keys": []}"#,
        r#"{"keys": {"volleyPwa.db.v2": 5}}"#,
        r#"{"events": [null, 1, "x", {}, []]}"#,
        r#"{"events": [{"type": {"nested": true}, "result": ["point"]}]}"#,
        r#"{"events": [{"type": "spike", "result": "point", "matchName": 42, "playerId": 1.5}]}"#,
    ];
    for raw in inputs {
        let doc = parse_document(raw.as_bytes()).unwrap();
        let analysis = analyze(&doc);
        let _ = analysis.player_stats(None, &Weights::default());
    }
}

#[test]
fn test_deeply_nested_export_is_found() {
    let depth = 200;
    let raw = format!(
        "{}{}{}",
        r#"{"a":"#.repeat(depth),
        r#"[{"type":"spike","result":"point"}]"#,
        "}".repeat(depth)
    );
    let doc = parse_document(raw.as_bytes()).expect("deep but valid JSON must parse");
    let analysis = analyze(&doc);

    assert!(!analysis.discovery.budget_exhausted);
    assert_eq!(analysis.events.len(), 1);
    assert_eq!(analysis.events[0].skill, Skill::Spike);
    assert_eq!(analysis.events[0].outcome, Outcome::Point);
}

#[test]
fn test_exactly_half_event_like_qualifies() {
    let doc = json!({"log": [
        {"type": "serve", "result": "ace"},
        {"note": "substitution"}
    ]});
    let analysis = analyze(&doc);
    assert_eq!(analysis.discovery.collections, 1);
    assert_eq!(analysis.events.len(), 1);
}

#[test]
fn test_step_limit_is_reported() {
    let doc = json!({"a": {"b": {"c": {"events": [{"type": "spike", "result": "point"}]}}}});
    let config = DiscoveryConfig {
        step_limit: 2,
        ..DiscoveryConfig::default()
    };
    let analysis = analyze_document(&doc, &config);
    assert!(analysis.discovery.budget_exhausted);
    assert!(analysis.is_empty());
}

#[test]
fn test_corrupt_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"keys\": {").unwrap();
    let err = read_document(&path).unwrap_err();
    assert!(matches!(err, LoadError::Json(_)));
}
