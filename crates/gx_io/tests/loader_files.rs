use std::fs;

use assert_json_diff::assert_json_eq;
use serde_json::json;

use gx_io::{load_config, load_preferences, write_canonical_file, IoError};

fn record(id: &str, exclusions: &[&str]) -> serde_json::Value {
    json!({
        "user_id": id,
        "preference_practicality_giving": 3,
        "preference_practicality_receiving": 3,
        "preference_novelty_giving": 2,
        "preference_novelty_receiving": 4,
        "preference_thoughtfulness_giving": 5,
        "preference_thoughtfulness_receiving": 1,
        "preferred_interests": ["Books"],
        "we_hate_being_stolen_from": 3,
        "we_enjoy_stealing": 3,
        "exclusions": exclusions,
    })
}

#[test]
fn loads_wrapped_file_and_reports_digest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    let doc = json!({"group_id": "office", "preferences": [record("a", &["b"]), record("b", &[])]});
    fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();

    let loaded = load_preferences(&path).unwrap();
    assert_eq!(loaded.group_id.as_deref(), Some("office"));
    assert_eq!(loaded.preferences.len(), 2);
    assert!(loaded.preferences[0].excludes(&"b".parse().unwrap()));
    assert_eq!(loaded.sha256.len(), 64);

    // same records, different formatting: same digest
    let compact = dir.path().join("compact.json");
    fs::write(&compact, serde_json::to_string(&doc["preferences"]).unwrap()).unwrap();
    assert_eq!(load_preferences(&compact).unwrap().sha256, loaded.sha256);
}

#[test]
fn missing_file_is_a_path_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_preferences(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, IoError::Path(_)));
}

#[test]
fn malformed_json_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "[{\"user_id\": ").unwrap();
    match load_preferences(&path).unwrap_err() {
        IoError::Json { at, .. } => assert!(at.contains("broken.json")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn partial_config_takes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    fs::write(&path, r#"{"simulation": {"simulations": 25}, "utility": {"preference_weight": 1.0}}"#).unwrap();
    let cfg = load_config(&path).unwrap();
    assert_eq!(cfg.simulation.simulations, 25);
    assert_eq!(cfg.simulation.max_steals_per_gift, 3);
    assert_eq!(cfg.utility.preference_weight, 1.0);
    assert_eq!(cfg.utility.interest_bonus_per_shared_tag, 1.0);
    assert_eq!(cfg.random_max_attempts, 10_000);
}

#[test]
fn canonical_output_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");
    let value = json!({"zeta": [3, 1], "alpha": {"k": "v"}});
    write_canonical_file(&path, &value, true).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\"alpha\""));
    let back: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_json_eq!(back, value);
}
