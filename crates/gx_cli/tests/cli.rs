use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};

fn record(id: &str, exclusions: &[&str]) -> Value {
    json!({
        "user_id": id,
        "preference_practicality_giving": 3,
        "preference_practicality_receiving": 3,
        "preference_novelty_giving": 3,
        "preference_novelty_receiving": 3,
        "preference_thoughtfulness_giving": 3,
        "preference_thoughtfulness_receiving": 3,
        "preferred_interests": [],
        "we_hate_being_stolen_from": 3,
        "we_enjoy_stealing": 3,
        "exclusions": exclusions,
    })
}

fn write_group(dir: &Path) -> PathBuf {
    let path = dir.join("group.json");
    let doc = json!({
        "group_id": "office",
        "preferences": [record("A", &[]), record("B", &[]), record("C", &[]), record("D", &["A"])],
    });
    fs::write(&path, doc.to_string()).unwrap();
    path
}

fn gx() -> Command {
    let mut cmd = Command::cargo_bin("gx").unwrap();
    cmd.env_remove("GX_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn compare_prints_all_four_rulesets() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_group(dir.path());
    let v = stdout_json(gx().args(["compare", "--simulations", "40", "--seed", "7", "--input"]).arg(&input));

    let rulesets = v["comparison"]["rulesets"].as_object().unwrap();
    let mut keys: Vec<_> = rulesets.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, ["Max Fairness", "Max Utility", "Random Matching", "White Elephant"]);
    assert_eq!(v["comparison"]["seed"], 7);
    assert_eq!(v["comparison"]["rulesets"]["White Elephant"]["simulations_run"], 40);
    assert_eq!(v["group_id"], "office");
    assert_eq!(v["input_sha256"].as_str().unwrap().len(), 64);
}

#[test]
fn compare_is_deterministic_under_a_seed() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_group(dir.path());
    let run = || {
        gx().args(["compare", "--simulations", "25", "--seed", "0x2a", "--input"])
            .arg(&input)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn finalize_writes_pairings_with_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_group(dir.path());
    let out = dir.path().join("out").join("final.json");
    gx().args(["finalize", "--ruleset", "Max Utility", "--seed", "11", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote"));

    let v: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let result = &v["result"];
    assert_eq!(result["ruleset"], "Max Utility");
    let pairs = result["outcome"]["pairings"].as_object().unwrap();
    assert_eq!(pairs.len(), 4);
    assert_ne!(pairs["D"], "A");
    for (giver, receiver) in pairs {
        assert_ne!(giver.as_str(), receiver.as_str().unwrap());
    }
    assert_eq!(result["metadata"]["seed_requested"], 11);
    assert_eq!(result["metadata"]["seed_used"], 11);
    assert_eq!(result["metadata"]["relaxed_exclusions"], false);
    assert!(result["metadata"]["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn finalize_without_seed_reports_drawn_seed() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_group(dir.path());
    let v = stdout_json(gx().args(["finalize", "--ruleset", "White Elephant", "--input"]).arg(&input));
    let meta = &v["result"]["metadata"];
    assert!(meta["seed_requested"].is_null());
    assert!(meta["seed_used"].is_u64());
    assert_eq!(v["result"]["outcome"]["play_order"].as_array().unwrap().len(), 4);
}

#[test]
fn unknown_ruleset_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_group(dir.path());
    gx().args(["finalize", "--ruleset", "Secret Santa", "--input"])
        .arg(&input)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Secret Santa"));
}

#[test]
fn invalid_group_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("solo.json");
    fs::write(&input, json!([record("A", &["A"])]).to_string()).unwrap();
    gx().args(["compare", "--input"])
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("participants.too_few"));
}

#[test]
fn out_of_range_level_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.json");
    let mut r = record("A", &[]);
    r["we_enjoy_stealing"] = json!(9);
    fs::write(&input, json!([r, record("B", &[])]).to_string()).unwrap();
    gx().args(["compare", "--input"]).arg(&input).assert().code(2);
}

#[test]
fn missing_input_exits_2() {
    gx().args(["compare", "--input", "/definitely/not/here.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn unreadable_output_location_exits_4() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_group(dir.path());
    // a regular file where a directory is needed
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "x").unwrap();
    gx().args(["compare", "--simulations", "5", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(blocker.join("out.json"))
        .assert()
        .code(4);
}
