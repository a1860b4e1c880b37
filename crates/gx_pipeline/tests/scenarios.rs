//! End-to-end scenarios through the orchestrator.

use gx_algo::{Ruleset, UserStats};
use gx_core::{EngineConfig, ParticipantId, ParticipantPreference};
use gx_pipeline::{evaluate_all, finalize, Outcome, PipelineError};

fn pid(s: &str) -> ParticipantId {
    s.parse().unwrap()
}

fn group(ids: &[&str]) -> Vec<ParticipantPreference> {
    ids.iter().map(|s| ParticipantPreference::neutral(pid(s))).collect()
}

/// A, B, C, D mid-range; D excludes A.
fn abcd() -> Vec<ParticipantPreference> {
    let mut g = group(&["A", "B", "C", "D"]);
    g[3].exclusions.insert(pid("A"));
    g
}

fn fast_cfg() -> EngineConfig {
    let mut cfg = EngineConfig::default();
    cfg.simulation.simulations = 100;
    cfg
}

fn pairings(outcome: &Outcome) -> &gx_algo::Assignment {
    match outcome {
        Outcome::Pairings(a) => a,
        Outcome::PlayOrder(_) => panic!("expected pairings"),
    }
}

fn assert_derangement(a: &gx_algo::Assignment, ids: &[&str]) {
    assert_eq!(a.len(), ids.len());
    let receivers: std::collections::BTreeSet<_> = a.values().collect();
    assert_eq!(receivers.len(), ids.len());
    for (g, r) in a {
        assert_ne!(g, r);
    }
}

#[test]
fn random_matching_never_self_assigns_and_honors_exclusion() {
    let prefs = abcd();
    for seed in 0..64 {
        let f = finalize("Random Matching", &prefs, Some(seed), &fast_cfg()).unwrap();
        let a = pairings(&f.outcome);
        assert_derangement(a, &["A", "B", "C", "D"]);
        assert_ne!(a[&pid("D")], pid("A"));
        assert!(!f.metadata.relaxed_exclusions);
    }
}

#[test]
fn max_utility_returns_full_bijection_despite_sentinel() {
    let f = finalize("Max Utility", &abcd(), None, &fast_cfg()).unwrap();
    let a = pairings(&f.outcome);
    assert_derangement(a, &["A", "B", "C", "D"]);
    assert_ne!(a[&pid("D")], pid("A"));
    let total = f.metadata.total_utility.unwrap();
    assert!((total - 32.0).abs() < 1e-9);
}

#[test]
fn comparison_has_exactly_the_four_keys() {
    let cmp = evaluate_all(&abcd(), &fast_cfg()).unwrap();
    let keys: Vec<_> = cmp.rulesets.keys().copied().collect();
    assert_eq!(keys, Ruleset::ALL.to_vec());
    assert!(cmp.failed.is_empty());
    for stats in cmp.rulesets.values() {
        assert!(stats.std_dev.is_finite());
        assert_eq!(stats.user_stats.len(), 4);
    }
    let we = &cmp.rulesets[&Ruleset::WhiteElephant];
    assert_eq!(we.game.unwrap().simulations_run, 100);
    assert!(matches!(we.user_stats[&pid("A")], UserStats::Simulated { .. }));
}

#[test]
fn two_people_get_the_only_derangement() {
    let prefs = group(&["A", "B"]);
    for name in ["Random Matching", "Max Utility", "Max Fairness"] {
        let f = finalize(name, &prefs, Some(3), &fast_cfg()).unwrap();
        let a = pairings(&f.outcome);
        assert_eq!(a[&pid("A")], pid("B"));
        assert_eq!(a[&pid("B")], pid("A"));
    }
    let f = finalize("White Elephant", &prefs, Some(3), &fast_cfg()).unwrap();
    match f.outcome {
        Outcome::PlayOrder(order) => {
            let mut sorted = order.clone();
            sorted.sort();
            assert_eq!(sorted, vec![pid("A"), pid("B")]);
        }
        Outcome::Pairings(_) => panic!("expected a play order"),
    }
}

#[test]
fn fewer_than_two_is_rejected() {
    let err = evaluate_all(&group(&["solo"]), &fast_cfg()).unwrap_err();
    assert!(matches!(err, PipelineError::Validate(_)));
    let err = finalize("Max Utility", &[], None, &fast_cfg()).unwrap_err();
    assert!(matches!(err, PipelineError::Validate(_)));
}

#[test]
fn oversized_utility_weight_is_rejected_up_front() {
    let mut cfg = fast_cfg();
    cfg.utility.preference_weight = 1e308;
    let err = evaluate_all(&abcd(), &cfg).unwrap_err();
    match err {
        PipelineError::Validate(report) => {
            assert!(report.issues.iter().any(|i| i.code == "config.domain"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn self_exclusion_is_rejected_not_corrected() {
    let mut prefs = group(&["A", "B", "C"]);
    prefs[1].exclusions.insert(pid("B"));
    let err = finalize("Max Fairness", &prefs, None, &fast_cfg()).unwrap_err();
    match err {
        PipelineError::Validate(report) => {
            assert!(report.issues.iter().any(|i| i.code == "exclusions.self"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unknown_exclusion_target_is_only_a_warning() {
    let mut prefs = group(&["A", "B", "C"]);
    prefs[0].exclusions.insert(pid("nobody"));
    assert!(finalize("Max Fairness", &prefs, None, &fast_cfg()).is_ok());
}

#[test]
fn infeasible_exclusions_relax_instead_of_failing() {
    let mut prefs = group(&["A", "B"]);
    prefs[0].exclusions.insert(pid("B"));
    for name in ["Random Matching", "Max Utility", "Max Fairness"] {
        let f = finalize(name, &prefs, Some(1), &fast_cfg()).unwrap();
        assert!(f.metadata.relaxed_exclusions, "{name}");
        assert_eq!(pairings(&f.outcome)[&pid("A")], pid("B"));
    }
}

#[test]
fn seeded_finalize_is_reproducible() {
    let prefs = group(&["A", "B", "C", "D", "E", "F", "G"]);
    for name in ["Random Matching", "Max Fairness", "White Elephant"] {
        let a = finalize(name, &prefs, Some(2024), &fast_cfg()).unwrap();
        let b = finalize(name, &prefs, Some(2024), &fast_cfg()).unwrap();
        assert_eq!(a, b, "{name}");
    }
}

#[test]
fn comparison_is_reproducible_and_serializes() {
    let cfg = fast_cfg();
    let a = evaluate_all(&abcd(), &cfg).unwrap();
    let b = evaluate_all(&abcd(), &cfg).unwrap();
    assert_eq!(a, b);

    let json = serde_json::to_value(&a).unwrap();
    let keys: Vec<_> = json["rulesets"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys.len(), 4);
    assert!(keys.contains(&"White Elephant".to_string()));
    assert!(json["rulesets"]["White Elephant"]["simulations_run"].is_u64());
    assert!(json["rulesets"]["Max Utility"].get("simulations_run").is_none());
}

#[test]
fn fairness_minimum_dominates_utility_minimum() {
    let mut prefs = group(&["A", "B", "C", "D", "E"]);
    let l = |v| gx_core::Level::new(v).unwrap();
    prefs[0].novelty_receiving = l(5);
    prefs[1].thoughtfulness_giving = l(1);
    prefs[2].practicality_receiving = l(1);
    prefs[3].novelty_giving = l(5);
    prefs[4].interests.insert("Coffee".into());
    prefs[2].interests.insert("Coffee".into());
    let cmp = evaluate_all(&prefs, &fast_cfg()).unwrap();
    let fair = &cmp.rulesets[&Ruleset::MaxFairness];
    let util = &cmp.rulesets[&Ruleset::MaxUtility];
    let random = &cmp.rulesets[&Ruleset::RandomMatching];
    assert!(fair.min_utility + 1e-9 >= util.min_utility);
    assert!(util.group_satisfaction_score + 1e-9 >= random.group_satisfaction_score);
}
