//! Common statistics shape shared by every strategy, plus the numeric helpers
//! (mean, population variance, fairness score) they all aggregate with.
//!
//! Population (divide by N) moments throughout. Empty inputs yield 0.0 rather
//! than NaN so a degenerate group still serializes as finite numbers.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use gx_core::ParticipantId;

use crate::assignment::MatchingOutcome;
use crate::utility::UtilityMatrix;

/// Per-participant figures. Matching strategies report expectations over the
/// pairs they could produce; the stealing game reports simulated outcomes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum UserStats {
    Matching {
        expected_utility: f64,
        variance: f64,
    },
    Simulated {
        avg_utility: f64,
        utility_standard_deviation: f64,
        /// Share of runs in which this participant was stolen from.
        times_stolen_from_pct: f64,
        /// Share of runs in which this participant stole.
        times_stole_pct: f64,
        /// Mean times stolen from per run.
        avg_times_stolen_from: f64,
        /// Mean steals made per run.
        avg_times_stole: f64,
    },
}

impl UserStats {
    /// Central value regardless of variant.
    pub fn center(&self) -> f64 {
        match self {
            UserStats::Matching { expected_utility, .. } => *expected_utility,
            UserStats::Simulated { avg_utility, .. } => *avg_utility,
        }
    }
}

/// Stealing-game extras.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GameSummary {
    pub avg_steals_per_game: f64,
    pub max_steals_observed: u32,
    pub simulations_run: u32,
}

/// One strategy's statistics in the comparison.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RulesetStats {
    pub group_satisfaction_score: f64,
    pub group_fairness_score: f64,
    pub min_utility: f64,
    pub max_utility: Option<f64>,
    pub std_dev: f64,
    pub user_stats: BTreeMap<ParticipantId, UserStats>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub relaxed_exclusions: bool,
    /// Stealing game only; flattened into the same object.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub game: Option<GameSummary>,
}

impl RulesetStats {
    /// All-zero stats used when a strategy failed during comparison.
    pub fn placeholder() -> Self {
        Self {
            group_satisfaction_score: 0.0,
            group_fairness_score: 0.0,
            min_utility: 0.0,
            max_utility: Some(0.0),
            std_dev: 0.0,
            user_stats: BTreeMap::new(),
            relaxed_exclusions: false,
            game: None,
        }
    }

    /// Stats of one concrete assignment: each receiver's realized utility,
    /// zero variance.
    pub fn from_matching(matrix: &UtilityMatrix, outcome: &MatchingOutcome) -> Self {
        let received = outcome.received_utilities(matrix);
        let user_stats = matrix
            .ids()
            .iter()
            .zip(&received)
            .map(|(id, &u)| (id.clone(), UserStats::Matching { expected_utility: u, variance: 0.0 }))
            .collect();

        Self {
            group_satisfaction_score: mean(&received),
            group_fairness_score: fairness_score(&received),
            min_utility: min_of(&received),
            max_utility: Some(max_of(&received)),
            std_dev: population_std_dev(&received),
            user_stats,
            relaxed_exclusions: outcome.relaxed_exclusions,
            game: None,
        }
    }
}

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

pub fn population_variance(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64
}

#[inline]
pub fn population_std_dev(xs: &[f64]) -> f64 {
    population_variance(xs).sqrt()
}

/// Minimum, 0.0 for an empty slice.
pub fn min_of(xs: &[f64]) -> f64 {
    xs.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

/// Maximum, 0.0 for an empty slice.
pub fn max_of(xs: &[f64]) -> f64 {
    xs.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// Fairness on a 0..=10 scale: the better of a coefficient-of-variation
/// score `max(0, 1 - std/mean) * 10` and a min/max ratio score
/// `min/max * 10`, capped at 10.
///
/// Non-positive mean zeroes the first term; non-positive max zeroes the second.
pub fn fairness_score(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let cv_score = if m > 0.0 {
        (1.0 - population_std_dev(values) / m).max(0.0) * 10.0
    } else {
        0.0
    };
    let hi = max_of(values);
    let ratio_score = if hi > 0.0 { (min_of(values) / hi) * 10.0 } else { 0.0 };
    cv_score.max(ratio_score).min(10.0)
}
