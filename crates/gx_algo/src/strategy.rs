//! The closed set of allocation strategies behind one capability trait.
//!
//! Callers never dispatch on names: parse a [`Ruleset`], ask it for its
//! [`Strategy`], and call `compute_statistics` / `compute_outcome`.
//! `Ruleset::ALL` fixes the comparison order.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use gx_core::{EngineConfig, ParticipantId, ParticipantPreference};

use crate::assignment::Assignment;
use crate::stats::RulesetStats;
use crate::utility::UtilityMatrix;
use crate::{max_fairness, max_utility, random_matching, white_elephant, AlgoError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Ruleset {
    #[cfg_attr(feature = "serde", serde(rename = "Random Matching"))]
    RandomMatching,
    #[cfg_attr(feature = "serde", serde(rename = "Max Utility"))]
    MaxUtility,
    #[cfg_attr(feature = "serde", serde(rename = "Max Fairness"))]
    MaxFairness,
    #[cfg_attr(feature = "serde", serde(rename = "White Elephant"))]
    WhiteElephant,
}

impl Ruleset {
    pub const ALL: [Ruleset; 4] = [
        Ruleset::RandomMatching,
        Ruleset::MaxUtility,
        Ruleset::MaxFairness,
        Ruleset::WhiteElephant,
    ];

    /// Display name, also the key in comparison output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Ruleset::RandomMatching => "Random Matching",
            Ruleset::MaxUtility => "Max Utility",
            Ruleset::MaxFairness => "Max Fairness",
            Ruleset::WhiteElephant => "White Elephant",
        }
    }

    pub fn strategy(self) -> &'static dyn Strategy {
        match self {
            Ruleset::RandomMatching => &RandomMatching,
            Ruleset::MaxUtility => &MaxUtility,
            Ruleset::MaxFairness => &MaxFairness,
            Ruleset::WhiteElephant => &WhiteElephant,
        }
    }
}

impl fmt::Display for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name did not match any ruleset exactly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ruleset: {0:?}")]
pub struct UnknownRuleset(pub String);

impl FromStr for Ruleset {
    type Err = UnknownRuleset;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ruleset::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRuleset(s.to_string()))
    }
}

/// Everything a strategy may read. The matrix is built once per request;
/// a build failure only reaches strategies that ask for it.
#[derive(Debug, Clone, Copy)]
pub struct StrategyInput<'a> {
    pub prefs: &'a [ParticipantPreference],
    pub matrix: Result<&'a UtilityMatrix, &'a AlgoError>,
    pub config: &'a EngineConfig,
    /// Seed for stochastic statistics (the stealing-game batch).
    pub seed: u64,
}

impl<'a> StrategyInput<'a> {
    pub fn matrix(&self) -> Result<&'a UtilityMatrix, AlgoError> {
        self.matrix.map_err(Clone::clone)
    }
}

/// Concrete result of running one strategy for real.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    Pairings {
        assignment: Assignment,
        relaxed_exclusions: bool,
        total_utility: f64,
    },
    PlayOrder(Vec<ParticipantId>),
}

pub trait Strategy: Sync {
    fn ruleset(&self) -> Ruleset;

    fn compute_statistics(&self, input: &StrategyInput<'_>) -> Result<RulesetStats, AlgoError>;

    fn compute_outcome(&self, input: &StrategyInput<'_>, seed: u64) -> Result<StrategyOutcome, AlgoError>;
}

fn pairings(matrix: &UtilityMatrix, outcome: &crate::assignment::MatchingOutcome) -> StrategyOutcome {
    StrategyOutcome::Pairings {
        assignment: outcome.to_assignment(matrix),
        relaxed_exclusions: outcome.relaxed_exclusions,
        total_utility: outcome.total_utility(matrix),
    }
}

pub struct RandomMatching;
pub struct MaxUtility;
pub struct MaxFairness;
pub struct WhiteElephant;

impl Strategy for RandomMatching {
    fn ruleset(&self) -> Ruleset {
        Ruleset::RandomMatching
    }

    fn compute_statistics(&self, input: &StrategyInput<'_>) -> Result<RulesetStats, AlgoError> {
        Ok(random_matching::random_statistics(input.matrix()?))
    }

    fn compute_outcome(&self, input: &StrategyInput<'_>, seed: u64) -> Result<StrategyOutcome, AlgoError> {
        let matrix = input.matrix()?;
        let out = random_matching::generate_matching(matrix, seed, input.config.random_max_attempts);
        Ok(pairings(matrix, &out))
    }
}

impl Strategy for MaxUtility {
    fn ruleset(&self) -> Ruleset {
        Ruleset::MaxUtility
    }

    fn compute_statistics(&self, input: &StrategyInput<'_>) -> Result<RulesetStats, AlgoError> {
        Ok(max_utility::max_utility_statistics(input.matrix()?))
    }

    fn compute_outcome(&self, input: &StrategyInput<'_>, _seed: u64) -> Result<StrategyOutcome, AlgoError> {
        let matrix = input.matrix()?;
        Ok(pairings(matrix, &max_utility::solve_max_utility(matrix)))
    }
}

impl Strategy for MaxFairness {
    fn ruleset(&self) -> Ruleset {
        Ruleset::MaxFairness
    }

    fn compute_statistics(&self, input: &StrategyInput<'_>) -> Result<RulesetStats, AlgoError> {
        Ok(max_fairness::max_fairness_statistics(input.matrix()?, input.config.exact_fairness_max_n))
    }

    /// Deterministic; the seed is recorded by the caller but unused here.
    fn compute_outcome(&self, input: &StrategyInput<'_>, _seed: u64) -> Result<StrategyOutcome, AlgoError> {
        let matrix = input.matrix()?;
        let out = max_fairness::solve_max_fairness(matrix, input.config.exact_fairness_max_n);
        Ok(pairings(matrix, &out))
    }
}

impl Strategy for WhiteElephant {
    fn ruleset(&self) -> Ruleset {
        Ruleset::WhiteElephant
    }

    fn compute_statistics(&self, input: &StrategyInput<'_>) -> Result<RulesetStats, AlgoError> {
        white_elephant::white_elephant_statistics(input.prefs, &input.config.simulation, input.seed)
    }

    /// Needs ids only, never the utility matrix.
    fn compute_outcome(&self, input: &StrategyInput<'_>, seed: u64) -> Result<StrategyOutcome, AlgoError> {
        let ids: Vec<ParticipantId> = input.prefs.iter().map(|p| p.user_id.clone()).collect();
        Ok(StrategyOutcome::PlayOrder(white_elephant::generate_play_order(&ids, seed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_exactly() {
        for r in Ruleset::ALL {
            assert_eq!(r.as_str().parse::<Ruleset>(), Ok(r));
            assert_eq!(r.strategy().ruleset(), r);
        }
        assert!("max utility".parse::<Ruleset>().is_err());
        assert!("Max Utility ".parse::<Ruleset>().is_err());
        assert_eq!("Nope".parse::<Ruleset>(), Err(UnknownRuleset("Nope".into())));
    }

    #[test]
    fn stealing_game_runs_without_a_matrix() {
        let prefs: Vec<ParticipantPreference> = ["a", "b", "c"]
            .iter()
            .map(|s| ParticipantPreference::neutral(s.parse().unwrap()))
            .collect();
        let mut config = EngineConfig::default();
        config.simulation.simulations = 20;
        let broken = AlgoError::SimulationStalled { steps: 0 };
        let input = StrategyInput { prefs: &prefs, matrix: Err(&broken), config: &config, seed: 5 };

        let stats = Ruleset::WhiteElephant.strategy().compute_statistics(&input).unwrap();
        assert_eq!(stats.user_stats.len(), 3);
        let order = Ruleset::WhiteElephant.strategy().compute_outcome(&input, 5).unwrap();
        assert!(matches!(order, StrategyOutcome::PlayOrder(ref o) if o.len() == 3));

        for r in [Ruleset::RandomMatching, Ruleset::MaxUtility, Ruleset::MaxFairness] {
            assert_eq!(r.strategy().compute_statistics(&input), Err(broken.clone()));
        }
    }
}
