//! variables.rs: Engine configuration with safe defaults.
//!
//! Notes:
//! - Every constant the matching strategies and the simulator depend on lives
//!   here, so tuning never touches algorithm code.
//! - `validate()` re-asserts domains after deserialization; the pipeline calls
//!   it before any computation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Largest group size the exact minimax search will enumerate (8! candidates).
pub const EXACT_FAIRNESS_HARD_CAP: usize = 8;

/// Upper bound on either utility weight. Keeps utilities far inside the
/// fixed-point range of the assignment solver.
pub const MAX_UTILITY_WEIGHT: f64 = 1_000.0;

/// Relative importance of preference closeness vs shared interests.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UtilityWeights {
    /// Multiplier on the 0..=10 closeness score.
    pub preference_weight: f64,
    /// Flat bonus per shared interest tag.
    pub interest_bonus_per_shared_tag: f64,
}

impl Default for UtilityWeights {
    fn default() -> Self {
        Self {
            preference_weight: 0.8,
            interest_bonus_per_shared_tag: 1.0,
        }
    }
}

/// Stealing-game constants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationParams {
    /// Independent runs per statistics call.
    pub simulations: u32,
    /// A gift stolen this many times is frozen.
    pub max_steals_per_gift: u32,
    pub min_happiness: f64,
    pub max_happiness: f64,
    /// Neutral value; also the steal/open decision threshold.
    pub baseline_happiness: f64,
    /// Happiness change per point of attribute vs preference difference.
    pub happiness_per_point: f64,
    /// Bonus per `enjoy_stealing` point when evaluating a steal.
    pub steal_bonus_per_point: f64,
    /// End-of-run penalty per `hate_being_stolen_from` point, applied once if stolen from.
    pub stolen_penalty_per_point: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            simulations: 1000,
            max_steals_per_gift: 3,
            min_happiness: 0.0,
            max_happiness: 10.0,
            baseline_happiness: 5.0,
            happiness_per_point: 1.0,
            steal_bonus_per_point: 0.5,
            stolen_penalty_per_point: 0.5,
        }
    }
}

impl SimulationParams {
    #[inline]
    pub fn clamp_happiness(&self, h: f64) -> f64 {
        h.clamp(self.min_happiness, self.max_happiness)
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub utility: UtilityWeights,
    pub simulation: SimulationParams,
    /// Groups up to this size get the exact minimax search (at most 8).
    pub exact_fairness_max_n: usize,
    /// Rejection-sampling budget for the random derangement.
    pub random_max_attempts: u32,
    /// Seed used when a caller supplies none.
    pub default_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utility: UtilityWeights::default(),
            simulation: SimulationParams::default(),
            exact_fairness_max_n: EXACT_FAIRNESS_HARD_CAP,
            random_max_attempts: 10_000,
            default_seed: 0,
        }
    }
}

impl EngineConfig {
    /// Domain checks. Returns the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        let w = &self.utility;
        let weight_ok = |v: f64| (0.0..=MAX_UTILITY_WEIGHT).contains(&v);
        if !weight_ok(w.preference_weight) {
            return Err(CoreError::DomainOutOfRange("utility.preference_weight"));
        }
        if !weight_ok(w.interest_bonus_per_shared_tag) {
            return Err(CoreError::DomainOutOfRange("utility.interest_bonus_per_shared_tag"));
        }

        let s = &self.simulation;
        if s.simulations == 0 {
            return Err(CoreError::DomainOutOfRange("simulation.simulations"));
        }
        if s.max_steals_per_gift == 0 {
            return Err(CoreError::DomainOutOfRange("simulation.max_steals_per_gift"));
        }
        let all_finite = [
            s.min_happiness,
            s.max_happiness,
            s.baseline_happiness,
            s.happiness_per_point,
            s.steal_bonus_per_point,
            s.stolen_penalty_per_point,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(CoreError::DomainOutOfRange("simulation (non-finite value)"));
        }
        if s.min_happiness >= s.max_happiness {
            return Err(CoreError::DomainOutOfRange("simulation.min_happiness < max_happiness"));
        }
        if !(s.min_happiness..=s.max_happiness).contains(&s.baseline_happiness) {
            return Err(CoreError::DomainOutOfRange("simulation.baseline_happiness"));
        }
        if s.happiness_per_point <= 0.0 {
            return Err(CoreError::DomainOutOfRange("simulation.happiness_per_point"));
        }
        if s.steal_bonus_per_point < 0.0 || s.stolen_penalty_per_point < 0.0 {
            return Err(CoreError::DomainOutOfRange("simulation (negative bonus/penalty)"));
        }

        if self.exact_fairness_max_n > EXACT_FAIRNESS_HARD_CAP {
            return Err(CoreError::DomainOutOfRange("exact_fairness_max_n (max 8)"));
        }
        if self.random_max_attempts == 0 {
            return Err(CoreError::DomainOutOfRange("random_max_attempts"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_exact_search_above_cap() {
        let cfg = EngineConfig { exact_fairness_max_n: 9, ..EngineConfig::default() };
        assert!(matches!(cfg.validate(), Err(CoreError::DomainOutOfRange(_))));
    }

    #[test]
    fn rejects_weights_above_bound() {
        let mut cfg = EngineConfig::default();
        cfg.utility.preference_weight = 1e308;
        assert_eq!(cfg.validate(), Err(CoreError::DomainOutOfRange("utility.preference_weight")));

        let mut cfg = EngineConfig::default();
        cfg.utility.interest_bonus_per_shared_tag = MAX_UTILITY_WEIGHT + 1.0;
        assert!(cfg.validate().is_err());

        cfg.utility.interest_bonus_per_shared_tag = MAX_UTILITY_WEIGHT;
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_happiness_bounds() {
        let mut cfg = EngineConfig::default();
        cfg.simulation.min_happiness = 10.0;
        cfg.simulation.max_happiness = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn clamp_saturates() {
        let s = SimulationParams::default();
        assert_eq!(s.clamp_happiness(-3.0), 0.0);
        assert_eq!(s.clamp_happiness(12.5), 10.0);
        assert_eq!(s.clamp_happiness(6.5), 6.5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_takes_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"simulation": {"simulations": 50}, "default_seed": 9}"#).unwrap();
        assert_eq!(cfg.simulation.simulations, 50);
        assert_eq!(cfg.simulation.max_steals_per_gift, 3);
        assert_eq!(cfg.default_seed, 9);
        assert_eq!(cfg.exact_fairness_max_n, 8);
    }
}
