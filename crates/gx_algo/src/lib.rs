// crates/gx_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Allocation algorithms for the gift exchange engine.
//!
//! Every strategy reads a [`UtilityMatrix`] built once per request and
//! reports a [`RulesetStats`]. No I/O; randomness only through a caller-seeded
//! `ExchangeRng`.

use gx_core::ParticipantId;

// ----------------------------- Shared building blocks --------------------------------

pub mod assignment;
pub mod stats;
pub mod utility;

pub use assignment::{is_derangement, respects_exclusions, Assignment, MatchingOutcome};
pub use stats::{fairness_score, GameSummary, RulesetStats, UserStats};
pub use utility::{utility, UtilityMatrix};

// ----------------------------- Strategies --------------------------------------------

pub mod max_fairness;
pub mod max_utility;
pub mod random_matching;
pub mod white_elephant;

pub use max_fairness::solve_max_fairness;
pub use max_utility::{solve_max_utility, EXCLUDED_SENTINEL, SELF_SENTINEL};
pub use random_matching::generate_matching;
pub use white_elephant::{generate_play_order, white_elephant_statistics};

pub mod strategy;

pub use strategy::{Ruleset, Strategy, StrategyInput, StrategyOutcome, UnknownRuleset};

// ----------------------------- Errors ------------------------------------------------

/// Internal strategy failures. Infeasible exclusions are not errors; they
/// surface as `relaxed_exclusions` on the outcome.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlgoError {
    #[error("non-finite utility for {giver} -> {receiver}")]
    NonFiniteUtility { giver: ParticipantId, receiver: ParticipantId },
    #[error("stealing game did not terminate within {steps} steps")]
    SimulationStalled { steps: usize },
}
