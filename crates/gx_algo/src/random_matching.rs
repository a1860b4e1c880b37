//! Uniformly random derangement with best-effort exclusion respecting.
//!
//! Contract:
//! - Rejection sampling: Fisher–Yates shuffle of receiver indices, accept the
//!   first draw with no fixed point and no excluded pair. Accepted draws are
//!   uniform over the valid assignments.
//! - After `max_attempts` rejected draws, exclusions are dropped: the same
//!   sampler runs on fixed points only, and if that budget is spent too a
//!   Sattolo single cycle is returned. Either way `relaxed_exclusions = true`.
//! - All randomness comes from the caller's `ExchangeRng`; equal seeds give
//!   equal outcomes.
//!
//! Statistics are expectations, not a draw: each receiver's utility averaged
//! over every giver allowed to give to them.

use gx_core::ExchangeRng;

use crate::assignment::{is_derangement, respects_exclusions, MatchingOutcome};
use crate::stats::{self, RulesetStats, UserStats};
use crate::utility::UtilityMatrix;

/// Seeded entry point.
pub fn generate_matching(matrix: &UtilityMatrix, seed: u64, max_attempts: u32) -> MatchingOutcome {
    let mut rng = ExchangeRng::from_seed_u64(seed);
    generate_matching_with(matrix, &mut rng, max_attempts)
}

/// Draw with a caller-owned RNG.
///
/// Groups of fewer than two participants have no derangement; they get the
/// identity (empty or a single self pair).
pub fn generate_matching_with(
    matrix: &UtilityMatrix,
    rng: &mut ExchangeRng,
    max_attempts: u32,
) -> MatchingOutcome {
    let n = matrix.len();
    if n < 2 {
        return MatchingOutcome::new((0..n).collect(), false);
    }

    if let Some(receivers) = sample(rng, n, max_attempts, |p| {
        is_derangement(p) && respects_exclusions(p, matrix)
    }) {
        return MatchingOutcome::new(receivers, false);
    }

    tracing::warn!(
        participants = n,
        attempts = max_attempts,
        "no exclusion-respecting derangement found; ignoring exclusions"
    );

    let receivers = sample(rng, n, max_attempts, is_derangement)
        .unwrap_or_else(|| rng.cyclic_permutation(n));
    // Reported as relaxed even if this draw happens to respect exclusions.
    MatchingOutcome::new(receivers, true)
}

fn sample<F>(rng: &mut ExchangeRng, n: usize, attempts: u32, accept: F) -> Option<Vec<usize>>
where
    F: Fn(&[usize]) -> bool,
{
    let mut perm: Vec<usize> = (0..n).collect();
    for _ in 0..attempts {
        perm.iter_mut().enumerate().for_each(|(i, slot)| *slot = i);
        rng.shuffle_in_place(&mut perm);
        if accept(&perm) {
            return Some(perm);
        }
    }
    None
}

/// Expected-value statistics over the allowed pairs.
pub fn random_statistics(matrix: &UtilityMatrix) -> RulesetStats {
    let n = matrix.len();
    let mut relaxed = false;
    let mut expected = Vec::with_capacity(n);
    let mut user_stats = std::collections::BTreeMap::new();

    for r in 0..n {
        let mut incoming: Vec<f64> = (0..n)
            .filter(|&g| matrix.is_allowed(g, r))
            .map(|g| matrix.get(g, r))
            .collect();
        if incoming.is_empty() {
            relaxed = true;
            incoming = (0..n).filter(|&g| g != r).map(|g| matrix.get(g, r)).collect();
        }
        let e = stats::mean(&incoming);
        expected.push(e);
        user_stats.insert(
            matrix.id(r).clone(),
            UserStats::Matching { expected_utility: e, variance: stats::population_variance(&incoming) },
        );
    }

    let mut pair_utilities: Vec<f64> = (0..n)
        .flat_map(|g| (0..n).map(move |r| (g, r)))
        .filter(|&(g, r)| matrix.is_allowed(g, r))
        .map(|(g, r)| matrix.get(g, r))
        .collect();
    if pair_utilities.is_empty() {
        pair_utilities = (0..n)
            .flat_map(|g| (0..n).map(move |r| (g, r)))
            .filter(|&(g, r)| g != r)
            .map(|(g, r)| matrix.get(g, r))
            .collect();
    }

    RulesetStats {
        group_satisfaction_score: stats::mean(&expected),
        group_fairness_score: stats::fairness_score(&expected),
        min_utility: stats::min_of(&pair_utilities),
        max_utility: Some(stats::max_of(&pair_utilities)),
        std_dev: stats::population_std_dev(&expected),
        user_stats,
        relaxed_exclusions: relaxed,
        game: None,
    }
}
