//! Max-utility assignment (Kuhn–Munkres).
//!
//! Contract:
//! - Profit matrix: real utility for allowed pairs, `EXCLUDED_SENTINEL` for
//!   excluded pairs, `SELF_SENTINEL` on the diagonal. Profits go to the
//!   integer solver at 1e-3 resolution, O(N^3).
//! - `SELF_SENTINEL` outweighs N excluded sentinels for N < 1000, so for
//!   N >= 2 the result never contains a fixed point.
//! - The result is always a complete bijection. If it uses an excluded pair,
//!   `relaxed_exclusions = true`.
//! - Statistics use real utilities only; sentinels never leak out.

use pathfinding::kuhn_munkres::kuhn_munkres;
use pathfinding::matrix::Matrix;

use crate::assignment::MatchingOutcome;
use crate::stats::RulesetStats;
use crate::utility::UtilityMatrix;

/// Profit assigned to a pair the giver excluded.
pub const EXCLUDED_SENTINEL: f64 = -1e6;
/// Profit assigned to a self pair.
pub const SELF_SENTINEL: f64 = -1e9;

fn profit(matrix: &UtilityMatrix, g: usize, r: usize) -> f64 {
    if g == r {
        SELF_SENTINEL
    } else if matrix.is_allowed(g, r) {
        matrix.get(g, r)
    } else {
        EXCLUDED_SENTINEL
    }
}

/// Assignment maximizing total utility.
pub fn solve_max_utility(matrix: &UtilityMatrix) -> MatchingOutcome {
    let n = matrix.len();
    let receivers = assign_max(n, |g, r| scaled(profit(matrix, g, r)));
    let relaxed = receivers
        .iter()
        .enumerate()
        .any(|(g, &r)| g != r && !matrix.is_allowed(g, r));
    if relaxed {
        tracing::warn!(participants = n, "max-utility assignment uses an excluded pair");
    }
    MatchingOutcome::new(receivers, relaxed)
}

pub fn max_utility_statistics(matrix: &UtilityMatrix) -> RulesetStats {
    RulesetStats::from_matching(matrix, &solve_max_utility(matrix))
}

/// Fixed-point steps per utility unit for the integer solver.
const SCALE: f64 = 1_000.0;

/// Utility (or sentinel) as solver weight.
#[inline]
pub(crate) fn scaled(x: f64) -> i64 {
    (x * SCALE).round() as i64
}

/// Maximum-weight perfect assignment on an `n × n` weight function.
/// Returns `row -> column`.
pub(crate) fn assign_max(n: usize, weight: impl Fn(usize, usize) -> i64) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let weights = Matrix::from_fn(n, n, |(g, r)| weight(g, r));
    let (_, receivers) = kuhn_munkres(&weights);
    receivers
}
