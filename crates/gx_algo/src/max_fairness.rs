//! Max-fairness (minimax) assignment.
//!
//! Objective, in order:
//!   1) maximize the smallest utility any receiver gets,
//!   2) then maximize total utility,
//!   3) remaining ties: first candidate in lexicographic permutation order
//!      (exact path) or the solver's deterministic choice (bottleneck path).
//!
//! Exact search for N ≤ `exact_max_n` (never above 8): every receiver
//! permutation is enumerated in lexicographic order. Candidates with a fixed
//! point or an excluded pair are skipped; if none survive, the search repeats
//! with exclusions ignored and the result is flagged relaxed.
//!
//! Larger groups solve the same objective as a bottleneck assignment. Binary
//! search over the distinct pair utilities for the highest threshold `t` at
//! which a derangement using only allowed pairs with utility `>= t` exists,
//! then maximize total utility among pairs at or above `t`. Both steps are
//! Kuhn–Munkres runs, so the minimum is optimal on either path. Infeasible
//! exclusions relax exactly as in the exact search.
//!
//! Deterministic: no RNG is consumed.

use gx_core::EXACT_FAIRNESS_HARD_CAP;
use itertools::Itertools;

use crate::assignment::MatchingOutcome;
use crate::max_utility::{assign_max, scaled};
use crate::stats::RulesetStats;
use crate::utility::UtilityMatrix;

/// Comparison slack for float ties.
const EPS: f64 = 1e-9;

pub fn solve_max_fairness(matrix: &UtilityMatrix, exact_max_n: usize) -> MatchingOutcome {
    let n = matrix.len();
    if n < 2 {
        return MatchingOutcome::new((0..n).collect(), false);
    }
    if n <= exact_max_n.min(EXACT_FAIRNESS_HARD_CAP) {
        exact(matrix)
    } else {
        bottleneck(matrix)
    }
}

pub fn max_fairness_statistics(matrix: &UtilityMatrix, exact_max_n: usize) -> RulesetStats {
    RulesetStats::from_matching(matrix, &solve_max_fairness(matrix, exact_max_n))
}

fn rotation(n: usize) -> Vec<usize> {
    (0..n).map(|g| (g + 1) % n).collect()
}

// ---------------------------------------------------------------------------
// exact

#[derive(Clone, Copy)]
struct Score {
    min: f64,
    total: f64,
}

impl Score {
    fn beats(&self, other: &Score) -> bool {
        if self.min > other.min + EPS {
            return true;
        }
        (self.min - other.min).abs() <= EPS && self.total > other.total + EPS
    }
}

fn exact(matrix: &UtilityMatrix) -> MatchingOutcome {
    if let Some(best) = search(matrix, true) {
        return MatchingOutcome::new(best, false);
    }
    tracing::warn!(
        participants = matrix.len(),
        "no exclusion-respecting assignment exists; minimax search ignores exclusions"
    );
    let best = search(matrix, false).unwrap_or_else(|| rotation(matrix.len()));
    MatchingOutcome::new(best, true)
}

fn search(matrix: &UtilityMatrix, honor_exclusions: bool) -> Option<Vec<usize>> {
    let n = matrix.len();
    let mut best: Option<(Score, Vec<usize>)> = None;

    // lexicographic in index order
    for perm in (0..n).permutations(n) {
        let valid = perm
            .iter()
            .enumerate()
            .all(|(g, &r)| g != r && (!honor_exclusions || matrix.is_allowed(g, r)));
        if !valid {
            continue;
        }
        let score = score_of(matrix, &perm);
        if best.as_ref().map_or(true, |(b, _)| score.beats(b)) {
            best = Some((score, perm));
        }
    }
    best.map(|(_, p)| p)
}

fn score_of(matrix: &UtilityMatrix, receivers: &[usize]) -> Score {
    let mut min = f64::INFINITY;
    let mut total = 0.0;
    for (g, &r) in receivers.iter().enumerate() {
        let u = matrix.get(g, r);
        min = min.min(u);
        total += u;
    }
    Score { min, total }
}

// ---------------------------------------------------------------------------
// bottleneck

fn bottleneck(matrix: &UtilityMatrix) -> MatchingOutcome {
    if let Some(best) = bottleneck_over(matrix, |g, r| matrix.is_allowed(g, r)) {
        return MatchingOutcome::new(best, false);
    }
    tracing::warn!(
        participants = matrix.len(),
        "no exclusion-respecting assignment exists; bottleneck search ignores exclusions"
    );
    let best = bottleneck_over(matrix, |g, r| g != r).unwrap_or_else(|| rotation(matrix.len()));
    MatchingOutcome::new(best, true)
}

/// Max-min derangement over the `usable` pairs, `None` if the usable pairs
/// admit no derangement at all.
fn bottleneck_over(matrix: &UtilityMatrix, usable: impl Fn(usize, usize) -> bool) -> Option<Vec<usize>> {
    let n = matrix.len();
    let usable = &usable;
    let pairs = || (0..n).cartesian_product(0..n).filter(move |&(g, r)| usable(g, r));

    let levels: Vec<f64> = pairs()
        .map(|(g, r)| matrix.get(g, r))
        .sorted_by(f64::total_cmp)
        .dedup()
        .collect();

    let qualifies = |t: f64| move |g: usize, r: usize| usable(g, r) && matrix.get(g, r) >= t;
    let covers = |t: f64| {
        let ok = qualifies(t);
        let receivers = assign_max(n, |g, r| if ok(g, r) { 0 } else { -1 });
        receivers.iter().enumerate().all(|(g, &r)| ok(g, r))
    };

    // levels[lo] stays feasible
    let first = *levels.first()?;
    if !covers(first) {
        return None;
    }
    let (mut lo, mut hi) = (0usize, levels.len() - 1);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if covers(levels[mid]) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    // A pair below the threshold must cost more than any total can recover.
    let top = pairs().map(|(g, r)| scaled(matrix.get(g, r)).abs()).max().unwrap_or(0);
    let floor = (2 * n as i64 + 1).saturating_mul(top + 1).saturating_neg();
    let ok = qualifies(levels[lo]);
    Some(assign_max(n, |g, r| if ok(g, r) { scaled(matrix.get(g, r)) } else { floor }))
}
