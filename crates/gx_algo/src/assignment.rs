//! Index-level assignment result shared by the matching strategies.
//!
//! `receivers[i] = j` means participant `i` (input order) gives to participant `j`.

use std::collections::BTreeMap;

use gx_core::ParticipantId;

use crate::utility::UtilityMatrix;

/// Giver id → receiver id.
pub type Assignment = BTreeMap<ParticipantId, ParticipantId>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingOutcome {
    pub receivers: Vec<usize>,
    /// At least one chosen pair violates a declared exclusion.
    pub relaxed_exclusions: bool,
}

impl MatchingOutcome {
    pub fn new(receivers: Vec<usize>, relaxed_exclusions: bool) -> Self {
        Self { receivers, relaxed_exclusions }
    }

    pub fn to_assignment(&self, matrix: &UtilityMatrix) -> Assignment {
        self.receivers
            .iter()
            .enumerate()
            .map(|(g, &r)| (matrix.id(g).clone(), matrix.id(r).clone()))
            .collect()
    }

    /// Utility each participant receives, indexed by receiver.
    pub fn received_utilities(&self, matrix: &UtilityMatrix) -> Vec<f64> {
        let mut out = vec![0.0; self.receivers.len()];
        for (g, &r) in self.receivers.iter().enumerate() {
            out[r] = matrix.get(g, r);
        }
        out
    }

    pub fn total_utility(&self, matrix: &UtilityMatrix) -> f64 {
        self.receivers
            .iter()
            .enumerate()
            .map(|(g, &r)| matrix.get(g, r))
            .sum()
    }
}

/// Bijection on `0..len` with no fixed point.
pub fn is_derangement(receivers: &[usize]) -> bool {
    let n = receivers.len();
    let mut seen = vec![false; n];
    for (g, &r) in receivers.iter().enumerate() {
        if r >= n || r == g || seen[r] {
            return false;
        }
        seen[r] = true;
    }
    true
}

/// Every chosen pair is allowed by the matrix (not self, not excluded).
pub fn respects_exclusions(receivers: &[usize], matrix: &UtilityMatrix) -> bool {
    receivers
        .iter()
        .enumerate()
        .all(|(g, &r)| matrix.is_allowed(g, r))
}
