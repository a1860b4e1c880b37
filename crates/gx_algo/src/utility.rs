//! Utility model: how happy a receiver would be with a gift from a giver.
//!
//! Contract:
//! - `utility(giver, receiver, weights)` is pure, total and deterministic.
//! - Closeness per dimension compares the giver's *giving* style with the
//!   receiver's *receiving* style: `1 - |g - r| / 4`, so an exact match is 1.0
//!   and the widest gap (1 vs 5) is 0.0.
//! - `preference_score = 10 * mean(closeness)` over practicality, novelty and
//!   thoughtfulness.
//! - `utility = preference_weight * preference_score
//!            + interest_bonus_per_shared_tag * |shared interests|`.
//!
//! Not symmetric, not clamped. With default weights the result is 0..=8 plus
//! one point per shared tag.

use gx_core::{ParticipantId, ParticipantPreference, UtilityWeights};

use crate::AlgoError;

/// Widest possible gap between two levels (5 - 1).
const MAX_LEVEL_GAP: f64 = 4.0;

#[inline]
fn closeness(giving: gx_core::Level, receiving: gx_core::Level) -> f64 {
    let diff = (giving.as_f64() - receiving.as_f64()).abs();
    1.0 - diff / MAX_LEVEL_GAP
}

/// Preference closeness on a 0..=10 scale, before weighting.
pub fn preference_score(giver: &ParticipantPreference, receiver: &ParticipantPreference) -> f64 {
    let c = closeness(giver.practicality_giving, receiver.practicality_receiving)
        + closeness(giver.novelty_giving, receiver.novelty_receiving)
        + closeness(giver.thoughtfulness_giving, receiver.thoughtfulness_receiving);
    10.0 * c / 3.0
}

/// Compatibility score for the ordered pair (giver → receiver).
pub fn utility(
    giver: &ParticipantPreference,
    receiver: &ParticipantPreference,
    weights: &UtilityWeights,
) -> f64 {
    let shared = giver.shared_interests(receiver) as f64;
    weights.preference_weight * preference_score(giver, receiver)
        + weights.interest_bonus_per_shared_tag * shared
}

/// Dense N×N view of every ordered pair, computed once per request.
///
/// Row = giver index, column = receiver index, in input order.
/// `allowed(i, j)` is false on the diagonal and where giver `i` excludes `j`.
#[derive(Debug, Clone)]
pub struct UtilityMatrix {
    ids: Vec<ParticipantId>,
    utility: Vec<f64>,
    allowed: Vec<bool>,
}

impl UtilityMatrix {
    pub fn build(prefs: &[ParticipantPreference], weights: &UtilityWeights) -> Result<Self, AlgoError> {
        let n = prefs.len();
        let mut utility = vec![0.0; n * n];
        let mut allowed = vec![false; n * n];

        for (i, giver) in prefs.iter().enumerate() {
            for (j, receiver) in prefs.iter().enumerate() {
                if i == j {
                    continue;
                }
                let u = self::utility(giver, receiver, weights);
                if !u.is_finite() {
                    return Err(AlgoError::NonFiniteUtility {
                        giver: giver.user_id.clone(),
                        receiver: receiver.user_id.clone(),
                    });
                }
                utility[i * n + j] = u;
                allowed[i * n + j] = !giver.excludes(&receiver.user_id);
            }
        }

        Ok(Self {
            ids: prefs.iter().map(|p| p.user_id.clone()).collect(),
            utility,
            allowed,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn ids(&self) -> &[ParticipantId] {
        &self.ids
    }

    #[inline]
    pub fn id(&self, i: usize) -> &ParticipantId {
        &self.ids[i]
    }

    /// Utility of giver `i` → receiver `j` (0.0 on the diagonal).
    #[inline]
    pub fn get(&self, giver: usize, receiver: usize) -> f64 {
        self.utility[giver * self.len() + receiver]
    }

    /// Not a self pair and not excluded by the giver.
    #[inline]
    pub fn is_allowed(&self, giver: usize, receiver: usize) -> bool {
        self.allowed[giver * self.len() + receiver]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gx_core::Level;

    fn pref(id: &str) -> ParticipantPreference {
        ParticipantPreference::neutral(id.parse().unwrap())
    }

    fn lvl(v: i64) -> Level {
        Level::new(v).unwrap()
    }

    #[test]
    fn identical_styles_score_full_closeness() {
        let a = pref("a");
        let b = pref("b");
        assert!((preference_score(&a, &b) - 10.0).abs() < 1e-12);
        let w = UtilityWeights::default();
        assert!((utility(&a, &b, &w) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn widest_gap_scores_zero_closeness() {
        let mut g = pref("g");
        let mut r = pref("r");
        g.practicality_giving = lvl(1);
        g.novelty_giving = lvl(1);
        g.thoughtfulness_giving = lvl(1);
        r.practicality_receiving = lvl(5);
        r.novelty_receiving = lvl(5);
        r.thoughtfulness_receiving = lvl(5);
        assert!(preference_score(&g, &r).abs() < 1e-12);
    }

    #[test]
    fn closer_values_score_higher() {
        let g = pref("g");
        let mut near = pref("near");
        let mut far = pref("far");
        near.novelty_receiving = lvl(4);
        far.novelty_receiving = lvl(5);
        let w = UtilityWeights::default();
        assert!(utility(&g, &near, &w) > utility(&g, &far, &w));
    }

    #[test]
    fn shared_interests_add_weighted_bonus() {
        let mut a = pref("a");
        let mut b = pref("b");
        a.interests = ["Coffee", "Hiking"].iter().map(|s| s.to_string()).collect();
        b.interests = ["Coffee", "Hiking", "Chess"].iter().map(|s| s.to_string()).collect();
        let w = UtilityWeights { preference_weight: 0.8, interest_bonus_per_shared_tag: 1.5 };
        assert!((utility(&a, &b, &w) - (8.0 + 3.0)).abs() < 1e-12);
    }

    #[test]
    fn utility_is_directional() {
        let mut a = pref("a");
        let b = pref("b");
        a.novelty_giving = lvl(5);
        let w = UtilityWeights::default();
        assert!(utility(&a, &b, &w) < utility(&b, &a, &w));
    }

    #[test]
    fn matrix_marks_self_and_exclusions() {
        let a = pref("a");
        let mut b = pref("b");
        let c = pref("c");
        b.exclusions.insert("a".parse().unwrap());
        let m = UtilityMatrix::build(&[a, b, c], &UtilityWeights::default()).unwrap();
        assert!(!m.is_allowed(0, 0));
        assert!(!m.is_allowed(1, 0));
        assert!(m.is_allowed(0, 1));
        assert!(m.is_allowed(1, 2));
        assert_eq!(m.len(), 3);
    }
}
