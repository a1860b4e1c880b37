//! preferences.rs: Participant preference records with bounded levels.
//!
//! Every bounded integer is a `Level` (1..=5); out-of-range values are rejected
//! on construction and on deserialization, never clamped.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::CoreError;
use crate::ids::ParticipantId;

/// Integer preference level in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Level(u8);

impl Level {
    pub const MIN: Level = Level(1);
    pub const MID: Level = Level(3);
    pub const MAX: Level = Level(5);

    pub fn new(v: i64) -> Result<Self, CoreError> {
        if (1..=5).contains(&v) {
            Ok(Self(v as u8))
        } else {
            Err(CoreError::LevelOutOfRange(v))
        }
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::MID
    }
}

impl TryFrom<i64> for Level {
    type Error = CoreError;
    fn try_from(v: i64) -> Result<Self, Self::Error> {
        Level::new(v)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        use serde::de::{Error as DeError, Unexpected};
        let v = i64::deserialize(d)?;
        Level::new(v).map_err(|_| D::Error::invalid_value(Unexpected::Signed(v), &"1..=5"))
    }
}

/// One participant's preference profile.
///
/// Giving/receiving styles are compared crosswise by the utility model: a
/// giver's `*_giving` against a receiver's `*_receiving`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParticipantPreference {
    pub user_id: ParticipantId,

    #[cfg_attr(feature = "serde", serde(rename = "preference_practicality_giving"))]
    pub practicality_giving: Level,
    #[cfg_attr(feature = "serde", serde(rename = "preference_practicality_receiving"))]
    pub practicality_receiving: Level,
    #[cfg_attr(feature = "serde", serde(rename = "preference_novelty_giving"))]
    pub novelty_giving: Level,
    #[cfg_attr(feature = "serde", serde(rename = "preference_novelty_receiving"))]
    pub novelty_receiving: Level,
    #[cfg_attr(feature = "serde", serde(rename = "preference_thoughtfulness_giving"))]
    pub thoughtfulness_giving: Level,
    #[cfg_attr(feature = "serde", serde(rename = "preference_thoughtfulness_receiving"))]
    pub thoughtfulness_receiving: Level,

    #[cfg_attr(feature = "serde", serde(rename = "preferred_interests", default))]
    pub interests: BTreeSet<String>,

    #[cfg_attr(feature = "serde", serde(rename = "we_hate_being_stolen_from"))]
    pub hate_being_stolen_from: Level,
    #[cfg_attr(feature = "serde", serde(rename = "we_enjoy_stealing"))]
    pub enjoy_stealing: Level,

    #[cfg_attr(feature = "serde", serde(default))]
    pub exclusions: BTreeSet<ParticipantId>,
}

impl ParticipantPreference {
    /// A mid-range profile (every level 3, no interests, no exclusions).
    pub fn neutral(user_id: ParticipantId) -> Self {
        Self {
            user_id,
            practicality_giving: Level::MID,
            practicality_receiving: Level::MID,
            novelty_giving: Level::MID,
            novelty_receiving: Level::MID,
            thoughtfulness_giving: Level::MID,
            thoughtfulness_receiving: Level::MID,
            interests: BTreeSet::new(),
            hate_being_stolen_from: Level::MID,
            enjoy_stealing: Level::MID,
            exclusions: BTreeSet::new(),
        }
    }

    /// True iff this participant declared `other` as excluded.
    #[inline]
    pub fn excludes(&self, other: &ParticipantId) -> bool {
        self.exclusions.contains(other)
    }

    /// Number of interest tags shared with `other` (exact match).
    pub fn shared_interests(&self, other: &ParticipantPreference) -> usize {
        self.interests.intersection(&other.interests).count()
    }
}
