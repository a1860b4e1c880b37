//! crates/gx_core/src/ids.rs
//! Participant identifier token. Strict shape; no I/O.

use core::fmt;
use core::str::FromStr;

use smol_str::SmolStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::CoreError;

const ID_MAX_CHARS: usize = 64;

/// Non-empty, at most 64 chars, no control characters, no surrounding whitespace.
#[inline]
pub fn is_valid_participant_id(s: &str) -> bool {
    let n = s.chars().count();
    (1..=ID_MAX_CHARS).contains(&n)
        && s.trim() == s
        && !s.chars().any(|c| c.is_control())
}

/// Stable participant identifier (user id on the wire).
///
/// Backed by `SmolStr` so assignments can clone ids freely.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ParticipantId(SmolStr);

impl ParticipantId {
    pub fn new(s: &str) -> Result<Self, CoreError> {
        if is_valid_participant_id(s) {
            Ok(Self(SmolStr::new(s)))
        } else {
            Err(CoreError::InvalidId(s.to_string()))
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ParticipantId {
    type Error = CoreError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for ParticipantId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        use serde::de::{Error as DeError, Unexpected};
        let s = String::deserialize(d)?;
        ParticipantId::new(&s).map_err(|_| {
            D::Error::invalid_value(Unexpected::Str(&s), &"participant id, 1..=64 chars, no control chars")
        })
    }
}
