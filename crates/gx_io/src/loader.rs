//! Loader: read local JSON inputs (preference list, engine config) into typed
//! values. No network I/O.
//!
//! A preference file is either a bare array of records or an object
//! `{ "group_id"?: string, "preferences": [...] }`. Levels and ids are
//! range-checked during deserialization.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use gx_core::{EngineConfig, ParticipantPreference};

use crate::{hasher, IoError};

/// Largest input file the loader will read.
pub const MAX_INPUT_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPreferences {
    pub group_id: Option<String>,
    pub preferences: Vec<ParticipantPreference>,
    /// SHA-256 of the canonical JSON of `preferences`.
    pub sha256: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WrappedPreferences {
    #[serde(default)]
    group_id: Option<String>,
    preferences: Vec<ParticipantPreference>,
}

pub fn load_preferences(path: &Path) -> Result<LoadedPreferences, IoError> {
    let text = read_limited(path)?;
    parse_preferences(&text).map_err(|e| with_file(e, path))
}

pub fn parse_preferences(text: &str) -> Result<LoadedPreferences, IoError> {
    let value: Value = serde_json::from_str(text)?;
    let (group_id, preferences) = match value {
        Value::Array(_) => (None, serde_json::from_value::<Vec<ParticipantPreference>>(value)?),
        Value::Object(_) => {
            let w: WrappedPreferences = serde_json::from_value(value)?;
            (w.group_id, w.preferences)
        }
        _ => {
            return Err(IoError::Json {
                at: "/".into(),
                msg: "expected an array of preferences or an object with a \"preferences\" array".into(),
            })
        }
    };
    let sha256 = hasher::sha256_canonical(&preferences)?;
    Ok(LoadedPreferences { group_id, preferences, sha256 })
}

/// Engine configuration; missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<EngineConfig, IoError> {
    let text = read_limited(path)?;
    serde_json::from_str(&text).map_err(|e| with_file(IoError::from(e), path))
}

fn read_limited(path: &Path) -> Result<String, IoError> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let len = f.metadata()?.len();
    if len > MAX_INPUT_BYTES {
        return Err(IoError::Limit(format!(
            "{} is {len} bytes (max {MAX_INPUT_BYTES})",
            path.display()
        )));
    }
    let mut text = String::with_capacity(len as usize);
    f.take(MAX_INPUT_BYTES).read_to_string(&mut text)?;
    Ok(text)
}

fn with_file(e: IoError, path: &Path) -> IoError {
    match e {
        IoError::Json { at, msg } => IoError::Json { at: format!("{} {at}", path.display()), msg },
        other => other,
    }
}
