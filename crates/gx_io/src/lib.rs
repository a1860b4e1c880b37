//! crates/gx_io/src/lib.rs
//! File-facing crate: preference and config loading, canonical JSON output,
//! SHA-256 digests. Offline only; paths are local files.
//!
//! Shared error type (`IoError`) with `From` conversions used across modules.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for gx_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem errors (open, read, create_dir_all, rename, fsync).
    #[error("io error: {0}")]
    Path(String),

    /// JSON parse/shape errors; `at` names the file or a location inside it.
    #[error("json error at {at}: {msg}")]
    Json { at: String, msg: String },

    /// Input larger than the loader accepts.
    #[error("limit exceeded: {0}")]
    Limit(String),

    /// Hashing / canonicalization failures.
    #[error("hash error: {0}")]
    Hash(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json {
            at: format!("line {} column {}", e.line(), e.column()),
            msg: e.to_string(),
        }
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;

pub use canonical_json::{to_canonical_bytes, to_canonical_json_bytes, write_canonical_file};
pub use hasher::{sha256_canonical, sha256_hex};
pub use loader::{load_config, load_preferences, parse_preferences, LoadedPreferences};
