//! gx_core: Core types, bounded preference domains, configuration, and seeded RNG.
//!
//! This crate is **I/O-free**. It defines the stable types shared across the
//! engine (`gx_algo`, `gx_pipeline`, `gx_io`, `gx_cli`).
//!
//! - Participant ids: `ParticipantId` (small-string token)
//! - Preference records: `Level` (1..=5), `ParticipantPreference`
//! - Engine configuration: `EngineConfig` with safe defaults + `validate()`
//! - Request-scoped RNG (ChaCha20): `ExchangeRng`
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod ids;
pub mod preferences;
pub mod rng;
pub mod variables;

pub mod errors {
    use thiserror::Error;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Debug, Eq, PartialEq, Error)]
    pub enum CoreError {
        #[error("invalid participant id: {0:?}")]
        InvalidId(String),
        #[error("preference level out of range (1..=5): {0}")]
        LevelOutOfRange(i64),
        #[error("domain out of range: {0}")]
        DomainOutOfRange(&'static str),
    }
}

pub use errors::CoreError;
pub use ids::ParticipantId;
pub use preferences::{Level, ParticipantPreference};
pub use rng::ExchangeRng;
pub use variables::{EngineConfig, SimulationParams, UtilityWeights, EXACT_FAIRNESS_HARD_CAP, MAX_UTILITY_WEIGHT};
