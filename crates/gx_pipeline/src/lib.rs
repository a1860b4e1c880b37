//! gx_pipeline: orchestration surface (validate → utility matrix → strategies → compare / finalize).
//! I/O-free: callers load inputs through `gx_io` and hand typed values in.
//!
//! Two entry points:
//! - [`evaluate_all`] runs every ruleset and returns a [`Comparison`]. One
//!   strategy failing does not fail the call; its slot gets
//!   `RulesetStats::placeholder()`.
//! - [`finalize`] runs exactly one ruleset and returns the concrete pairings
//!   or play order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gx_algo::{
    AlgoError, Assignment, Ruleset, RulesetStats, Strategy, StrategyInput, StrategyOutcome, UtilityMatrix,
};
use gx_core::{EngineConfig, ParticipantId, ParticipantPreference};

pub mod validate;

pub use validate::{EntityRef, Severity, ValidationIssue, ValidationReport};

/// Placeholder until the caller stamps a wall-clock time.
pub const EPOCH_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

/// Single error surface for orchestration.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("input failed validation: {0}")]
    Validate(ValidationReport),
    #[error("unknown ruleset: {0:?}")]
    UnknownRuleset(String),
    #[error("{ruleset} failed: {source}")]
    Strategy {
        ruleset: Ruleset,
        #[source]
        source: AlgoError,
    },
}

impl From<gx_algo::UnknownRuleset> for PipelineError {
    fn from(e: gx_algo::UnknownRuleset) -> Self {
        PipelineError::UnknownRuleset(e.0)
    }
}

// ---------------------------- Outputs ----------------------------

/// Side-by-side statistics, one entry per ruleset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub participants: usize,
    /// Seed the stealing-game batch ran with.
    pub seed: u64,
    pub rulesets: BTreeMap<Ruleset, RulesetStats>,
    /// Rulesets whose entry is a placeholder because the strategy failed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<Ruleset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pairings(Assignment),
    PlayOrder(Vec<ParticipantId>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeMetadata {
    pub timestamp: String,
    pub seed_requested: Option<u64>,
    pub seed_used: u64,
    pub relaxed_exclusions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_utility: Option<f64>,
    pub participants: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finalized {
    pub ruleset: Ruleset,
    pub outcome: Outcome,
    pub metadata: FinalizeMetadata,
}

impl Finalized {
    /// Replace the placeholder timestamp (RFC 3339, UTC).
    pub fn with_timestamp(mut self, ts: impl Into<String>) -> Self {
        self.metadata.timestamp = ts.into();
        self
    }
}

// ---------------------------- Entry points ----------------------------

/// Run every ruleset against one input.
pub fn evaluate_all(prefs: &[ParticipantPreference], cfg: &EngineConfig) -> Result<Comparison, PipelineError> {
    evaluate_with(prefs, cfg, Ruleset::strategy)
}

fn evaluate_with(
    prefs: &[ParticipantPreference],
    cfg: &EngineConfig,
    strategy_for: impl Fn(Ruleset) -> &'static dyn Strategy,
) -> Result<Comparison, PipelineError> {
    let _span = tracing::info_span!("evaluate_all", participants = prefs.len()).entered();
    check(prefs, cfg)?;

    let seed = cfg.default_seed;
    let matrix = UtilityMatrix::build(prefs, &cfg.utility);

    let mut rulesets = BTreeMap::new();
    let mut failed = Vec::new();
    for ruleset in Ruleset::ALL {
        let input = StrategyInput { prefs, matrix: matrix.as_ref(), config: cfg, seed };
        let stats = match strategy_for(ruleset).compute_statistics(&input) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(%ruleset, error = %e, "strategy failed; using placeholder statistics");
                failed.push(ruleset);
                RulesetStats::placeholder()
            }
        };
        rulesets.insert(ruleset, stats);
    }

    Ok(Comparison { participants: prefs.len(), seed, rulesets, failed })
}

/// Run one ruleset for real.
///
/// `seed = None` falls back to `cfg.default_seed`; both values are echoed in
/// the metadata. The timestamp is `EPOCH_TIMESTAMP` until the caller stamps it.
pub fn finalize(
    ruleset_name: &str,
    prefs: &[ParticipantPreference],
    seed: Option<u64>,
    cfg: &EngineConfig,
) -> Result<Finalized, PipelineError> {
    let ruleset: Ruleset = ruleset_name.parse()?;
    let _span = tracing::info_span!("finalize", %ruleset, participants = prefs.len()).entered();
    check(prefs, cfg)?;

    let seed_used = seed.unwrap_or(cfg.default_seed);
    let strategy_err = |source| PipelineError::Strategy { ruleset, source };

    let matrix = UtilityMatrix::build(prefs, &cfg.utility);
    let input = StrategyInput { prefs, matrix: matrix.as_ref(), config: cfg, seed: seed_used };
    let outcome = ruleset.strategy().compute_outcome(&input, seed_used).map_err(strategy_err)?;

    let (outcome, relaxed_exclusions, total_utility) = match outcome {
        StrategyOutcome::Pairings { assignment, relaxed_exclusions, total_utility } => {
            (Outcome::Pairings(assignment), relaxed_exclusions, Some(total_utility))
        }
        StrategyOutcome::PlayOrder(order) => (Outcome::PlayOrder(order), false, None),
    };
    if relaxed_exclusions {
        tracing::warn!(%ruleset, "finalized assignment ignores at least one exclusion");
    }

    Ok(Finalized {
        ruleset,
        outcome,
        metadata: FinalizeMetadata {
            timestamp: EPOCH_TIMESTAMP.to_string(),
            seed_requested: seed,
            seed_used,
            relaxed_exclusions,
            total_utility,
            participants: prefs.len(),
        },
    })
}

fn check(prefs: &[ParticipantPreference], cfg: &EngineConfig) -> Result<(), PipelineError> {
    let report = validate::validate(prefs, cfg);
    for w in report.warnings() {
        tracing::warn!(code = w.code, "{}", w.message);
    }
    if report.pass {
        Ok(())
    } else {
        Err(PipelineError::Validate(report))
    }
}
