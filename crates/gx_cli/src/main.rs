// crates/gx_cli/src/main.rs
//
// Exit codes, typed error mapping, logging setup, and the two run paths
// (compare → all rulesets; finalize → one ruleset). Output is canonical JSON
// on stdout or in the --out file.

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const UNKNOWN_RULESET: i32 = 3;
    pub const IO: i32 = 4;
    pub const ENGINE: i32 = 5;
}

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use chrono::{SecondsFormat, Utc};
use rand_core::{OsRng, RngCore};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Cli, Command, CompareArgs, FinalizeArgs};

use gx_core::EngineConfig;
use gx_io::{loader, IoError, LoadedPreferences};
use gx_pipeline::PipelineError;

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Input shape, out-of-range values, failed boundary validation.
    Validation(String),
    UnknownRuleset(String),
    /// Read/write/path/limit failures.
    Io(String),
    /// A strategy failed internally.
    Engine(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::UnknownRuleset(m) => write!(f, "unknown ruleset: {m:?}"),
            MainError::Io(m) => write!(f, "io: {m}"),
            MainError::Engine(m) => write!(f, "engine: {m}"),
        }
    }
}

impl From<IoError> for MainError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Json { at, msg } => MainError::Validation(format!("json {at}: {msg}")),
            IoError::Hash(m) => MainError::Validation(format!("hash: {m}")),
            IoError::Path(m) => MainError::Io(format!("path: {m}")),
            IoError::Limit(m) => MainError::Io(format!("limit: {m}")),
        }
    }
}

impl From<PipelineError> for MainError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Validate(report) => MainError::Validation(report.to_string()),
            PipelineError::UnknownRuleset(name) => MainError::UnknownRuleset(name),
            e @ PipelineError::Strategy { .. } => MainError::Engine(e.to_string()),
        }
    }
}

fn main() -> ExitCode {
    let cli = match parse_cli() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("gx: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };
    init_tracing(cli.quiet);

    let rc = match run(&cli) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("gx: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// `GX_LOG` takes an `EnvFilter` directive; default `warn` (`error` with --quiet).
fn init_tracing(quiet: bool) {
    let fallback = if quiet { "error" } else { "warn" };
    let filter = EnvFilter::try_from_env("GX_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::UnknownRuleset(_) => UNKNOWN_RULESET,
        MainError::Io(_) => IO,
        MainError::Engine(_) => ENGINE,
    }
}

fn run(cli: &Cli) -> Result<(), MainError> {
    match &cli.command {
        Command::Compare(a) => run_compare(a, cli.quiet),
        Command::Finalize(a) => run_finalize(a, cli.quiet),
    }
}

fn load_inputs(input: &Path, config: Option<&Path>) -> Result<(LoadedPreferences, EngineConfig), MainError> {
    let prefs = loader::load_preferences(input)?;
    let cfg = match config {
        Some(p) => loader::load_config(p)?,
        None => EngineConfig::default(),
    };
    tracing::debug!(participants = prefs.preferences.len(), input_sha256 = %prefs.sha256, "inputs loaded");
    Ok((prefs, cfg))
}

fn run_compare(a: &CompareArgs, quiet: bool) -> Result<(), MainError> {
    let (loaded, mut cfg) = load_inputs(&a.input, a.config.as_deref())?;
    if let Some(seed) = a.seed {
        cfg.default_seed = seed;
    }
    if let Some(n) = a.simulations {
        cfg.simulation.simulations = n;
    }

    let comparison = gx_pipeline::evaluate_all(&loaded.preferences, &cfg)?;
    let doc = json!({
        "input_sha256": loaded.sha256,
        "group_id": loaded.group_id,
        "comparison": to_value(&comparison)?,
    });
    emit(&doc, a.out.as_deref(), quiet)
}

fn run_finalize(a: &FinalizeArgs, quiet: bool) -> Result<(), MainError> {
    let (loaded, mut cfg) = load_inputs(&a.input, a.config.as_deref())?;
    // No --seed: draw one so the seed used is always reportable.
    if a.seed.is_none() {
        cfg.default_seed = entropy_seed()?;
    }

    let finalized = gx_pipeline::finalize(&a.ruleset, &loaded.preferences, a.seed, &cfg)?
        .with_timestamp(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
    let doc = json!({
        "input_sha256": loaded.sha256,
        "group_id": loaded.group_id,
        "result": to_value(&finalized)?,
    });
    emit(&doc, a.out.as_deref(), quiet)
}

fn entropy_seed() -> Result<u64, MainError> {
    let mut buf = [0u8; 8];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| MainError::Io(format!("entropy: {e}")))?;
    Ok(u64::from_le_bytes(buf))
}

fn to_value<T: serde::Serialize>(v: &T) -> Result<Value, MainError> {
    serde_json::to_value(v).map_err(|e| MainError::Engine(format!("serialize: {e}")))
}

fn emit(doc: &Value, out: Option<&Path>, quiet: bool) -> Result<(), MainError> {
    match out {
        Some(path) => {
            gx_io::write_canonical_file(path, doc, true)?;
            if !quiet {
                eprintln!("gx: wrote {}", path.display());
            }
        }
        None => {
            let mut bytes = gx_io::to_canonical_json_bytes(doc)?;
            bytes.push(b'\n');
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&bytes)
                .and_then(|_| stdout.flush())
                .map_err(|e| MainError::Io(format!("stdout: {e}")))?;
        }
    }
    Ok(())
}
