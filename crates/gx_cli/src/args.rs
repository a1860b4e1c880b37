// crates/gx_cli/src/args.rs
//
// Offline CLI argument surface.
//
// - Two subcommands: `compare` (all rulesets) and `finalize` (one ruleset)
// - No networked paths (reject any scheme:// like http/https/file)
// - Seed accepts decimal u64 or 0x-hex (up to 16 nybbles)
// - Input files must exist; `--out` may not exist yet

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "gx",
    disable_help_subcommand = true,
    about = "Offline gift exchange allocation engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress non-essential stderr messages.
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run every ruleset and print comparative statistics.
    Compare(CompareArgs),
    /// Run one ruleset and print the concrete pairings or play order.
    Finalize(FinalizeArgs),
}

#[derive(Debug, ClapArgs, Clone)]
pub struct CompareArgs {
    /// Preference list JSON (array, or object with a "preferences" array).
    #[arg(long)]
    pub input: PathBuf,
    /// Engine configuration JSON; missing fields take defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Seed for the stealing-game simulation. Decimal u64 or 0x-hex.
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,
    /// Number of stealing-game runs (overrides the config).
    #[arg(long)]
    pub simulations: Option<u32>,
    /// Write output here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct FinalizeArgs {
    #[arg(long)]
    pub input: PathBuf,
    /// "Random Matching", "Max Utility", "Max Fairness" or "White Elephant".
    #[arg(long)]
    pub ruleset: String,
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Decimal u64 or 0x-hex. Drawn from OS entropy when omitted.
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Errors surfaced by argument validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
    BadValue(&'static str),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
            BadValue(s) => write!(f, "invalid value: {s}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Seed parser: decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Cli, CliError> {
    let cli = Cli::parse();
    validate(&cli)?;
    Ok(cli)
}

pub fn validate(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Compare(a) => {
            ensure_local_exists(&a.input, "--input")?;
            if let Some(c) = &a.config {
                ensure_local_exists(c, "--config")?;
            }
            if let Some(o) = &a.out {
                ensure_local_path(o)?;
            }
            if a.simulations == Some(0) {
                return Err(CliError::BadValue("--simulations must be at least 1"));
            }
        }
        Command::Finalize(a) => {
            ensure_local_exists(&a.input, "--input")?;
            if let Some(c) = &a.config {
                ensure_local_exists(c, "--config")?;
            }
            if let Some(o) = &a.out {
                ensure_local_path(o)?;
            }
        }
    }
    Ok(())
}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

/// Local (no scheme) and an existing regular file.
fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}
