//! Stealing-game ("White Elephant") Monte Carlo simulator.
//!
//! Contract:
//! - Run `k` of a seeded batch draws everything (play order, gift picks) from
//!   `ExchangeRng::for_run(seed, k)`. Runs are independent, so the optional
//!   `parallel` feature changes wall time only, never results.
//! - Results are reduced in run order.
//! - Happiness stays inside `[min_happiness, max_happiness]` after every step.
//!
//! Rules of one run live in [`game`].

mod game;

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use gx_core::{ExchangeRng, ParticipantId, ParticipantPreference, SimulationParams};

use crate::stats::{self, GameSummary, RulesetStats, UserStats};
use crate::AlgoError;

pub use game::{gift_happiness, RunResult};

/// Uniformly random turn order for a live game. Stateless.
pub fn generate_play_order(ids: &[ParticipantId], seed: u64) -> Vec<ParticipantId> {
    let mut order = ids.to_vec();
    ExchangeRng::from_seed_u64(seed).shuffle_in_place(&mut order);
    order
}

/// Single run `run_index` of the batch seeded with `seed`.
pub fn simulate_run(
    prefs: &[ParticipantPreference],
    params: &SimulationParams,
    seed: u64,
    run_index: u64,
) -> Result<RunResult, AlgoError> {
    let mut rng = ExchangeRng::for_run(seed, run_index);
    let mut order: Vec<usize> = (0..prefs.len()).collect();
    rng.shuffle_in_place(&mut order);
    game::Game::new(prefs, params, &order).play(&mut rng)
}

/// All `params.simulations` runs, in run order.
pub fn simulate_all(
    prefs: &[ParticipantPreference],
    params: &SimulationParams,
    seed: u64,
) -> Result<Vec<RunResult>, AlgoError> {
    let runs = u64::from(params.simulations);

    #[cfg(feature = "parallel")]
    let out = (0..runs)
        .into_par_iter()
        .map(|k| simulate_run(prefs, params, seed, k))
        .collect::<Result<Vec<_>, _>>();

    #[cfg(not(feature = "parallel"))]
    let out = (0..runs)
        .map(|k| simulate_run(prefs, params, seed, k))
        .collect::<Result<Vec<_>, _>>();

    out
}

/// Aggregated statistics over a full batch.
pub fn white_elephant_statistics(
    prefs: &[ParticipantPreference],
    params: &SimulationParams,
    seed: u64,
) -> Result<RulesetStats, AlgoError> {
    let runs = simulate_all(prefs, params, seed)?;
    let stats = aggregate(prefs, &runs);
    tracing::debug!(
        participants = prefs.len(),
        simulations = runs.len(),
        avg_steals = stats.game.map(|g| g.avg_steals_per_game).unwrap_or(0.0),
        "stealing game simulated"
    );
    Ok(stats)
}

fn aggregate(prefs: &[ParticipantPreference], runs: &[RunResult]) -> RulesetStats {
    let n = prefs.len();
    let total_runs = runs.len();
    let denom = total_runs.max(1) as f64;

    let mut per_user: Vec<Vec<f64>> = vec![Vec::with_capacity(total_runs); n];
    // (runs with any, total count)
    let mut stolen_from = vec![(0u32, 0u64); n];
    let mut stole = vec![(0u32, 0u64); n];
    let tally = |slot: &mut (u32, u64), count: u32| {
        slot.0 += u32::from(count > 0);
        slot.1 += u64::from(count);
    };
    for run in runs {
        for i in 0..n {
            per_user[i].push(run.happiness[i]);
            tally(&mut stolen_from[i], run.stolen_from[i]);
            tally(&mut stole[i], run.stole[i]);
        }
    }

    let means: Vec<f64> = per_user.iter().map(|xs| stats::mean(xs)).collect();
    let user_stats: BTreeMap<ParticipantId, UserStats> = prefs
        .iter()
        .enumerate()
        .map(|(i, p)| {
            (
                p.user_id.clone(),
                UserStats::Simulated {
                    avg_utility: means[i],
                    utility_standard_deviation: stats::population_std_dev(&per_user[i]),
                    times_stolen_from_pct: f64::from(stolen_from[i].0) / denom,
                    times_stole_pct: f64::from(stole[i].0) / denom,
                    avg_times_stolen_from: stolen_from[i].1 as f64 / denom,
                    avg_times_stole: stole[i].1 as f64 / denom,
                },
            )
        })
        .collect();

    let all_samples: Vec<f64> = per_user.iter().flatten().copied().collect();
    let steals: Vec<f64> = runs.iter().map(|r| f64::from(r.steals)).collect();

    RulesetStats {
        group_satisfaction_score: stats::mean(&all_samples),
        group_fairness_score: stats::fairness_score(&means),
        min_utility: stats::min_of(&means),
        max_utility: Some(stats::max_of(&means)),
        std_dev: stats::population_std_dev(&all_samples),
        user_stats,
        relaxed_exclusions: false,
        game: Some(GameSummary {
            avg_steals_per_game: stats::mean(&steals),
            max_steals_observed: runs.iter().map(|r| r.steals).max().unwrap_or(0),
            simulations_run: total_runs as u32,
        }),
    }
}
