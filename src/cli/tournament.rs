//! Tournament command implementation.

// Games-per-second is a display value.
#![allow(clippy::cast_precision_loss)]

use std::path::PathBuf;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use super::output::{
    JsonTournamentResult, TournamentStats, format_tournament_csv, format_tournament_text,
};
use super::{CliError, Overrides, TournamentFormat, load_config, seed_or_clock};
use stitch::config::AiConfig;
use stitch::tournament::{TournamentConfig, run_game};

/// Execute the tournament command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    players: usize,
    games: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    config_path: Option<PathBuf>,
    overrides: Overrides,
    challenger: Option<f64>,
    format: TournamentFormat,
    progress: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref(), overrides)?;

    // Seat 0 may play with a different aggression than the field.
    let mut seats = vec![config.ai; players];
    if let (Some(aggression), Some(first)) = (challenger, seats.first_mut()) {
        *first = AiConfig {
            aggression,
            ..config.ai
        };
    }

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = seed_or_clock(seed);
    let tournament = TournamentConfig::from(&config);

    let pb = if progress {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
            .map_err(|e| CliError::new(format!("invalid progress template: {e}")))?
            .progress_chars("=>-");
        Some(ProgressBar::new(games).with_style(style))
    } else {
        None
    };

    let start = Instant::now();

    // Each worker accumulates its own stats; merged at the end.
    let stats = (0..games)
        .into_par_iter()
        .fold(
            || TournamentStats::new(players),
            |mut local_stats, i| {
                match run_game(base_seed.wrapping_add(i), &seats, &tournament) {
                    Ok(result) => local_stats.add_result(&result),
                    Err(e) => {
                        tracing::warn!(game = i, error = %e, "game failed to start");
                        local_stats.add_failure();
                    }
                }
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
                local_stats
            },
        )
        .reduce(
            || TournamentStats::new(players),
            |mut a, b| {
                a.merge(&b);
                a
            },
        );

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    let games_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.games_played as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        TournamentFormat::Text => {
            println!();
            print!("{}", format_tournament_text(&stats));
            println!();
            println!("Duration: {:.2}s ({games_per_sec:.0} games/sec)", duration.as_secs_f64());
        }
        TournamentFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonTournamentResult::from_stats(&stats))?;
            println!("{json}");
        }
        TournamentFormat::Csv => {
            print!("{}", format_tournament_csv(&stats));
        }
    }

    Ok(())
}
