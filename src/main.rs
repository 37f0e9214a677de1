//! Stitch CLI - play, self-play and benchmark the wall-stitching territory game.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Stitch - claim territory by walling off the board
#[derive(Parser, Debug)]
#[command(name = "stitch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single AI self-play game
    Run {
        /// Number of players (2-4)
        #[arg(short, long, default_value = "2")]
        players: usize,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Board edge length
        #[arg(long)]
        size: Option<u16>,

        /// Stop the game after this many turns
        #[arg(short = 't', long)]
        max_turns: Option<u32>,

        /// Weight of opponent territory in the AI score
        #[arg(short, long)]
        aggression: Option<f64>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Suppress the banner and the final board
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run mass parallel self-play games and aggregate statistics
    Tournament {
        /// Number of players (2-4)
        #[arg(short = 'n', long, default_value = "2")]
        players: usize,

        /// Number of games to run (default: 1000)
        #[arg(short, long, default_value = "1000")]
        games: u64,

        /// Starting seed (increments for each game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Board edge length
        #[arg(long)]
        size: Option<u16>,

        /// Maximum turns per game
        #[arg(short = 't', long)]
        max_turns: Option<u32>,

        /// Aggression for the first seat only
        #[arg(long)]
        challenger: Option<f64>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::TournamentFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Play interactively in the terminal
    Play {
        /// Who sits at each seat
        #[arg(short, long, default_value = "ai")]
        mode: cli::ModeArg,

        /// Number of players (2-4)
        #[arg(short, long, default_value = "2")]
        players: usize,

        /// Seat names in turn order
        #[arg(long = "name")]
        names: Vec<String>,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Board edge length
        #[arg(long)]
        size: Option<u16>,

        /// Seconds per turn
        #[arg(short = 't', long)]
        turn_seconds: Option<u32>,

        /// File that keeps the matches-played count
        #[arg(long)]
        counter_file: Option<PathBuf>,
    },
}

/// Install the tracing subscriber.
///
/// The TUI owns the terminal, so `play` logs nothing unless a log file is given.
fn init_logging(verbose: bool, log_file: Option<&Path>, tui: bool) -> Result<(), cli::CliError> {
    if tui && log_file.is_none() {
        return Ok(());
    }
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let tui = matches!(args.command, Commands::Play { .. });
    if let Err(e) = init_logging(args.verbose, args.log_file.as_deref(), tui) {
        eprintln!("Error: cannot open log file: {e}");
        return ExitCode::FAILURE;
    }

    let result = match args.command {
        Commands::Run {
            players,
            seed,
            config,
            size,
            max_turns,
            aggression,
            format,
            quiet,
        } => {
            let overrides = cli::Overrides {
                board_size: size,
                max_turns,
                aggression,
                ..cli::Overrides::default()
            };
            cli::run::execute(players, seed, config, overrides, format, quiet)
        }

        Commands::Tournament {
            players,
            games,
            seed,
            threads,
            config,
            size,
            max_turns,
            challenger,
            format,
            progress,
        } => {
            let overrides = cli::Overrides {
                board_size: size,
                max_turns,
                ..cli::Overrides::default()
            };
            cli::tournament::execute(
                players, games, seed, threads, config, overrides, challenger, format, progress,
            )
        }

        Commands::Play {
            mode,
            players,
            names,
            seed,
            config,
            size,
            turn_seconds,
            counter_file,
        } => {
            let overrides = cli::Overrides {
                board_size: size,
                turn_seconds,
                ..cli::Overrides::default()
            };
            cli::play::execute(mode.into(), players, names, seed, config, overrides, counter_file)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
