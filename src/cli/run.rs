//! Run command implementation.

use std::path::PathBuf;

use super::output::{JsonGameResult, format_text};
use super::{CliError, OutputFormat, Overrides, load_config, seed_or_clock};
use stitch::render::render_board;
use stitch::tournament::{TournamentConfig, run_game};

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the game cannot be set up.
pub(crate) fn execute(
    players: usize,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
    overrides: Overrides,
    format: OutputFormat,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref(), overrides)?;
    let seed = seed_or_clock(seed);

    if !quiet && format == OutputFormat::Text {
        println!(
            "Running {players}-player game on a {0}x{0} board with seed {seed}...",
            config.board_size
        );
        println!();
    }

    let seats = vec![config.ai; players];
    let result = run_game(seed, &seats, &TournamentConfig::from(&config))?;

    match format {
        OutputFormat::Text => {
            if !quiet {
                println!("{}", render_board(&result.final_state));
            }
            print!("{}", format_text(&result));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonGameResult::from_game_result(&result))?;
            println!("{json}");
        }
    }

    Ok(())
}
