//! CLI command implementations for Stitch.

pub(crate) mod play;
pub(crate) mod run;
pub(crate) mod tournament;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;
use std::path::Path;

use stitch::config::GameConfig;
use stitch::game::GameMode;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `tournament` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum TournamentFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// Seat assignment for the `play` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    /// Every seat is human.
    Hotseat,
    /// You play the first seat against the AI.
    Ai,
    /// Watch the AI play itself.
    Spectate,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Hotseat => GameMode::Hotseat,
            ModeArg::Ai => GameMode::VersusAi,
            ModeArg::Spectate => GameMode::Spectate,
        }
    }
}

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Overrides {
    /// Board edge length.
    pub(crate) board_size: Option<u16>,
    /// Seconds per turn.
    pub(crate) turn_seconds: Option<u32>,
    /// Self-play turn limit.
    pub(crate) max_turns: Option<u32>,
    /// AI opponent weight.
    pub(crate) aggression: Option<f64>,
}

/// Load the config file (or defaults), apply overrides and validate.
pub(crate) fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<GameConfig, CliError> {
    let mut config = match path {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(size) = overrides.board_size {
        config.board_size = size;
    }
    if let Some(seconds) = overrides.turn_seconds {
        config.turn_seconds = seconds;
    }
    if let Some(turns) = overrides.max_turns {
        config.max_turns = turns;
    }
    if let Some(aggression) = overrides.aggression {
        config.ai.aggression = aggression;
    }
    config.validate()?;
    Ok(config)
}

/// Seed from the clock when none was given.
pub(crate) fn seed_or_clock(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()))
            .unwrap_or(42)
    })
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<stitch::ConfigError> for CliError {
    fn from(e: stitch::ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<stitch::SetupError> for CliError {
    fn from(e: stitch::SetupError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {e}"))
    }
}
