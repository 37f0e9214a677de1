//! Match and AI configuration.
//!
//! Defaults reproduce the standard game: a 7×7 board, thirty second turns and
//! an AI that weighs opponent territory at 1.2× its own. A JSON file may
//! override any subset of the fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::MIN_BOARD_SIZE;

/// Largest supported board edge.
pub const MAX_BOARD_SIZE: u16 = 26;

/// How the AI folds several opponents' territories into one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpponentAggregate {
    /// Only the strongest opponent counts.
    #[default]
    Max,
    /// Every opponent's territory counts.
    Sum,
}

impl OpponentAggregate {
    /// Fold opponent reachable-area sizes.
    #[must_use]
    pub fn fold(self, areas: impl IntoIterator<Item = u32>) -> u32 {
        match self {
            OpponentAggregate::Max => areas.into_iter().max().unwrap_or(0),
            OpponentAggregate::Sum => areas.into_iter().sum(),
        }
    }
}

/// Heuristic search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AiConfig {
    /// Weight of the opponent term in `own - aggression * opponents`.
    pub aggression: f64,
    /// Exclusive upper bound of the uniform tie-break perturbation.
    pub noise: f64,
    /// Opponent aggregation when more than one opponent is active.
    pub opponents: OpponentAggregate,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            aggression: 1.2,
            noise: 0.5,
            opponents: OpponentAggregate::Max,
        }
    }
}

/// Full configuration of a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Board edge length.
    pub board_size: u16,
    /// Seconds per action turn.
    pub turn_seconds: u32,
    /// AI search parameters.
    pub ai: AiConfig,
    /// Self-play stops after this many action turns.
    pub max_turns: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 7,
            turn_seconds: 30,
            ai: AiConfig::default(),
            max_turns: 500,
        }
    }
}

impl GameConfig {
    /// Read a JSON configuration file and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid JSON,
    /// or holds out-of-range values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "configuration loaded");
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(ConfigError::Invalid(format!(
                "board_size must be between {MIN_BOARD_SIZE} and {MAX_BOARD_SIZE}, got {}",
                self.board_size
            )));
        }
        if self.turn_seconds == 0 {
            return Err(ConfigError::Invalid("turn_seconds must be positive".into()));
        }
        if !self.ai.aggression.is_finite() || self.ai.aggression < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "ai.aggression must be a non-negative number, got {}",
                self.ai.aggression
            )));
        }
        if !self.ai.noise.is_finite() || self.ai.noise < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "ai.noise must be a non-negative number, got {}",
                self.ai.noise
            )));
        }
        Ok(())
    }
}
