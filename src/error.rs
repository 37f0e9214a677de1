//! Error types for the rules engine and its collaborators.

use crate::game::{Coord, Phase, Side};

/// Board access outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The coordinate is not on the board.
    #[error("coordinate {0} is off the board")]
    OutOfBounds(Coord),
}

/// Why a player command was refused.
///
/// Every variant is recoverable: the game state is left exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The command does not belong to the current phase.
    #[error("command not accepted during {0:?}")]
    WrongPhase(Phase),
    /// The coordinate is not on the board.
    #[error("coordinate {0} is off the board")]
    OutOfBounds(Coord),
    /// A piece already stands on the cell.
    #[error("cell {0} is occupied")]
    Occupied(Coord),
    /// The cell does not hold one of the current player's pieces.
    #[error("no piece of the current player at {0}")]
    NotYourPiece(Coord),
    /// A move was requested without a selected piece.
    #[error("no piece selected")]
    NoSelection,
    /// The destination is not among the selected piece's valid moves.
    #[error("{0} is not a legal destination")]
    IllegalDestination(Coord),
    /// Walls may only go on the cell the piece just moved to.
    #[error("{0} is not the moved-to cell")]
    NotMovedTo(Coord),
    /// That side already carries a wall.
    #[error("{side} side of {coord} is already walled")]
    SideWalled {
        /// Cell the wall was aimed at.
        coord: Coord,
        /// Side that is already walled.
        side: Side,
    },
    /// The match is finished; only reset is accepted.
    #[error("game is over")]
    GameOver,
}

impl From<BoardError> for CommandError {
    fn from(e: BoardError) -> Self {
        match e {
            BoardError::OutOfBounds(coord) => Self::OutOfBounds(coord),
        }
    }
}

/// Invalid parameters for starting a match.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    /// Fewer than two players requested.
    #[error("too few players: {0} (minimum 2)")]
    TooFewPlayers(usize),
    /// More than four players requested.
    #[error("too many players: {0} (maximum 4)")]
    TooManyPlayers(usize),
    /// The board cannot hold every player's pieces.
    #[error("board size {0} is too small")]
    BoardTooSmall(u16),
    /// More names than players were supplied.
    #[error("{names} names given for {players} players")]
    NameCount {
        /// Number of names supplied.
        names: usize,
        /// Number of players requested.
        players: usize,
    },
}

/// Failure to load or validate configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON for [`crate::config::GameConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure of a single match-counter backend.
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    /// Storage could not be read or written.
    #[error("counter storage failed: {0}")]
    Io(#[from] std::io::Error),
    /// Stored data was not a valid count.
    #[error("counter data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    /// The backend cannot be reached at all.
    #[error("counter backend unavailable: {0}")]
    Unavailable(String),
}
