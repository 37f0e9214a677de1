//! Game layer for Stitch.
//!
//! Implements the rules on a square grid of cells with per-side walls:
//! - Board with mirrored walls between neighbouring cells
//! - Connectivity (reachable area, territory, separation)
//! - Move generation for the two-step piece move
//! - Turn state machine with placement, action phases and a turn timer
//! - Winner resolution

mod board;
mod command;
mod connectivity;
mod invariants;
mod movegen;
mod player;
mod state;
mod timer;

pub use board::{Board, Cell, Coord, Side};
pub use command::{Command, ParseCommandError};
pub use connectivity::{
    is_blocked, is_game_over, largest_territory, open_neighbors, reachable_area,
    reachable_area_size, touches_opponent,
};
pub use invariants::{InvariantViolation, check_invariants};
pub use movegen::{MAX_STEPS, valid_moves};
pub use player::{
    GameMode, MAX_PLAYERS, MIN_PLAYERS, PIECES_PER_PLAYER, PlayerId, PlayerKind, Roster,
    ScoreBoard, Seat,
};
pub use state::{
    GameState, MIN_BOARD_SIZE, Outcome, Phase, Selection, decide_outcome, resolve_winner,
};
pub use timer::{Tick, TurnTimer};
