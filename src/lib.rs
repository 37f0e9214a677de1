// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Stitch: a territory game where players wall off the board around their pieces.
//!
//! Two to four players each place two pieces, then take turns moving a piece
//! up to two steps and building one wall on the cell it lands on. Once no
//! player can reach another, each player scores the cells connected to their
//! pieces.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  Front ends (CLI, TUI, self-play)   │
//! ├─────────────────────────────────────┤
//! │  Session: timer, AI worker, counter │
//! ├─────────────────────────────────────┤
//! │  AI search       │  Rules engine    │
//! ├─────────────────────────────────────┤
//! │  Board, connectivity, move gen      │
//! └─────────────────────────────────────┘
//! ```

pub mod ai;
pub mod config;
pub mod counter;
pub mod error;
pub mod game;
pub mod render;
pub mod session;
pub mod telemetry;
pub mod tournament;

pub use config::{AiConfig, GameConfig};
pub use error::{BoardError, CommandError, ConfigError, CounterError, SetupError};
pub use session::Session;

// Re-export key game types at crate root for convenience
pub use game::{Board, Command, Coord, GameState, Outcome, Phase, PlayerId, Side};
