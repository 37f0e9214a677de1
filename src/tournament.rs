//! Self-play runner.
//!
//! Provides a pure function interface: `(seed, seats) -> GameResult`.
//! Every seat is played by the AI with its own search parameters; the same
//! seed and seats always produce the same game.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::ai::{AiDecision, decide};
use crate::config::{AiConfig, GameConfig};
use crate::error::SetupError;
use crate::game::{
    GameMode, GameState, Outcome, Phase, PlayerId, Roster, ScoreBoard, largest_territory,
};
use crate::render::render_ascii;

/// Configuration shared by every game of a tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TournamentConfig {
    /// Board edge length.
    pub board_size: u16,
    /// Action turns before the game is stopped and scored as it stands.
    pub max_turns: u32,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        let game = GameConfig::default();
        Self {
            board_size: game.board_size,
            max_turns: game.max_turns,
        }
    }
}

impl From<&GameConfig> for TournamentConfig {
    fn from(config: &GameConfig) -> Self {
        Self {
            board_size: config.board_size,
            max_turns: config.max_turns,
        }
    }
}

/// Statistics for a single seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    /// Player identity.
    pub player: PlayerId,
    /// Final reachable-area score.
    pub score: u32,
    /// Largest single territory (the tie-break metric).
    pub largest_territory: u32,
    /// Edges walled by this player.
    pub walls: usize,
    /// Turns that ended without a move of the player's choosing.
    pub forced_passes: u32,
}

/// Final result of a game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameResult {
    /// The seed used for this game.
    pub seed: u64,
    /// Winner or draw.
    pub outcome: Outcome,
    /// Final scores.
    pub scores: ScoreBoard,
    /// Action turns played.
    pub turns_played: u32,
    /// Whether the turn limit stopped the game before separation.
    pub truncated: bool,
    /// Per-seat statistics in turn order.
    pub player_stats: Vec<PlayerStats>,
    /// The match as it ended.
    #[serde(skip)]
    pub final_state: GameState,
}

impl GameResult {
    /// Winning player, if any.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        match self.outcome {
            Outcome::Winner(player) => Some(player),
            Outcome::Draw | Outcome::Undecided => None,
        }
    }
}

/// Run a complete AI-vs-AI game.
///
/// `seats` gives the search parameters of each player in turn order; its
/// length is the player count.
///
/// # Errors
///
/// Returns [`SetupError`] if the seat count is outside 2..=4 or the board is too small.
pub fn run_game(
    seed: u64,
    seats: &[AiConfig],
    config: &TournamentConfig,
) -> Result<GameResult, SetupError> {
    let runner = GameRunner::new(seed, seats, config)?;
    Ok(runner.run())
}

struct GameRunner<'a> {
    state: GameState,
    seats: &'a [AiConfig],
    rng: StdRng,
    config: TournamentConfig,
    seed: u64,
    forced_passes: [u32; crate::game::MAX_PLAYERS],
}

impl<'a> GameRunner<'a> {
    fn new(seed: u64, seats: &'a [AiConfig], config: &TournamentConfig) -> Result<Self, SetupError> {
        let roster = Roster::new(GameMode::Spectate, seats.len(), &[])?;
        // The clock plays no part in self-play.
        let state = GameState::new(roster, config.board_size, u32::MAX)?;

        Ok(Self {
            state,
            seats,
            rng: StdRng::seed_from_u64(seed),
            config: *config,
            seed,
            forced_passes: [0; crate::game::MAX_PLAYERS],
        })
    }

    fn run(mut self) -> GameResult {
        while !self.state.is_over() {
            if self.state.turn() >= self.config.max_turns {
                debug!(seed = self.seed, turns = self.state.turn(), "turn limit reached");
                self.state.finish();
                break;
            }
            self.step();
        }
        trace!(seed = self.seed, "final position\n{}", render_ascii(&self.state));
        self.build_result()
    }

    fn step(&mut self) {
        let player = self.state.current_player();
        let seat = self.seats.get(player.index()).copied().unwrap_or_default();
        let decision = decide(&self.state, &seat, &mut self.rng);

        let applied = match decision {
            AiDecision::Place(cell) => self.state.place_piece(cell).is_ok(),
            AiDecision::Turn(ai_move) => self.state.apply_ai_move(ai_move).is_ok(),
            AiDecision::Pass => false,
        };
        if applied {
            return;
        }

        if self.state.phase() == Phase::Placement {
            // A full board during placement cannot be played out.
            warn!(seed = self.seed, %player, "no cell left to place on");
            self.state.finish();
            return;
        }
        self.forced_passes[player.index()] += 1;
        self.state.expire_turn(&mut self.rng);
    }

    fn build_result(self) -> GameResult {
        let board = self.state.board();
        let scores = self.state.scores().clone();
        let player_stats = self
            .state
            .active_players()
            .iter()
            .map(|&player| PlayerStats {
                player,
                score: scores.get(player),
                largest_territory: largest_territory(board, player),
                walls: board.walls_owned_by(player),
                forced_passes: self.forced_passes[player.index()],
            })
            .collect();

        let truncated = self.state.turn() >= self.config.max_turns
            && !crate::game::is_game_over(board, self.state.active_players());

        GameResult {
            seed: self.seed,
            outcome: self.state.outcome(),
            truncated,
            turns_played: self.state.turn(),
            scores,
            player_stats,
            final_state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> TournamentConfig {
        TournamentConfig {
            board_size: 5,
            max_turns: 200,
        }
    }

    #[test]
    fn test_run_game_too_few_players() {
        let result = run_game(42, &[AiConfig::default()], &small());
        assert!(matches!(result, Err(SetupError::TooFewPlayers(1))));
    }

    #[test]
    fn test_run_game_too_many_players() {
        let seats = vec![AiConfig::default(); 5];
        let result = run_game(42, &seats, &small());
        assert!(matches!(result, Err(SetupError::TooManyPlayers(5))));
    }

    #[test]
    fn test_run_game_finishes() {
        let seats = [AiConfig::default(); 2];
        let result = run_game(7, &seats, &small()).unwrap();
        assert_ne!(result.outcome, Outcome::Undecided);
        assert_eq!(result.player_stats.len(), 2);
        assert!(result.turns_played > 0);
        assert!(!result.truncated);
    }

    #[test]
    fn test_run_game_is_deterministic() {
        let seats = [AiConfig::default(); 3];
        let a = run_game(99, &seats, &small()).unwrap();
        let b = run_game(99, &seats, &small()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_turn_limit_truncates() {
        let seats = [AiConfig::default(); 4];
        let config = TournamentConfig {
            board_size: 9,
            max_turns: 2,
        };
        let result = run_game(1, &seats, &config).unwrap();
        assert_eq!(result.turns_played, 2);
        assert!(result.truncated);
        assert_ne!(result.outcome, Outcome::Undecided);
    }

    #[test]
    fn test_config_default() {
        let config = TournamentConfig::default();
        assert_eq!(config.board_size, 7);
        assert_eq!(config.max_turns, 500);
    }
}
