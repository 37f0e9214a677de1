//! One-ply heuristic search.
//!
//! Every candidate is tried on a single working copy of the board: the move
//! and the wall are applied, the position is scored, and both are undone
//! before the next candidate. No per-candidate allocation of boards.

use rand::Rng;
use tracing::{trace, warn};

use crate::config::AiConfig;
use crate::error::BoardError;
use crate::game::{Board, Coord, PlayerId, Side, reachable_area_size, valid_moves};

/// A complete action turn chosen by the AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct AiMove {
    /// Piece to move.
    pub piece: Coord,
    /// Destination, possibly the piece's own cell.
    pub to: Coord,
    /// Side of `to` to wall.
    pub side: Side,
}

impl std::fmt::Display for AiMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {} wall {}", self.piece, self.to, self.side)
    }
}

/// Territory differential of the position for `player`.
///
/// `own - aggression * aggregate(opponents)`, without the random perturbation.
#[must_use]
pub fn evaluate(board: &Board, player: PlayerId, opponents: &[PlayerId], config: &AiConfig) -> f64 {
    let own = f64::from(reachable_area_size(board, player));
    let theirs = config
        .opponents
        .fold(opponents.iter().map(|&p| reachable_area_size(board, p)));
    own - config.aggression * f64::from(theirs)
}

fn perturbation(config: &AiConfig, rng: &mut impl Rng) -> f64 {
    if config.noise > 0.0 {
        rng.random_range(0.0..config.noise)
    } else {
        0.0
    }
}

/// Keeps the highest-scoring candidate seen so far.
struct Best<T> {
    score: f64,
    choice: Option<T>,
    evaluated: usize,
}

impl<T> Best<T> {
    const fn new() -> Self {
        Self {
            score: f64::NEG_INFINITY,
            choice: None,
            evaluated: 0,
        }
    }

    fn offer(&mut self, score: f64, choice: T) {
        self.evaluated += 1;
        if self.choice.is_none() || score > self.score {
            self.score = score;
            self.choice = Some(choice);
        }
    }
}

/// Pick the best (piece, destination, open side) for `player`.
///
/// Returns `None` when none of the player's pieces has a destination with an
/// open side; the caller should force the end of the turn.
pub fn choose_move(
    board: &Board,
    player: PlayerId,
    opponents: &[PlayerId],
    config: &AiConfig,
    rng: &mut impl Rng,
) -> Option<AiMove> {
    let mut work = board.clone();
    let mut best = Best::new();

    if let Err(e) = search_moves(&mut work, player, opponents, config, rng, &mut best) {
        warn!(%player, error = %e, "move search aborted");
        return None;
    }

    trace!(%player, candidates = best.evaluated, score = best.score, "move search done");
    best.choice
}

fn search_moves(
    work: &mut Board,
    player: PlayerId,
    opponents: &[PlayerId],
    config: &AiConfig,
    rng: &mut impl Rng,
    best: &mut Best<AiMove>,
) -> Result<(), BoardError> {
    let pieces: Vec<Coord> = work.pieces_of(player).collect();

    for piece in pieces {
        for to in valid_moves(work, piece) {
            work.move_occupant(piece, to)?;

            let sides: Vec<Side> = work.open_sides(to).collect();
            for side in sides {
                work.set_wall(to, side, player)?;
                let score = evaluate(work, player, opponents, config) + perturbation(config, rng);
                best.offer(score, AiMove { piece, to, side });
                // The side was open, so removing restores both halves of the edge.
                work.remove_wall(to, side)?;
            }

            work.move_occupant(to, piece)?;
        }
    }
    Ok(())
}

/// Pick an empty cell for `player`'s next piece during placement.
///
/// Same scoring as [`choose_move`]. Returns `None` only on a full board.
pub fn choose_placement(
    board: &Board,
    player: PlayerId,
    opponents: &[PlayerId],
    config: &AiConfig,
    rng: &mut impl Rng,
) -> Option<Coord> {
    let mut work = board.clone();
    let empty: Vec<Coord> = work.empty_cells().collect();
    let mut best = Best::new();

    for cell in empty {
        let tried = work.set_occupant(cell, Some(player)).map(|()| {
            let score = evaluate(&work, player, opponents, config) + perturbation(config, rng);
            best.offer(score, cell);
        });
        if let Err(e) = tried.and_then(|()| work.set_occupant(cell, None)) {
            warn!(%player, error = %e, "placement search aborted");
            return None;
        }
    }

    trace!(%player, candidates = best.evaluated, "placement search done");
    best.choice
}
