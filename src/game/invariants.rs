//! Game invariants - sanity checks that detect bugs.
//!
//! None of these should ever trigger for a state driven only through the
//! public command API. Tests and fuzz targets call [`check_invariants`] after
//! every step.

use crate::game::{Coord, GameState, PIECES_PER_PLAYER, Phase, Side};

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn violation(message: String) -> InvariantViolation {
    InvariantViolation { message }
}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let board = state.board();
    let size = board.size();

    // Every interior edge reads the same from both sides; the board edge is never recorded.
    for (coord, cell) in board.iter() {
        for side in Side::ALL {
            if coord.step(side, size).is_none() && cell.has_wall(side) {
                violations.push(violation(format!(
                    "wall recorded on board edge {side} of {coord}"
                )));
            }
        }
        for side in [Side::Right, Side::Bottom] {
            let Some(neighbor) = coord.step(side, size) else {
                continue;
            };
            let mirrored = board.get(neighbor).map(|n| n.wall(side.opposite())).ok().flatten();
            if cell.wall(side) != mirrored {
                violations.push(violation(format!(
                    "wall on {side} of {coord} is {:?} but mirror on {neighbor} is {mirrored:?}",
                    cell.wall(side)
                )));
            }
        }

        if let Some(occupant) = cell.occupant
            && !state.active_players().contains(&occupant)
        {
            violations.push(violation(format!(
                "inactive player {occupant} has a piece at {coord}"
            )));
        }
    }

    // Piece counts: placed pieces plus outstanding placements is always two each.
    for &player in state.active_players() {
        let on_board = board.pieces_of(player).count();
        let queued = state.placement_queue().filter(|&p| p == player).count();
        if on_board + queued != PIECES_PER_PLAYER {
            violations.push(violation(format!(
                "{player} has {on_board} pieces on board and {queued} queued"
            )));
        }
    }

    // Transient turn state matches the phase.
    let phase = state.phase();
    if state.selection().is_some() != (phase == Phase::ActionMove) {
        violations.push(violation(format!(
            "selection present = {} during {phase:?}",
            state.selection().is_some()
        )));
    }
    if state.moved_to().is_some() != (phase == Phase::ActionWall) {
        violations.push(violation(format!(
            "moved-to present = {} during {phase:?}",
            state.moved_to().is_some()
        )));
    }
    if let Some(selection) = state.selection() {
        check_selection(state, selection.piece, &selection.moves, &mut violations);
    }
    if let Some(cell) = state.moved_to()
        && board.occupant(cell) != Some(state.current_player())
    {
        violations.push(violation(format!(
            "moved-to cell {cell} does not hold a piece of {}",
            state.current_player()
        )));
    }
    if (phase == Phase::Placement) == state.placement_queue().next().is_none() {
        violations.push(violation(format!(
            "placement queue length {} during {phase:?}",
            state.placement_queue().count()
        )));
    }

    violations
}

fn check_selection(
    state: &GameState,
    piece: Coord,
    moves: &[Coord],
    violations: &mut Vec<InvariantViolation>,
) {
    if state.board().occupant(piece) != Some(state.current_player()) {
        violations.push(violation(format!(
            "selected cell {piece} does not hold a piece of {}",
            state.current_player()
        )));
    }
    if moves.first() != Some(&piece) {
        violations.push(violation(format!("valid moves of {piece} do not start at the origin")));
    }
}
