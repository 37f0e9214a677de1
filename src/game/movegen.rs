//! Legal destinations for a selected piece.

use std::collections::VecDeque;

use crate::game::{Board, Coord, open_neighbors};

/// Maximum number of orthogonal steps in one move.
pub const MAX_STEPS: u8 = 2;

/// Every destination reachable from `origin` in 0, 1 or 2 steps.
///
/// Each step goes to an orthogonally adjacent, in-bounds, unoccupied cell not
/// separated from the current cell by a wall; intermediate cells obey the same
/// rules, so pieces never jump. The origin itself (a pass) is always included
/// and comes first; the rest follow in breadth-first order without duplicates.
#[must_use]
pub fn valid_moves(board: &Board, origin: Coord) -> Vec<Coord> {
    let mut moves = vec![origin];
    let mut queue = VecDeque::from([(origin, 0u8)]);

    while let Some((current, depth)) = queue.pop_front() {
        if depth == MAX_STEPS {
            continue;
        }

        let (neighbors, count) = open_neighbors(board, current);
        for &next in &neighbors[..count as usize] {
            if board.occupant(next).is_some() || moves.contains(&next) {
                continue;
            }
            moves.push(next);
            queue.push_back((next, depth + 1));
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{PlayerId, Side};

    #[test]
    fn test_open_board_center_has_13_moves() {
        let mut board = Board::new(7).unwrap();
        board.set_occupant(Coord::new(3, 3), Some(PlayerId::Red)).unwrap();

        let moves = valid_moves(&board, Coord::new(3, 3));
        assert_eq!(moves.len(), 13);
        assert_eq!(moves[0], Coord::new(3, 3));
        assert!(moves.contains(&Coord::new(3, 1)));
        assert!(moves.contains(&Coord::new(4, 4)));
        assert!(!moves.contains(&Coord::new(5, 4)));
    }

    #[test]
    fn test_corner_moves() {
        let board = Board::new(7).unwrap();
        // origin + 2 one-step + 3 two-step
        assert_eq!(valid_moves(&board, Coord::new(0, 0)).len(), 6);
    }

    #[test]
    fn test_walls_block_steps() {
        let mut board = Board::new(7).unwrap();
        let origin = Coord::new(3, 3);
        board.set_wall(origin, Side::Top, PlayerId::Blue).unwrap();

        let moves = valid_moves(&board, origin);
        assert!(!moves.contains(&Coord::new(3, 2)));
        assert!(!moves.contains(&Coord::new(3, 1)));
        // Going around the wall to (3,2) would take three steps.
        assert_eq!(moves.len(), 11);
    }

    #[test]
    fn test_no_jumping_over_pieces() {
        let mut board = Board::new(7).unwrap();
        let origin = Coord::new(3, 3);
        board.set_occupant(Coord::new(3, 2), Some(PlayerId::Blue)).unwrap();

        let moves = valid_moves(&board, origin);
        assert!(!moves.contains(&Coord::new(3, 2)));
        assert!(!moves.contains(&Coord::new(3, 1)));
        // The diagonals are still reachable through the side cells.
        assert!(moves.contains(&Coord::new(2, 2)));
        assert!(moves.contains(&Coord::new(4, 2)));
    }

    #[test]
    fn test_boxed_in_piece_can_only_pass() {
        let mut board = Board::new(7).unwrap();
        let origin = Coord::new(3, 3);
        for side in Side::ALL {
            board.set_wall(origin, side, PlayerId::Red).unwrap();
        }
        assert_eq!(valid_moves(&board, origin), vec![origin]);
    }
}
