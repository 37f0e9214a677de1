//! Property-based tests for board and connectivity.
//!
//! Run with: cargo test --release prop_game

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use stitch::game::{
    Board, Coord, PlayerId, Side, is_blocked, is_game_over, reachable_area_size, valid_moves,
};

/// (x, y, side index, owner index) before reduction modulo the board size.
type RawWall = (u16, u16, usize, usize);

fn build_board(size: u16, walls: &[RawWall], pieces: &[(u16, u16)]) -> Board {
    let mut board = Board::new(size).unwrap();
    for &(x, y, side, owner) in walls {
        let coord = Coord::new(x % size, y % size);
        board
            .set_wall(coord, Side::ALL[side % 4], PlayerId::ALL[owner % 2])
            .unwrap();
    }
    for (i, &(x, y)) in pieces.iter().enumerate() {
        let coord = Coord::new(x % size, y % size);
        board.set_occupant(coord, Some(PlayerId::ALL[i % 2])).unwrap();
    }
    board
}

fn walls() -> impl Strategy<Value = Vec<RawWall>> {
    prop::collection::vec((0u16..16, 0u16..16, 0usize..4, 0usize..2), 0..30)
}

fn pieces() -> impl Strategy<Value = Vec<(u16, u16)>> {
    prop::collection::vec((0u16..16, 0u16..16), 1..5)
}

proptest! {
    #![proptest_config(ProptestConfig { max_global_rejects: 8192, ..ProptestConfig::with_cases(2000) })]

    /// Every interior wall is recorded on both cells sharing the edge.
    #[test]
    fn prop_walls_are_mirrored(size in 3u16..9, walls in walls()) {
        let board = build_board(size, &walls, &[]);
        for (coord, cell) in board.iter() {
            for side in Side::ALL {
                if let Some(neighbor) = coord.step(side, size) {
                    let mirror = board.get(neighbor).unwrap();
                    prop_assert_eq!(cell.has_wall(side), mirror.has_wall(side.opposite()));
                }
            }
        }
    }

    /// Blocking is symmetric between neighbours.
    #[test]
    fn prop_blocked_is_symmetric(
        size in 3u16..9,
        walls in walls(),
        x in 0u16..16,
        y in 0u16..16,
        side in 0usize..4,
    ) {
        let board = build_board(size, &walls, &[]);
        let a = Coord::new(x % size, y % size);
        if let Some(b) = a.step(Side::ALL[side], size) {
            prop_assert_eq!(is_blocked(&board, a, b), is_blocked(&board, b, a));
        }
    }

    /// Building then removing a wall on an open edge restores the board.
    #[test]
    fn prop_set_remove_wall_restores(
        size in 3u16..9,
        walls in walls(),
        x in 0u16..16,
        y in 0u16..16,
        side in 0usize..4,
    ) {
        let board = build_board(size, &walls, &[]);
        let coord = Coord::new(x % size, y % size);
        let side = Side::ALL[side];
        prop_assume!(board.is_open(coord, side));

        let mut scratch = board.clone();
        scratch.set_wall(coord, side, PlayerId::Red).unwrap();
        prop_assert!(scratch.get(coord).unwrap().has_wall(side));
        scratch.remove_wall(coord, side).unwrap();
        prop_assert_eq!(scratch, board);
    }

    /// Destinations start at the origin, are distinct, empty and at most two steps away.
    #[test]
    fn prop_valid_moves_shape(
        size in 3u16..9,
        walls in walls(),
        pieces in pieces(),
    ) {
        let board = build_board(size, &walls, &pieces);
        let origin = Coord::new(pieces[0].0 % size, pieces[0].1 % size);
        let moves = valid_moves(&board, origin);

        prop_assert_eq!(moves[0], origin);
        for (i, &dest) in moves.iter().enumerate() {
            prop_assert!(!moves[i + 1..].contains(&dest));
            if dest != origin {
                prop_assert!(board.occupant(dest).is_none());
            }
            let distance = dest.x.abs_diff(origin.x) + dest.y.abs_diff(origin.y);
            prop_assert!(distance <= 2);
        }

        // Every open, empty neighbour is a destination.
        for side in Side::ALL {
            if let Some(next) = origin.step(side, size)
                && !is_blocked(&board, origin, next)
                && board.occupant(next).is_none()
            {
                prop_assert!(moves.contains(&next));
            }
        }
    }

    /// Adding a wall never grows anyone's reachable area.
    #[test]
    fn prop_wall_never_grows_area(
        size in 3u16..9,
        walls in walls(),
        pieces in pieces(),
        x in 0u16..16,
        y in 0u16..16,
        side in 0usize..4,
    ) {
        let board = build_board(size, &walls, &pieces);
        let mut walled = board.clone();
        walled
            .set_wall(Coord::new(x % size, y % size), Side::ALL[side], PlayerId::Blue)
            .unwrap();

        for player in [PlayerId::Red, PlayerId::Blue] {
            prop_assert!(reachable_area_size(&walled, player) <= reachable_area_size(&board, player));
        }
    }

    /// Two unwalled adjacent opposing pieces keep the game going.
    #[test]
    fn prop_adjacent_pieces_not_over(size in 3u16..9, x in 0u16..16, y in 0u16..16) {
        let mut board = Board::new(size).unwrap();
        let a = Coord::new(x % (size - 1), y % size);
        let b = Coord::new(a.x + 1, a.y);
        board.set_occupant(a, Some(PlayerId::Red)).unwrap();
        board.set_occupant(b, Some(PlayerId::Blue)).unwrap();

        prop_assert!(!is_game_over(&board, &[PlayerId::Red, PlayerId::Blue]));

        board.set_wall(a, Side::Right, PlayerId::Red).unwrap();
        // Boards have at least three rows, so the wall can be walked around.
        prop_assert!(!is_game_over(&board, &[PlayerId::Red, PlayerId::Blue]));
    }
}
