#![no_main]

//! Connectivity fuzzer.
//!
//! Builds arbitrary boards and checks the flood fills against each other:
//! a player's largest territory never exceeds its reachable area, the
//! destinations of a move are all inside that area, and a finished game
//! never double counts a cell.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use stitch::game::{
    Board, Coord, PlayerId, Side, is_game_over, largest_territory, reachable_area,
    reachable_area_size, valid_moves,
};

#[derive(Arbitrary, Debug)]
struct BoardInput {
    size: u8,
    walls: Vec<(u8, u8, u8)>,
    pieces: Vec<(u8, u8, u8)>,
}

fuzz_target!(|input: BoardInput| {
    let size = u16::from(input.size % 10) + 3;
    let Some(mut board) = Board::new(size) else {
        return;
    };
    let at = |x: u8, y: u8| Coord::new(u16::from(x) % size, u16::from(y) % size);

    for &(x, y, side) in input.walls.iter().take(200) {
        let _ = board.set_wall(at(x, y), Side::ALL[usize::from(side % 4)], PlayerId::Red);
    }
    for &(x, y, player) in input.pieces.iter().take(8) {
        let _ = board.set_occupant(at(x, y), Some(PlayerId::ALL[usize::from(player % 4)]));
    }

    for player in PlayerId::ALL {
        let area = reachable_area(&board, player);
        let size_of_area = reachable_area_size(&board, player);
        assert_eq!(usize::try_from(size_of_area).ok(), Some(area.len()));
        assert!(largest_territory(&board, player) <= size_of_area);

        for piece in board.pieces_of(player) {
            for dest in valid_moves(&board, piece) {
                assert!(area.contains(&dest), "{dest} outside {player}'s area");
            }
        }
    }

    if is_game_over(&board, &PlayerId::ALL) {
        let total: usize = PlayerId::ALL
            .iter()
            .map(|&p| reachable_area(&board, p).len())
            .sum();
        assert!(total <= usize::from(size) * usize::from(size));
    }
});
