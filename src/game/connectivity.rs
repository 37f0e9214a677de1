//! Flood-fill connectivity: wall blocking, reachable areas, territories and separation.
//!
//! All traversals are breadth-first over orthogonal neighbours and never cross a
//! walled edge. Visited sets are flat `Vec<bool>` indexed row-major, which keeps
//! the AI's inner loop free of hashing.

use std::collections::{HashSet, VecDeque};

use crate::game::{Board, Coord, PlayerId, Side};

/// Whether movement between `a` and `b` is impossible.
///
/// True unless the two cells are exactly one orthogonal step apart, both on the
/// board, and the shared edge carries no wall. Non-adjacent pairs are always blocked.
#[must_use]
pub fn is_blocked(board: &Board, a: Coord, b: Coord) -> bool {
    let Some(side) = a.side_towards(b) else {
        return true;
    };
    match (board.get(a), board.get(b)) {
        (Ok(cell_a), Ok(cell_b)) => cell_a.has_wall(side) || cell_b.has_wall(side.opposite()),
        _ => true,
    }
}

/// Neighbours of `coord` reachable without crossing a wall.
///
/// Returns a fixed-size array and count, like [`Coord::adjacent`].
#[must_use]
#[inline]
pub fn open_neighbors(board: &Board, coord: Coord) -> ([Coord; 4], u8) {
    let mut result = [Coord::new(0, 0); 4];
    let mut count = 0u8;

    let Ok(cell) = board.get(coord) else {
        return (result, 0);
    };

    for side in Side::ALL {
        if cell.has_wall(side) {
            continue;
        }
        if let Some(next) = coord.step(side, board.size()) {
            result[count as usize] = next;
            count += 1;
        }
    }

    (result, count)
}

#[inline]
fn index(board: &Board, coord: Coord) -> usize {
    usize::from(coord.y) * usize::from(board.size()) + usize::from(coord.x)
}

/// Breadth-first expansion from `seeds` into empty cells, marking `visited`.
///
/// Seeds are counted as reached. Cells already marked in `visited` are skipped,
/// both as seeds and as expansion targets. When `absorb` is set, unvisited cells
/// holding a piece of `absorb` are joined to the region and expanded from too.
/// Returns the number of newly reached cells.
fn flood(
    board: &Board,
    seeds: impl IntoIterator<Item = Coord>,
    visited: &mut [bool],
    absorb: Option<PlayerId>,
    mut on_reach: impl FnMut(Coord),
) -> usize {
    let mut queue = VecDeque::new();
    let mut reached = 0usize;

    for seed in seeds {
        let idx = index(board, seed);
        if !visited[idx] {
            visited[idx] = true;
            reached += 1;
            on_reach(seed);
            queue.push_back(seed);
        }
    }

    while let Some(current) = queue.pop_front() {
        let (neighbors, count) = open_neighbors(board, current);
        for &next in &neighbors[..count as usize] {
            let idx = index(board, next);
            if visited[idx] {
                continue;
            }
            let occupant = board.occupant(next);
            let enter = occupant.is_none() || (absorb.is_some() && occupant == absorb);
            if enter {
                visited[idx] = true;
                reached += 1;
                on_reach(next);
                queue.push_back(next);
            }
        }
    }

    reached
}

fn visited_buffer(board: &Board) -> Vec<bool> {
    vec![false; board.cells().len()]
}

/// Cells reachable from any of `player`'s pieces through unwalled empty cells.
///
/// The pieces themselves are included; other occupied cells are never entered.
/// The size of this set is the player's territory score.
#[must_use]
pub fn reachable_area(board: &Board, player: PlayerId) -> HashSet<Coord> {
    let mut area = HashSet::new();
    let mut visited = visited_buffer(board);
    flood(board, board.pieces_of(player), &mut visited, None, |c| {
        area.insert(c);
    });
    area
}

/// Size of [`reachable_area`] without materialising the set.
#[must_use]
pub fn reachable_area_size(board: &Board, player: PlayerId) -> u32 {
    let mut visited = visited_buffer(board);
    let reached = flood(board, board.pieces_of(player), &mut visited, None, |_| {});
    u32::try_from(reached).unwrap_or(u32::MAX)
}

/// Size of the largest contiguous region held by one of `player`'s components.
///
/// Each unvisited piece starts a fresh flood fill over empty cells; pieces of the
/// same player met along the way join that component, so two pieces sharing
/// empty space are counted once. Returns 0 if the player has no pieces.
#[must_use]
pub fn largest_territory(board: &Board, player: PlayerId) -> u32 {
    let mut visited = visited_buffer(board);
    let mut largest = 0usize;

    for piece in board.pieces_of(player) {
        let size = flood(board, [piece], &mut visited, Some(player), |_| {});
        largest = largest.max(size);
    }

    u32::try_from(largest).unwrap_or(u32::MAX)
}

/// Whether `player` can reach a piece of another active player through empty cells.
#[must_use]
pub fn touches_opponent(board: &Board, player: PlayerId, active: &[PlayerId]) -> bool {
    let mut visited = visited_buffer(board);
    let mut queue: VecDeque<Coord> = VecDeque::new();

    for seed in board.pieces_of(player) {
        visited[index(board, seed)] = true;
        queue.push_back(seed);
    }

    while let Some(current) = queue.pop_front() {
        let (neighbors, count) = open_neighbors(board, current);
        for &next in &neighbors[..count as usize] {
            match board.occupant(next) {
                Some(other) if other != player && active.contains(&other) => return true,
                Some(_) => {}
                None => {
                    let idx = index(board, next);
                    if !visited[idx] {
                        visited[idx] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
    }

    false
}

/// True iff every pair of active players is separated.
///
/// The game continues while any active player's empty-cell closure touches a
/// piece of another active player.
#[must_use]
pub fn is_game_over(board: &Board, active: &[PlayerId]) -> bool {
    !active
        .iter()
        .any(|&player| touches_opponent(board, player, active))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(size: u16, pieces: &[(u16, u16, PlayerId)]) -> Board {
        let mut board = Board::new(size).unwrap();
        for &(x, y, p) in pieces {
            board.set_occupant(Coord::new(x, y), Some(p)).unwrap();
        }
        board
    }

    /// Wall off the full column boundary between x and x+1.
    fn wall_column(board: &mut Board, x: u16) {
        for y in 0..board.size() {
            board.set_wall(Coord::new(x, y), Side::Right, PlayerId::Red).unwrap();
        }
    }

    #[test]
    fn test_is_blocked_adjacent_open() {
        let board = Board::new(5).unwrap();
        assert!(!is_blocked(&board, Coord::new(1, 1), Coord::new(1, 2)));
    }

    #[test]
    fn test_is_blocked_by_wall() {
        let mut board = Board::new(5).unwrap();
        board.set_wall(Coord::new(1, 1), Side::Bottom, PlayerId::Blue).unwrap();
        assert!(is_blocked(&board, Coord::new(1, 1), Coord::new(1, 2)));
        assert!(is_blocked(&board, Coord::new(1, 2), Coord::new(1, 1)));
    }

    #[test]
    fn test_is_blocked_non_adjacent() {
        let board = Board::new(5).unwrap();
        assert!(is_blocked(&board, Coord::new(0, 0), Coord::new(1, 1)));
        assert!(is_blocked(&board, Coord::new(0, 0), Coord::new(0, 2)));
        assert!(is_blocked(&board, Coord::new(2, 2), Coord::new(2, 2)));
    }

    #[test]
    fn test_is_blocked_off_board() {
        let board = Board::new(5).unwrap();
        assert!(is_blocked(&board, Coord::new(4, 0), Coord::new(5, 0)));
    }

    #[test]
    fn test_reachable_area_empty_board() {
        let board = board_with(7, &[(3, 3, PlayerId::Red)]);
        assert_eq!(reachable_area(&board, PlayerId::Red).len(), 49);
        assert_eq!(reachable_area_size(&board, PlayerId::Red), 49);
    }

    #[test]
    fn test_reachable_area_excludes_other_pieces() {
        let board = board_with(7, &[(0, 0, PlayerId::Red), (6, 6, PlayerId::Blue)]);
        let area = reachable_area(&board, PlayerId::Red);
        assert_eq!(area.len(), 48);
        assert!(area.contains(&Coord::new(0, 0)));
        assert!(!area.contains(&Coord::new(6, 6)));
    }

    #[test]
    fn test_reachable_area_stops_at_walls() {
        let mut board = board_with(5, &[(0, 0, PlayerId::Red), (4, 4, PlayerId::Blue)]);
        wall_column(&mut board, 1);

        assert_eq!(reachable_area_size(&board, PlayerId::Red), 10);
        assert_eq!(reachable_area_size(&board, PlayerId::Blue), 15);
    }

    #[test]
    fn test_reachable_area_no_pieces() {
        let board = Board::new(5).unwrap();
        assert_eq!(reachable_area_size(&board, PlayerId::Green), 0);
        assert_eq!(largest_territory(&board, PlayerId::Green), 0);
    }

    #[test]
    fn test_largest_territory_split_components() {
        // Red holds both halves of a board split after column 1.
        let mut board = board_with(5, &[(0, 0, PlayerId::Red), (4, 4, PlayerId::Red)]);
        wall_column(&mut board, 1);

        assert_eq!(reachable_area_size(&board, PlayerId::Red), 25);
        assert_eq!(largest_territory(&board, PlayerId::Red), 15);
    }

    #[test]
    fn test_largest_territory_shared_space_counted_once() {
        let board = board_with(5, &[(0, 0, PlayerId::Red), (4, 4, PlayerId::Red)]);
        assert_eq!(largest_territory(&board, PlayerId::Red), 25);
    }

    #[test]
    fn test_largest_territory_adjacent_own_pieces() {
        let board = board_with(3, &[(0, 0, PlayerId::Red), (1, 0, PlayerId::Red)]);
        assert_eq!(largest_territory(&board, PlayerId::Red), 9);
    }

    #[test]
    fn test_game_not_over_when_connected() {
        let board = board_with(5, &[(0, 0, PlayerId::Red), (4, 4, PlayerId::Blue)]);
        assert!(!is_game_over(&board, &[PlayerId::Red, PlayerId::Blue]));
    }

    #[test]
    fn test_game_not_over_when_adjacent() {
        let board = board_with(5, &[(2, 2, PlayerId::Red), (3, 2, PlayerId::Blue)]);
        assert!(!is_game_over(&board, &[PlayerId::Red, PlayerId::Blue]));
    }

    #[test]
    fn test_game_over_when_separated() {
        let mut board = board_with(5, &[(0, 0, PlayerId::Red), (4, 4, PlayerId::Blue)]);
        wall_column(&mut board, 1);
        assert!(is_game_over(&board, &[PlayerId::Red, PlayerId::Blue]));
    }

    #[test]
    fn test_game_over_checks_every_pair() {
        // Red is walled off, but Blue and Green still share the right side.
        let mut board = board_with(
            5,
            &[(0, 0, PlayerId::Red), (3, 0, PlayerId::Blue), (4, 4, PlayerId::Green)],
        );
        wall_column(&mut board, 1);
        let active = [PlayerId::Red, PlayerId::Blue, PlayerId::Green];
        assert!(!is_game_over(&board, &active));
        assert!(!touches_opponent(&board, PlayerId::Red, &active));
        assert!(touches_opponent(&board, PlayerId::Blue, &active));
    }

    #[test]
    fn test_game_over_ignores_inactive_pieces() {
        let mut board = board_with(
            5,
            &[(0, 0, PlayerId::Red), (1, 0, PlayerId::Yellow), (4, 4, PlayerId::Blue)],
        );
        wall_column(&mut board, 1);
        assert!(is_game_over(&board, &[PlayerId::Red, PlayerId::Blue]));
    }

    #[test]
    fn test_adjacent_pieces_across_wall_are_separated() {
        let mut board = board_with(2, &[(0, 0, PlayerId::Red), (1, 0, PlayerId::Blue)]);
        board.set_wall(Coord::new(0, 0), Side::Right, PlayerId::Red).unwrap();
        board.set_wall(Coord::new(0, 0), Side::Bottom, PlayerId::Red).unwrap();
        assert!(is_game_over(&board, &[PlayerId::Red, PlayerId::Blue]));
    }
}
