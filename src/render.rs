//! Plain-text rendering of a match.
//!
//! ```text
//!     0 1 2 3 4
//!    +-+-+-+-+-+
//!  0 |R . . . .|
//!    + +-+ + + +
//!  1 |. .|B . .|
//!    +-+-+-+-+-+
//! ```
//!
//! Pieces show as their player's initial, `*` marks a destination of the
//! selected piece, `|` and `-` are walls.

#![allow(clippy::format_push_string)]

use crate::game::{Board, Coord, GameState, Outcome, Phase, Side};

fn cell_char(state: &GameState, coord: Coord) -> char {
    if let Some(player) = state.board().occupant(coord) {
        return player.initial();
    }
    let highlighted = state
        .selection()
        .is_some_and(|s| s.moves.contains(&coord));
    if highlighted { '*' } else { '.' }
}

fn wall_between(board: &Board, coord: Coord, side: Side) -> bool {
    !board.is_open(coord, side)
}

fn horizontal_rule(board: &Board, y: u16, side: Side) -> String {
    let mut line = String::from("   +");
    for x in 0..board.size() {
        line.push(if wall_between(board, Coord::new(x, y), side) { '-' } else { ' ' });
        line.push('+');
    }
    line.push('\n');
    line
}

/// Draw the board only.
#[must_use]
pub fn render_board(state: &GameState) -> String {
    let board = state.board();
    let size = board.size();
    let mut output = String::from("    ");

    for x in 0..size {
        output.push_str(&format!("{} ", x % 10));
    }
    output.push('\n');
    output.push_str(&horizontal_rule(board, 0, Side::Top));

    for y in 0..size {
        output.push_str(&format!("{y:>2} |"));
        for x in 0..size {
            let coord = Coord::new(x, y);
            output.push(cell_char(state, coord));
            output.push(if wall_between(board, coord, Side::Right) { '|' } else { ' ' });
        }
        output.push('\n');
        output.push_str(&horizontal_rule(board, y, Side::Bottom));
    }

    output
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Placement => "placement",
        Phase::ActionSelect => "select a piece",
        Phase::ActionMove => "move the piece",
        Phase::ActionWall => "build a wall",
        Phase::GameOver => "game over",
    }
}

/// Draw the board with a status and score footer.
#[must_use]
pub fn render_ascii(state: &GameState) -> String {
    let mut output = render_board(state);
    let current = state.current_player();
    let name = state.roster().seat(current).map_or(current.name(), |s| s.name.as_str());

    output.push('\n');
    if state.is_over() {
        output.push_str(&format!("Turn {}: game over\n", state.turn()));
    } else {
        output.push_str(&format!(
            "Turn {}: {} ({}) to {}",
            state.turn(),
            name,
            current.initial(),
            phase_label(state.phase())
        ));
        if state.timer().is_running() {
            output.push_str(&format!(" [{}s]", state.timer().remaining()));
        }
        output.push('\n');
    }

    let scores = if state.is_over() { state.scores().clone() } else { state.live_scores() };
    let line: Vec<String> = scores
        .iter()
        .map(|(player, score)| format!("{}={score}", player.initial()))
        .collect();
    output.push_str(&format!("Territory: {}\n", line.join(" ")));
    output
}

/// Final result block for a finished (or abandoned) match.
#[must_use]
pub fn render_summary(state: &GameState) -> String {
    let mut output = String::new();
    let name_of = |player: crate::game::PlayerId| {
        state.roster().seat(player).map_or(player.name().to_string(), |s| s.name.clone())
    };

    output.push_str(&format!("Game over after {} turns\n", state.turn()));
    match state.outcome() {
        Outcome::Winner(player) => {
            output.push_str(&format!("  Winner: {} ({})\n", name_of(player), player.name()));
        }
        Outcome::Draw => output.push_str("  Result: draw\n"),
        Outcome::Undecided => output.push_str("  Result: undecided\n"),
    }
    for (player, score) in state.scores().iter() {
        output.push_str(&format!("  {:<8} {score:>3} cells\n", name_of(player)));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameMode, PlayerId, Roster};

    fn game() -> GameState {
        let names = vec!["Ada".to_string()];
        let roster = Roster::new(GameMode::Hotseat, 2, &names).unwrap();
        GameState::new(roster, 3, 30).unwrap()
    }

    #[test]
    fn test_empty_board_layout() {
        let text = render_board(&game());
        let expected = "    0 1 2 \n   +-+-+-+\n 0 |. . .|\n   + + + +\n 1 |. . .|\n   + + + +\n 2 |. . .|\n   +-+-+-+\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_pieces_walls_and_highlights() {
        let mut state = game();
        for (x, y) in [(0, 0), (2, 2), (0, 2), (2, 0)] {
            state.place_piece(Coord::new(x, y)).unwrap();
        }
        state.select_piece(Coord::new(0, 0)).unwrap();
        state.move_piece_to(Coord::new(1, 0)).unwrap();
        state.place_wall(Coord::new(1, 0), Side::Bottom).unwrap();

        let text = render_board(&state);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], " 0 |. R B|");
        assert_eq!(lines[3], "   + +-+ +");
        assert_eq!(lines[6], " 2 |R . B|");
    }

    #[test]
    fn test_footer_and_summary() {
        let mut state = game();
        let text = render_ascii(&state);
        assert!(text.contains("Ada (R) to placement"));

        for (x, y) in [(0, 0), (2, 2), (0, 2), (2, 0)] {
            state.place_piece(Coord::new(x, y)).unwrap();
        }
        state.finish();
        let summary = render_summary(&state);
        assert!(summary.contains("Game over after 0 turns"));
        assert!(summary.contains("Ada"));
        assert!(summary.contains(PlayerId::Blue.name()));
    }
}
