//! Multi-turn integration tests across the rules engine, AI, session and self-play.
//!
//! Run with: cargo test --release game_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use stitch::config::{AiConfig, GameConfig};
use stitch::counter::{CounterSource, FallbackCounter, LocalFileCounter};
use stitch::game::{
    Command, Coord, GameMode, GameState, Outcome, Phase, PlayerId, Roster, check_invariants,
    valid_moves,
};
use stitch::session::Session;
use stitch::telemetry::MemorySink;
use stitch::tournament::{TournamentConfig, run_game};

fn hotseat(players: usize, size: u16) -> GameState {
    let roster = Roster::new(GameMode::Hotseat, players, &[]).unwrap();
    GameState::new(roster, size, 30).unwrap()
}

/// Play one random legal turn for the current player, or time it out when none exists.
fn random_turn(state: &mut GameState, rng: &mut impl Rng) {
    let player = state.current_player();
    let mut turns = Vec::new();
    for piece in state.board().pieces_of(player) {
        for to in valid_moves(state.board(), piece) {
            for side in state.board().open_sides(to) {
                turns.push((piece, to, side));
            }
        }
    }
    match turns.choose(rng) {
        Some(&(piece, to, side)) => state.play_turn(piece, to, side).unwrap(),
        None => {
            state.expire_turn(rng);
        }
    }
}

fn place_all(state: &mut GameState, rng: &mut impl Rng) {
    while state.phase() == Phase::Placement {
        let empty: Vec<Coord> = state.board().empty_cells().collect();
        let at = *empty.choose(rng).unwrap();
        state.apply(Command::Place { at }).unwrap();
        assert!(check_invariants(state).is_empty());
    }
}

#[test]
fn test_random_hotseat_games_terminate_cleanly() {
    for (players, size) in [(2, 3), (2, 5), (3, 5), (4, 4), (4, 7)] {
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = hotseat(players, size);
            place_all(&mut state, &mut rng);

            let mut turns = 0;
            while !state.is_over() {
                random_turn(&mut state, &mut rng);
                let violations = check_invariants(&state);
                assert!(violations.is_empty(), "seed {seed}: {violations:?}");
                turns += 1;
                assert!(turns < 1000, "game on {size}x{size} did not end");
            }

            let total: u32 = state.scores().iter().map(|(_, s)| s).sum();
            let cells = u32::from(size) * u32::from(size);
            assert!(total <= cells);
            assert_ne!(state.outcome(), Outcome::Undecided);
        }
    }
}

#[test]
fn test_text_commands_drive_a_game_to_the_end() {
    // Red walls itself into the top-left 2x2 block of a 3x3 board.
    let script = [
        "place 0 0",
        "place 2 2",
        "place 1 0",
        "place 2 1",
        "select 0 0",
        "move 0 1",
        "wall 0 1 bottom",
        "select 2 1",
        "move 2 1",
        "wall 2 1 left",
        "select 1 0",
        "move 1 0",
        "wall 1 0 right",
        "select 2 2",
        "move 1 2",
        "wall 1 2 top",
    ];

    let mut state = hotseat(2, 3);
    for line in script {
        let command: Command = line.parse().unwrap();
        state.apply(command).unwrap();
        assert!(check_invariants(&state).is_empty(), "after '{line}'");
    }

    // Red owns (0,0), (1,0), (0,1), (1,1); Blue owns the rest.
    assert_eq!(state.phase(), Phase::GameOver);
    assert_eq!(state.turn(), 4);
    assert_eq!(state.scores().get(PlayerId::Red), 4);
    assert_eq!(state.scores().get(PlayerId::Blue), 5);
    assert_eq!(state.outcome(), Outcome::Winner(PlayerId::Blue));
    assert!(matches!(
        state.apply(Command::Select { at: Coord::new(0, 0) }),
        Err(stitch::CommandError::GameOver)
    ));
}

#[test]
fn test_timer_expiry_hands_over_the_turn() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut state = hotseat(2, 5);
    place_all(&mut state, &mut rng);

    let walls_before = state.board().wall_sides();
    let first = state.current_player();
    for _ in 0..29 {
        state.tick(&mut rng);
    }
    assert_eq!(state.current_player(), first);
    state.tick(&mut rng);

    assert_ne!(state.current_player(), first);
    assert_eq!(state.phase(), Phase::ActionSelect);
    assert!(state.board().wall_sides() > walls_before);
    assert_eq!(state.timer().remaining(), 30);
}

#[test]
fn test_spectated_session_reports_through_sink() {
    let sink = MemorySink::new();
    let roster = Roster::new(GameMode::Spectate, 3, &[]).unwrap();
    let config = GameConfig {
        board_size: 5,
        ..GameConfig::default()
    };
    let mut session = Session::start(
        roster,
        config,
        11,
        Box::new(FallbackCounter::offline()),
        Box::new(sink.clone()),
    )
    .unwrap();

    let mut steps = 0;
    while !session.state().is_over() {
        session.run_ai_blocking();
        steps += 1;
        assert!(steps < 2000);
    }

    let names = sink.names();
    assert_eq!(names.first().map(String::as_str), Some("game_start"));
    assert_eq!(names.iter().filter(|n| *n == "game_over").count(), 1);
}

#[test]
fn test_match_count_persists_in_local_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matches.json");

    let start = |seed| {
        let counter = FallbackCounter::offline().with_backend(LocalFileCounter::new(&path));
        let roster = Roster::new(GameMode::Hotseat, 2, &[]).unwrap();
        Session::start(
            roster,
            GameConfig::default(),
            seed,
            Box::new(counter),
            Box::new(MemorySink::new()),
        )
        .unwrap()
    };

    let first = start(1);
    assert_eq!(first.matches_played().count, 1);
    assert_eq!(first.matches_played().source, CounterSource::Local);

    let mut second = start(2);
    assert_eq!(second.matches_played().count, 2);
    second.reset();
    assert_eq!(second.matches_played().count, 3);
}

#[test]
fn test_self_play_across_player_counts() {
    let config = TournamentConfig {
        board_size: 7,
        max_turns: 400,
    };
    for players in 2..=4 {
        let seats = vec![AiConfig::default(); players];
        for seed in 0..3 {
            let result = run_game(seed, &seats, &config).unwrap();
            assert_eq!(result.player_stats.len(), players);
            assert!(result.turns_played <= 400);
            assert_ne!(result.outcome, Outcome::Undecided);
        }
    }
}

#[test]
fn test_self_play_is_reproducible() {
    let config = TournamentConfig::default();
    let seats = [
        AiConfig::default(),
        AiConfig {
            aggression: 0.5,
            ..AiConfig::default()
        },
    ];
    let a = run_game(77, &seats, &config).unwrap();
    let b = run_game(77, &seats, &config).unwrap();
    assert_eq!(a.outcome, b.outcome);
    assert_eq!(a.turns_played, b.turns_played);
    assert_eq!(a.scores, b.scores);
}
