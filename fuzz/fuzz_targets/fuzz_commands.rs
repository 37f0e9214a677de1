#![no_main]

//! Rules engine command fuzzer.
//!
//! Feeds arbitrary command and tick sequences to a match and checks the state
//! invariants after every step. Rejected commands must leave the state as it was.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand::rngs::StdRng;
use stitch::game::{Command, Coord, GameMode, GameState, Roster, Side, check_invariants};

/// A fuzzer-generated input step.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzStep {
    Place { x: u8, y: u8 },
    Select { x: u8, y: u8 },
    Move { x: u8, y: u8 },
    Wall { x: u8, y: u8, side: u8 },
    Unselect,
    Reset,
    Tick,
}

/// Structured input for a whole match.
#[derive(Arbitrary, Debug)]
struct MatchInput {
    players: u8,
    board_size: u8,
    turn_seconds: u8,
    rng_seed: u64,
    steps: Vec<FuzzStep>,
}

fn coord(x: u8, y: u8, size: u16) -> Coord {
    // One past the edge so out-of-bounds input is reachable.
    let span = size + 1;
    Coord::new(u16::from(x) % span, u16::from(y) % span)
}

fn to_command(step: FuzzStep, size: u16) -> Option<Command> {
    Some(match step {
        FuzzStep::Place { x, y } => Command::Place { at: coord(x, y, size) },
        FuzzStep::Select { x, y } => Command::Select { at: coord(x, y, size) },
        FuzzStep::Move { x, y } => Command::Move { to: coord(x, y, size) },
        FuzzStep::Wall { x, y, side } => Command::Wall {
            at: coord(x, y, size),
            side: Side::ALL[usize::from(side % 4)],
        },
        FuzzStep::Unselect => Command::Unselect,
        FuzzStep::Reset => Command::Reset,
        FuzzStep::Tick => return None,
    })
}

fuzz_target!(|input: MatchInput| {
    let players = usize::from(input.players % 3) + 2;
    let size = u16::from(input.board_size % 6) + 3;
    let turn_seconds = u32::from(input.turn_seconds % 5) + 1;

    let Ok(roster) = Roster::new(GameMode::Hotseat, players, &[]) else {
        return;
    };
    let Ok(mut state) = GameState::new(roster, size, turn_seconds) else {
        return;
    };
    let mut rng = StdRng::seed_from_u64(input.rng_seed);

    for step in input.steps.into_iter().take(2000) {
        match to_command(step, size) {
            Some(command) => {
                let before = state.clone();
                if state.apply(command).is_err() {
                    assert_eq!(state, before, "rejected {command} changed the state");
                }
            }
            None => {
                state.tick(&mut rng);
            }
        }

        let violations = check_invariants(&state);
        assert!(violations.is_empty(), "invariants violated: {violations:?}");
    }
});
