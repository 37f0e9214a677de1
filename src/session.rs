//! A live match with its collaborators.
//!
//! [`Session`] owns the [`GameState`], the random source, the AI worker and the
//! best-effort collaborators (match counter and analytics). Front ends feed it
//! human commands, a one-second tick and a frequent AI pump; it never blocks
//! unless asked to.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::ai::{AiDecision, AiJob, AiPoll, AiWorker, decide};
use crate::config::GameConfig;
use crate::counter::{CounterReading, MatchCounter};
use crate::error::{CommandError, SetupError};
use crate::game::{Command, GameState, Outcome, Phase, Roster, Tick};
use crate::telemetry::{Event, EventSink};

/// What changed as a result of pumping the AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiStep {
    /// Not an AI seat's turn, or the game is over.
    NotAiTurn,
    /// A search is running.
    Thinking,
    /// The AI's decision was applied.
    Applied(AiDecision),
    /// The AI had nothing legal or failed; the turn was forced to end.
    ForcedPass,
    /// A result arrived for a position that no longer exists.
    Discarded,
}

/// A match in progress plus everything around it.
pub struct Session {
    state: GameState,
    config: GameConfig,
    rng: StdRng,
    worker: AiWorker,
    epoch: u64,
    counter: Box<dyn MatchCounter>,
    sink: Box<dyn EventSink>,
    matches: CounterReading,
    reported_over: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.state.phase())
            .field("current", &self.state.current_player())
            .field("epoch", &self.epoch)
            .field("worker", &self.worker)
            .field("matches", &self.matches)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a match.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if the board cannot hold the roster's pieces.
    pub fn start(
        roster: Roster,
        config: GameConfig,
        seed: u64,
        mut counter: Box<dyn MatchCounter>,
        sink: Box<dyn EventSink>,
    ) -> Result<Self, SetupError> {
        let state = GameState::new(roster, config.board_size, config.turn_seconds)?;
        let matches = counter.increment();

        let mut session = Self {
            state,
            config,
            rng: StdRng::seed_from_u64(seed),
            worker: AiWorker::new(),
            epoch: 0,
            counter,
            sink,
            matches,
            reported_over: false,
        };
        session.announce_start();
        Ok(session)
    }

    /// The match.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Match count as of the start of this match.
    #[must_use]
    pub fn matches_played(&self) -> CounterReading {
        self.matches
    }

    /// Whether the current player is an AI seat that still has to act.
    #[must_use]
    pub fn is_ai_turn(&self) -> bool {
        !self.state.is_over() && self.state.roster().is_ai(self.state.current_player())
    }

    /// Whether an AI search is running.
    #[must_use]
    pub fn is_ai_thinking(&self) -> bool {
        self.worker.is_thinking()
    }

    /// Apply a command from a human seat.
    ///
    /// `Reset` is accepted at any time. Other commands are refused while an AI
    /// seat is to move.
    ///
    /// # Errors
    ///
    /// Returns the [`CommandError`] of the rejected command; nothing changes.
    pub fn command(&mut self, command: Command) -> Result<(), CommandError> {
        if command == Command::Reset {
            self.reset();
            return Ok(());
        }
        if self.is_ai_turn() {
            return Err(CommandError::WrongPhase(self.state.phase()));
        }
        self.state.apply(command)?;
        self.after_change();
        Ok(())
    }

    /// Start over with the same seats; any running AI search is abandoned.
    pub fn reset(&mut self) {
        self.worker.cancel();
        self.epoch += 1;
        self.state.reset();
        self.reported_over = false;
        self.matches = self.counter.increment();
        self.announce_start();
    }

    /// Advance the turn timer by one second, running the timeout fallback on expiry.
    pub fn tick(&mut self) -> Tick {
        let player = self.state.current_player();
        let tick = self.state.tick(&mut self.rng);
        if tick == Tick::Expired {
            self.worker.cancel();
            self.sink.emit(Event::new("turn_timeout").with("player", player.name()));
            self.after_change();
        }
        tick
    }

    /// Drive the AI without blocking: start a search or collect a finished one.
    pub fn pump_ai(&mut self) -> AiStep {
        match self.worker.poll() {
            AiPoll::Ready(job, decision) => return self.resolve(job, Some(decision)),
            AiPoll::Failed(job) => return self.resolve(job, None),
            AiPoll::Thinking => return AiStep::Thinking,
            AiPoll::Idle => {}
        }
        if !self.wants_ai() {
            return AiStep::NotAiTurn;
        }
        let job = AiJob::for_state(&self.state, self.epoch);
        let seed = self.rng.random();
        self.worker.start(job, &self.state, self.config.ai, seed);
        AiStep::Thinking
    }

    /// Let the AI act for the current seat, waiting for its search to finish.
    pub fn run_ai_blocking(&mut self) -> AiStep {
        if !self.worker.is_thinking() {
            if !self.wants_ai() {
                return AiStep::NotAiTurn;
            }
            let job = AiJob::for_state(&self.state, self.epoch);
            let decision = decide(&self.state, &self.config.ai, &mut self.rng);
            return self.resolve(job, Some(decision));
        }
        match self.worker.wait() {
            AiPoll::Ready(job, decision) => self.resolve(job, Some(decision)),
            AiPoll::Failed(job) => self.resolve(job, None),
            AiPoll::Thinking | AiPoll::Idle => AiStep::NotAiTurn,
        }
    }

    fn wants_ai(&self) -> bool {
        self.is_ai_turn()
            && matches!(
                self.state.phase(),
                Phase::Placement | Phase::ActionSelect | Phase::ActionMove
            )
    }

    fn resolve(&mut self, job: AiJob, decision: Option<AiDecision>) -> AiStep {
        if !job.is_current(&self.state, self.epoch) {
            info!(player = %job.player, "discarding stale ai result");
            return AiStep::Discarded;
        }

        let applied = match decision {
            Some(AiDecision::Place(cell)) => self.state.place_piece(cell).is_ok(),
            Some(AiDecision::Turn(ai_move)) => {
                if self.state.phase() == Phase::ActionMove {
                    let _ = self.state.unselect();
                }
                self.state.apply_ai_move(ai_move).is_ok()
            }
            Some(AiDecision::Pass) | None => false,
        };

        let step = match decision {
            Some(d) if applied => AiStep::Applied(d),
            _ => {
                self.force_pass(job);
                AiStep::ForcedPass
            }
        };
        self.after_change();
        step
    }

    fn force_pass(&mut self, job: AiJob) {
        warn!(player = %job.player, phase = ?job.phase, "ai could not move; forcing end of turn");
        if self.state.phase().is_action() {
            self.state.expire_turn(&mut self.rng);
        }
        self.sink.emit(Event::new("ai_forced_pass").with("player", job.player.name()));
    }

    fn announce_start(&mut self) {
        let roster = self.state.roster();
        let event = Event::new("game_start")
            .with("players", roster.len())
            .with("mode", format!("{:?}", roster.mode()))
            .with("board_size", self.config.board_size)
            .with("matches_played", self.matches.count);
        self.sink.emit(event);
    }

    fn after_change(&mut self) {
        if !self.state.is_over() || self.reported_over {
            return;
        }
        self.reported_over = true;
        self.worker.cancel();

        let winner = match self.state.outcome() {
            Outcome::Winner(player) => player.name(),
            Outcome::Draw | Outcome::Undecided => "draw",
        };
        let mut event = Event::new("game_over")
            .with("winner", winner)
            .with("turns", self.state.turn());
        for (player, score) in self.state.scores().iter() {
            event = event.with(player.name().to_lowercase(), score);
        }
        self.sink.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::{CounterSource, FallbackCounter};
    use crate::game::{Board, Coord, GameMode, PlayerId, Side};
    use crate::telemetry::MemorySink;

    fn session(mode: GameMode, players: usize, sink: &MemorySink) -> Session {
        let roster = Roster::new(mode, players, &[]).unwrap();
        let config = GameConfig {
            board_size: 5,
            turn_seconds: 3,
            ..GameConfig::default()
        };
        Session::start(
            roster,
            config,
            42,
            Box::new(FallbackCounter::offline()),
            Box::new(sink.clone()),
        )
        .unwrap()
    }

    #[test]
    fn test_start_counts_and_announces() {
        let sink = MemorySink::new();
        let s = session(GameMode::Hotseat, 2, &sink);
        assert_eq!(s.matches_played().count, 1);
        assert_eq!(s.matches_played().source, CounterSource::Offline);
        assert_eq!(sink.names(), vec!["game_start".to_string()]);
    }

    #[test]
    fn test_human_commands_refused_on_ai_turn() {
        let sink = MemorySink::new();
        let mut s = session(GameMode::VersusAi, 2, &sink);
        s.command(Command::Place { at: Coord::new(0, 0) }).unwrap();
        assert!(s.is_ai_turn());
        assert!(s.command(Command::Place { at: Coord::new(1, 1) }).is_err());
    }

    #[test]
    fn test_spectate_game_runs_to_completion() {
        let sink = MemorySink::new();
        let mut s = session(GameMode::Spectate, 2, &sink);
        for _ in 0..500 {
            if s.state().is_over() {
                break;
            }
            let step = s.run_ai_blocking();
            assert!(matches!(step, AiStep::Applied(_) | AiStep::ForcedPass));
        }
        assert!(s.state().is_over());
        assert_eq!(s.run_ai_blocking(), AiStep::NotAiTurn);
        let names = sink.names();
        assert_eq!(names.iter().filter(|n| *n == "game_over").count(), 1);
    }

    #[test]
    fn test_pumped_ai_applies_placement() {
        let sink = MemorySink::new();
        let mut s = session(GameMode::Spectate, 3, &sink);
        let mut applied = false;
        for _ in 0..10_000 {
            match s.pump_ai() {
                AiStep::Applied(AiDecision::Place(_)) => {
                    applied = true;
                    break;
                }
                AiStep::Thinking => std::thread::sleep(std::time::Duration::from_millis(1)),
                other => panic!("unexpected step {other:?}"),
            }
        }
        assert!(applied);
        assert_eq!(s.state().placement_queue().count(), 5);
    }

    #[test]
    fn test_reset_discards_running_search() {
        let sink = MemorySink::new();
        let mut s = session(GameMode::Spectate, 2, &sink);
        assert_eq!(s.pump_ai(), AiStep::Thinking);
        s.reset();
        assert!(!s.is_ai_thinking());
        assert_eq!(s.state().phase(), Phase::Placement);
        assert_eq!(s.matches_played().count, 2);
    }

    #[test]
    fn test_timeout_emits_event() {
        let sink = MemorySink::new();
        let mut s = session(GameMode::Hotseat, 2, &sink);
        for (x, y) in [(0, 0), (4, 4), (0, 4), (4, 0)] {
            s.command(Command::Place { at: Coord::new(x, y) }).unwrap();
        }
        assert_eq!(s.tick(), Tick::Running(2));
        assert_eq!(s.tick(), Tick::Running(1));
        assert_eq!(s.tick(), Tick::Expired);
        assert!(sink.names().contains(&"turn_timeout".to_string()));
        assert_eq!(s.state().current_player(), crate::game::PlayerId::Blue);
    }

    /// Three AI seats with Red's only piece boxed into the top-left corner.
    fn boxed_red_session(sink: &MemorySink) -> Session {
        let mut s = session(GameMode::Spectate, 3, sink);
        let mut board = Board::new(5).unwrap();
        let corner = Coord::new(0, 0);
        board.set_occupant(corner, Some(PlayerId::Red)).unwrap();
        board.set_occupant(Coord::new(2, 2), Some(PlayerId::Blue)).unwrap();
        board.set_occupant(Coord::new(4, 4), Some(PlayerId::Green)).unwrap();
        board.set_wall(corner, Side::Right, PlayerId::Blue).unwrap();
        board.set_wall(corner, Side::Bottom, PlayerId::Green).unwrap();

        let roster = s.state.roster().clone();
        s.state = GameState::from_board(roster, board, 3).unwrap();
        s
    }

    #[test]
    fn test_ai_without_moves_forces_pass() {
        let sink = MemorySink::new();
        let mut s = boxed_red_session(&sink);
        let walls = s.state().board().wall_sides();

        assert_eq!(s.run_ai_blocking(), AiStep::ForcedPass);
        assert_eq!(s.state().current_player(), PlayerId::Blue);
        assert_eq!(s.state().phase(), Phase::ActionSelect);
        assert_eq!(s.state().turn(), 1);
        assert_eq!(s.state().board().wall_sides(), walls);
        assert!(sink.names().contains(&"ai_forced_pass".to_string()));
    }

    #[test]
    fn test_pumped_ai_without_moves_forces_pass() {
        let sink = MemorySink::new();
        let mut s = boxed_red_session(&sink);

        let mut step = s.pump_ai();
        for _ in 0..10_000 {
            if step != AiStep::Thinking {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(1));
            step = s.pump_ai();
        }
        assert_eq!(step, AiStep::ForcedPass);
        assert_eq!(s.state().current_player(), PlayerId::Blue);
        assert_eq!(
            sink.names().iter().filter(|n| *n == "ai_forced_pass").count(),
            1
        );
    }

    #[test]
    fn test_result_for_old_position_is_discarded() {
        let sink = MemorySink::new();
        let mut s = session(GameMode::Spectate, 2, &sink);
        assert_eq!(s.pump_ai(), AiStep::Thinking);

        // The position moves on while the search is still out.
        s.state.place_piece(Coord::new(2, 2)).unwrap();
        let moved_on = s.state().clone();

        let mut step = s.pump_ai();
        for _ in 0..10_000 {
            if step != AiStep::Thinking {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(1));
            step = s.pump_ai();
        }
        assert_eq!(step, AiStep::Discarded);
        assert_eq!(s.state(), &moved_on);
        assert!(!s.is_ai_thinking());
    }
}
