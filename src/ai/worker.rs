//! Runs one AI search on a background thread so input handling keeps going.
//!
//! Each search is tagged with an [`AiJob`] describing the position it was
//! started from. Before a result is applied the caller compares the job with
//! the live game; a result for a position that no longer exists is dropped.

use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread::{self, JoinHandle};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::ai::{AiMove, choose_move, choose_placement};
use crate::config::AiConfig;
use crate::game::{Coord, GameState, Phase, PlayerId};

/// Identifies the position an AI search was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AiJob {
    /// Caller-maintained counter bumped on every reset.
    pub epoch: u64,
    /// Player the search is for.
    pub player: PlayerId,
    /// Phase the search is for.
    pub phase: Phase,
    /// Completed action turns at start.
    pub turn: u32,
    /// Outstanding placements at start.
    pub placements_left: usize,
    /// Turn timer generation at start; a restarted countdown means a new turn.
    pub timer_generation: u64,
}

impl AiJob {
    /// Ticket for the position `state` is in now.
    #[must_use]
    pub fn for_state(state: &GameState, epoch: u64) -> Self {
        Self {
            epoch,
            player: state.current_player(),
            phase: state.phase(),
            turn: state.turn(),
            placements_left: state.placement_queue().count(),
            timer_generation: state.timer().generation(),
        }
    }

    /// Whether a result computed for this job may still be applied to `state`.
    #[must_use]
    pub fn is_current(&self, state: &GameState, epoch: u64) -> bool {
        let now = Self::for_state(state, epoch);
        // Select and move are the same decision point for a full-turn search.
        let same_phase = self.phase == now.phase
            || (matches!(self.phase, Phase::ActionSelect | Phase::ActionMove)
                && matches!(now.phase, Phase::ActionSelect | Phase::ActionMove));
        self.epoch == now.epoch
            && self.player == now.player
            && self.turn == now.turn
            && self.placements_left == now.placements_left
            && self.timer_generation == now.timer_generation
            && same_phase
    }
}

/// What the AI decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiDecision {
    /// Put the next piece here.
    Place(Coord),
    /// Play this full turn.
    Turn(AiMove),
    /// Nothing legal; the turn must be forced to an end.
    Pass,
}

/// Compute a decision for the current player of `state` synchronously.
#[must_use]
pub fn decide(state: &GameState, config: &AiConfig, rng: &mut impl rand::Rng) -> AiDecision {
    let player = state.current_player();
    let opponents: Vec<PlayerId> =
        state.active_players().iter().copied().filter(|&p| p != player).collect();

    let decision = match state.phase() {
        Phase::Placement => {
            choose_placement(state.board(), player, &opponents, config, rng).map(AiDecision::Place)
        }
        Phase::ActionSelect | Phase::ActionMove => {
            choose_move(state.board(), player, &opponents, config, rng).map(AiDecision::Turn)
        }
        Phase::ActionWall | Phase::GameOver => None,
    };
    decision.unwrap_or(AiDecision::Pass)
}

/// Result of polling the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiPoll {
    /// No search is running.
    Idle,
    /// The search is still running.
    Thinking,
    /// The search finished.
    Ready(AiJob, AiDecision),
    /// The search thread died without answering.
    Failed(AiJob),
}

struct Pending {
    job: AiJob,
    receiver: Receiver<AiDecision>,
    handle: JoinHandle<()>,
}

/// At most one AI search in flight.
#[derive(Default)]
pub struct AiWorker {
    pending: Option<Pending>,
}

impl std::fmt::Debug for AiWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiWorker")
            .field("job", &self.pending.as_ref().map(|p| p.job))
            .finish()
    }
}

impl AiWorker {
    /// Idle worker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a search is in flight.
    #[must_use]
    pub fn is_thinking(&self) -> bool {
        self.pending.is_some()
    }

    /// The job in flight, if any.
    #[must_use]
    pub fn job(&self) -> Option<AiJob> {
        self.pending.as_ref().map(|p| p.job)
    }

    /// Start searching for `job` on a copy of `state`. Ignored if a search is already running.
    pub fn start(&mut self, job: AiJob, state: &GameState, config: AiConfig, seed: u64) {
        if self.pending.is_some() {
            return;
        }

        let snapshot = state.snapshot();
        let (sender, receiver) = channel();

        let handle = thread::spawn(move || {
            let mut rng = StdRng::seed_from_u64(seed);
            let decision = decide(&snapshot, &config, &mut rng);
            let _ = sender.send(decision);
        });

        debug!(player = %job.player, phase = ?job.phase, "ai search started");
        self.pending = Some(Pending {
            job,
            receiver,
            handle,
        });
    }

    /// Check for a finished search without blocking.
    pub fn poll(&mut self) -> AiPoll {
        let Some(pending) = &self.pending else {
            return AiPoll::Idle;
        };

        match pending.receiver.try_recv() {
            Ok(decision) => {
                let job = pending.job;
                self.reap();
                AiPoll::Ready(job, decision)
            }
            Err(TryRecvError::Empty) => AiPoll::Thinking,
            Err(TryRecvError::Disconnected) => {
                let job = pending.job;
                self.reap();
                warn!(player = %job.player, "ai search thread died");
                AiPoll::Failed(job)
            }
        }
    }

    /// Block until the running search answers.
    pub fn wait(&mut self) -> AiPoll {
        let Some(pending) = &self.pending else {
            return AiPoll::Idle;
        };
        let job = pending.job;
        let answer = pending.receiver.recv();
        self.reap();
        match answer {
            Ok(decision) => AiPoll::Ready(job, decision),
            Err(_) => {
                warn!(player = %job.player, "ai search thread died");
                AiPoll::Failed(job)
            }
        }
    }

    /// Forget the running search; its answer is never read.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(player = %pending.job.player, "ai search abandoned");
        }
    }

    fn reap(&mut self) {
        if let Some(pending) = self.pending.take() {
            // The thread has already sent or died; a panic payload is not needed.
            let _ = pending.handle.join();
        }
    }
}
