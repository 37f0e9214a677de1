//! Per-turn countdown driven by an external one-second tick.

use serde::{Deserialize, Serialize};

/// Result of advancing the timer by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The timer is not running; nothing happened.
    Idle,
    /// Still counting; seconds left after this tick.
    Running(u32),
    /// This tick took the countdown to zero. The timer is now stopped.
    Expired,
}

/// A single countdown owned by the turn state machine.
///
/// Restarting bumps `generation`. AI job tickets record it, so a search started
/// under an earlier countdown is recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnTimer {
    duration: u32,
    remaining: u32,
    running: bool,
    generation: u64,
}

impl TurnTimer {
    /// A stopped timer that counts down from `duration` seconds when started.
    #[must_use]
    pub const fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
            running: false,
            generation: 0,
        }
    }

    /// Reset to the full duration and start counting.
    pub fn start(&mut self) {
        self.remaining = self.duration;
        self.running = true;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Stop counting. The remaining time is kept for display.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Decrement by one second and report expiry.
    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Full countdown length.
    #[must_use]
    pub const fn duration(&self) -> u32 {
        self.duration
    }

    /// Whether the countdown is active.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Incremented on every [`TurnTimer::start`].
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}
