//! Computer opponent.
//!
//! The search is one ply deep: every legal full turn is tried and scored by
//! the territory differential `own - aggression * opponents`, with a small
//! random perturbation so equal candidates are not always resolved the same
//! way. [`AiWorker`] runs it off the input thread.

mod search;
mod worker;

pub use search::{AiMove, choose_move, choose_placement, evaluate};
pub use worker::{AiDecision, AiJob, AiPoll, AiWorker, decide};
