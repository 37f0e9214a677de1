//! Game state and the turn state machine.
//!
//! ```text
//! PLACEMENT ──(queue empty)──> ACTION_SELECT ──select──> ACTION_MOVE ──move──> ACTION_WALL
//!                                   ^   <──unselect──┘                              │
//!                                   └──────────── next player <── wall / timeout ───┤
//!                                                                                   v
//!                                                                               GAME_OVER
//! ```
//!
//! Every command either applies completely or returns a [`CommandError`] and
//! leaves the state untouched.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ai::AiMove;
use crate::error::{CommandError, SetupError};
use crate::game::{
    Board, Command, Coord, PIECES_PER_PLAYER, PlayerId, Roster, ScoreBoard, Side, Tick,
    TurnTimer, is_game_over, largest_territory, reachable_area_size, valid_moves,
};

/// Smallest supported board edge.
pub const MIN_BOARD_SIZE: u16 = 3;

/// Phase of the turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Players drop their pieces in queue order.
    Placement,
    /// The current player must pick one of their pieces.
    ActionSelect,
    /// A piece is selected; waiting for its destination.
    ActionMove,
    /// The piece moved; waiting for the wall on the moved-to cell.
    ActionWall,
    /// Terminal; only reset is accepted.
    GameOver,
}

impl Phase {
    /// Whether the turn timer runs in this phase.
    #[must_use]
    pub const fn is_action(self) -> bool {
        matches!(self, Phase::ActionSelect | Phase::ActionMove | Phase::ActionWall)
    }
}

/// Terminal result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Still playing.
    Undecided,
    /// A single player won.
    Winner(PlayerId),
    /// Two or more players tied on both score and largest territory.
    Draw,
}

/// The selected piece and where it may go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Cell of the selected piece.
    pub piece: Coord,
    /// Destinations from [`valid_moves`], origin first.
    pub moves: Vec<Coord>,
}

/// Complete state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    board: Board,
    roster: Roster,
    active: Vec<PlayerId>,
    phase: Phase,
    current: PlayerId,
    scores: ScoreBoard,
    placement_queue: VecDeque<PlayerId>,
    selection: Option<Selection>,
    moved_to: Option<Coord>,
    timer: TurnTimer,
    outcome: Outcome,
    /// Completed action turns.
    turn: u32,
}

impl GameState {
    /// Start a match: empty board, every player owed two placements.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::BoardTooSmall`] if the board cannot hold all pieces.
    pub fn new(roster: Roster, board_size: u16, turn_seconds: u32) -> Result<Self, SetupError> {
        let board = Self::empty_board(board_size, roster.len())?;
        let active: Vec<PlayerId> = roster.ids().collect();
        let placement_queue: VecDeque<PlayerId> = roster.placement_queue().into();
        let current = placement_queue.front().copied().unwrap_or(PlayerId::Red);

        info!(players = active.len(), board_size, "new game");

        Ok(Self {
            board,
            scores: ScoreBoard::zeroed(active.iter().copied()),
            active,
            roster,
            phase: Phase::Placement,
            current,
            placement_queue,
            selection: None,
            moved_to: None,
            timer: TurnTimer::new(turn_seconds),
            outcome: Outcome::Undecided,
            turn: 0,
        })
    }

    /// Resume action play from an arbitrary position, first player to act.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::BoardTooSmall`] if the board is below the minimum size.
    pub fn from_board(roster: Roster, board: Board, turn_seconds: u32) -> Result<Self, SetupError> {
        if board.size() < MIN_BOARD_SIZE {
            return Err(SetupError::BoardTooSmall(board.size()));
        }
        let active: Vec<PlayerId> = roster.ids().collect();
        let current = active.first().copied().unwrap_or(PlayerId::Red);
        let mut timer = TurnTimer::new(turn_seconds);
        timer.start();

        Ok(Self {
            board,
            scores: ScoreBoard::zeroed(active.iter().copied()),
            active,
            roster,
            phase: Phase::ActionSelect,
            current,
            placement_queue: VecDeque::new(),
            selection: None,
            moved_to: None,
            timer,
            outcome: Outcome::Undecided,
            turn: 0,
        })
    }

    fn empty_board(size: u16, players: usize) -> Result<Board, SetupError> {
        let cells = usize::from(size) * usize::from(size);
        if size < MIN_BOARD_SIZE || cells < players * PIECES_PER_PLAYER {
            return Err(SetupError::BoardTooSmall(size));
        }
        Board::new(size).ok_or(SetupError::BoardTooSmall(size))
    }

    /// The board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Seats of this match.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Active players in turn order.
    #[must_use]
    pub fn active_players(&self) -> &[PlayerId] {
        &self.active
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Player whose command is expected (queue head during placement).
    #[must_use]
    pub const fn current_player(&self) -> PlayerId {
        self.current
    }

    /// Scores as of game over; zero for everyone before that.
    #[must_use]
    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    /// Reachable-area scores for the position as it stands.
    #[must_use]
    pub fn live_scores(&self) -> ScoreBoard {
        let mut scores = ScoreBoard::zeroed(self.active.iter().copied());
        for &player in &self.active {
            scores.set(player, reachable_area_size(&self.board, player));
        }
        scores
    }

    /// Outstanding placements, head first.
    pub fn placement_queue(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.placement_queue.iter().copied()
    }

    /// Current selection, if a piece is selected.
    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Cell awaiting this turn's wall.
    #[must_use]
    pub const fn moved_to(&self) -> Option<Coord> {
        self.moved_to
    }

    /// The turn countdown.
    #[must_use]
    pub const fn timer(&self) -> &TurnTimer {
        &self.timer
    }

    /// Result of the match.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Number of completed action turns.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Whether the match has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// An owned copy for presentation layers.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Dispatch a command to the matching operation.
    ///
    /// # Errors
    ///
    /// Returns the [`CommandError`] of the underlying operation; the state is unchanged.
    pub fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        let result = match command {
            Command::Place { at } => self.place_piece(at),
            Command::Select { at } => self.select_piece(at),
            Command::Move { to } => self.move_piece_to(to),
            Command::Wall { at, side } => self.place_wall(at, side),
            Command::Unselect => self.unselect(),
            Command::Reset => {
                self.reset();
                Ok(())
            }
        };
        if let Err(e) = &result {
            debug!(%command, player = %self.current, error = %e, "command rejected");
        }
        result
    }

    fn expect_phase(&self, allowed: &[Phase]) -> Result<(), CommandError> {
        if self.phase == Phase::GameOver {
            return Err(CommandError::GameOver);
        }
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(CommandError::WrongPhase(self.phase))
        }
    }

    /// Put the queue head's next piece on `at`.
    ///
    /// # Errors
    ///
    /// Rejected outside placement, off the board, or on an occupied cell.
    pub fn place_piece(&mut self, at: Coord) -> Result<(), CommandError> {
        self.expect_phase(&[Phase::Placement])?;
        if self.board.get(at)?.occupant.is_some() {
            return Err(CommandError::Occupied(at));
        }
        let Some(player) = self.placement_queue.pop_front() else {
            return Err(CommandError::WrongPhase(self.phase));
        };

        self.board.set_occupant(at, Some(player))?;
        debug!(%player, %at, "piece placed");

        match self.placement_queue.front() {
            Some(&next) => self.current = next,
            None => {
                self.current = self.active[0];
                self.phase = Phase::ActionSelect;
                self.timer.start();
                debug!(player = %self.current, "placement complete");
            }
        }
        Ok(())
    }

    /// Select one of the current player's pieces, replacing any previous selection.
    ///
    /// # Errors
    ///
    /// Rejected outside the select/move phases or if `at` is not the current player's piece.
    pub fn select_piece(&mut self, at: Coord) -> Result<(), CommandError> {
        self.expect_phase(&[Phase::ActionSelect, Phase::ActionMove])?;
        if self.board.get(at)?.occupant != Some(self.current) {
            return Err(CommandError::NotYourPiece(at));
        }

        let moves = valid_moves(&self.board, at);
        debug!(player = %self.current, %at, moves = moves.len(), "piece selected");
        self.selection = Some(Selection { piece: at, moves });
        self.phase = Phase::ActionMove;
        Ok(())
    }

    /// Drop the selection and return to piece selection.
    ///
    /// # Errors
    ///
    /// Rejected unless a piece is selected.
    pub fn unselect(&mut self) -> Result<(), CommandError> {
        self.expect_phase(&[Phase::ActionMove])?;
        self.selection = None;
        self.phase = Phase::ActionSelect;
        Ok(())
    }

    /// Move the selected piece to `to`, one of its precomputed destinations.
    ///
    /// # Errors
    ///
    /// Rejected outside the move phase, without a selection, or for an illegal destination.
    pub fn move_piece_to(&mut self, to: Coord) -> Result<(), CommandError> {
        self.expect_phase(&[Phase::ActionMove])?;
        let Some(selection) = &self.selection else {
            return Err(CommandError::NoSelection);
        };
        if !selection.moves.contains(&to) {
            return Err(CommandError::IllegalDestination(to));
        }

        let from = selection.piece;
        if from != to {
            self.board.move_occupant(from, to)?;
        }
        debug!(player = %self.current, %from, %to, "piece moved");

        self.selection = None;
        self.moved_to = Some(to);
        self.phase = Phase::ActionWall;
        Ok(())
    }

    /// Wall `side` of the moved-to cell for the current player, then end the turn.
    ///
    /// # Errors
    ///
    /// Rejected outside the wall phase, on any other cell, or on a side that is
    /// already walled. The board edge counts as walled.
    pub fn place_wall(&mut self, at: Coord, side: Side) -> Result<(), CommandError> {
        self.expect_phase(&[Phase::ActionWall])?;
        if self.moved_to != Some(at) {
            return Err(CommandError::NotMovedTo(at));
        }
        if !self.board.is_open(at, side) {
            return Err(CommandError::SideWalled { coord: at, side });
        }

        self.board.set_wall(at, side, self.current)?;
        debug!(player = %self.current, %at, %side, "wall placed");
        self.end_turn();
        Ok(())
    }

    /// Select, move and wall in one step. Either the whole turn applies or nothing does.
    ///
    /// # Errors
    ///
    /// Returns the first rejection; the state is restored to what it was before the call.
    pub fn play_turn(&mut self, piece: Coord, to: Coord, side: Side) -> Result<(), CommandError> {
        self.expect_phase(&[Phase::ActionSelect, Phase::ActionMove])?;
        let saved = self.clone();

        let result = self
            .select_piece(piece)
            .and_then(|()| self.move_piece_to(to))
            .and_then(|()| self.place_wall(to, side));

        if result.is_err() {
            *self = saved;
        }
        result
    }

    /// Apply a full turn chosen by the AI through the ordinary command path.
    ///
    /// # Errors
    ///
    /// Same as [`GameState::play_turn`]; nothing changes on rejection.
    pub fn apply_ai_move(&mut self, ai_move: AiMove) -> Result<(), CommandError> {
        debug!(player = %self.current, %ai_move, "ai move");
        self.play_turn(ai_move.piece, ai_move.to, ai_move.side)
    }

    /// Start the match over with the same players, board size and turn length.
    pub fn reset(&mut self) {
        let turn_seconds = self.timer.duration();
        let mut board = self.board.clone();
        board.clear();

        self.board = board;
        self.placement_queue = self.roster.placement_queue().into();
        self.current = self.placement_queue.front().copied().unwrap_or(self.active[0]);
        self.phase = Phase::Placement;
        self.scores = ScoreBoard::zeroed(self.active.iter().copied());
        self.selection = None;
        self.moved_to = None;
        self.timer = TurnTimer::new(turn_seconds);
        self.outcome = Outcome::Undecided;
        self.turn = 0;
        info!("game reset");
    }

    /// Advance the turn countdown by one second.
    ///
    /// On expiry during action play the timeout fallback runs: a wall goes up
    /// automatically and the turn ends.
    pub fn tick(&mut self, rng: &mut impl Rng) -> Tick {
        if !self.phase.is_action() {
            return Tick::Idle;
        }
        let tick = self.timer.tick();
        if tick == Tick::Expired {
            warn!(player = %self.current, "turn timer expired");
            self.expire_turn(rng);
        }
        tick
    }

    /// Timeout fallback: wall a random open side for the current player, then end the turn.
    ///
    /// The wall goes on the moved-to cell if the piece already moved, otherwise
    /// on one of the current player's pieces at random. When every side of that
    /// cell is walled or on the board edge, no wall is placed. Returns the wall placed, if any.
    /// Does nothing outside action play.
    pub fn expire_turn(&mut self, rng: &mut impl Rng) -> Option<(Coord, Side)> {
        if !self.phase.is_action() {
            return None;
        }

        let target = match (self.phase, self.moved_to) {
            (Phase::ActionWall, Some(cell)) => Some(cell),
            _ => {
                let pieces: Vec<Coord> = self.board.pieces_of(self.current).collect();
                pieces.choose(rng).copied()
            }
        };

        let mut sides = Side::ALL;
        sides.shuffle(rng);

        let placed = target.and_then(|cell| {
            let side = sides.into_iter().find(|&s| self.board.is_open(cell, s))?;
            self.board.set_wall(cell, side, self.current).ok()?;
            Some((cell, side))
        });

        match placed {
            Some((cell, side)) => debug!(player = %self.current, %cell, %side, "fallback wall"),
            None => debug!(player = %self.current, "no open side for fallback wall"),
        }

        self.end_turn();
        placed
    }

    fn end_turn(&mut self) {
        self.turn += 1;
        self.selection = None;
        self.moved_to = None;

        if is_game_over(&self.board, &self.active) {
            self.finish();
            return;
        }

        self.current = self.roster.next_after(self.current);
        self.phase = Phase::ActionSelect;
        self.timer.start();
    }

    /// Score the position and end the match now.
    ///
    /// Called automatically once every player is separated; self-play also
    /// uses it to close games that hit a turn limit.
    pub fn finish(&mut self) {
        let (scores, outcome) = resolve_winner(&self.board, &self.active);
        self.scores = scores;
        self.outcome = outcome;
        self.phase = Phase::GameOver;
        self.selection = None;
        self.moved_to = None;
        self.timer.stop();

        match outcome {
            Outcome::Winner(player) => info!(%player, turns = self.turn, "game over"),
            Outcome::Draw | Outcome::Undecided => info!(turns = self.turn, "game over: draw"),
        }
    }
}

/// Score every active player and pick the winner.
///
/// Highest reachable area wins; ties go to the largest single territory among
/// the tied players; a tie there too is a draw.
#[must_use]
pub fn resolve_winner(board: &Board, active: &[PlayerId]) -> (ScoreBoard, Outcome) {
    let mut scores = ScoreBoard::zeroed(active.iter().copied());
    for &player in active {
        scores.set(player, reachable_area_size(board, player));
    }
    let outcome = decide_outcome(&scores, |player| largest_territory(board, player));
    (scores, outcome)
}

/// Winner resolution over precomputed scores with a tie-break metric.
#[must_use]
pub fn decide_outcome(scores: &ScoreBoard, tie_break: impl Fn(PlayerId) -> u32) -> Outcome {
    let Some(best) = scores.max() else {
        return Outcome::Draw;
    };
    let candidates: Vec<PlayerId> = scores
        .iter()
        .filter(|&(_, score)| score == best)
        .map(|(player, _)| player)
        .collect();

    if let [winner] = candidates.as_slice() {
        return Outcome::Winner(*winner);
    }

    let secondary: Vec<(PlayerId, u32)> = candidates.iter().map(|&p| (p, tie_break(p))).collect();
    let best_secondary = secondary.iter().map(|&(_, v)| v).max().unwrap_or(0);
    let mut leaders = secondary.iter().filter(|&&(_, v)| v == best_secondary);

    match (leaders.next(), leaders.next()) {
        (Some(&(winner, _)), None) => Outcome::Winner(winner),
        _ => Outcome::Draw,
    }
}
