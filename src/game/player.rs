//! Player identities, seats and score keeping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// Minimum number of players in a match.
pub const MIN_PLAYERS: usize = 2;

/// Maximum number of players in a match.
pub const MAX_PLAYERS: usize = 4;

/// Pieces each player places before action play begins.
pub const PIECES_PER_PLAYER: usize = 2;

/// Identity of a player. Active players are a prefix of [`PlayerId::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerId {
    /// First player.
    Red,
    /// Second player.
    Blue,
    /// Third player.
    Green,
    /// Fourth player.
    Yellow,
}

impl PlayerId {
    /// Every player identity in turn order.
    pub const ALL: [PlayerId; MAX_PLAYERS] =
        [PlayerId::Red, PlayerId::Blue, PlayerId::Green, PlayerId::Yellow];

    /// Zero-based position in [`PlayerId::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PlayerId::Red => "Red",
            PlayerId::Blue => "Blue",
            PlayerId::Green => "Green",
            PlayerId::Yellow => "Yellow",
        }
    }

    /// Single-letter tag used by text renderers.
    #[must_use]
    pub const fn initial(self) -> char {
        match self {
            PlayerId::Red => 'R',
            PlayerId::Blue => 'B',
            PlayerId::Green => 'G',
            PlayerId::Yellow => 'Y',
        }
    }

    /// The first `count` identities, or an error if `count` is out of range.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] when `count` is outside 2..=4.
    pub fn active(count: usize) -> Result<&'static [PlayerId], SetupError> {
        if count < MIN_PLAYERS {
            return Err(SetupError::TooFewPlayers(count));
        }
        if count > MAX_PLAYERS {
            return Err(SetupError::TooManyPlayers(count));
        }
        Ok(&Self::ALL[..count])
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Who drives a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    /// Commands come from a person.
    Human,
    /// Commands come from the AI search.
    Ai,
}

/// How seats are assigned at game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    /// Every seat is human.
    Hotseat,
    /// The first seat is human, the rest are AI.
    #[default]
    VersusAi,
    /// Every seat is AI.
    Spectate,
}

impl GameMode {
    /// Kind of the seat at `index` under this mode.
    #[must_use]
    pub const fn kind_for(self, index: usize) -> PlayerKind {
        match self {
            GameMode::Hotseat => PlayerKind::Human,
            GameMode::VersusAi if index == 0 => PlayerKind::Human,
            GameMode::VersusAi | GameMode::Spectate => PlayerKind::Ai,
        }
    }
}

/// A participant in the current match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Player identity.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Who issues this seat's commands.
    pub kind: PlayerKind,
}

/// Ordered, fixed-at-start sequence of seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    mode: GameMode,
    seats: Vec<Seat>,
}

impl Roster {
    /// Build the seats for `count` players; missing names fall back to colour names.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if `count` is out of range or more names than seats are given.
    pub fn new(mode: GameMode, count: usize, names: &[String]) -> Result<Self, SetupError> {
        let ids = PlayerId::active(count)?;
        if names.len() > count {
            return Err(SetupError::NameCount {
                names: names.len(),
                players: count,
            });
        }

        let seats = ids
            .iter()
            .enumerate()
            .map(|(i, &id)| Seat {
                id,
                name: names
                    .get(i)
                    .filter(|n| !n.trim().is_empty())
                    .cloned()
                    .unwrap_or_else(|| id.name().to_string()),
                kind: mode.kind_for(i),
            })
            .collect();

        Ok(Self { mode, seats })
    }

    /// Mode the roster was built with.
    #[must_use]
    pub const fn mode(&self) -> GameMode {
        self.mode
    }

    /// All seats in turn order.
    #[must_use]
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Active player identities in turn order.
    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.seats.iter().map(|s| s.id)
    }

    /// Number of active players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// Whether the roster has no seats (never true for a built roster).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Seat for `id`, if that player is active.
    #[must_use]
    pub fn seat(&self, id: PlayerId) -> Option<&Seat> {
        self.seats.iter().find(|s| s.id == id)
    }

    /// Whether `id` is driven by the AI.
    #[must_use]
    pub fn is_ai(&self, id: PlayerId) -> bool {
        self.seat(id).is_some_and(|s| s.kind == PlayerKind::Ai)
    }

    /// Whether `id` takes part in this match.
    #[must_use]
    pub fn contains(&self, id: PlayerId) -> bool {
        self.seat(id).is_some()
    }

    /// The player after `id` in the rotation.
    #[must_use]
    pub fn next_after(&self, id: PlayerId) -> PlayerId {
        let pos = self.seats.iter().position(|s| s.id == id).unwrap_or(0);
        self.seats[(pos + 1) % self.seats.len()].id
    }

    /// Initial placement obligations: every player twice, round-robin.
    #[must_use]
    pub fn placement_queue(&self) -> Vec<PlayerId> {
        (0..PIECES_PER_PLAYER).flat_map(|_| self.ids()).collect()
    }

    /// Every active player other than `id`.
    #[must_use]
    pub fn opponents_of(&self, id: PlayerId) -> Vec<PlayerId> {
        self.ids().filter(|&other| other != id).collect()
    }
}

/// Score per active player. Every active player has an entry from game start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    scores: BTreeMap<PlayerId, u32>,
}

impl ScoreBoard {
    /// A board with every listed player at zero.
    pub fn zeroed(players: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            scores: players.into_iter().map(|p| (p, 0)).collect(),
        }
    }

    /// Score of `player` (zero for players not in the match).
    #[must_use]
    pub fn get(&self, player: PlayerId) -> u32 {
        self.scores.get(&player).copied().unwrap_or(0)
    }

    /// Overwrite the score of `player`.
    pub fn set(&mut self, player: PlayerId, score: u32) {
        self.scores.insert(player, score);
    }

    /// Iterate over `(player, score)` in turn order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, u32)> + '_ {
        self.scores.iter().map(|(&p, &s)| (p, s))
    }

    /// Highest score on the board.
    #[must_use]
    pub fn max(&self) -> Option<u32> {
        self.scores.values().copied().max()
    }
}
