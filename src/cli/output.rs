//! Output formatting utilities for CLI.

// Averages over game counts; precision loss is irrelevant at these magnitudes.
#![allow(clippy::cast_precision_loss, clippy::format_push_string)]

use serde::Serialize;
use stitch::game::{Outcome, PlayerId};
use stitch::tournament::GameResult;

/// JSON-serializable game result.
#[derive(Debug, Serialize)]
pub(super) struct JsonGameResult {
    /// Random seed used.
    pub(super) seed: u64,
    /// Winner colour (null if draw).
    pub(super) winner: Option<PlayerId>,
    /// Total action turns played.
    pub(super) turns_played: u32,
    /// Whether the turn limit stopped the game.
    pub(super) truncated: bool,
    /// Per-player results.
    pub(super) players: Vec<JsonPlayerResult>,
}

/// JSON-serializable player result.
#[derive(Debug, Serialize)]
pub(super) struct JsonPlayerResult {
    /// Player colour.
    pub(super) id: PlayerId,
    /// Final territory.
    pub(super) score: u32,
    /// Largest single territory.
    pub(super) largest_territory: u32,
    /// Edges walled.
    pub(super) walls: usize,
    /// Turns ended without a move.
    pub(super) forced_passes: u32,
}

impl JsonGameResult {
    /// Create from a `GameResult`.
    pub(super) fn from_game_result(result: &GameResult) -> Self {
        Self {
            seed: result.seed,
            winner: result.winner(),
            turns_played: result.turns_played,
            truncated: result.truncated,
            players: result
                .player_stats
                .iter()
                .map(|ps| JsonPlayerResult {
                    id: ps.player,
                    score: ps.score,
                    largest_territory: ps.largest_territory,
                    walls: ps.walls,
                    forced_passes: ps.forced_passes,
                })
                .collect(),
        }
    }
}

/// Format a game result as human-readable text.
pub(super) fn format_text(result: &GameResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Game Result (seed: {})\n", result.seed));
    match result.outcome {
        Outcome::Winner(winner) => output.push_str(&format!("  Winner: {winner}\n")),
        Outcome::Draw | Outcome::Undecided => output.push_str("  Winner: Draw\n"),
    }
    output.push_str(&format!("  Turns: {}", result.turns_played));
    if result.truncated {
        output.push_str(" (turn limit)");
    }
    output.push_str("\n\n");

    for stats in &result.player_stats {
        output.push_str(&format!(
            "  {:<7} {:>3} cells (largest {}, {} walls)",
            stats.player.name(),
            stats.score,
            stats.largest_territory,
            stats.walls
        ));
        if stats.forced_passes > 0 {
            output.push_str(&format!(" [{} forced passes]", stats.forced_passes));
        }
        output.push('\n');
    }

    output
}

/// Tournament statistics for aggregated results.
#[derive(Debug, Default)]
pub(super) struct TournamentStats {
    /// Total games played.
    pub(super) games_played: u64,
    /// Win count per seat.
    pub(super) wins: Vec<u64>,
    /// Draw count.
    pub(super) draws: u64,
    /// Games stopped by the turn limit.
    pub(super) truncated: u64,
    /// Games that could not be set up.
    pub(super) failed: u64,
    /// Total score per seat.
    total_scores: Vec<f64>,
    /// Score sum of squares for std dev calculation.
    score_sq_sums: Vec<f64>,
    /// Total turns across all games.
    total_turns: u64,
}

impl TournamentStats {
    /// Create new stats for n seats.
    pub(super) fn new(num_players: usize) -> Self {
        Self {
            wins: vec![0; num_players],
            total_scores: vec![0.0; num_players],
            score_sq_sums: vec![0.0; num_players],
            ..Self::default()
        }
    }

    /// Add a game result to the stats.
    pub(super) fn add_result(&mut self, result: &GameResult) {
        self.games_played += 1;
        self.total_turns += u64::from(result.turns_played);
        if result.truncated {
            self.truncated += 1;
        }

        match result.winner() {
            Some(winner) if winner.index() < self.wins.len() => self.wins[winner.index()] += 1,
            Some(_) => {}
            None => self.draws += 1,
        }

        for (i, stats) in result.player_stats.iter().enumerate() {
            if i < self.total_scores.len() {
                let score = f64::from(stats.score);
                self.total_scores[i] += score;
                self.score_sq_sums[i] += score * score;
            }
        }
    }

    /// Count a game that failed to start.
    pub(super) fn add_failure(&mut self) {
        self.failed += 1;
    }

    /// Merge another stats object into this one.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.draws += other.draws;
        self.truncated += other.truncated;
        self.failed += other.failed;
        self.total_turns += other.total_turns;
        for (a, b) in self.wins.iter_mut().zip(&other.wins) {
            *a += b;
        }
        for (a, b) in self.total_scores.iter_mut().zip(&other.total_scores) {
            *a += b;
        }
        for (a, b) in self.score_sq_sums.iter_mut().zip(&other.score_sq_sums) {
            *a += b;
        }
    }

    /// Get win rate for a seat (0.0-1.0).
    pub(super) fn win_rate(&self, player_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.wins.get(player_idx).copied().unwrap_or(0) as f64 / self.games_played as f64
    }

    /// Get draw rate (0.0-1.0).
    pub(super) fn draw_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.draws as f64 / self.games_played as f64
    }

    /// Get average score for a seat.
    pub(super) fn avg_score(&self, player_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_scores.get(player_idx).copied().unwrap_or(0.0) / self.games_played as f64
    }

    /// Get score standard deviation for a seat.
    pub(super) fn score_std_dev(&self, player_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        let n = self.games_played as f64;
        let mean = self.avg_score(player_idx);
        let sq_sum = self.score_sq_sums.get(player_idx).copied().unwrap_or(0.0);
        let variance = (sq_sum / n) - (mean * mean);
        if variance < 0.0 { 0.0 } else { variance.sqrt() }
    }

    /// Get average game length.
    pub(super) fn avg_turns(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games_played as f64
    }
}

/// JSON-serializable tournament result.
#[derive(Debug, Serialize)]
pub(super) struct JsonTournamentResult {
    /// Total games played.
    games_played: u64,
    /// Per-seat statistics.
    players: Vec<JsonTournamentPlayer>,
    /// Number of draws.
    draws: u64,
    /// Games stopped by the turn limit.
    truncated: u64,
    /// Games that failed to start.
    failed: u64,
    /// Average game length in turns.
    avg_turns: f64,
}

/// JSON-serializable per-seat tournament stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonTournamentPlayer {
    /// Player colour.
    player: PlayerId,
    /// Number of wins.
    wins: u64,
    /// Win rate (0.0-1.0).
    win_rate: f64,
    /// Average score.
    avg_score: f64,
    /// Score standard deviation.
    score_std_dev: f64,
}

impl JsonTournamentResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &TournamentStats) -> Self {
        let players = PlayerId::ALL
            .iter()
            .take(stats.wins.len())
            .map(|&player| {
                let i = player.index();
                JsonTournamentPlayer {
                    player,
                    wins: stats.wins[i],
                    win_rate: stats.win_rate(i),
                    avg_score: stats.avg_score(i),
                    score_std_dev: stats.score_std_dev(i),
                }
            })
            .collect();

        Self {
            games_played: stats.games_played,
            players,
            draws: stats.draws,
            truncated: stats.truncated,
            failed: stats.failed,
            avg_turns: stats.avg_turns(),
        }
    }
}

/// Format tournament stats as human-readable text.
pub(super) fn format_tournament_text(stats: &TournamentStats) -> String {
    let mut output = String::new();

    output.push_str(&format!("Tournament Results ({} games)\n", stats.games_played));
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for &player in PlayerId::ALL.iter().take(stats.wins.len()) {
        let i = player.index();
        output.push_str(&format!(
            "  {:<7} {:.1}% ({} wins)\n",
            player.name(),
            stats.win_rate(i) * 100.0,
            stats.wins[i]
        ));
    }
    output.push_str(&format!(
        "  Draws:  {} ({:.1}%)\n\n",
        stats.draws,
        stats.draw_rate() * 100.0
    ));

    output.push_str("Average Territory:\n");
    for &player in PlayerId::ALL.iter().take(stats.wins.len()) {
        let i = player.index();
        output.push_str(&format!(
            "  {:<7} {:.1} (+/- {:.1})\n",
            player.name(),
            stats.avg_score(i),
            stats.score_std_dev(i)
        ));
    }

    output.push_str(&format!("\nAverage Game Length: {:.0} turns\n", stats.avg_turns()));
    if stats.truncated > 0 {
        output.push_str(&format!("Stopped at turn limit: {}\n", stats.truncated));
    }
    if stats.failed > 0 {
        output.push_str(&format!("Failed to start: {}\n", stats.failed));
    }

    output
}

/// Format tournament stats as CSV.
pub(super) fn format_tournament_csv(stats: &TournamentStats) -> String {
    let mut output = String::new();

    output.push_str("player,wins,win_rate,avg_score,score_std_dev\n");

    for &player in PlayerId::ALL.iter().take(stats.wins.len()) {
        let i = player.index();
        output.push_str(&format!(
            "{},{},{:.4},{:.2},{:.2}\n",
            player.name().to_lowercase(),
            stats.wins[i],
            stats.win_rate(i),
            stats.avg_score(i),
            stats.score_std_dev(i)
        ));
    }

    output
}
