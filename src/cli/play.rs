//! Play command implementation - interactive TUI.

// Board coordinates always fit the terminal.
#![allow(clippy::cast_possible_truncation, clippy::needless_pass_by_value)]

use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{CliError, Overrides, load_config, seed_or_clock};
use stitch::counter::{FallbackCounter, LocalFileCounter};
use stitch::game::{Command, Coord, GameMode, Outcome, Phase, PlayerId, PlayerKind, Roster, Side};
use stitch::render::render_summary;
use stitch::session::Session;
use stitch::telemetry::TracingSink;

/// Execute the play command.
///
/// # Errors
///
/// Returns an error if setup fails or the terminal cannot be driven.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    mode: GameMode,
    players: usize,
    names: Vec<String>,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
    overrides: Overrides,
    counter_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref(), overrides)?;
    let roster = Roster::new(mode, players, &names)?;

    let mut counter = FallbackCounter::offline();
    if let Some(path) = counter_file {
        counter = counter.with_backend(LocalFileCounter::new(path));
    }

    let session = Session::start(
        roster,
        config,
        seed_or_clock(seed),
        Box::new(counter),
        Box::new(TracingSink),
    )?;

    run_tui(session)
}

/// App state for the TUI.
struct App {
    session: Session,
    cursor: Coord,
    message: String,
    last_tick: Instant,
}

impl App {
    fn new(session: Session) -> Self {
        let mid = session.state().board().size() / 2;
        Self {
            session,
            cursor: Coord::new(mid, mid),
            message: String::from("Arrows/hjkl move, Enter acts"),
            last_tick: Instant::now(),
        }
    }

    fn move_cursor(&mut self, side: Side) {
        let size = self.session.state().board().size();
        if let Some(next) = self.cursor.step(side, size) {
            self.cursor = next;
        }
    }

    fn send(&mut self, command: Command) {
        self.message = match self.session.command(command) {
            Ok(()) => format!("{command}"),
            Err(e) => format!("Rejected: {e}"),
        };
    }

    fn activate(&mut self) {
        let state = self.session.state();
        let cursor = self.cursor;
        let command = match state.phase() {
            Phase::Placement => Command::Place { at: cursor },
            Phase::ActionSelect => Command::Select { at: cursor },
            Phase::ActionMove if state.board().occupant(cursor) == Some(state.current_player()) => {
                if state.selection().is_some_and(|s| s.piece == cursor) {
                    Command::Move { to: cursor }
                } else {
                    Command::Select { at: cursor }
                }
            }
            Phase::ActionMove => Command::Move { to: cursor },
            Phase::ActionWall => {
                self.message = String::from("Pick a side: w/a/s/d");
                return;
            }
            Phase::GameOver => {
                self.message = String::from("Game over - press n for a new game");
                return;
            }
        };
        self.send(command);
    }

    fn wall(&mut self, side: Side) {
        match self.session.state().moved_to() {
            Some(at) => self.send(Command::Wall { at, side }),
            None => self.message = String::from("Move a piece first"),
        }
    }

    fn update(&mut self) {
        self.session.pump_ai();
        if self.last_tick.elapsed() >= Duration::from_secs(1) {
            self.last_tick = Instant::now();
            self.session.tick();
        }
    }
}

fn run_tui(session: Session) -> Result<(), CliError> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    let mut app = App::new(session);
    let result = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<(), CliError> {
    loop {
        terminal.draw(|f| ui(f, app)).map_err(|e| CliError::new(e.to_string()))?;
        app.update();

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Up | KeyCode::Char('k') => app.move_cursor(Side::Top),
                KeyCode::Down | KeyCode::Char('j') => app.move_cursor(Side::Bottom),
                KeyCode::Left | KeyCode::Char('h') => app.move_cursor(Side::Left),
                KeyCode::Right | KeyCode::Char('l') => app.move_cursor(Side::Right),
                KeyCode::Enter | KeyCode::Char(' ') => app.activate(),
                KeyCode::Char('w') => app.wall(Side::Top),
                KeyCode::Char('a') => app.wall(Side::Left),
                KeyCode::Char('s') => app.wall(Side::Bottom),
                KeyCode::Char('d') => app.wall(Side::Right),
                KeyCode::Char('u') => app.send(Command::Unselect),
                KeyCode::Char('n') => app.send(Command::Reset),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    render_board(f, main_chunks[0], app);
    render_players(f, main_chunks[1], app);
    render_footer(f, chunks[2], app);
}

fn player_color(id: PlayerId) -> Color {
    match id {
        PlayerId::Red => Color::Red,
        PlayerId::Blue => Color::Blue,
        PlayerId::Green => Color::Green,
        PlayerId::Yellow => Color::Yellow,
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let state = app.session.state();
    let status = match (state.phase(), state.outcome()) {
        (Phase::GameOver, Outcome::Winner(p)) => format!("GAME OVER - {} wins", p.name()),
        (Phase::GameOver, _) => String::from("GAME OVER - draw"),
        (Phase::Placement, _) => format!("{} places a piece", state.current_player().name()),
        (phase, _) => {
            let action = match phase {
                Phase::ActionSelect => "select a piece",
                Phase::ActionMove => "move",
                _ => "build a wall",
            };
            format!(
                "{} to {action} | {}s",
                state.current_player().name(),
                state.timer().remaining()
            )
        }
    };
    let thinking = if app.session.is_ai_thinking() { " | AI thinking..." } else { "" };

    let header = Paragraph::new(format!(" Stitch | Turn {} | {status}{thinking} ", state.turn()))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn render_board(f: &mut Frame, area: Rect, app: &App) {
    let state = app.session.state();
    let board = state.board();
    let size = board.size();
    let wall = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let walled = |coord: Coord, side: Side| !board.is_open(coord, side);

    let rule = |y: u16, side: Side| {
        let mut text = String::from("+");
        for x in 0..size {
            text.push_str(if walled(Coord::new(x, y), side) { "---+" } else { "   +" });
        }
        Line::from(Span::styled(text, wall))
    };

    let mut lines = vec![rule(0, Side::Top)];
    for y in 0..size {
        let mut spans = vec![Span::styled("|", wall)];
        for x in 0..size {
            let coord = Coord::new(x, y);
            let (text, mut style) = match board.occupant(coord) {
                Some(p) => (
                    format!(" {} ", p.initial()),
                    Style::default().fg(player_color(p)).add_modifier(Modifier::BOLD),
                ),
                None if state.selection().is_some_and(|s| s.moves.contains(&coord)) => {
                    (String::from(" * "), Style::default().fg(Color::Cyan))
                }
                None => (String::from(" . "), Style::default().fg(Color::DarkGray)),
            };
            if coord == app.cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(text, style));
            spans.push(Span::styled(if walled(coord, Side::Right) { "|" } else { " " }, wall));
        }
        lines.push(Line::from(spans));
        lines.push(rule(y, Side::Bottom));
    }

    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Board "));
    f.render_widget(widget, area);
}

fn render_players(f: &mut Frame, area: Rect, app: &App) {
    let state = app.session.state();
    let scores = if state.is_over() { state.scores().clone() } else { state.live_scores() };
    let mut lines = vec![Line::from("")];

    for seat in state.roster().seats() {
        let marker = if seat.id == state.current_player() && !state.is_over() { "> " } else { "  " };
        let kind = match seat.kind {
            PlayerKind::Human => "human",
            PlayerKind::Ai => "AI",
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(
                format!("{} ", seat.name),
                Style::default().fg(player_color(seat.id)).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("({kind})")),
        ]));
        lines.push(Line::from(format!(
            "    Territory: {}  Walls: {}",
            scores.get(seat.id),
            state.board().walls_owned_by(seat.id)
        )));
        lines.push(Line::from(""));
    }

    if state.is_over() {
        lines.extend(render_summary(state).lines().map(|l| Line::from(l.to_string())));
        lines.push(Line::from(""));
    }

    let matches = app.session.matches_played();
    lines.push(Line::from(format!("Matches played: {} ({:?})", matches.count, matches.source)));
    lines.push(Line::from(""));
    lines.push(Line::from(app.message.clone()));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Players "))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let controls = match app.session.state().phase() {
        Phase::GameOver => " [q] Quit  [n] New game ",
        Phase::ActionWall => " [w/a/s/d] Wall top/left/bottom/right  [n] New game  [q] Quit ",
        _ => " [←↑↓→/hjkl] Cursor  [Enter] Act  [u] Unselect  [n] New game  [q] Quit ",
    };
    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}
