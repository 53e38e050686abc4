use std::{
    fs::File,
    io::stdout,
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, prelude::*};

use blockfall::{
    config::{DEFAULT_COLS, DEFAULT_ROWS},
    CellState, EngineConfig, Game, GameState, TetrominoType,
};

// ============================================================================
// Command Line
// ============================================================================

#[derive(Debug, Parser)]
#[command(version, about = "Falling-block puzzle in the terminal")]
struct Cli {
    #[arg(long, default_value_t = DEFAULT_COLS, help = "Grid width in cells")]
    cols: usize,

    #[arg(long, default_value_t = DEFAULT_ROWS, help = "Grid height in cells")]
    rows: usize,

    #[arg(long, help = "Seed for piece selection (random when omitted)")]
    seed: Option<u64>,

    #[arg(short = 'v', long, action = clap::ArgAction::Count, help = "Increase log verbosity (-v = WARN, -vv = INFO, -vvv = DEBUG, -vvvv = TRACE)")]
    verbose: u8,

    #[arg(long, help = "Write logs to this file; logging is off without it")]
    log_file: Option<PathBuf>,
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;

    let level = match cli.verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(level)
        .init();
    Ok(())
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";
const FRAME: Duration = Duration::from_millis(16);

fn tetromino_color(t: TetrominoType) -> Color {
    match t {
        TetrominoType::I => Color::Cyan,
        TetrominoType::O => Color::Yellow,
        TetrominoType::T => Color::Magenta,
        TetrominoType::S => Color::Green,
        TetrominoType::Z => Color::Red,
        TetrominoType::J => Color::Blue,
        TetrominoType::L => Color::Rgb(255, 165, 0),
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game) {
    let area = frame.size();

    render_game(frame, game, area);
    match game.state() {
        GameState::Running => {}
        GameState::Idle => render_idle(frame, area),
        GameState::Paused => render_paused(frame, area),
        GameState::GameOver => render_game_over(frame, game, area),
    }
}

fn render_game(frame: &mut Frame, game: &Game, area: Rect) {
    let grid = game.grid();
    let grid_display_width = (grid.width() as u16 * CELL_WIDTH) + 2;
    let grid_display_height = grid.height() as u16 + 2;
    let side_width = 14;
    let total_width = grid_display_width + side_width;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Side panel]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(side_width),
    ])
    .split(game_row);

    // Side panel: [Preview][Info]
    let side = Layout::vertical([Constraint::Length(6), Constraint::Fill(1)]).split(horizontal[1]);

    render_grid(frame, game, horizontal[0]);
    render_preview(frame, game, side[0]);
    render_info(frame, game, side[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→: Move | ↓: Drop | ↑/Space: Rotate | P: Pause | S: Start | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

/// Locked cells with the falling piece drawn over them.
fn visible_cells(game: &Game) -> Vec<Vec<CellState>> {
    let mut cells = game.grid().rows().to_vec();

    if let Some(piece) = game.current_piece() {
        for block in piece.blocks() {
            let (Ok(x), Ok(y)) = (usize::try_from(block.x), usize::try_from(block.y)) else {
                continue;
            };
            if let Some(cell) = cells.get_mut(y).and_then(|row| row.get_mut(x)) {
                *cell = CellState::Filled(piece.kind);
            }
        }
    }

    cells
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blockfall ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = visible_cells(game)
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match cell {
                    CellState::Empty => Span::raw(EMPTY_CHAR),
                    CellState::Filled(kind) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(tetromino_color(*kind)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_preview(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(next) = game.next_piece() else {
        return;
    };
    let style = Style::default().fg(tetromino_color(next.kind));

    let mut lines: Vec<Line> = vec![Line::from("")];
    for row in next.shape.rows() {
        let mut spans: Vec<Span> = vec![Span::raw(" ")];
        spans.extend(row.iter().map(|&color| {
            if color == 0 {
                Span::raw(EMPTY_CHAR)
            } else {
                Span::styled(BLOCK_CHAR, style)
            }
        }));
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score())),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", game.lines())),
        Line::from(""),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", game.level())),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_popup(frame: &mut Frame, area: Rect, title: &str, text: Vec<Line>) {
    let height = text.len() as u16 + 2;
    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "))
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(paragraph, centered_rect(24, height, area));
}

fn render_idle(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("BLOCKFALL", Style::default().fg(Color::Cyan))),
        Line::from(""),
        Line::from(Span::styled(
            "Press S to start",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render_popup(frame, area, "Ready", text);
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score())),
        Line::from(format!("Lines: {}", game.lines())),
        Line::from(format!("Level: {}", game.level())),
        Line::from(""),
        Line::from(Span::styled(
            "S to restart, ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render_popup(frame, area, "Game Over", text);
}

fn render_paused(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "Press P to continue",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render_popup(frame, area, "Paused", text);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Input
// ============================================================================

/// Applies one key press. Returns `false` when the player asked to quit.
fn dispatch_key(game: &mut Game, code: KeyCode) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return false,
        KeyCode::Char('p') | KeyCode::Char('P') => game.toggle_pause(),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Enter
            if matches!(game.state(), GameState::Idle | GameState::GameOver) =>
        {
            game.start_game();
        }
        // Movement is only dispatched while a piece is in play
        _ if game.is_running() => match code {
            KeyCode::Left => {
                game.move_left();
            }
            KeyCode::Right => {
                game.move_right();
            }
            KeyCode::Down => {
                game.move_down();
            }
            KeyCode::Up | KeyCode::Char(' ') => {
                game.rotate_piece();
            }
            _ => {}
        },
        _ => {}
    }
    true
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    game: &mut Game,
) -> anyhow::Result<()> {
    let clock = Instant::now();

    loop {
        terminal.draw(|frame| render(frame, game))?;

        if event::poll(FRAME)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !dispatch_key(game, key.code) {
                    return Ok(());
                }
            }
        }

        let now_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        game.tick(now_ms);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = EngineConfig {
        cols: cli.cols,
        rows: cli.rows,
        seed: cli.seed,
    };
    let mut game = Game::new(config).context("invalid grid configuration")?;
    info!(?config, "engine ready");

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run(&mut terminal, &mut game);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}
