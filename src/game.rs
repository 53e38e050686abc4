use tracing::{debug, info, trace};

use crate::collision::is_valid_move;
use crate::config::{ConfigError, EngineConfig};
use crate::grid::Grid;
use crate::piece::{Piece, PieceFactory, PieceProvider, Position, RandomPieceProvider};
use crate::scoring::Session;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    /// No session has been started yet.
    Idle,
    Running,
    Paused,
    /// A spawned piece had no room. Only [`Game::start_game`] leaves this state.
    GameOver,
}

/// Result of a one-row descent.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DropOutcome {
    Falling,
    Locked,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    GameStarted,
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    LevelUp(u32),
    Paused,
    Unpaused,
    GameOver,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    config: EngineConfig,
    grid: Grid,
    factory: PieceFactory,
    current_piece: Option<Piece>,
    next_piece: Option<Piece>,
    session: Session,
    state: GameState,
    last_drop_ms: Option<u64>,
    events: Vec<GameEvent>,
}

impl Game {
    /// Idle engine drawing pieces at random, seeded from `config.seed` when
    /// present.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let provider: Box<dyn PieceProvider> = match config.seed {
            Some(seed) => Box::new(RandomPieceProvider::seeded(seed)),
            None => Box::new(RandomPieceProvider::from_entropy()),
        };
        Self::with_provider(config, provider)
    }

    pub fn with_provider(
        config: EngineConfig,
        provider: Box<dyn PieceProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            config,
            grid: Grid::new(config.cols, config.rows),
            factory: PieceFactory::new(provider, config.cols),
            current_piece: None,
            next_piece: None,
            session: Session::new(),
            state: GameState::Idle,
            last_drop_ms: None,
            events: Vec::new(),
        })
    }

    /// Running session over a prepared grid with `current_piece` already in
    /// play. The next piece is drawn from `provider`. The grid must satisfy
    /// the same bounds as [`EngineConfig::validate`].
    pub fn with_grid(
        grid: Grid,
        current_piece: Piece,
        provider: Box<dyn PieceProvider>,
    ) -> Result<Self, ConfigError> {
        let config = EngineConfig {
            cols: grid.width(),
            rows: grid.height(),
            seed: None,
        };
        config.validate()?;

        let mut factory = PieceFactory::new(provider, config.cols);
        let next_piece = factory.create();

        Ok(Self {
            config,
            grid,
            factory,
            current_piece: Some(current_piece),
            next_piece: Some(next_piece),
            session: Session::new(),
            state: GameState::Running,
            last_drop_ms: None,
            events: Vec::new(),
        })
    }

    // ------------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------------

    /// Starts a fresh session from any state: clears the grid and counters,
    /// draws the first two pieces and spawns the first of them.
    pub fn start_game(&mut self) {
        self.grid.reset();
        self.session = Session::new();
        self.state = GameState::Running;
        self.last_drop_ms = None;
        self.current_piece = None;
        self.next_piece = Some(self.factory.create());

        info!(cols = self.config.cols, rows = self.config.rows, "game started");
        self.events.push(GameEvent::GameStarted);

        self.spawn_piece();
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            GameState::Running => {
                self.state = GameState::Paused;
                self.events.push(GameEvent::Paused);
            }
            GameState::Paused => {
                self.state = GameState::Running;
                self.events.push(GameEvent::Unpaused);
            }
            GameState::Idle | GameState::GameOver => {}
        }
    }

    /// Promotes the next piece to current and draws a new next piece. Ends the
    /// session when the promoted piece does not fit where it spawned. Ignored
    /// unless the session is running.
    pub fn spawn_piece(&mut self) {
        if self.state != GameState::Running {
            return;
        }

        let piece = match self.next_piece.take() {
            Some(piece) => piece,
            None => self.factory.create(),
        };
        self.next_piece = Some(self.factory.create());

        let fits = is_valid_move(
            &self.grid,
            piece.position.x,
            piece.position.y,
            &piece.shape,
        );
        trace!(kind = ?piece.kind, x = piece.position.x, fits, "spawned piece");
        self.current_piece = Some(piece);

        if !fits {
            self.state = GameState::GameOver;
            self.events.push(GameEvent::GameOver);
            info!(
                score = self.session.score,
                level = self.session.level,
                lines = self.session.lines,
                "game over"
            );
        }
    }

    // ------------------------------------------------------------------------
    // Player actions
    // ------------------------------------------------------------------------

    pub fn move_left(&mut self) -> bool {
        self.move_piece(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.move_piece(1, 0)
    }

    /// Soft drop and gravity step in one: descends one row if possible,
    /// otherwise locks the piece. `None` when no piece is in play.
    pub fn move_down(&mut self) -> Option<DropOutcome> {
        if self.state != GameState::Running || self.current_piece.is_none() {
            return None;
        }

        if self.move_piece(0, 1) {
            Some(DropOutcome::Falling)
        } else {
            self.lock_piece();
            Some(DropOutcome::Locked)
        }
    }

    /// Rotates clockwise in place. Rotations that collide are rejected; there
    /// are no wall kicks.
    pub fn rotate_piece(&mut self) -> bool {
        if self.state != GameState::Running {
            return false;
        }
        let Some(piece) = self.current_piece.as_mut() else {
            return false;
        };

        let rotated = piece.shape.rotated();
        if !is_valid_move(&self.grid, piece.position.x, piece.position.y, &rotated) {
            return false;
        }
        piece.shape = rotated;
        self.events.push(GameEvent::PieceRotated);
        true
    }

    fn move_piece(&mut self, dx: i16, dy: i16) -> bool {
        if self.state != GameState::Running {
            return false;
        }
        let Some(piece) = self.current_piece.as_mut() else {
            return false;
        };

        let target = Position {
            x: piece.position.x + dx,
            y: piece.position.y + dy,
        };
        if !is_valid_move(&self.grid, target.x, target.y, &piece.shape) {
            return false;
        }
        piece.position = target;
        self.events.push(GameEvent::PieceMoved);
        true
    }

    // ------------------------------------------------------------------------
    // Locking and line clears
    // ------------------------------------------------------------------------

    /// Merges the current piece into the grid, clears completed rows, credits
    /// the session and spawns the next piece.
    pub fn lock_piece(&mut self) {
        if self.state != GameState::Running {
            return;
        }
        let Some(piece) = self.current_piece.take() else {
            return;
        };

        for block in piece.blocks() {
            self.grid.set(block.x, block.y, piece.kind);
        }
        debug!(
            kind = ?piece.kind,
            x = piece.position.x,
            y = piece.position.y,
            "piece locked"
        );
        self.events.push(GameEvent::PieceLocked);

        let cleared = self.grid.clear_completed_rows();
        self.record_clear(cleared);

        self.spawn_piece();
    }

    fn record_clear(&mut self, cleared: u32) {
        if cleared == 0 {
            return;
        }

        let level_up = self.session.record_clear(cleared);
        debug!(cleared, score = self.session.score, "lines cleared");
        self.events.push(GameEvent::LinesCleared(cleared));

        if let Some(level) = level_up {
            info!(
                level,
                drop_interval_ms = self.session.drop_interval_ms,
                "level up"
            );
            self.events.push(GameEvent::LevelUp(level));
        }
    }

    // ------------------------------------------------------------------------
    // Timing
    // ------------------------------------------------------------------------

    /// Frame callback. While running, drops the piece one row once more than
    /// the drop interval has passed since the previous drop. The first tick
    /// of a session only records its timestamp.
    pub fn tick(&mut self, now_ms: u64) {
        if self.state != GameState::Running {
            return;
        }

        let last_drop = *self.last_drop_ms.get_or_insert(now_ms);
        if now_ms.saturating_sub(last_drop) > self.session.drop_interval_ms {
            self.move_down();
            self.last_drop_ms = Some(now_ms);
        }
    }

    // ------------------------------------------------------------------------
    // Read-only view
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn current_piece(&self) -> Option<&Piece> {
        self.current_piece.as_ref()
    }

    pub fn next_piece(&self) -> Option<&Piece> {
        self.next_piece.as_ref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    pub fn level(&self) -> u32 {
        self.session.level
    }

    pub fn lines(&self) -> u32 {
        self.session.lines
    }

    pub fn drop_interval_ms(&self) -> u64 {
        self.session.drop_interval_ms
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == GameState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == GameState::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
