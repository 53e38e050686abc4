//! Falling-block puzzle engine.
//!
//! The engine owns a fixed-size grid, spawns tetrominoes one at a time,
//! validates their motion, locks them on contact, clears completed rows and
//! derives score, level and drop speed from the rows cleared. Rendering,
//! input mapping and frame scheduling live outside the engine and drive it
//! through [`Game`]'s operations and read-only accessors.

pub mod collision;
pub mod config;
pub mod game;
pub mod grid;
pub mod piece;
pub mod scoring;

pub use collision::is_valid_move;
pub use config::{ConfigError, EngineConfig};
pub use game::{DropOutcome, Game, GameEvent, GameState};
pub use grid::{CellState, Grid};
pub use piece::{
    rotate, Piece, PieceFactory, PieceProvider, Position, RandomPieceProvider,
    SequencePieceProvider, Shape, TetrominoType,
};
pub use scoring::Session;

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;

    pub fn empty_grid() -> Grid {
        Grid::new(config::DEFAULT_COLS, config::DEFAULT_ROWS)
    }

    pub fn fill_row(grid: &mut Grid, y: usize) {
        for x in 0..grid.width() {
            grid.set(x as i16, y as i16, TetrominoType::T);
        }
    }

    pub fn fill_row_with_gap(grid: &mut Grid, y: usize, gap_x: usize) {
        for x in 0..grid.width() {
            if x != gap_x {
                grid.set(x as i16, y as i16, TetrominoType::T);
            }
        }
    }
}
