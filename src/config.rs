//! Engine configuration.

use thiserror::Error;

pub const DEFAULT_COLS: usize = 10;
pub const DEFAULT_ROWS: usize = 20;

/// Narrowest playfield that still fits the horizontal I piece.
pub const MIN_DIMENSION: usize = 4;
pub const MAX_DIMENSION: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid width {0} is outside {min}..={max}", min = MIN_DIMENSION, max = MAX_DIMENSION)]
    ColsOutOfRange(usize),
    #[error("grid height {0} is outside {min}..={max}", min = MIN_DIMENSION, max = MAX_DIMENSION)]
    RowsOutOfRange(usize),
}

/// Settings fixed for the lifetime of a [`Game`](crate::Game).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub cols: usize,
    pub rows: usize,
    /// Seed for piece selection; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&self.cols) {
            return Err(ConfigError::ColsOutOfRange(self.cols));
        }
        if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&self.rows) {
            return Err(ConfigError::RowsOutOfRange(self.rows));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            seed: None,
        }
    }
}
