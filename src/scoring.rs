//! Score, level and gravity bookkeeping.
//!
//! Each cleared row is worth [`POINTS_PER_LINE`] times the level held
//! *before* the clear. Every [`LINES_PER_LEVEL`] rows raise the level by one,
//! and each level shortens the drop interval by [`DROP_STEP_MS`] down to
//! [`MIN_DROP_MS`].

pub const POINTS_PER_LINE: u32 = 100;
pub const LINES_PER_LEVEL: u32 = 10;

// Timing (in milliseconds)
pub const BASE_DROP_MS: u64 = 1000;
pub const DROP_STEP_MS: u64 = 100;
pub const MIN_DROP_MS: u64 = 100;

pub fn line_clear_score(lines: u32, level: u32) -> u32 {
    lines.saturating_mul(POINTS_PER_LINE).saturating_mul(level)
}

pub fn level_for_lines(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL + 1
}

pub fn drop_interval_ms(level: u32) -> u64 {
    let speed_reduction = u64::from(level.saturating_sub(1)) * DROP_STEP_MS;
    BASE_DROP_MS.saturating_sub(speed_reduction).max(MIN_DROP_MS)
}

/// Per-session counters. Reset only when a new session starts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Session {
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub drop_interval_ms: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            lines: 0,
            drop_interval_ms: BASE_DROP_MS,
        }
    }

    /// Credits `cleared` rows. Returns the new level when this clear levelled
    /// up. Counters saturate at `u32::MAX`.
    pub fn record_clear(&mut self, cleared: u32) -> Option<u32> {
        if cleared == 0 {
            return None;
        }

        self.lines = self.lines.saturating_add(cleared);
        self.score = self
            .score
            .saturating_add(line_clear_score(cleared, self.level));

        let new_level = level_for_lines(self.lines);
        if new_level > self.level {
            self.level = new_level;
            self.drop_interval_ms = drop_interval_ms(new_level);
            return Some(new_level);
        }
        None
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
