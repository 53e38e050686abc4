use crate::piece::TetrominoType;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
    #[default]
    Empty,
    Filled(TetrominoType),
}

impl CellState {
    /// Palette color id, `0` for an empty cell.
    pub fn color(self) -> u8 {
        match self {
            CellState::Empty => 0,
            CellState::Filled(kind) => kind.color(),
        }
    }

    pub fn is_filled(self) -> bool {
        self != CellState::Empty
    }
}

/// Fixed-size occupancy matrix, row 0 at the top.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    rows: Vec<Vec<CellState>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: vec![vec![CellState::Empty; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn reset(&mut self) {
        for row in &mut self.rows {
            row.fill(CellState::Empty);
        }
    }

    pub fn rows(&self) -> &[Vec<CellState>] {
        &self.rows
    }

    /// Cell at `(x, y)`, or `None` outside the grid.
    pub fn cell(&self, x: i16, y: i16) -> Option<CellState> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        self.rows.get(y)?.get(x).copied()
    }

    pub fn occupied(&self, x: i16, y: i16) -> bool {
        self.cell(x, y).is_some_and(CellState::is_filled)
    }

    /// Writes `kind` into `(x, y)`. Writes outside the grid are dropped, so a
    /// piece that locks while sticking out of the top only leaves its visible
    /// cells behind.
    pub fn set(&mut self, x: i16, y: i16, kind: TetrominoType) {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        if let Some(cell) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = CellState::Filled(kind);
        }
    }

    /// A row with no cells is never complete.
    pub fn is_row_complete(&self, y: usize) -> bool {
        let row = &self.rows[y];
        !row.is_empty() && row.iter().all(|cell| cell.is_filled())
    }

    /// Removes every complete row, shifting the rows above it down and
    /// opening an empty row at the top. Returns the number of rows removed.
    pub fn clear_completed_rows(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = self.height;

        // Scan bottom-up. After a removal the row above has moved into `y - 1`,
        // so the index is held and the same slot is tested again.
        while y > 0 {
            if self.is_row_complete(y - 1) {
                self.rows[..y].rotate_right(1);
                self.rows[0].fill(CellState::Empty);
                cleared += 1;
            } else {
                y -= 1;
            }
        }

        cleared
    }

    /// Filled cells in row `y`.
    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.rows[y].iter().filter(|cell| cell.is_filled()).count()
    }

        pub fn total_filled_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| cell.is_filled()).count()
    }
}
