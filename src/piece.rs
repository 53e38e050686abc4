use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TetrominoType {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl TetrominoType {
    /// Palette order; a kind's color id is its index here plus one.
    pub const ALL: [TetrominoType; 7] = [
        TetrominoType::I,
        TetrominoType::O,
        TetrominoType::T,
        TetrominoType::S,
        TetrominoType::Z,
        TetrominoType::J,
        TetrominoType::L,
    ];

    pub fn color(self) -> u8 {
        match self {
            TetrominoType::I => 1,
            TetrominoType::O => 2,
            TetrominoType::T => 3,
            TetrominoType::S => 4,
            TetrominoType::Z => 5,
            TetrominoType::J => 6,
            TetrominoType::L => 7,
        }
    }

    /// Inverse of [`color`](Self::color). `0` and anything past the palette
    /// map to `None`.
    pub fn from_color(color: u8) -> Option<Self> {
        Self::ALL.get(usize::from(color).checked_sub(1)?).copied()
    }

    /// Spawn-orientation layout. Every call builds a fresh matrix, so the
    /// canonical layouts can never be mutated through a piece.
    pub fn shape(self) -> Shape {
        let c = self.color();
        let rows: Vec<Vec<u8>> = match self {
            TetrominoType::I => vec![vec![c, c, c, c]],
            TetrominoType::O => vec![vec![c, c], vec![c, c]],
            TetrominoType::T => vec![vec![0, c, 0], vec![c, c, c]],
            TetrominoType::S => vec![vec![0, c, c], vec![c, c, 0]],
            TetrominoType::Z => vec![vec![c, c, 0], vec![0, c, c]],
            TetrominoType::J => vec![vec![c, 0, 0], vec![c, c, c]],
            TetrominoType::L => vec![vec![0, 0, c], vec![c, c, c]],
        };
        Shape { rows }
    }
}

/// Rectangular matrix of color ids, `0` meaning an empty cell.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Shape {
    rows: Vec<Vec<u8>>,
}

impl Shape {
    /// Returns `None` for an empty or ragged matrix.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Option<Self> {
        let width = rows.first()?.len();
        if width == 0 || rows.iter().any(|row| row.len() != width) {
            return None;
        }
        Some(Self { rows })
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// Non-empty cells as `(col, row, color)` offsets from the anchor.
    pub fn cells(&self) -> impl Iterator<Item = (i16, i16, u8)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .filter(|(_, color)| **color != 0)
                .map(move |(col, &color)| (col as i16, row as i16, color))
        })
    }

    pub fn rotated(&self) -> Shape {
        rotate(self)
    }
}

/// 90° clockwise rotation. An `R x C` input yields a `C x R` output where
/// `out[col][R - 1 - row] = in[row][col]`.
pub fn rotate(shape: &Shape) -> Shape {
    let height = shape.height();
    let width = shape.width();
    let mut rows = vec![vec![0; height]; width];

    for (row, line) in shape.rows.iter().enumerate() {
        for (col, &color) in line.iter().enumerate() {
            rows[col][height - 1 - row] = color;
        }
    }

    Shape { rows }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Piece {
    pub kind: TetrominoType,
    pub shape: Shape,
    /// Top-left corner of the shape's bounding matrix in grid coordinates.
    pub position: Position,
}

impl Piece {
    /// Piece in spawn orientation, centered horizontally on the top row of a
    /// grid `cols` wide.
    pub fn spawn(kind: TetrominoType, cols: usize) -> Self {
        let shape = kind.shape();
        let x = (cols / 2) as i16 - (shape.width() / 2) as i16;
        Self {
            kind,
            shape,
            position: Position { x, y: 0 },
        }
    }

    pub fn new_at(kind: TetrominoType, x: i16, y: i16) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            position: Position { x, y },
        }
    }

    pub fn with_shape(self, shape: Shape) -> Self {
        Self { shape, ..self }
    }

    pub fn color(&self) -> u8 {
        self.kind.color()
    }

    /// Absolute grid coordinates of every occupied cell.
    pub fn blocks(&self) -> impl Iterator<Item = Position> + '_ {
        self.shape.cells().map(move |(dx, dy, _)| Position {
            x: self.position.x + dx,
            y: self.position.y + dy,
        })
    }
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

/// Source of piece kinds. The engine draws one kind per spawn.
pub trait PieceProvider {
    fn next_piece(&mut self) -> TetrominoType;
}

/// Uniform selection over the seven kinds.
pub struct RandomPieceProvider<R = StdRng> {
    rng: R,
}

impl RandomPieceProvider<StdRng> {
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomPieceProvider<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> PieceProvider for RandomPieceProvider<R> {
    fn next_piece(&mut self) -> TetrominoType {
        TetrominoType::ALL[self.rng.gen_range(0..TetrominoType::ALL.len())]
    }
}

/// Replays a fixed list of kinds, cycling when exhausted.
pub struct SequencePieceProvider {
    pieces: Vec<TetrominoType>,
    index: usize,
}

impl SequencePieceProvider {
    /// An empty list falls back to `O` pieces.
    pub fn new(pieces: Vec<TetrominoType>) -> Self {
        let pieces = if pieces.is_empty() {
            vec![TetrominoType::O]
        } else {
            pieces
        };
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}

// ============================================================================
// Piece Factory
// ============================================================================

/// Produces spawn-ready pieces for a grid of a given width.
pub struct PieceFactory {
    provider: Box<dyn PieceProvider>,
    cols: usize,
}

impl PieceFactory {
    pub fn new(provider: Box<dyn PieceProvider>, cols: usize) -> Self {
        Self { provider, cols }
    }

    pub fn create(&mut self) -> Piece {
        Piece::spawn(self.provider.next_piece(), self.cols)
    }
}
