use crate::grid::Grid;
use crate::piece::Shape;

/// Whether `shape` anchored at `(x, y)` fits inside `grid`.
///
/// Every non-empty cell must lie between the side walls and above the floor,
/// and must not overlap an occupied grid cell. Cells above the top edge
/// (`y < 0`) are only checked against the walls.
pub fn is_valid_move(grid: &Grid, x: i16, y: i16, shape: &Shape) -> bool {
    let width = grid.width() as i16;
    let height = grid.height() as i16;

    shape.cells().all(|(col, row, _)| {
        let (cx, cy) = (x + col, y + row);
        if cx < 0 || cx >= width || cy >= height {
            return false;
        }
        cy < 0 || !grid.occupied(cx, cy)
    })
}
