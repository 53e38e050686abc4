//! Property tests for the pure parts of the engine.
//!
//! Invariants covered:
//! - Rotation is cyclic of order four and transposes dimensions.
//! - The validator accepts exactly the placements inside the walls and above
//!   the floor on an empty grid, whatever lies above the top edge.
//! - Line clearing removes exactly the complete rows and conserves every
//!   other filled cell.
//! - Score, level and drop interval stay consistent over any clear sequence.
use proptest::prelude::*;

use blockfall::{
    is_valid_move, rotate,
    scoring::{drop_interval_ms, Session},
    test_helpers::empty_grid,
    Grid, Piece, Shape, TetrominoType,
};

fn any_shape() -> impl Strategy<Value = Shape> {
    (1usize..6, 1usize..6)
        .prop_flat_map(|(height, width)| {
            prop::collection::vec(prop::collection::vec(0u8..8, width), height)
        })
        .prop_map(|rows| Shape::from_rows(rows).expect("rectangular by construction"))
}

fn any_kind() -> impl Strategy<Value = TetrominoType> {
    prop::sample::select(TetrominoType::ALL.to_vec())
}

/// Grid with each cell filled independently; rows listed in `full_rows` are
/// forced complete.
fn any_grid() -> impl Strategy<Value = Grid> {
    (
        prop::collection::vec(prop::collection::vec(any::<bool>(), 10), 20),
        prop::collection::vec(0usize..20, 0..6),
    )
        .prop_map(|(cells, full_rows)| {
            let mut grid = empty_grid();
            for (y, row) in cells.iter().enumerate() {
                for (x, &filled) in row.iter().enumerate() {
                    if filled || full_rows.contains(&y) {
                        grid.set(x as i16, y as i16, TetrominoType::ALL[(x + y) % 7]);
                    }
                }
            }
            grid
        })
}

proptest! {
    #[test]
    fn four_rotations_are_identity(shape in any_shape()) {
        let turned = rotate(&rotate(&rotate(&rotate(&shape))));
        prop_assert_eq!(turned, shape);
    }

    #[test]
    fn rotation_transposes_dimensions(shape in any_shape()) {
        let rotated = rotate(&shape);
        prop_assert_eq!(rotated.height(), shape.width());
        prop_assert_eq!(rotated.width(), shape.height());
        prop_assert_eq!(rotated.cells().count(), shape.cells().count());
    }

    #[test]
    fn validator_matches_bounds_on_empty_grid(
        kind in any_kind(),
        turns in 0usize..4,
        x in -6i16..14,
        y in -6i16..24,
    ) {
        let grid = empty_grid();
        let mut shape = kind.shape();
        for _ in 0..turns {
            shape = rotate(&shape);
        }
        let piece = Piece::new_at(kind, x, y).with_shape(shape);

        let inside = piece
            .blocks()
            .all(|block| (0..10).contains(&block.x) && block.y < 20);
        prop_assert_eq!(is_valid_move(&grid, x, y, &piece.shape), inside);
    }

    #[test]
    fn cells_above_top_never_collide(kind in any_kind(), x in 0i16..6) {
        let mut grid = empty_grid();
        for row in 0..20 {
            blockfall::test_helpers::fill_row(&mut grid, row);
        }
        let shape = kind.shape();
        let y = -(shape.height() as i16);

        prop_assert!(is_valid_move(&grid, x, y, &shape));
    }

    #[test]
    fn clearing_removes_only_complete_rows(mut grid in any_grid()) {
        let complete: Vec<usize> = (0..grid.height()).filter(|&y| grid.is_row_complete(y)).collect();
        let survivors: Vec<Vec<_>> = grid
            .rows()
            .iter()
            .enumerate()
            .filter(|(y, _)| !complete.contains(y))
            .map(|(_, row)| row.clone())
            .collect();
        let kept_cells = grid.total_filled_cells() - complete.len() * grid.width();

        let cleared = grid.clear_completed_rows();

        prop_assert_eq!(cleared as usize, complete.len());
        prop_assert_eq!(grid.total_filled_cells(), kept_cells);
        for y in 0..complete.len() {
            prop_assert_eq!(grid.filled_count_in_row(y), 0);
        }
        prop_assert_eq!(&grid.rows()[complete.len()..], survivors.as_slice());
    }

    #[test]
    fn session_stays_consistent(clears in prop::collection::vec(0u32..=4, 0..60)) {
        let mut session = Session::new();
        let mut expected_score = 0;

        for n in clears {
            let level_before = session.level;
            session.record_clear(n);
            expected_score += n * 100 * level_before;

            prop_assert_eq!(session.score, expected_score);
            prop_assert_eq!(session.level, session.lines / 10 + 1);
            prop_assert_eq!(session.drop_interval_ms, drop_interval_ms(session.level));
        }
    }
}
