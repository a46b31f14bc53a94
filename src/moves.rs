//! Swap legality and move availability.
//!
//! [`can_make_move`] is the authoritative stalemate test: it recognises the
//! eight three-gem shapes in [`ONE_OFF_PATTERNS`] (and their transposes)
//! without simulating any swap. [`find_matching_swap`] answers the same
//! question by brute force and also says which swap works.

use crate::constants::ONE_OFF_PATTERNS;
use crate::error::SwapError;
use crate::grid::{Cell, Coord, GemKind, Grid};
use crate::matcher::find_matches;
use crate::piece::{Direction, Piece, Position};

/// Whether `a` and `b` are orthogonal neighbors (Euclidean distance 1).
///
/// # Errors
/// `SwapError::SameCell` when `a == b`; a cell is never its own neighbor.
pub fn are_adjacent(a: Coord, b: Coord) -> Result<bool, SwapError> {
    if a == b {
        return Err(SwapError::SameCell(a));
    }
    let dc = a.col.abs_diff(b.col);
    let dr = a.row.abs_diff(b.row);
    Ok(dc * dc + dr * dr <= 1)
}

/// Build the two moving pieces for swapping the gems at `a` and `b`, each
/// heading toward the other's cell. The grid is not modified.
///
/// # Errors
/// - `SwapError::SameCell` if `a == b`
/// - `SwapError::NotAdjacent` if the cells are not orthogonal neighbors
/// - `SwapError::OffBoard` / `SwapError::EmptyCell` if either cell has no gem
pub fn swap_pieces(grid: &Grid, a: Coord, b: Coord) -> Result<(Piece, Piece), SwapError> {
    if !are_adjacent(a, b)? {
        return Err(SwapError::NotAdjacent(a, b));
    }
    let kind_a = gem_for_swap(grid, a)?;
    let kind_b = gem_for_swap(grid, b)?;

    let toward_b = if b.col > a.col {
        Direction::Right
    } else if b.col < a.col {
        Direction::Left
    } else if b.row > a.row {
        Direction::Down
    } else {
        Direction::Up
    };

    Ok((
        Piece::new(kind_a, Position::OnBoard(a), toward_b),
        Piece::new(kind_b, Position::OnBoard(b), toward_b.opposite()),
    ))
}

fn gem_for_swap(grid: &Grid, at: Coord) -> Result<GemKind, SwapError> {
    match grid.at(at) {
        None => Err(SwapError::OffBoard(at)),
        Some(Cell::Empty) => Err(SwapError::EmptyCell(at)),
        Some(Cell::Gem(kind)) => Ok(kind),
    }
}

/// Whether any swap on `grid` would form a match.
///
/// Returns on the first one-off shape found. Assumes a stable board (no
/// standing matches); it looks for shapes, not for existing runs.
pub fn can_make_move(grid: &Grid) -> bool {
    for c in grid.coords() {
        let (col, row) = (c.col as isize, c.row as isize);
        for pat in &ONE_OFF_PATTERNS {
            if shape_at(grid, col, row, pat, false) || shape_at(grid, col, row, pat, true) {
                return true;
            }
        }
    }
    false
}

/// Do the three cells of `pat`, offset from `(col, row)`, hold the same gem?
fn shape_at(
    grid: &Grid,
    col: isize,
    row: isize,
    pat: &[(isize, isize); 3],
    transpose: bool,
) -> bool {
    let gem = |(dc, dr): (isize, isize)| {
        let (dc, dr) = if transpose { (dr, dc) } else { (dc, dr) };
        grid.gem_at(col + dc, row + dr)
    };
    match gem(pat[0]) {
        Some(kind) => gem(pat[1]) == Some(kind) && gem(pat[2]) == Some(kind),
        None => false,
    }
}

/// First adjacent swap, in raster order, after which the grid holds a match.
///
/// Tries every pair of neighboring gems on a scratch copy.
pub fn find_matching_swap(grid: &Grid) -> Option<(Coord, Coord)> {
    let mut scratch = grid.clone();
    for a in grid.coords() {
        for (dc, dr) in [(1, 0), (0, 1)] {
            let Some(b) = a.offset(dc, dr).filter(|b| grid.contains(*b)) else {
                continue;
            };
            let (ca, cb) = (grid.at(a), grid.at(b));
            if ca == cb || ca.is_none_or(Cell::is_empty) || cb.is_none_or(Cell::is_empty) {
                continue;
            }
            scratch.swap(a, b);
            let matched = !find_matches(&scratch).is_empty();
            scratch.swap(a, b);
            if matched {
                return Some((a, b));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(text: &str) -> Grid {
        text.parse().unwrap()
    }

    #[test]
    fn test_are_adjacent() {
        let a = Coord::new(0, 0);
        assert_eq!(are_adjacent(a, Coord::new(0, 1)), Ok(true));
        assert_eq!(are_adjacent(a, Coord::new(1, 0)), Ok(true));
        assert_eq!(are_adjacent(Coord::new(0, 1), a), Ok(true));
        assert_eq!(are_adjacent(a, Coord::new(1, 1)), Ok(false));
        assert_eq!(are_adjacent(a, Coord::new(0, 2)), Ok(false));
        assert_eq!(are_adjacent(Coord::new(1, 1), Coord::new(1, 5)), Ok(false));
    }

    #[test]
    fn test_same_cell_is_invalid() {
        let a = Coord::new(3, 3);
        assert_eq!(are_adjacent(a, a), Err(SwapError::SameCell(a)));
    }

    #[test]
    fn test_swap_directions() {
        let g = grid("0 1\n2 3");
        let (first, second) = swap_pieces(&g, Coord::new(0, 0), Coord::new(1, 0)).unwrap();
        assert_eq!((first.direction, second.direction), (Direction::Right, Direction::Left));
        assert_eq!((first.kind, second.kind), (GemKind(0), GemKind(1)));

        let (first, second) = swap_pieces(&g, Coord::new(1, 0), Coord::new(0, 0)).unwrap();
        assert_eq!((first.direction, second.direction), (Direction::Left, Direction::Right));

        let (first, second) = swap_pieces(&g, Coord::new(0, 1), Coord::new(0, 0)).unwrap();
        assert_eq!((first.direction, second.direction), (Direction::Up, Direction::Down));

        let (first, second) = swap_pieces(&g, Coord::new(0, 0), Coord::new(0, 1)).unwrap();
        assert_eq!((first.direction, second.direction), (Direction::Down, Direction::Up));
    }

    #[test]
    fn test_swap_pieces_errors() {
        let g = grid("0 1 .\n2 3 4");
        let a = Coord::new(0, 0);
        assert_eq!(swap_pieces(&g, a, a), Err(SwapError::SameCell(a)));
        assert_eq!(
            swap_pieces(&g, a, Coord::new(1, 1)),
            Err(SwapError::NotAdjacent(a, Coord::new(1, 1)))
        );
        assert_eq!(
            swap_pieces(&g, Coord::new(1, 0), Coord::new(2, 0)),
            Err(SwapError::EmptyCell(Coord::new(2, 0)))
        );
        assert_eq!(
            swap_pieces(&g, Coord::new(2, 1), Coord::new(3, 1)),
            Err(SwapError::OffBoard(Coord::new(3, 1)))
        );
    }

    #[test]
    fn test_can_make_move_each_shape() {
        // One board per shape, each holding only that shape's gems as kind 9.
        let boards = [
            "0 9 9 1\n9 2 3 4\n5 6 7 8",     // gem below the left end
            "0 1 9 2\n9 9 3 4\n5 6 7 8",     // gem above the right end
            "9 0 9 1\n2 9 3 4\n5 6 7 8",     // gem below the gap
            "0 9 1 2\n9 3 9 4\n5 6 7 8",     // gem above the gap
            "9 9 0 1\n2 3 9 4\n5 6 7 8",     // gem below the right end
            "9 0 1 2\n3 9 9 4\n5 6 7 8",     // gem above the left end
            "9 0 9 9\n1 2 3 4\n5 6 7 8",     // slides right along the row
            "9 9 0 9\n1 2 3 4\n5 6 7 8",     // slides left along the row
        ];
        for text in boards {
            let g = grid(text);
            assert!(can_make_move(&g), "no move found in\n{g}");
            assert!(find_matching_swap(&g).is_some(), "oracle disagrees on\n{g}");

            // The same shape rotated into a column.
            let t = transpose(&g);
            assert!(can_make_move(&t), "no move found in\n{t}");
        }
    }

    #[test]
    fn test_stalemate_tiling() {
        // 2x2 tiling of four kinds: every kind sits two cells from its twins.
        let g = grid("0 1 0 1 0\n2 3 2 3 2\n0 1 0 1 0\n2 3 2 3 2\n0 1 0 1 0");
        assert!(!can_make_move(&g));
        assert_eq!(find_matching_swap(&g), None);
    }

    #[test]
    fn test_two_kind_checkerboard_has_moves() {
        let g = grid("0 1 0 1\n1 0 1 0\n0 1 0 1\n1 0 1 0");
        assert!(can_make_move(&g));
        assert!(find_matching_swap(&g).is_some());
    }

    #[test]
    fn test_empty_cells_never_form_shapes() {
        let g = grid(". . .\n. . .\n. . .");
        assert!(!can_make_move(&g));
    }

    #[test]
    fn test_find_matching_swap_reports_pair() {
        let g = grid("1 1 0 1\n2 3 4 5");
        assert_eq!(
            find_matching_swap(&g),
            Some((Coord::new(2, 0), Coord::new(3, 0)))
        );
    }

    fn transpose(g: &Grid) -> Grid {
        let mut t = Grid::new(g.height(), g.width());
        for c in g.coords() {
            t.set(c.row, c.col, g.at(c).unwrap());
        }
        t
    }
}
