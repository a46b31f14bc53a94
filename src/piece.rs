//! Moving gems, as handed to a renderer for animation.
//!
//! A [`Piece`] lives for one step: it is produced by the gravity resolver or
//! the swap logic, applied to the grid with [`apply_moves`], and dropped.

use crate::grid::{Cell, Coord, GemKind, Grid};

/// Direction a piece travels during one step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// `(dcol, drow)` for one step.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Where a piece starts its step.
///
/// `AboveBoard` is the staging row for freshly generated gems. It is one row
/// above row 0 logically, but it is never a grid index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    OnBoard(Coord),
    AboveBoard { col: usize },
}

impl Position {
    pub const fn col(self) -> usize {
        match self {
            Position::OnBoard(c) => c.col,
            Position::AboveBoard { col } => col,
        }
    }
}

/// A gem in flight for exactly one step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: GemKind,
    pub origin: Position,
    pub direction: Direction,
}

impl Piece {
    pub const fn new(kind: GemKind, origin: Position, direction: Direction) -> Self {
        Self {
            kind,
            origin,
            direction,
        }
    }

    /// Cell the piece occupies after its step. A staged piece can only enter
    /// the board downward, landing on row 0.
    pub fn destination(&self) -> Option<Coord> {
        match self.origin {
            Position::OnBoard(c) => {
                let (dc, dr) = self.direction.delta();
                c.offset(dc, dr)
            }
            Position::AboveBoard { col } => match self.direction {
                Direction::Down => Some(Coord::new(col, 0)),
                _ => None,
            },
        }
    }
}

/// Advance every piece one cell on `grid`.
///
/// Origins are vacated before destinations are written, so pieces may move
/// into cells another piece is leaving in the same step.
///
/// # Panics
/// If a destination falls off the board.
pub fn apply_moves(grid: &mut Grid, pieces: &[Piece]) {
    for piece in pieces {
        if let Position::OnBoard(c) = piece.origin {
            grid.set_at(c, Cell::Empty);
        }
    }
    for piece in pieces {
        let dest = piece
            .destination()
            .filter(|d| grid.contains(*d))
            .unwrap_or_else(|| panic!("{piece:?} moves off the board"));
        grid.set_at(dest, Cell::Gem(piece.kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_on_board() {
        let p = Piece::new(GemKind(0), Position::OnBoard(Coord::new(2, 2)), Direction::Left);
        assert_eq!(p.destination(), Some(Coord::new(1, 2)));
        let p = Piece::new(GemKind(0), Position::OnBoard(Coord::new(0, 0)), Direction::Up);
        assert_eq!(p.destination(), None);
    }

    #[test]
    fn test_destination_above_board_lands_on_top_row() {
        let p = Piece::new(GemKind(3), Position::AboveBoard { col: 4 }, Direction::Down);
        assert_eq!(p.destination(), Some(Coord::new(4, 0)));
        let sideways = Piece::new(GemKind(3), Position::AboveBoard { col: 4 }, Direction::Left);
        assert_eq!(sideways.destination(), None);
    }

    #[test]
    fn test_apply_moves_stack_falls_together() {
        let mut grid: Grid = "1\n2\n.".parse().unwrap();
        let pieces = [
            Piece::new(GemKind(2), Position::OnBoard(Coord::new(0, 1)), Direction::Down),
            Piece::new(GemKind(1), Position::OnBoard(Coord::new(0, 0)), Direction::Down),
            Piece::new(GemKind(6), Position::AboveBoard { col: 0 }, Direction::Down),
        ];
        apply_moves(&mut grid, &pieces);
        assert_eq!(grid.to_string(), "6\n1\n2\n");
    }

    #[test]
    fn test_apply_moves_swap_pair() {
        let mut grid: Grid = "1 2".parse().unwrap();
        let pieces = [
            Piece::new(GemKind(1), Position::OnBoard(Coord::new(0, 0)), Direction::Right),
            Piece::new(GemKind(2), Position::OnBoard(Coord::new(1, 0)), Direction::Left),
        ];
        apply_moves(&mut grid, &pieces);
        assert_eq!(grid.to_string(), "2 1\n");
    }

    #[test]
    fn test_opposite() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
    }
}
