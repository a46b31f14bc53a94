//! The game grid: a fixed-size 2D container of gem cells.
//!
//! Coordinates are `(col, row)` with row 0 at the top. Storage is a flat
//! row-major vector; the dimensions never change after construction.
//!
//! Reads are lenient: [`Grid::get`] and [`Grid::gem_at`] return `None` off the
//! board, so neighbor scans can probe past the edges without bounds checks.
//! Writes are strict: [`Grid::set`] panics off the board.

use std::fmt;
use std::str::FromStr;

use crate::error::GridError;
use crate::piece::{Piece, Position};

/// Index of a gem kind, in `0..gem_kinds` for the configured kind count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GemKind(pub u8);

impl GemKind {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contents of one grid cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Gem(GemKind),
}

impl Cell {
    #[inline]
    pub const fn gem(self) -> Option<GemKind> {
        match self {
            Cell::Gem(kind) => Some(kind),
            Cell::Empty => None,
        }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<GemKind> for Cell {
    fn from(kind: GemKind) -> Self {
        Cell::Gem(kind)
    }
}

/// A cell address on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub col: usize,
    pub row: usize,
}

impl Coord {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Shift by a signed offset. `None` if either axis would go negative;
    /// the upper bound is the grid's business.
    pub fn offset(self, dcol: isize, drow: isize) -> Option<Coord> {
        Some(Coord {
            col: self.col.checked_add_signed(dcol)?,
            row: self.row.checked_add_signed(drow)?,
        })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// A `width x height` board of cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an empty grid.
    ///
    /// # Panics
    /// If either dimension is zero.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be non-zero");
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn idx(&self, col: usize, row: usize) -> usize {
        row * self.width + col
    }

    #[inline]
    pub fn contains(&self, coord: Coord) -> bool {
        coord.col < self.width && coord.row < self.height
    }

    /// Cell at `(col, row)`, or `None` off the board.
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<Cell> {
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(self.cells[self.idx(col, row)])
    }

    #[inline]
    pub fn at(&self, coord: Coord) -> Option<Cell> {
        self.get(coord.col, coord.row)
    }

    /// Gem at a signed position. `None` for empty cells and anything off the
    /// board, so two `None`s never count as a matching pair in scans that
    /// compare `Some` values.
    #[inline]
    pub fn gem_at(&self, col: isize, row: isize) -> Option<GemKind> {
        if col < 0 || row < 0 {
            return None;
        }
        self.get(col as usize, row as usize).and_then(Cell::gem)
    }

    /// Store `cell` at `(col, row)`.
    ///
    /// # Panics
    /// If the position is off the board. Callers index with coordinates they
    /// already derived from this grid's dimensions.
    pub fn set(&mut self, col: usize, row: usize, cell: Cell) {
        if let Err(err) = self.try_set(col, row, cell) {
            panic!("{err}");
        }
    }

    /// Checked form of [`Grid::set`].
    pub fn try_set(&mut self, col: usize, row: usize, cell: Cell) -> Result<(), GridError> {
        if col >= self.width || row >= self.height {
            return Err(GridError::OutOfBounds {
                col,
                row,
                width: self.width,
                height: self.height,
            });
        }
        let i = self.idx(col, row);
        self.cells[i] = cell;
        Ok(())
    }

    #[inline]
    pub fn set_at(&mut self, coord: Coord, cell: Cell) {
        self.set(coord.col, coord.row, cell);
    }

    /// Exchange the contents of two cells.
    ///
    /// # Panics
    /// If either coordinate is off the board.
    pub fn swap(&mut self, a: Coord, b: Coord) {
        for c in [a, b] {
            if !self.contains(c) {
                panic!(
                    "{}",
                    GridError::OutOfBounds {
                        col: c.col,
                        row: c.row,
                        width: self.width,
                        height: self.height,
                    }
                );
            }
        }
        let (ia, ib) = (self.idx(a.col, a.row), self.idx(b.col, b.row));
        self.cells.swap(ia, ib);
    }

    /// All coordinates in raster order (row by row, left to right).
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |col| Coord::new(col, row)))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }

    /// Copy of the grid with the origin cells of `pieces` cleared.
    ///
    /// This is the static background a renderer draws underneath pieces that
    /// are in flight. Pieces staged above the board have no origin cell.
    pub fn without_pieces(&self, pieces: &[Piece]) -> Grid {
        let mut copy = self.clone();
        for piece in pieces {
            if let Position::OnBoard(c) = piece.origin {
                copy.set_at(c, Cell::Empty);
            }
        }
        copy
    }
}

/// One row per line, cells separated by spaces, `.` for empty.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            for col in 0..self.width {
                if col > 0 {
                    write!(f, " ")?;
                }
                match self.cells[self.idx(col, row)] {
                    Cell::Empty => write!(f, ".")?,
                    Cell::Gem(kind) => write!(f, "{kind}")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parses the [`Display`](fmt::Display) format. Blank lines are skipped.
impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<Vec<&str>> = s
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>())
            .filter(|tokens| !tokens.is_empty())
            .collect();

        let width = rows.first().map(Vec::len).ok_or(GridError::Empty)?;
        let mut grid = Grid::new(width, rows.len());

        for (row, tokens) in rows.iter().enumerate() {
            if tokens.len() != width {
                return Err(GridError::RaggedRow {
                    row,
                    expected: width,
                    found: tokens.len(),
                });
            }
            for (col, token) in tokens.iter().enumerate() {
                let cell = if *token == "." {
                    Cell::Empty
                } else {
                    let kind = token.parse::<u8>().map_err(|_| GridError::BadToken {
                        token: token.to_string(),
                        col,
                        row,
                    })?;
                    Cell::Gem(GemKind(kind))
                };
                grid.set(col, row, cell);
            }
        }
        Ok(grid)
    }
}
