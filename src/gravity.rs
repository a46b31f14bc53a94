//! Gravity settling and refill generation.
//!
//! Gems fall toward the bottom row (`height - 1`), keeping their order within
//! a column. Vacated cells at the top are refilled with new gems chosen so that
//! a fresh gem never lands next to a gem of its own kind.
//!
//! Two ways to get the settled board:
//! - [`fill`] jumps straight to the final grid.
//! - [`Refill`] advances one row per [`Refill::step`], reporting the pieces in
//!   flight so a renderer can animate each step.
//!
//! Both consume the RNG only while building the [`DropSlots`], so the same seed
//! gives the same final grid either way.

use std::collections::VecDeque;

use fastrand::Rng;
use tracing::trace;

use crate::constants::NEIGHBOR_OFFSETS;
use crate::grid::{Cell, Coord, GemKind, Grid};
use crate::piece::{Direction, Piece, Position, apply_moves};

/// Compact every column so no empty cell sits below a gem.
pub fn settle(grid: &mut Grid) {
    let height = grid.height();
    for col in 0..grid.width() {
        let gems: Vec<Cell> = (0..height)
            .filter_map(|row| grid.get(col, row))
            .filter(|c| !c.is_empty())
            .collect();
        let gap = height - gems.len();
        for row in 0..gap {
            grid.set(col, row, Cell::Empty);
        }
        for (i, cell) in gems.into_iter().enumerate() {
            grid.set(col, gap + i, cell);
        }
    }
}

/// Settled copy of `grid`.
pub fn settled(grid: &Grid) -> Grid {
    let mut copy = grid.clone();
    settle(&mut copy);
    copy
}

/// Gems that have an empty cell directly below them, and so must fall one
/// row. Everything stacked above a gap falls together.
pub fn falling_pieces(grid: &Grid) -> Vec<Piece> {
    let mut scratch = grid.clone();
    let mut falling = Vec::new();
    for col in 0..grid.width() {
        for row in (0..grid.height().saturating_sub(1)).rev() {
            let below = scratch.get(col, row + 1);
            if let (Some(Cell::Empty), Some(Cell::Gem(kind))) = (below, scratch.get(col, row)) {
                falling.push(Piece::new(
                    kind,
                    Position::OnBoard(Coord::new(col, row)),
                    Direction::Down,
                ));
                scratch.set(col, row, Cell::Empty);
            }
        }
    }
    falling
}

/// Per-column queues of new gems waiting to enter the board.
///
/// The front of each queue is the next gem to land on top of the column's
/// existing stack.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DropSlots {
    slots: Vec<VecDeque<GemKind>>,
}

impl DropSlots {
    pub fn column(&self, col: usize) -> Option<&VecDeque<GemKind>> {
        self.slots.get(col)
    }

    /// Total number of gems still waiting.
    pub fn pending(&self) -> usize {
        self.slots.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(VecDeque::is_empty)
    }
}

/// Work out which new gems each column needs.
///
/// Runs on a settled scratch copy. Each empty cell is filled bottom to top,
/// excluding kinds already present in its four neighbors on the scratch grid,
/// which includes gems chosen earlier in the same pass.
///
/// # Panics
/// If `gem_kinds` is zero.
pub fn drop_slots(grid: &Grid, gem_kinds: u8, rng: &mut Rng) -> DropSlots {
    assert!(gem_kinds > 0, "refill needs at least one gem kind");
    let mut scratch = settled(grid);
    let mut slots = vec![VecDeque::new(); grid.width()];

    for (col, slot) in slots.iter_mut().enumerate() {
        for row in (0..grid.height()).rev() {
            if scratch.get(col, row) != Some(Cell::Empty) {
                continue;
            }
            let kind = pick_refill_kind(&scratch, Coord::new(col, row), gem_kinds, rng);
            scratch.set(col, row, Cell::Gem(kind));
            slot.push_back(kind);
        }
    }

    DropSlots { slots }
}

/// Choose a kind for `at`, avoiding its neighbors' kinds.
///
/// When the exclusions would leave nothing to choose from, they are dropped
/// one at a time in neighbor order (up, right, down, left) until a candidate
/// appears.
fn pick_refill_kind(grid: &Grid, at: Coord, gem_kinds: u8, rng: &mut Rng) -> GemKind {
    let mut excluded: Vec<GemKind> = Vec::with_capacity(NEIGHBOR_OFFSETS.len());
    for (dc, dr) in NEIGHBOR_OFFSETS {
        let neighbor = grid.gem_at(at.col as isize + dc, at.row as isize + dr);
        if let Some(kind) = neighbor {
            if kind.0 < gem_kinds && !excluded.contains(&kind) {
                excluded.push(kind);
            }
        }
    }

    let mut relaxed = 0;
    loop {
        let active = &excluded[relaxed..];
        let candidates: Vec<GemKind> = (0..gem_kinds)
            .map(GemKind)
            .filter(|k| !active.contains(k))
            .collect();
        if !candidates.is_empty() {
            return candidates[rng.usize(..candidates.len())];
        }
        trace!(%at, relaxed = ?excluded[relaxed], "all gem kinds excluded, relaxing");
        relaxed += 1;
    }
}

/// Fill `grid` in one jump: settle, then place every generated gem.
pub fn fill(grid: &mut Grid, gem_kinds: u8, rng: &mut Rng) {
    let slots = drop_slots(grid, gem_kinds, rng);
    settle(grid);
    for (col, slot) in slots.slots.iter().enumerate() {
        // After settling the empties are rows 0..len; the first gem lands lowest.
        for (i, kind) in slot.iter().enumerate() {
            grid.set(col, slot.len() - 1 - i, Cell::Gem(*kind));
        }
    }
}

/// Stepwise settle-and-refill, one row per step.
///
/// Each step moves every falling gem down one row and stages the next gem of
/// each non-empty drop slot above its column, entering at row 0.
#[derive(Clone, Debug)]
pub struct Refill {
    slots: DropSlots,
}

impl Refill {
    pub fn new(grid: &Grid, gem_kinds: u8, rng: &mut Rng) -> Self {
        Self {
            slots: drop_slots(grid, gem_kinds, rng),
        }
    }

    pub fn slots(&self) -> &DropSlots {
        &self.slots
    }

    pub fn is_done(&self, grid: &Grid) -> bool {
        self.slots.is_empty() && falling_pieces(grid).is_empty()
    }

    /// Advance one step on `grid` and return the pieces that moved, or `None`
    /// when nothing is left to move.
    pub fn step(&mut self, grid: &mut Grid) -> Option<Vec<Piece>> {
        let mut moving = falling_pieces(grid);

        let mut staged = Vec::new();
        for (col, slot) in self.slots.slots.iter().enumerate() {
            let Some(&kind) = slot.front() else {
                continue;
            };
            let top = Coord::new(col, 0);
            let top_free = grid.at(top) == Some(Cell::Empty)
                || moving.iter().any(|p| p.origin == Position::OnBoard(top));
            if top_free {
                staged.push(col);
                moving.push(Piece::new(kind, Position::AboveBoard { col }, Direction::Down));
            }
        }

        if moving.is_empty() {
            return None;
        }

        apply_moves(grid, &moving);
        for col in staged {
            self.slots.slots[col].pop_front();
        }
        Some(moving)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_no_gaps(grid: &Grid) {
        for col in 0..grid.width() {
            for row in 0..grid.height() - 1 {
                let gem_above = !grid.get(col, row).unwrap().is_empty();
                let empty_below = grid.get(col, row + 1).unwrap().is_empty();
                assert!(
                    !(gem_above && empty_below),
                    "gap below ({col}, {row}) in\n{grid}"
                );
            }
        }
    }

    #[test]
    fn test_settle_keeps_column_order() {
        let mut grid: Grid = "1 .\n. 2\n3 .\n. .".parse().unwrap();
        settle(&mut grid);
        assert_eq!(grid.to_string(), ". .\n. .\n1 .\n3 2\n");
    }

    #[test]
    fn test_falling_pieces_whole_stack_above_gap() {
        let grid: Grid = "1\n2\n.\n3".parse().unwrap();
        let falling = falling_pieces(&grid);
        let origins: Vec<Position> = falling.iter().map(|p| p.origin).collect();
        assert_eq!(
            origins,
            vec![
                Position::OnBoard(Coord::new(0, 1)),
                Position::OnBoard(Coord::new(0, 0)),
            ]
        );
        assert!(falling.iter().all(|p| p.direction == Direction::Down));
    }

    #[test]
    fn test_falling_pieces_none_when_settled() {
        let grid: Grid = ". .\n1 .\n2 3".parse().unwrap();
        assert!(falling_pieces(&grid).is_empty());
    }

    #[test]
    fn test_drop_slots_count_matches_empties() {
        let grid: Grid = "1 . 2\n. . 3\n4 5 6".parse().unwrap();
        let mut rng = Rng::with_seed(7);
        let slots = drop_slots(&grid, 7, &mut rng);
        assert_eq!(slots.column(0).unwrap().len(), 1);
        assert_eq!(slots.column(1).unwrap().len(), 2);
        assert_eq!(slots.column(2).unwrap().len(), 0);
        assert_eq!(slots.pending(), 3);
    }

    #[test]
    fn test_refill_never_touches_same_kind() {
        for seed in 0..50 {
            let mut rng = Rng::with_seed(seed);
            let mut grid = Grid::new(8, 8);
            fill(&mut grid, 7, &mut rng);
            assert!(grid.is_full());
            for c in grid.coords() {
                let kind = grid.at(c).unwrap().gem().unwrap();
                for (dc, dr) in NEIGHBOR_OFFSETS {
                    let n = grid.gem_at(c.col as isize + dc, c.row as isize + dr);
                    assert_ne!(n, Some(kind), "seed {seed}: {c} touches its own kind");
                }
            }
        }
    }

    #[test]
    fn test_relaxation_with_single_kind() {
        let mut rng = Rng::with_seed(1);
        let mut grid = Grid::new(3, 3);
        fill(&mut grid, 1, &mut rng);
        assert_eq!(grid.to_string(), "0 0 0\n0 0 0\n0 0 0\n");
    }

    #[test]
    fn test_relaxation_drops_first_exclusion() {
        // Center cell: kind 1 above, kind 0 to the right, only two kinds.
        // The upper neighbor's exclusion goes first, leaving kind 1.
        let grid: Grid = "0 1 0\n0 . 0\n0 1 0".parse().unwrap();
        for seed in 0..10 {
            let mut rng = Rng::with_seed(seed);
            let kind = pick_refill_kind(&grid, Coord::new(1, 1), 2, &mut rng);
            assert_eq!(kind, GemKind(1));
        }
    }

    #[test]
    fn test_settle_is_idempotent_on_full_grid() {
        let mut rng = Rng::with_seed(11);
        let mut grid = Grid::new(6, 6);
        fill(&mut grid, 7, &mut rng);
        assert!(falling_pieces(&grid).is_empty());
        assert!(drop_slots(&grid, 7, &mut rng).is_empty());
        let mut refill = Refill::new(&grid, 7, &mut rng);
        assert!(refill.is_done(&grid));
        assert_eq!(refill.step(&mut grid), None);
    }

    #[test]
    fn test_stepping_matches_jump() {
        let start: Grid = "1 . 2 3\n. . 4 .\n5 6 . .\n2 . 1 4".parse().unwrap();
        for seed in 0..20 {
            let mut jumped = start.clone();
            fill(&mut jumped, 7, &mut Rng::with_seed(seed));

            let mut stepped = start.clone();
            let mut refill = Refill::new(&stepped, 7, &mut Rng::with_seed(seed));
            let mut steps = 0;
            while refill.step(&mut stepped).is_some() {
                steps += 1;
            }
            assert!(refill.is_done(&stepped));
            assert_eq!(stepped, jumped, "seed {seed}");
            // Deepest column has three empties: three steps to fill.
            assert_eq!(steps, 3);
        }
    }

    #[test]
    fn test_step_stages_above_board() {
        let mut grid: Grid = ".\n1".parse().unwrap();
        let mut refill = Refill::new(&grid, 7, &mut Rng::with_seed(2));
        let moved = refill.step(&mut grid).unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].origin, Position::AboveBoard { col: 0 });
        assert!(grid.is_full());
        assert_eq!(refill.step(&mut grid), None);
    }

    #[test]
    fn test_fill_leaves_no_gaps() {
        let mut grid: Grid = "1 . 2\n. 3 .\n. . 4".parse().unwrap();
        fill(&mut grid, 5, &mut Rng::with_seed(9));
        assert!(grid.is_full());
        assert_no_gaps(&grid);
        assert_eq!(grid.get(0, 2), Some(Cell::Gem(GemKind(1))));
        assert_eq!(grid.get(1, 2), Some(Cell::Gem(GemKind(3))));
        assert_eq!(grid.get(2, 1), Some(Cell::Gem(GemKind(2))));
    }
}
