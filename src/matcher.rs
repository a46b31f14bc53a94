//! Match detection.
//!
//! A match is a straight run of three or more gems of one kind. The detector
//! scans in raster order and, at each gem, looks for a run starting there
//! going right and one going down. A run is extended as far as it goes and
//! reported once as a single [`MatchGroup`]. Cells already claimed by a run
//! are not reused as the start of a shorter run on the same axis, but a cell
//! can belong to one horizontal and one vertical group.

use crate::constants::MIN_MATCH_LEN;
use crate::grid::{Cell, Coord, GemKind, Grid};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    const fn step(self) -> (isize, isize) {
        match self {
            Axis::Horizontal => (1, 0),
            Axis::Vertical => (0, 1),
        }
    }
}

/// One run of matching gems, cells ordered left to right or top to bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchGroup {
    kind: GemKind,
    axis: Axis,
    cells: Vec<Coord>,
}

impl MatchGroup {
    pub fn kind(&self) -> GemKind {
        self.kind
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Last cell of the run; where a points annotation is shown.
    pub fn anchor(&self) -> Coord {
        self.cells[self.cells.len() - 1]
    }

    /// Points for this group: `base` plus `per_extra` for each gem past three.
    /// Saturates at `u32::MAX`.
    pub fn points(&self, base: u32, per_extra: u32) -> u32 {
        let extra = u32::try_from(self.len().saturating_sub(MIN_MATCH_LEN)).unwrap_or(u32::MAX);
        base.saturating_add(per_extra.saturating_mul(extra))
    }
}

/// Find every match on `grid`. The grid is not modified.
pub fn find_matches(grid: &Grid) -> Vec<MatchGroup> {
    let width = grid.width();
    let mut claimed_h = vec![false; width * grid.height()];
    let mut claimed_v = vec![false; width * grid.height()];
    let mut groups = Vec::new();

    for start in grid.coords() {
        let Some(kind) = grid.at(start).and_then(Cell::gem) else {
            continue;
        };
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let claimed = match axis {
                Axis::Horizontal => &mut claimed_h,
                Axis::Vertical => &mut claimed_v,
            };
            if claimed[start.row * width + start.col] {
                continue;
            }

            let cells = run_from(grid, start, axis, kind);
            if cells.len() < MIN_MATCH_LEN {
                continue;
            }
            for c in &cells {
                claimed[c.row * width + c.col] = true;
            }
            groups.push(MatchGroup { kind, axis, cells });
        }
    }

    groups
}

/// Cells of `kind` starting at `start` and continuing along `axis`.
fn run_from(grid: &Grid, start: Coord, axis: Axis, kind: GemKind) -> Vec<Coord> {
    let (dc, dr) = axis.step();
    let mut cells = Vec::new();
    let mut cur = Some(start);
    while let Some(c) = cur {
        if grid.at(c).and_then(Cell::gem) != Some(kind) {
            break;
        }
        cells.push(c);
        cur = c.offset(dc, dr);
    }
    cells
}

/// Empty every cell covered by `groups`. Returns how many cells were cleared;
/// a cell shared by two groups counts once.
pub fn clear_matches(grid: &mut Grid, groups: &[MatchGroup]) -> usize {
    let mut cleared = 0;
    for c in groups.iter().flat_map(|g| g.cells.iter()) {
        if grid.at(*c).is_some_and(|cell| !cell.is_empty()) {
            grid.set_at(*c, Cell::Empty);
            cleared += 1;
        }
    }
    cleared
}
