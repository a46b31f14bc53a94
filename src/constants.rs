//! Default board geometry, scoring rules, and scan patterns.
//!
//! Everything here is a default or a fixed table. Values a player may want to
//! change (board size, number of gem kinds, scoring) are also carried by
//! [`GameConfig`](crate::config::GameConfig), which starts from these.

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of columns on a standard board.
pub const BOARD_WIDTH: usize = 8;

/// Number of rows on a standard board.
pub const BOARD_HEIGHT: usize = 8;

/// Smallest board side that can hold a match.
pub const MIN_BOARD_SIDE: usize = 3;

/// Upper bound on `width * height` accepted by the config loader.
pub const MAX_BOARD_CELLS: usize = 4096;

// =============================================================================
// Gem Kinds
// =============================================================================

/// Number of distinct gem kinds on a standard board.
pub const NUM_GEM_KINDS: u8 = 7;

/// The refill rule excludes up to four neighbor kinds, so anything below five
/// can force a pre-made pair or triple.
pub const MIN_GEM_KINDS: u8 = 5;

// =============================================================================
// Matching and Scoring
// =============================================================================

/// Shortest run that counts as a match.
pub const MIN_MATCH_LEN: usize = 3;

/// Points for a plain three-gem match.
pub const MATCH_BASE_POINTS: u32 = 10;

/// Bonus for every gem beyond the third in one group.
pub const POINTS_PER_EXTRA_GEM: u32 = 10;

/// One point is deducted from a live score every this many milliseconds.
pub const SCORE_DECAY_MS: u64 = 800;

/// How many times a new session re-deals a board with no legal move.
pub const MAX_DEAL_ATTEMPTS: usize = 16;

// =============================================================================
// Neighbor Offsets
// =============================================================================

/// Orthogonal neighbor offsets as `(dcol, drow)`.
/// Order: Up, Right, Down, Left. The refill rule relaxes exclusions in this order.
pub const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

// =============================================================================
// One-Off Patterns
// =============================================================================

/// Three-cell shapes that are one swap away from a horizontal triple, as
/// `(dcol, drow)` offsets from the scan cursor. The move validator also checks
/// each shape transposed (`(drow, dcol)`), which covers vertical triples.
///
/// With `+` as the cursor, `[(0, 1), (1, 0), (2, 0)]` is
///
/// ```text
/// +BC
/// A
/// ```
///
/// where swapping `A` up completes `ABC` on the cursor row. The first six
/// shapes cover a gem stepping into a run from above or below; the last two
/// cover a gem sliding along its own line.
pub const ONE_OFF_PATTERNS: [[(isize, isize); 3]; 8] = [
    [(0, 1), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 0)],
    [(0, 0), (1, 1), (2, 0)],
    [(0, 1), (1, 0), (2, 1)],
    [(0, 0), (1, 0), (2, 1)],
    [(0, 0), (1, 1), (2, 1)],
    [(0, 0), (2, 0), (3, 0)],
    [(0, 0), (1, 0), (3, 0)],
];
