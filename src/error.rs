use std::path::PathBuf;

use crate::grid::Coord;

/// Errors raised by checked grid access and the text grid format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("cell ({col}, {row}) is outside the {width}x{height} grid")]
    OutOfBounds {
        col: usize,
        row: usize,
        width: usize,
        height: usize,
    },

    #[error("grid text is empty")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid cell token {token:?} at ({col}, {row})")]
    BadToken {
        token: String,
        col: usize,
        row: usize,
    },
}

/// A swap request the turn controller refuses.
///
/// The turn controller recovers from every variant by deselecting; none ends a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SwapError {
    #[error("cannot swap {0} with itself")]
    SameCell(Coord),

    #[error("{0} and {1} are not adjacent")]
    NotAdjacent(Coord, Coord),

    #[error("{0} is off the board")]
    OffBoard(Coord),

    #[error("{0} holds no gem")]
    EmptyCell(Coord),
}

/// A game config that could not be read or would not make a playable board.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read game config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("game config is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unplayable game config: {0}")]
    Invalid(String),
}
