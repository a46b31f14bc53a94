//! Gemgem: the board simulation of a match-3 gem-swapping game.
//!
//! This crate holds the deterministic core of the game: grid storage,
//! gravity and refill, match detection, swap validation, and the turn
//! controller that ties them together. Rendering, input and audio stay
//! outside; a front end reads everything it needs from the turn reports.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions, scoring values and move shapes
//! - [`grid`] - Grid storage, coordinates and the text grid format
//! - [`piece`] - Moving gems and their directions
//! - [`gravity`] - Settling, falling gems and refill with drop slots
//! - [`matcher`] - Horizontal and vertical run detection
//! - [`moves`] - Adjacency, swap validation and stalemate detection
//! - [`session`] - Selection state machine, cascades and scoring
//! - [`config`] - TOML game configuration
//! - [`console`] - Line-oriented text console
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```
//! use gemgem::config::GameConfig;
//! use gemgem::moves::find_matching_swap;
//! use gemgem::session::{Selection, Session};
//!
//! // Deal a reproducible game
//! let config = GameConfig { seed: Some(7), ..GameConfig::default() };
//! let mut session = Session::new(config);
//!
//! // Play a swap that is known to match
//! let (from, to) = find_matching_swap(session.grid()).expect("dealt boards have a move");
//! if let Selection::Turn(report) = session.drag(from, to) {
//!     assert!(report.matched());
//!     assert_eq!(session.score(), report.score_delta);
//! }
//! ```

pub mod config;
pub mod console;
pub mod constants;
pub mod error;
pub mod gravity;
pub mod grid;
pub mod matcher;
pub mod moves;
pub mod piece;
pub mod session;
