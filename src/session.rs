//! Game session and turn controller.
//!
//! A [`Session`] owns the live grid and runs the selection state machine:
//!
//! ```text
//! AwaitingFirstSelection --gem--> AwaitingSecondSelection
//! AwaitingSecondSelection --not adjacent--> AwaitingFirstSelection
//! AwaitingSecondSelection --adjacent--> (resolve) --> AwaitingFirstSelection | GameOver
//! ```
//!
//! Resolving swaps the two gems. Without a match the swap is reverted. With
//! one, matched gems are cleared, the board settles and refills, and this
//! repeats until a pass finds no match. The game ends when no swap on the
//! settled board can form a match.
//!
//! Everything a renderer or audio layer needs comes back in a [`TurnReport`];
//! the session never talks to them directly.

use std::time::Duration;

use fastrand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::config::GameConfig;
use crate::constants::MAX_DEAL_ATTEMPTS;
use crate::error::{ConfigError, SwapError};
use crate::gravity::Refill;
use crate::grid::{Cell, Coord, Grid};
use crate::matcher::{MatchGroup, clear_matches, find_matches};
use crate::moves::{can_make_move, swap_pieces};
use crate::piece::Piece;

/// Where the selection state machine is.
///
/// There is no resolving state: a swap is resolved to completion inside the
/// [`Session::select`] call that completes the pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnState {
    AwaitingFirstSelection,
    AwaitingSecondSelection(Coord),
    GameOver,
}

/// Sound cue for a finished turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SoundEvent {
    BadSwap,
    Match,
}

/// Points earned by one matched group, shown at `at`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PointsAwarded {
    pub points: u32,
    pub at: Coord,
}

/// One row-step of settling.
///
/// `background` is the grid before the step with every moving gem removed;
/// draw it, then draw `pieces` sliding one cell in their directions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettleStep {
    pub background: Grid,
    pub pieces: Vec<Piece>,
}

/// One clear-and-refill pass of a matching turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cascade {
    pub groups: Vec<MatchGroup>,
    pub points: Vec<PointsAwarded>,
    pub steps: Vec<SettleStep>,
}

/// Outcome of one resolved swap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    /// The two gems as they slide toward each other. A bad swap plays this
    /// forward and then back.
    pub swap: (Piece, Piece),
    /// Grid under the swapping gems.
    pub swap_background: Grid,
    /// Empty for a bad swap.
    pub cascades: Vec<Cascade>,
    pub score_delta: u32,
    pub game_over: bool,
}

impl TurnReport {
    pub fn matched(&self) -> bool {
        !self.cascades.is_empty()
    }

    pub fn sound(&self) -> SoundEvent {
        if self.matched() {
            SoundEvent::Match
        } else {
            SoundEvent::BadSwap
        }
    }
}

/// What a selection did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Nothing happened: empty or off-board cell, or the game is over.
    Ignored,
    /// First gem picked; waiting for the second.
    Selected(Coord),
    /// The pair could not be swapped; selection was cleared.
    Deselected(SwapError),
    /// A swap was resolved.
    Turn(TurnReport),
}

/// A single game: grid, score, and selection state.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    grid: Grid,
    score: u32,
    state: TurnState,
    rng: Rng,
    decay_elapsed: Duration,
    deal_steps: Vec<SettleStep>,
}

impl Session {
    /// Start a game on a freshly dealt board.
    ///
    /// `config` is taken as valid; use [`Session::try_new`] for untrusted
    /// settings.
    ///
    /// # Panics
    /// If `config.gem_kinds` is zero.
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        let grid = Grid::new(config.width, config.height);
        let mut session = Self {
            config,
            grid,
            score: 0,
            state: TurnState::AwaitingFirstSelection,
            rng,
            decay_elapsed: Duration::ZERO,
            deal_steps: Vec::new(),
        };
        session.deal();
        session
    }

    /// Validate `config`, then start a game as [`Session::new`] does.
    pub fn try_new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Resume play on an existing grid. The config's board size is replaced
    /// by the grid's; the game is over at once if the grid has no move.
    pub fn from_grid(mut config: GameConfig, grid: Grid) -> Self {
        config.width = grid.width();
        config.height = grid.height();
        let rng = match config.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        let state = if can_make_move(&grid) {
            TurnState::AwaitingFirstSelection
        } else {
            TurnState::GameOver
        };
        Self {
            config,
            grid,
            score: 0,
            state,
            rng,
            decay_elapsed: Duration::ZERO,
            deal_steps: Vec::new(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state == TurnState::GameOver
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Steps of the most recent deal, for animating the opening drop.
    pub fn deal_steps(&self) -> &[SettleStep] {
        &self.deal_steps
    }

    /// Throw away the current game and deal a new one.
    #[instrument(skip(self), fields(score = self.score))]
    pub fn restart(&mut self) {
        self.score = 0;
        self.decay_elapsed = Duration::ZERO;
        self.deal();
        info!("session restarted");
    }

    /// Fill an empty board, re-dealing while the result has no legal move.
    fn deal(&mut self) {
        for attempt in 1..=MAX_DEAL_ATTEMPTS {
            let mut grid = Grid::new(self.config.width, self.config.height);
            let steps = settle_and_refill(&mut grid, self.config.gem_kinds, &mut self.rng);
            let playable = can_make_move(&grid);
            self.grid = grid;
            self.deal_steps = steps;
            if playable {
                self.state = TurnState::AwaitingFirstSelection;
                return;
            }
            debug!(attempt, "dealt board has no moves, re-dealing");
        }
        warn!(attempts = MAX_DEAL_ATTEMPTS, "no playable board dealt");
        self.state = TurnState::GameOver;
    }

    /// Feed one selection into the state machine.
    #[instrument(skip(self), fields(state = ?self.state))]
    pub fn select(&mut self, at: Coord) -> Selection {
        match self.state {
            TurnState::GameOver => Selection::Ignored,
            TurnState::AwaitingFirstSelection => match self.grid.at(at) {
                Some(Cell::Gem(_)) => {
                    self.state = TurnState::AwaitingSecondSelection(at);
                    Selection::Selected(at)
                }
                _ => Selection::Ignored,
            },
            TurnState::AwaitingSecondSelection(first) => {
                self.state = TurnState::AwaitingFirstSelection;
                match self.resolve_swap(first, at) {
                    Ok(report) => Selection::Turn(report),
                    Err(err) => {
                        debug!(%err, "swap rejected");
                        Selection::Deselected(err)
                    }
                }
            }
        }
    }

    /// A drag from `from` to `to`: both selections at once, replacing any
    /// pending first selection.
    pub fn drag(&mut self, from: Coord, to: Coord) -> Selection {
        if self.is_over() {
            return Selection::Ignored;
        }
        self.state = TurnState::AwaitingFirstSelection;
        match self.select(from) {
            Selection::Selected(_) => self.select(to),
            other => other,
        }
    }

    fn resolve_swap(&mut self, a: Coord, b: Coord) -> Result<TurnReport, SwapError> {
        let swap = swap_pieces(&self.grid, a, b)?;
        let swap_background = self.grid.without_pieces(&[swap.0, swap.1]);

        self.grid.swap(a, b);
        let mut groups = find_matches(&self.grid);
        if groups.is_empty() {
            self.grid.swap(a, b);
            info!(%a, %b, "bad swap");
            return Ok(TurnReport {
                swap,
                swap_background,
                cascades: Vec::new(),
                score_delta: 0,
                game_over: false,
            });
        }

        let mut cascades = Vec::new();
        let mut score_delta: u32 = 0;
        while !groups.is_empty() {
            let points: Vec<PointsAwarded> = groups
                .iter()
                .map(|g| PointsAwarded {
                    points: g.points(self.config.match_base_points, self.config.points_per_extra_gem),
                    at: g.anchor(),
                })
                .collect();
            let pass_points = points.iter().fold(0u32, |sum, p| sum.saturating_add(p.points));
            score_delta = score_delta.saturating_add(pass_points);

            let cleared = clear_matches(&mut self.grid, &groups);
            let steps = settle_and_refill(&mut self.grid, self.config.gem_kinds, &mut self.rng);
            debug!(
                groups = groups.len(),
                cleared,
                points = pass_points,
                steps = steps.len(),
                "cascade resolved"
            );
            cascades.push(Cascade {
                groups,
                points,
                steps,
            });
            groups = find_matches(&self.grid);
        }

        self.score = self.score.saturating_add(score_delta);
        let game_over = !can_make_move(&self.grid);
        if game_over {
            self.state = TurnState::GameOver;
            info!(score = self.score, "no moves left, game over");
        } else {
            info!(score_delta, cascades = cascades.len(), "matching swap");
        }

        Ok(TurnReport {
            swap,
            swap_background,
            cascades,
            score_delta,
            game_over,
        })
    }

    /// Let `elapsed` wall time pass. A live, positive score loses one point per
    /// `score_decay_ms`. Time left over once the score reaches zero is
    /// dropped, so the next points start a fresh interval. Returns the points
    /// deducted.
    pub fn tick(&mut self, elapsed: Duration) -> u32 {
        if self.is_over() || self.config.score_decay_ms == 0 {
            return 0;
        }
        if self.score == 0 {
            self.decay_elapsed = Duration::ZERO;
            return 0;
        }

        let interval = Duration::from_millis(self.config.score_decay_ms);
        self.decay_elapsed += elapsed;
        let mut deducted = 0;
        while self.decay_elapsed >= interval && self.score > 0 {
            self.decay_elapsed -= interval;
            self.score -= 1;
            deducted += 1;
        }
        if self.score == 0 {
            self.decay_elapsed = Duration::ZERO;
        }
        deducted
    }
}

/// Run a stepwise refill to completion, recording every step.
fn settle_and_refill(grid: &mut Grid, gem_kinds: u8, rng: &mut Rng) -> Vec<SettleStep> {
    let mut refill = Refill::new(grid, gem_kinds, rng);
    let mut steps = Vec::new();
    loop {
        let before = grid.clone();
        let Some(pieces) = refill.step(grid) else {
            break;
        };
        steps.push(SettleStep {
            background: before.without_pieces(&pieces),
            pieces,
        });
    }
    steps
}
