//! Grid mutation engine for a sliding-tile merge puzzle.
//!
//! - [`core`] - Plain data: grid cells, coordinates and directions
//! - [`engine`] - Game rules: move resolution, tile spawning, scoring and sessions
//!
//! Rendering, input translation and score persistence live outside this crate and
//! talk to it through [`GameSession`], [`MoveOutcome`] and the [`ScoreStore`] trait.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Error returned when a tile spawn asks for more cells than the grid has free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("board full: requested {requested} tiles but only {available} cells are empty")]
pub struct BoardFullError {
    requested: usize,
    available: usize,
}

impl BoardFullError {
    #[must_use]
    pub const fn new(requested: usize, available: usize) -> Self {
        Self {
            requested,
            available,
        }
    }

    /// Number of tiles the spawn was asked to place.
    #[must_use]
    pub const fn requested(&self) -> usize {
        self.requested
    }

    /// Number of empty cells at the time of the request.
    #[must_use]
    pub const fn available(&self) -> usize {
        self.available
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    #[display("session is over, restart to keep playing")]
    SessionOver,
}
