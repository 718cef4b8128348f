//! Game rules built on top of [`crate::core`].
//!
//! - [`MoveResolver`] - Slides and merges tiles for one direction
//! - [`TileSpawner`] / [`spawn_tiles`] - Places new tiles into empty cells
//! - [`ScoreTracker`] - Current and best score bookkeeping
//! - [`GameSession`] - Ties the above together, one move at a time
//! - [`ScoreStore`] / [`Leaderboard`] - Seams for best-score storage
//!
//! # Move Flow
//!
//! 1. The front end turns input into a [`Direction`](crate::Direction)
//! 2. [`GameSession::apply_move`] asks the resolver to mutate the grid
//! 3. Merge events are credited to the score tracker
//! 4. One tile is spawned (see [`SpawnPolicy`])
//! 5. The returned [`MoveOutcome`] and [`GameSession::grid`] are rendered
//!
//! # Example
//!
//! ```
//! use tilemerge_engine::{Direction, GameConfig, GameSession, SpawnSeed};
//!
//! let seed: SpawnSeed = "00000000000000000000000000000001".parse().unwrap();
//! let mut session = GameSession::with_seed(GameConfig::default(), seed).unwrap();
//!
//! for direction in [Direction::Left, Direction::Up, Direction::Right] {
//!     match session.apply_move(direction) {
//!         Ok(outcome) if outcome.board_full().is_some() => break,
//!         Ok(outcome) => println!("+{} points", outcome.score_delta()),
//!         Err(e) => panic!("{e}"),
//!     }
//! }
//! ```

pub use self::{
    config::*, game_session::*, move_resolver::*, persistence::*, score_tracker::*,
    tile_spawner::*,
};

mod config;
mod game_session;
mod move_resolver;
mod persistence;
mod score_tracker;
mod tile_spawner;
