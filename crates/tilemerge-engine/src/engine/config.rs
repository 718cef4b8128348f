use serde::{Deserialize, Serialize};

use crate::GridSize;

/// How merges chain within a single move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeRule {
    /// The scan may strike a freshly merged tile again in the same move, so
    /// `[2, 2, 2, 2]` collapses to `[8, 0, 0, 0]`.
    #[default]
    Cascade,
    /// A tile produced by a merge cannot merge again in the same move, so
    /// `[2, 2, 2, 2]` becomes `[4, 4, 0, 0]`.
    OncePerTile,
}

/// When a new tile appears after a move command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpawnPolicy {
    /// Spawn after every command, even when nothing moved.
    #[default]
    EveryMove,
    /// Spawn only when the command changed the grid.
    OnChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("initial tile count must be at least 1")]
    NoInitialTiles,
    #[display("{initial_tiles} initial tiles do not fit into a {size}x{size} grid")]
    TooManyInitialTiles { initial_tiles: usize, size: usize },
}

/// Immutable settings of one game session.
///
/// Built once and handed to every component that needs them; nothing here
/// changes while a session runs.
///
/// ```
/// use tilemerge_engine::{GameConfig, GridSize, MergeRule};
///
/// let config = GameConfig::new(GridSize::new(5).unwrap())
///     .with_initial_tiles(2)
///     .with_merge_rule(MergeRule::OncePerTile);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.grid_size().cell_count(), 25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    grid_size: GridSize,
    initial_tiles: usize,
    merge_rule: MergeRule,
    spawn_policy: SpawnPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(GridSize::DEFAULT)
    }
}

impl GameConfig {
    pub const DEFAULT_INITIAL_TILES: usize = 4;

    #[must_use]
    pub const fn new(grid_size: GridSize) -> Self {
        Self {
            grid_size,
            initial_tiles: Self::DEFAULT_INITIAL_TILES,
            merge_rule: MergeRule::Cascade,
            spawn_policy: SpawnPolicy::EveryMove,
        }
    }

    #[must_use]
    pub const fn with_initial_tiles(self, initial_tiles: usize) -> Self {
        Self {
            initial_tiles,
            ..self
        }
    }

    #[must_use]
    pub const fn with_merge_rule(self, merge_rule: MergeRule) -> Self {
        Self { merge_rule, ..self }
    }

    #[must_use]
    pub const fn with_spawn_policy(self, spawn_policy: SpawnPolicy) -> Self {
        Self {
            spawn_policy,
            ..self
        }
    }

    #[must_use]
    pub const fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    #[must_use]
    pub const fn initial_tiles(&self) -> usize {
        self.initial_tiles
    }

    #[must_use]
    pub const fn merge_rule(&self) -> MergeRule {
        self.merge_rule
    }

    #[must_use]
    pub const fn spawn_policy(&self) -> SpawnPolicy {
        self.spawn_policy
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_tiles == 0 {
            return Err(ConfigError::NoInitialTiles);
        }
        if self.initial_tiles > self.grid_size.cell_count() {
            return Err(ConfigError::TooManyInitialTiles {
                initial_tiles: self.initial_tiles,
                size: self.grid_size.get(),
            });
        }
        Ok(())
    }
}
