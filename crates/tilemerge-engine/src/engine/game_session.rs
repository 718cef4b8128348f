use serde::{Deserialize, Serialize};

use crate::{
    BestScorePersistence, BoardFullError, ConfigError, Coord, Direction, GameConfig, GridState,
    MergeEvent, MoveError, MoveResolver, ScoreTracker, SpawnPolicy, SpawnSeed, TileSpawner,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Playing,
    /// A spawn found no free cell. Terminal until [`GameSession::restart`].
    BoardFull,
}

/// Everything a renderer needs to know about one applied move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    direction: Direction,
    events: Vec<MergeEvent>,
    spawned: Vec<Coord>,
    score_delta: u64,
    new_best: Option<u64>,
    changed: bool,
    board_full: Option<BoardFullError>,
}

impl MoveOutcome {
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Merges in the order they happened.
    #[must_use]
    pub fn events(&self) -> &[MergeEvent] {
        &self.events
    }

    /// Cells that received a new tile after the move.
    #[must_use]
    pub fn spawned(&self) -> &[Coord] {
        &self.spawned
    }

    #[must_use]
    pub fn new_tile_count(&self) -> usize {
        self.spawned.len()
    }

    #[must_use]
    pub fn score_delta(&self) -> u64 {
        self.score_delta
    }

    #[must_use]
    pub fn new_best(&self) -> Option<u64> {
        self.new_best
    }

    /// Whether sliding and merging altered the grid, not counting the spawn.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.changed
    }

    #[must_use]
    pub fn board_full(&self) -> Option<BoardFullError> {
        self.board_full
    }
}

/// A running game: grid, score and spawn stream driven by directional moves.
///
/// Each [`apply_move`](Self::apply_move) resolves the slide, credits the
/// merges, then spawns a tile according to the configured [`SpawnPolicy`].
/// When no cell is left for the spawn the session becomes
/// [`SessionState::BoardFull`] and further moves are refused.
///
/// ```
/// use tilemerge_engine::{Direction, GameConfig, GameSession};
///
/// let mut session = GameSession::new(GameConfig::default()).unwrap();
/// assert_eq!(session.grid().occupied_count(), 4);
///
/// let outcome = session.apply_move(Direction::Left).unwrap();
/// assert_eq!(session.moves(), 1);
/// assert_eq!(session.score(), outcome.score_delta());
/// ```
#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    grid: GridState,
    resolver: MoveResolver,
    spawner: TileSpawner,
    score: ScoreTracker,
    state: SessionState,
    moves: u64,
    last_outcome: Option<MoveOutcome>,
    persistence: Option<BestScorePersistence>,
}

impl GameSession {
    /// Starts a session with a random spawn seed.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_spawner(config, TileSpawner::new())
    }

    /// Starts a session whose tile positions are fully determined by `seed`.
    pub fn with_seed(config: GameConfig, seed: SpawnSeed) -> Result<Self, ConfigError> {
        Self::with_spawner(config, TileSpawner::with_seed(seed))
    }

    fn with_spawner(config: GameConfig, spawner: TileSpawner) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut session = Self {
            config,
            grid: GridState::new(config.grid_size()),
            resolver: MoveResolver::new(config.merge_rule()),
            spawner,
            score: ScoreTracker::new(),
            state: SessionState::Playing,
            moves: 0,
            last_outcome: None,
            persistence: None,
        };
        session.place_initial_tiles();
        Ok(session)
    }

    /// Attaches best-score storage and raises the best score to the stored one.
    #[must_use]
    pub fn with_persistence(mut self, persistence: BestScorePersistence) -> Self {
        if let Some(best) = persistence.load() {
            tracing::info!(
                user_id = persistence.identity().user_id(),
                best,
                "restored best score"
            );
            self.score.restore_best(best);
        }
        self.persistence = Some(persistence);
        self
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn seed(&self) -> SpawnSeed {
        self.spawner.seed()
    }

    #[must_use]
    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.score.current()
    }

    #[must_use]
    pub fn best(&self) -> u64 {
        self.score.best()
    }

    /// Number of accepted moves since the last (re)start.
    #[must_use]
    pub fn moves(&self) -> u64 {
        self.moves
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<&MoveOutcome> {
        self.last_outcome.as_ref()
    }

    #[must_use]
    pub fn persistence(&self) -> Option<&BestScorePersistence> {
        self.persistence.as_ref()
    }

    pub fn apply_move(&mut self, direction: Direction) -> Result<MoveOutcome, MoveError> {
        if self.state.is_board_full() {
            return Err(MoveError::SessionOver);
        }

        let before = self.grid.clone();
        let events = self.resolver.resolve(&mut self.grid, direction);
        let changed = self.grid != before;
        let update = self.score.on_move(&events);
        self.moves += 1;

        let should_spawn = match self.config.spawn_policy() {
            SpawnPolicy::EveryMove => true,
            SpawnPolicy::OnChange => changed,
        };
        let mut spawned = vec![];
        let mut board_full = None;
        if should_spawn {
            match self.spawner.spawn(&mut self.grid, 1) {
                Ok(coords) => spawned = coords,
                Err(e) => {
                    tracing::info!(score = update.current, moves = self.moves, "board full");
                    self.state = SessionState::BoardFull;
                    board_full = Some(e);
                }
            }
        }

        if let Some(best) = update.new_best {
            tracing::info!(best, "new best score");
            if let Some(persistence) = &self.persistence {
                persistence.report(best);
            }
        }

        tracing::debug!(
            %direction,
            merges = events.len(),
            delta = update.delta,
            score = update.current,
            changed,
            spawned = spawned.len(),
            "move applied"
        );

        let outcome = MoveOutcome {
            direction,
            events,
            spawned,
            score_delta: update.delta,
            new_best: update.new_best,
            changed,
            board_full,
        };
        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Clears the grid and starts over. The best score and the spawn stream
    /// carry on.
    pub fn restart(&mut self) {
        tracing::info!(score = self.score.current(), moves = self.moves, "restart");
        self.grid = GridState::new(self.config.grid_size());
        self.score.reset_current();
        self.state = SessionState::Playing;
        self.moves = 0;
        self.last_outcome = None;
        self.place_initial_tiles();
    }

    fn place_initial_tiles(&mut self) {
        // validated config always fits on an empty grid
        if let Err(e) = self
            .spawner
            .spawn(&mut self.grid, self.config.initial_tiles())
        {
            tracing::warn!(error = %e, "could not place initial tiles");
            self.state = SessionState::BoardFull;
        }
    }
}
