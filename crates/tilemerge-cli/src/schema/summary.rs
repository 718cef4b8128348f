use chrono::{DateTime, Utc};
use serde::Serialize;
use tilemerge_engine::{
    Coord, Direction, GameConfig, GameSession, MergeEvent, MoveOutcome, PlayerIdentity,
    SessionState, SpawnSeed,
};

/// Result of a scripted game, printed by `simulate`.
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub played_at: DateTime<Utc>,
    pub config: GameConfig,
    /// Replaying with this seed and the same moves reproduces the game
    pub seed: SpawnSeed,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerIdentity>,
    pub state: SessionState,
    /// Moves given on the command line
    pub moves_requested: usize,
    /// Moves actually played (fewer when the board filled up)
    pub moves_applied: u64,
    pub score: u64,
    pub best: u64,
    pub highest_tile: u32,
    pub grid: Vec<Vec<u32>>,
    pub turns: Vec<TurnRecord>,
}

/// One applied move.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    pub turn: u64,
    pub direction: Direction,
    pub changed: bool,
    pub merges: Vec<MergeEvent>,
    pub spawned: Vec<Coord>,
    pub score_delta: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_best: Option<u64>,
}

impl TurnRecord {
    pub fn new(turn: u64, outcome: &MoveOutcome) -> Self {
        Self {
            turn,
            direction: outcome.direction(),
            changed: outcome.changed(),
            merges: outcome.events().to_vec(),
            spawned: outcome.spawned().to_vec(),
            score_delta: outcome.score_delta(),
            new_best: outcome.new_best(),
        }
    }
}

impl GameSummary {
    pub fn new(session: &GameSession, moves_requested: usize, turns: Vec<TurnRecord>) -> Self {
        Self {
            played_at: Utc::now(),
            config: *session.config(),
            seed: session.seed(),
            player: session.persistence().map(|p| p.identity().clone()),
            state: session.state(),
            moves_requested,
            moves_applied: session.moves(),
            score: session.score(),
            best: session.best(),
            highest_tile: session.grid().highest_tile(),
            grid: session.grid().to_rows(),
            turns,
        }
    }
}
