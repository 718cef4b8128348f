use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tilemerge_engine::LeaderboardEntry;

/// Contents of the score file, keyed by user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFile {
    #[serde(default)]
    pub scores: BTreeMap<String, ScoreRecord>,
}

/// Best score of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub best_score: u64,
    pub display_name: String,
    /// Time of the last save for this player (RFC 3339, UTC)
    pub updated_at: DateTime<Utc>,
}

impl ScoreFile {
    pub fn entries(&self) -> impl Iterator<Item = LeaderboardEntry> + '_ {
        self.scores.iter().map(|(user_id, record)| LeaderboardEntry {
            user_id: user_id.clone(),
            display_name: record.display_name.clone(),
            best_score: record.best_score,
        })
    }
}
