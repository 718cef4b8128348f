//! Best-score persistence seams.
//!
//! The engine only talks to storage through [`ScoreStore`] and
//! [`Leaderboard`]. Concrete stores (files, databases, remote services) live in
//! the front end; [`InMemoryScoreStore`] is provided for tests and throwaway
//! sessions.

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};

/// Player a best score belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerIdentity {
    user_id: String,
    display_name: String,
}

impl PlayerIdentity {
    #[must_use]
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// One ranked row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub display_name: String,
    pub best_score: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PersistenceError {
    #[display("failed to save best score for {user_id:?}: {detail}")]
    Save { user_id: String, detail: String },
    #[display("failed to load best score for {user_id:?}: {detail}")]
    Load { user_id: String, detail: String },
    #[display("failed to query leaderboard: {detail}")]
    Query { detail: String },
}

/// Keyed storage of one best score per player.
///
/// Implementations must keep the larger of the stored and the incoming value:
/// saving a smaller best than the one on record leaves the record unchanged.
pub trait ScoreStore: fmt::Debug {
    fn save_best_score(&self, identity: &PlayerIdentity, best: u64)
    -> Result<(), PersistenceError>;

    /// Returns `None` when the player has no record yet.
    fn load_best_score(&self, user_id: &str) -> Result<Option<u64>, PersistenceError>;
}

/// Read-only ranking over stored best scores.
pub trait Leaderboard: fmt::Debug {
    /// Highest `limit` records, best score first, ties ordered by user id.
    fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError>;
}

impl<T> ScoreStore for Arc<T>
where
    T: ScoreStore + ?Sized,
{
    fn save_best_score(
        &self,
        identity: &PlayerIdentity,
        best: u64,
    ) -> Result<(), PersistenceError> {
        (**self).save_best_score(identity, best)
    }

    fn load_best_score(&self, user_id: &str) -> Result<Option<u64>, PersistenceError> {
        (**self).load_best_score(user_id)
    }
}

impl<T> Leaderboard for Arc<T>
where
    T: Leaderboard + ?Sized,
{
    fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        (**self).top_scores(limit)
    }
}

/// Sorts entries into leaderboard order and keeps the first `limit`.
#[must_use]
pub fn rank_entries<I>(entries: I, limit: usize) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = LeaderboardEntry>,
{
    let mut entries: Vec<_> = entries.into_iter().collect();
    entries.sort_by(|a, b| {
        b.best_score
            .cmp(&a.best_score)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    entries.truncate(limit);
    entries
}

#[derive(Debug, Clone)]
struct StoredScore {
    display_name: String,
    best_score: u64,
}

/// Process-local [`ScoreStore`] and [`Leaderboard`].
#[derive(Debug, Default)]
pub struct InMemoryScoreStore {
    scores: Mutex<BTreeMap<String, StoredScore>>,
}

impl InMemoryScoreStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for InMemoryScoreStore {
    fn save_best_score(
        &self,
        identity: &PlayerIdentity,
        best: u64,
    ) -> Result<(), PersistenceError> {
        let mut scores = self.scores.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = scores
            .entry(identity.user_id().to_owned())
            .or_insert_with(|| StoredScore {
                display_name: identity.display_name().to_owned(),
                best_score: 0,
            });
        entry.display_name = identity.display_name().to_owned();
        entry.best_score = entry.best_score.max(best);
        Ok(())
    }

    fn load_best_score(&self, user_id: &str) -> Result<Option<u64>, PersistenceError> {
        let scores = self.scores.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(scores.get(user_id).map(|s| s.best_score))
    }
}

impl Leaderboard for InMemoryScoreStore {
    fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        let scores = self.scores.lock().unwrap_or_else(PoisonError::into_inner);
        let entries = scores.iter().map(|(user_id, s)| LeaderboardEntry {
            user_id: user_id.clone(),
            display_name: s.display_name.clone(),
            best_score: s.best_score,
        });
        Ok(rank_entries(entries, limit))
    }
}

/// A [`ScoreStore`] bound to the player whose session is running.
///
/// Storage failures are logged and swallowed here: losing a save must never
/// undo or block a move.
#[derive(Debug)]
pub struct BestScorePersistence {
    identity: PlayerIdentity,
    store: Box<dyn ScoreStore>,
}

impl BestScorePersistence {
    #[must_use]
    pub fn new<S>(identity: PlayerIdentity, store: S) -> Self
    where
        S: ScoreStore + 'static,
    {
        Self {
            identity,
            store: Box::new(store),
        }
    }

    #[must_use]
    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    /// Stored best of the bound player, `None` if absent or unreadable.
    #[must_use]
    pub fn load(&self) -> Option<u64> {
        match self.store.load_best_score(self.identity.user_id()) {
            Ok(best) => best,
            Err(e) => {
                tracing::warn!(error = %e, "could not load best score, starting from zero");
                None
            }
        }
    }

    pub fn report(&self, best: u64) {
        if let Err(e) = self.store.save_best_score(&self.identity, best) {
            tracing::warn!(error = %e, best, "could not save best score");
        }
    }
}
