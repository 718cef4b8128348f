//! Best-score storage backed by a JSON file.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
};

use anyhow::Context as _;
use chrono::Utc;
use tilemerge_engine::{
    Leaderboard, LeaderboardEntry, PersistenceError, PlayerIdentity, ScoreStore, rank_entries,
};

use crate::{
    schema::scores::{ScoreFile, ScoreRecord},
    util::{self, Output},
};

/// Synchronous store reading and rewriting the whole score file per call.
///
/// A missing file is an empty store. Writes go to a sibling temporary file
/// that is then renamed over the original, so readers never see a partial
/// file.
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
}

impl JsonScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> anyhow::Result<ScoreFile> {
        let exists = self
            .path
            .try_exists()
            .with_context(|| format!("Failed to access score file: {}", self.path.display()))?;
        if !exists {
            return Ok(ScoreFile::default());
        }
        util::read_json_file("score", &self.path)
    }

    fn write(&self, file: &ScoreFile) -> anyhow::Result<()> {
        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        Output::create(&tmp_path)?.write_json(file)?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "Failed to move {} to {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }

    fn merge_best(&self, identity: &PlayerIdentity, best: u64) -> anyhow::Result<()> {
        let mut file = self.read()?;
        let best_score = file
            .scores
            .get(identity.user_id())
            .map_or(best, |record| record.best_score.max(best));
        file.scores.insert(
            identity.user_id().to_owned(),
            ScoreRecord {
                best_score,
                display_name: identity.display_name().to_owned(),
                updated_at: Utc::now(),
            },
        );
        self.write(&file)
    }
}

impl ScoreStore for JsonScoreStore {
    fn save_best_score(
        &self,
        identity: &PlayerIdentity,
        best: u64,
    ) -> Result<(), PersistenceError> {
        self.merge_best(identity, best)
            .map_err(|e| PersistenceError::Save {
                user_id: identity.user_id().to_owned(),
                detail: format!("{e:#}"),
            })
    }

    fn load_best_score(&self, user_id: &str) -> Result<Option<u64>, PersistenceError> {
        let file = self.read().map_err(|e| PersistenceError::Load {
            user_id: user_id.to_owned(),
            detail: format!("{e:#}"),
        })?;
        Ok(file.scores.get(user_id).map(|record| record.best_score))
    }
}

impl Leaderboard for JsonScoreStore {
    fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        let file = self.read().map_err(|e| PersistenceError::Query {
            detail: format!("{e:#}"),
        })?;
        Ok(rank_entries(file.entries(), limit))
    }
}

#[derive(Debug)]
struct SaveRequest {
    identity: PlayerIdentity,
    best: u64,
}

/// [`JsonScoreStore`] whose saves run on a worker thread.
///
/// `save_best_score` only queues the request; the worker logs any failure.
/// Loads and leaderboard queries read the file on the calling thread. Dropping
/// the store waits for queued saves to finish.
#[derive(Debug)]
pub struct BackgroundScoreStore {
    reader: JsonScoreStore,
    sender: Option<mpsc::Sender<SaveRequest>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl BackgroundScoreStore {
    pub fn spawn(store: JsonScoreStore) -> anyhow::Result<Self> {
        let (sender, receiver) = mpsc::channel::<SaveRequest>();
        let writer = store.clone();
        let worker = thread::Builder::new()
            .name("score-saver".to_owned())
            .spawn(move || {
                for SaveRequest { identity, best } in receiver {
                    match writer.save_best_score(&identity, best) {
                        Ok(()) => tracing::debug!(user_id = identity.user_id(), best, "saved"),
                        Err(e) => tracing::warn!(error = %e, "background save failed"),
                    }
                }
            })
            .context("Failed to start score save worker")?;

        Ok(Self {
            reader: store,
            sender: Some(sender),
            worker: Some(worker),
        })
    }
}

impl ScoreStore for BackgroundScoreStore {
    fn save_best_score(
        &self,
        identity: &PlayerIdentity,
        best: u64,
    ) -> Result<(), PersistenceError> {
        let stopped = || PersistenceError::Save {
            user_id: identity.user_id().to_owned(),
            detail: "save worker has stopped".to_owned(),
        };
        let sender = self.sender.as_ref().ok_or_else(stopped)?;
        sender
            .send(SaveRequest {
                identity: identity.clone(),
                best,
            })
            .map_err(|_| stopped())
    }

    fn load_best_score(&self, user_id: &str) -> Result<Option<u64>, PersistenceError> {
        self.reader.load_best_score(user_id)
    }
}

impl Leaderboard for BackgroundScoreStore {
    fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        self.reader.top_scores(limit)
    }
}

impl Drop for BackgroundScoreStore {
    fn drop(&mut self) {
        // closing the channel ends the worker loop once the queue is drained
        drop(self.sender.take());
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("score save worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> PlayerIdentity {
        PlayerIdentity::new("ann", "Ann")
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonScoreStore::new(dir.path().join("scores.json"));
        assert_eq!(store.load_best_score("ann").unwrap(), None);
        assert!(store.top_scores(10).unwrap().is_empty());
    }

    #[test]
    fn test_save_creates_file_and_keeps_max() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("scores.json");
        let store = JsonScoreStore::new(&path);

        store.save_best_score(&ann(), 512).unwrap();
        store.save_best_score(&ann(), 128).unwrap();
        assert_eq!(store.load_best_score("ann").unwrap(), Some(512));

        let file = store.read().unwrap();
        assert_eq!(file.scores["ann"].display_name, "Ann");
        assert!(!path.with_extension("json.tmp").exists());

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["scores"]["ann"]["best_score"], 512);
        assert!(raw["scores"]["ann"]["updated_at"].is_string());
    }

    #[test]
    fn test_leaderboard_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonScoreStore::new(dir.path().join("scores.json"));
        store
            .save_best_score(&PlayerIdentity::new("bob", "Bob"), 64)
            .unwrap();
        store.save_best_score(&ann(), 64).unwrap();
        store
            .save_best_score(&PlayerIdentity::new("cy", "Cy"), 1024)
            .unwrap();

        let ids: Vec<_> = store
            .top_scores(10)
            .unwrap()
            .into_iter()
            .map(|e| e.user_id)
            .collect();
        assert_eq!(ids, ["cy", "ann", "bob"]);
        assert_eq!(store.top_scores(1).unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "not json").unwrap();
        let store = JsonScoreStore::new(&path);

        assert!(matches!(
            store.load_best_score("ann"),
            Err(PersistenceError::Load { .. })
        ));
        assert!(matches!(
            store.save_best_score(&ann(), 2),
            Err(PersistenceError::Save { .. })
        ));
        assert!(matches!(
            store.top_scores(3),
            Err(PersistenceError::Query { .. })
        ));
    }

    #[test]
    fn test_background_saves_are_flushed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        {
            let store = BackgroundScoreStore::spawn(JsonScoreStore::new(&path)).unwrap();
            for best in [4, 16, 8, 64, 32] {
                store.save_best_score(&ann(), best).unwrap();
            }
        }
        let store = JsonScoreStore::new(&path);
        assert_eq!(store.load_best_score("ann").unwrap(), Some(64));
    }

    #[test]
    fn test_background_failure_does_not_surface() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the file should be makes every write fail
        let path = dir.path().join("scores.json");
        fs::create_dir(&path).unwrap();
        let store = BackgroundScoreStore::spawn(JsonScoreStore::new(&path)).unwrap();
        assert!(store.save_best_score(&ann(), 8).is_ok());
    }
}
