use crate::MergeEvent;

/// Result of feeding one resolved move into a [`ScoreTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreUpdate {
    /// Points gained by this move (sum of merge values).
    pub delta: u64,
    /// Running score after the move.
    pub current: u64,
    /// New best score, present only when this move raised it.
    pub new_best: Option<u64>,
}

/// Running score and best-score bookkeeping.
///
/// - **Current**: sum of every merge value since the last restart
/// - **Best**: highest current seen by this tracker or restored from storage;
///   it never decreases
///
/// # Example
///
/// ```
/// use tilemerge_engine::{Coord, MergeEvent, ScoreTracker};
///
/// let mut tracker = ScoreTracker::new();
/// let update = tracker.on_move(&[
///     MergeEvent::new(Coord::new(0, 0), 4),
///     MergeEvent::new(Coord::new(1, 0), 8),
/// ]);
///
/// assert_eq!(update.delta, 12);
/// assert_eq!(tracker.current(), 12);
/// assert_eq!(update.new_best, Some(12));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScoreTracker {
    current: u64,
    best: u64,
}

impl ScoreTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: 0,
            best: 0,
        }
    }

    #[must_use]
    pub const fn current(&self) -> u64 {
        self.current
    }

    #[must_use]
    pub const fn best(&self) -> u64 {
        self.best
    }

    /// Credits a single merge and returns the points it was worth.
    ///
    /// Does not touch the best score; [`Self::on_move`] is the per-turn entry
    /// point that also maintains it.
    pub fn on_merge(&mut self, event: &MergeEvent) -> u64 {
        let delta = u64::from(event.value());
        self.current += delta;
        delta
    }

    /// Applies all merges of one move as a single update, then raises the best
    /// score if the running total passed it.
    pub fn on_move(&mut self, events: &[MergeEvent]) -> ScoreUpdate {
        let delta = events.iter().map(|e| u64::from(e.value())).sum();
        self.current += delta;

        let new_best = (self.current > self.best).then(|| {
            self.best = self.current;
            self.best
        });

        ScoreUpdate {
            delta,
            current: self.current,
            new_best,
        }
    }

    /// Raises the best score to a value loaded from storage. Lower values are
    /// ignored.
    pub fn restore_best(&mut self, best: u64) {
        self.best = self.best.max(best);
    }

    /// Starts a new game: current goes back to zero, best is kept.
    pub fn reset_current(&mut self) {
        self.current = 0;
    }
}
