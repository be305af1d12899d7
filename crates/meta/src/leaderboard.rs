//! Bounded, deduplicated score leaderboard.

use serde::{Deserialize, Serialize};
use tracing::trace;

use reportcard_storage::{DbTx, DbTxMut};

use crate::{META_BUCKET, MetaResult, SCORES_KEY, ScoreRecord, load_lossy};

/// Maximum number of records on the leaderboard.
pub const LEADERBOARD_CAPACITY: usize = 50;

/// Minimum file count for a repository to be eligible.
pub const MIN_FILE_COUNT: u64 = 100;

/// Result of [`Leaderboard::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Too few files; the leaderboard was not consulted.
    Ineligible,
    /// The leaderboard is full and its lowest score beats the candidate.
    Rejected,
    /// A new record was added.
    Inserted,
    /// An existing record for the same repository was replaced.
    Replaced,
}

impl UpsertOutcome {
    /// Returns `true` if the leaderboard was modified.
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Inserted | Self::Replaced)
    }
}

/// The highest-scoring eligible repositories.
///
/// Holds at most [`LEADERBOARD_CAPACITY`] records and at most one record per
/// case-insensitive key. Storage order is unspecified; use
/// [`Leaderboard::ranked`] for a score ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    records: Vec<ScoreRecord>,
}

impl Leaderboard {
    /// Create an empty leaderboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the leaderboard from the metadata bucket.
    ///
    /// A missing or unreadable value yields an empty leaderboard.
    pub fn load<T: DbTx>(tx: &T) -> MetaResult<Self> {
        let mut board: Self = load_lossy(tx, SCORES_KEY)?;
        // Values written elsewhere may exceed the bounds.
        board.dedup();
        board.truncate();
        Ok(board)
    }

    /// Write the leaderboard to the metadata bucket.
    pub fn store<T: DbTxMut>(&self, tx: &mut T) -> MetaResult<()> {
        tx.put_value(META_BUCKET, SCORES_KEY, self)?;
        Ok(())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if the leaderboard holds [`LEADERBOARD_CAPACITY`] records.
    pub fn is_full(&self) -> bool {
        self.records.len() >= LEADERBOARD_CAPACITY
    }

    /// The lowest score, or `None` if empty.
    pub fn min_score(&self) -> Option<f64> {
        self.records
            .iter()
            .map(|record| record.score)
            .min_by(f64::total_cmp)
    }

    /// Records in storage order.
    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    /// Find the record for `key`, ignoring case.
    pub fn get(&self, key: &str) -> Option<&ScoreRecord> {
        self.records.iter().find(|record| record.same_repo(key))
    }

    /// All records, highest score first.
    pub fn ranked(&self) -> Vec<ScoreRecord> {
        let mut ranked = self.records.clone();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    /// Insert or replace the record for `key`.
    ///
    /// - Repositories with fewer than [`MIN_FILE_COUNT`] files are ignored.
    /// - Below capacity every eligible score is admitted.
    /// - At capacity a score lower than the current minimum is rejected, even
    ///   when it belongs to a repository already on the board.
    /// - An existing record with the same case-insensitive key is replaced,
    ///   never merged.
    /// - If the board overflows, the lowest scores are evicted.
    pub fn upsert(&mut self, key: &str, score: f64, file_count: u64) -> UpsertOutcome {
        if file_count < MIN_FILE_COUNT {
            trace!(key, file_count, "Not enough files for the leaderboard");
            return UpsertOutcome::Ineligible;
        }

        if self.is_full() && self.min_score().is_some_and(|min| min > score) {
            trace!(key, score, "Score below leaderboard minimum");
            return UpsertOutcome::Rejected;
        }

        let existing = self.records.iter().position(|record| record.same_repo(key));
        if let Some(index) = existing {
            self.records.remove(index);
        }

        self.records.push(ScoreRecord::new(key, score, file_count));
        self.truncate();

        if existing.is_some() {
            UpsertOutcome::Replaced
        } else {
            UpsertOutcome::Inserted
        }
    }

    /// Evict the lowest scores until the board is within capacity.
    fn truncate(&mut self) {
        if self.records.len() <= LEADERBOARD_CAPACITY {
            return;
        }
        self.records.sort_by(|a, b| a.score.total_cmp(&b.score));
        let excess = self.records.len() - LEADERBOARD_CAPACITY;
        for evicted in self.records.drain(..excess) {
            trace!(key = %evicted.key, score = evicted.score, "Evicted from leaderboard");
        }
    }

    /// Keep only the best record per case-insensitive key.
    fn dedup(&mut self) {
        self.records.sort_by(|a, b| b.score.total_cmp(&a.score));
        let mut seen = std::collections::HashSet::new();
        self.records.retain(|record| seen.insert(record.key.to_lowercase()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use reportcard_storage::{Database, MemoryDatabase};

    fn board_with(scores: &[f64]) -> Leaderboard {
        let mut board = Leaderboard::new();
        for (i, score) in scores.iter().enumerate() {
            board.upsert(&format!("repo-{i}"), *score, MIN_FILE_COUNT);
        }
        board
    }

    fn sorted_scores(board: &Leaderboard) -> Vec<f64> {
        let mut scores: Vec<f64> = board.records().iter().map(|r| r.score).collect();
        scores.sort_by(f64::total_cmp);
        scores
    }

    #[test]
    fn test_ineligible_is_noop() {
        let mut board = Leaderboard::new();
        assert_eq!(board.upsert("small", 99.0, 99), UpsertOutcome::Ineligible);
        assert!(board.is_empty());

        assert_eq!(board.upsert("exact", 10.0, 100), UpsertOutcome::Inserted);
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_upsert_replaces_case_insensitively() {
        let mut board = Leaderboard::new();
        assert_eq!(board.upsert("github.com/Acme/Widgets", 40.0, 120), UpsertOutcome::Inserted);
        assert_eq!(board.upsert("github.com/acme/widgets", 30.0, 150), UpsertOutcome::Replaced);

        assert_eq!(board.len(), 1);
        let record = board.get("GITHUB.COM/ACME/WIDGETS").unwrap();
        assert_eq!(record.key, "github.com/acme/widgets");
        assert_eq!(record.score, 30.0);
        assert_eq!(record.file_count, 150);
    }

    #[test]
    fn test_identical_upsert_twice_keeps_one_record() {
        let mut board = Leaderboard::new();
        board.upsert("repo", 75.0, 300);
        board.upsert("repo", 75.0, 300);

        assert_eq!(board.records(), &[ScoreRecord::new("repo", 75.0, 300)]);
    }

    #[test]
    fn test_eviction_removes_lowest() {
        let scores: Vec<f64> = (1..=51).map(f64::from).collect();
        let board = board_with(&scores);

        assert_eq!(board.len(), LEADERBOARD_CAPACITY);
        assert_eq!(sorted_scores(&board), (2..=51).map(f64::from).collect::<Vec<_>>());
        assert!(board.get("repo-0").is_none());
    }

    #[test]
    fn test_eviction_removes_lowest_regardless_of_order() {
        // Descending then ascending so the minimum is not at either end.
        let mut scores: Vec<f64> = (26..=50).rev().map(f64::from).collect();
        scores.extend((51..=75).map(f64::from));
        scores.push(0.5);
        scores.push(60.5);
        let board = board_with(&scores);

        assert_eq!(board.len(), LEADERBOARD_CAPACITY);
        let kept = sorted_scores(&board);
        assert_eq!(kept.first().copied(), Some(27.0));
        assert!(kept.contains(&60.5));
    }

    #[test]
    fn test_fills_before_applying_cutoff() {
        let board = board_with(&[5.0, 4.0, 3.0, 2.0, 1.0, 50.0, 49.0, 48.0, 47.0, 46.0]);
        assert_eq!(board.len(), 10);
        assert_eq!(board.min_score(), Some(1.0));
    }

    #[test]
    fn test_full_board_rejects_lower_score() {
        let scores: Vec<f64> = (10..60).map(f64::from).collect();
        let mut board = board_with(&scores);
        assert!(board.is_full());

        assert_eq!(board.upsert("newcomer", 9.0, 500), UpsertOutcome::Rejected);
        assert!(board.get("newcomer").is_none());

        // Equal to the minimum is admitted and evicts the old minimum.
        assert_eq!(board.upsert("newcomer", 10.0, 500), UpsertOutcome::Inserted);
        assert_eq!(board.len(), LEADERBOARD_CAPACITY);
        assert!(board.get("newcomer").is_some());
    }

    #[test]
    fn test_full_board_rejects_lower_score_for_existing_repo() {
        let scores: Vec<f64> = (10..60).map(f64::from).collect();
        let mut board = board_with(&scores);

        assert_eq!(board.upsert("repo-20", 1.0, 500), UpsertOutcome::Rejected);
        assert_eq!(board.get("repo-20").map(|r| r.score), Some(30.0));
    }

    #[test]
    fn test_ranked_is_descending() {
        let board = board_with(&[10.0, 90.0, 50.0]);
        let scores: Vec<f64> = board.ranked().iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![90.0, 50.0, 10.0]);
    }

    #[test]
    fn test_load_missing_and_corrupt() {
        let db = MemoryDatabase::new();
        db.update(|tx| tx.create_bucket(META_BUCKET)).unwrap();

        let board = db.view(|tx| Leaderboard::load(tx)).unwrap();
        assert!(board.is_empty());

        db.update(|tx| tx.put(META_BUCKET, SCORES_KEY, b"{not json")).unwrap();
        let board = db.view(|tx| Leaderboard::load(tx)).unwrap();
        assert!(board.is_empty());
    }

    #[test]
    fn test_load_missing_bucket_is_error() {
        let db = MemoryDatabase::new();
        let err = db.view(|tx| Leaderboard::load(tx)).unwrap_err();
        assert_eq!(err, crate::MetaError::BucketNotFound(META_BUCKET.to_string()));
    }

    #[test]
    fn test_load_repairs_oversized_value() {
        let records: Vec<ScoreRecord> = (0..60)
            .map(|i| ScoreRecord::new(format!("repo-{i}"), f64::from(i), 100))
            .chain(std::iter::once(ScoreRecord::new("REPO-59", 1.0, 100)))
            .collect();
        let db = MemoryDatabase::new();
        db.update(|tx| {
            tx.create_bucket(META_BUCKET)?;
            tx.put_value(META_BUCKET, SCORES_KEY, &records)
        })
        .unwrap();

        let board = db.view(|tx| Leaderboard::load(tx)).unwrap();
        assert_eq!(board.len(), LEADERBOARD_CAPACITY);
        assert_eq!(board.min_score(), Some(10.0));
        assert_eq!(board.get("repo-59").map(|r| r.score), Some(59.0));
    }

    #[test]
    fn test_store_roundtrip() {
        let db = MemoryDatabase::new();
        let board = board_with(&[12.5, 99.0]);
        db.update(|tx| {
            tx.create_bucket(META_BUCKET)?;
            board.store(tx)
        })
        .unwrap();

        let loaded = db.view(|tx| Leaderboard::load(tx)).unwrap();
        assert_eq!(sorted_scores(&loaded), vec![12.5, 99.0]);
    }

    proptest! {
        #[test]
        fn test_bounds_hold_for_any_sequence(
            ops in prop::collection::vec((0u8..80, 0.0f64..100.0, 0u64..300), 0..200)
        ) {
            let mut board = Leaderboard::new();
            for (repo, score, files) in ops {
                // Alternate casing so deduplication is exercised.
                let key = if repo % 2 == 0 {
                    format!("Repo-{repo}")
                } else {
                    format!("repo-{repo}")
                };
                board.upsert(&key, score, files);
                board.upsert(&key.to_uppercase(), score, files);

                prop_assert!(board.len() <= LEADERBOARD_CAPACITY);
                let mut keys: Vec<String> =
                    board.records().iter().map(|r| r.key.to_lowercase()).collect();
                keys.sort();
                keys.dedup();
                prop_assert_eq!(keys.len(), board.len());
            }
        }

        #[test]
        fn test_overflow_keeps_the_best(
            scores in prop::collection::vec(0.0f64..100.0, 51..120)
        ) {
            let board = board_with(&scores);
            let mut expected = scores.clone();
            expected.sort_by(|a, b| b.total_cmp(a));
            let cutoff = expected[LEADERBOARD_CAPACITY - 1];

            prop_assert_eq!(board.len(), LEADERBOARD_CAPACITY);
            prop_assert!(board.records().iter().all(|r| r.score >= cutoff));
        }
    }
}
