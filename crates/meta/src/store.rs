//! Transactional metadata store.
//!
//! This module provides [`MetadataStore`], which applies score, counter and
//! view updates to the metadata bucket of a [`Database`].

use serde::Serialize;
use tracing::{debug, info};

use reportcard_storage::{Database, DbTx, DbTxMut};

use crate::metrics::MetaMetrics;
use crate::{
    Leaderboard, META_BUCKET, MetaError, MetaResult, RecentEntry, RecentList, RepoCounter,
    ScoreQuery, ScoreRecord, UpsertOutcome,
};

/// Point-in-time view of all metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaSnapshot {
    /// Leaderboard, highest score first.
    pub top: Vec<ScoreRecord>,
    /// Number of distinct repositories ever recorded.
    pub total_repos: u64,
    /// Recently viewed repositories, oldest first.
    pub recent: Vec<RecentEntry>,
}

/// Metadata store backed by a [`Database`].
///
/// Every operation runs in its own transaction and re-reads the bucket; no
/// state is kept between calls.
#[derive(Debug)]
pub struct MetadataStore<DB> {
    db: DB,
    metrics: MetaMetrics,
}

impl<DB: Database> MetadataStore<DB> {
    /// Create a store over `db`.
    pub fn new(db: DB) -> Self {
        Self {
            db,
            metrics: MetaMetrics::default(),
        }
    }

    /// The underlying database.
    pub fn database(&self) -> &DB {
        &self.db
    }

    /// Create the metadata bucket if it does not exist.
    pub fn initialize(&self) -> MetaResult<()> {
        self.db.update(|tx| {
            if !tx.has_bucket(META_BUCKET)? {
                tx.create_bucket(META_BUCKET)?;
                info!(bucket = META_BUCKET, "Created metadata bucket");
            }
            Ok(())
        })
    }

    /// Record a freshly computed score for `key`.
    ///
    /// `score01` is the analysis score in `[0, 1]`; the leaderboard stores it
    /// on a 0-100 scale. If `is_new` the repo counter is incremented in the
    /// same transaction, so the counter and the leaderboard change together
    /// or not at all.
    ///
    /// Returns how the leaderboard was affected. A score that does not make
    /// the leaderboard is not an error.
    pub fn record_score(
        &self,
        key: &str,
        score01: f64,
        file_count: u64,
        is_new: bool,
    ) -> MetaResult<UpsertOutcome> {
        if !score01.is_finite() {
            return Err(MetaError::InvalidScore(score01));
        }
        let score = score01 * 100.0;

        let outcome = self.db.update(|tx| {
            require_bucket(&*tx)?;

            if is_new {
                let mut counter = RepoCounter::load(&*tx)?;
                let total = counter.increment();
                counter.store(tx)?;
                info!(key, total, "New repo, incremented repo count");
            }

            let mut board = Leaderboard::load(&*tx)?;
            let outcome = board.upsert(key, score, file_count);
            if outcome.is_changed() {
                board.store(tx)?;
            }
            Ok::<_, MetaError>(outcome)
        })?;

        self.metrics.on_score(outcome, is_new);
        debug!(key, score, file_count, ?outcome, "Recorded score");
        Ok(outcome)
    }

    /// Add `key` to the recently viewed list.
    ///
    /// Returns `true` if the list changed.
    pub fn record_view(&self, key: &str) -> MetaResult<bool> {
        let changed = self.db.update(|tx| {
            require_bucket(&*tx)?;
            let mut recent = RecentList::load(&*tx)?;
            let changed = recent.record(key);
            if changed {
                recent.store(tx)?;
            }
            Ok::<_, MetaError>(changed)
        })?;

        if changed {
            self.metrics.inc_views();
            debug!(key, "Recorded view");
        }
        Ok(changed)
    }

    /// The leaderboard score for `key`, or [`DEFAULT_SCORE`](crate::DEFAULT_SCORE).
    ///
    /// See [`ScoreQuery::lookup`].
    pub fn lookup(&self, key: &str) -> String {
        self.metrics.inc_lookups();
        ScoreQuery::new(&self.db).lookup(key)
    }

    /// Number of distinct repositories ever recorded.
    pub fn total_repos(&self) -> MetaResult<u64> {
        self.db
            .view(|tx| RepoCounter::load(tx))
            .map(|counter| counter.value())
    }

    /// Recently viewed repositories, oldest first.
    pub fn recent(&self) -> MetaResult<Vec<RecentEntry>> {
        self.db
            .view(|tx| RecentList::load(tx))
            .map(|list| list.to_vec())
    }

    /// Read the leaderboard, counter and recent list from one snapshot.
    pub fn snapshot(&self) -> MetaResult<MetaSnapshot> {
        self.db.view(|tx| {
            require_bucket(tx)?;
            Ok(MetaSnapshot {
                top: Leaderboard::load(tx)?.ranked(),
                total_repos: RepoCounter::load(tx)?.value(),
                recent: RecentList::load(tx)?.to_vec(),
            })
        })
    }
}

fn require_bucket<T: DbTx>(tx: &T) -> MetaResult<()> {
    if tx.has_bucket(META_BUCKET)? {
        Ok(())
    } else {
        Err(MetaError::BucketNotFound(META_BUCKET.to_string()))
    }
}
