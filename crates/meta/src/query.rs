//! Score lookup.

use tracing::{debug, error};

use reportcard_storage::Database;

use crate::{Leaderboard, MetaResult};

/// Score returned when a repository is not on the leaderboard.
pub const DEFAULT_SCORE: &str = "0";

/// Read-only lookup of a repository's leaderboard score.
#[derive(Debug)]
pub struct ScoreQuery<'a, DB> {
    db: &'a DB,
}

impl<'a, DB: Database> ScoreQuery<'a, DB> {
    /// Create a query over `db`.
    pub fn new(db: &'a DB) -> Self {
        Self { db }
    }

    /// The leaderboard score for `key`, formatted with [`format_score`].
    ///
    /// Keys match exactly, unlike leaderboard deduplication which ignores
    /// case. Returns [`DEFAULT_SCORE`] if the repository is not ranked or the
    /// leaderboard cannot be read; failures are logged, never returned.
    pub fn lookup(&self, key: &str) -> String {
        match self.score(key) {
            Ok(Some(score)) => format_score(score),
            Ok(None) => DEFAULT_SCORE.to_string(),
            Err(err) => {
                error!(key, %err, "Failed to load leaderboard");
                DEFAULT_SCORE.to_string()
            }
        }
    }

    /// The leaderboard score for `key`, if ranked.
    pub fn score(&self, key: &str) -> MetaResult<Option<f64>> {
        let board = self.db.view(|tx| Leaderboard::load(tx))?;
        let score = board
            .ranked()
            .into_iter()
            .find(|record| record.key == key)
            .map(|record| record.score);
        debug!(key, ?score, "Looked up score");
        Ok(score)
    }
}

/// Format a score as the shortest decimal that reads back to the same value.
///
/// No exponent, no fixed precision and no trailing zeros: `87.5`, `100`,
/// `33.333333333333336`.
pub fn format_score(score: f64) -> String {
    score.to_string()
}
