//! Distinct repository counter.

use serde::{Deserialize, Serialize};

use reportcard_storage::{DbTx, DbTxMut};

use crate::{META_BUCKET, MetaResult, TOTAL_REPOS_KEY, load_lossy};

/// Number of distinct repositories ever recorded.
///
/// Advisory only: an unreadable value counts as zero. Never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoCounter(u64);

impl RepoCounter {
    /// Load the counter from the metadata bucket.
    pub fn load<T: DbTx>(tx: &T) -> MetaResult<Self> {
        load_lossy(tx, TOTAL_REPOS_KEY)
    }

    /// Write the counter to the metadata bucket.
    pub fn store<T: DbTxMut>(&self, tx: &mut T) -> MetaResult<()> {
        tx.put_value(META_BUCKET, TOTAL_REPOS_KEY, self)?;
        Ok(())
    }

    /// Current value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Add one and return the new value.
    pub fn increment(&mut self) -> u64 {
        self.0 = self.0.saturating_add(1);
        self.0
    }
}
