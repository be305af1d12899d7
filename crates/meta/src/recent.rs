//! Recently viewed repositories.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use reportcard_storage::{DbTx, DbTxMut};

use crate::{META_BUCKET, MetaResult, RECENT_KEY, RecentEntry, load_lossy};

/// Maximum number of entries on the recent list.
pub const RECENT_CAPACITY: usize = 5;

/// The last [`RECENT_CAPACITY`] distinct repositories viewed, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentList {
    entries: VecDeque<RecentEntry>,
}

impl RecentList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the list from the metadata bucket.
    ///
    /// A missing or unreadable value yields an empty list.
    pub fn load<T: DbTx>(tx: &T) -> MetaResult<Self> {
        let mut list: Self = load_lossy(tx, RECENT_KEY)?;
        list.truncate();
        Ok(list)
    }

    /// Write the list to the metadata bucket.
    pub fn store<T: DbTxMut>(&self, tx: &mut T) -> MetaResult<()> {
        tx.put_value(META_BUCKET, RECENT_KEY, self)?;
        Ok(())
    }

    /// Append `key` unless it is already present.
    ///
    /// Returns `true` if the list changed.
    pub fn record(&mut self, key: &str) -> bool {
        if self.contains(key) {
            return false;
        }
        self.entries.push_back(RecentEntry::new(key));
        self.truncate();
        true
    }

    /// Returns `true` if `key` is on the list (exact match).
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry == key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &RecentEntry> {
        self.entries.iter()
    }

    /// Entries, oldest first.
    pub fn to_vec(&self) -> Vec<RecentEntry> {
        self.entries.iter().cloned().collect()
    }

    fn truncate(&mut self) {
        while self.entries.len() > RECENT_CAPACITY {
            self.entries.pop_front();
        }
    }
}
