//! Persisted value types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A repository's entry on the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Repository identifier, with its original casing.
    #[serde(rename = "Repo")]
    pub key: String,
    /// Score on a 0-100 scale.
    #[serde(rename = "Score")]
    pub score: f64,
    /// Number of files analyzed.
    #[serde(rename = "Files")]
    pub file_count: u64,
}

impl ScoreRecord {
    /// Create a new record.
    pub fn new(key: impl Into<String>, score: f64, file_count: u64) -> Self {
        Self {
            key: key.into(),
            score,
            file_count,
        }
    }

    /// Case-insensitive key comparison, used for deduplication.
    pub fn same_repo(&self, key: &str) -> bool {
        self.key.to_lowercase() == key.to_lowercase()
    }
}

/// A repository identifier on the recently viewed list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentEntry(String);

impl RecentEntry {
    /// Create a new entry.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The repository identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecentEntry {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl PartialEq<str> for RecentEntry {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RecentEntry {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for RecentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
