//! Repository metadata: score leaderboard, repo counter and recent views.
//!
//! This crate provides the metadata layer kept next to analysis results:
//! - [`Leaderboard`] - The 50 best-scoring eligible repositories
//! - [`RepoCounter`] - Number of distinct repositories ever recorded
//! - [`RecentList`] - The last five repositories viewed
//! - [`MetadataStore`] - Transactional entry point over a [`Database`]
//! - [`ScoreQuery`] - Point lookup of a repository's leaderboard score
//!
//! # Layout
//!
//! ```text
//! bucket "metadata"
//! ├── scores      -> [ScoreRecord]  (Leaderboard)
//! ├── total_repos -> u64            (RepoCounter)
//! └── recent      -> [String]       (RecentList)
//! ```
//!
//! Nothing is cached between calls; every operation re-reads the bucket
//! inside its own transaction.
//!
//! # Usage
//!
//! ```ignore
//! use reportcard_meta::MetadataStore;
//! use reportcard_storage::MemoryDatabase;
//!
//! let store = MetadataStore::new(MemoryDatabase::new());
//! store.initialize()?;
//!
//! store.record_score("github.com/acme/widgets", 0.875, 240, true)?;
//! assert_eq!(store.lookup("github.com/acme/widgets"), "87.5");
//! ```
//!
//! [`Database`]: reportcard_storage::Database

mod comment;
mod counter;
mod error;
mod leaderboard;
mod metrics;
mod query;
mod recent;
mod record;
mod store;

pub use comment::score_comment;
pub use counter::RepoCounter;
pub use error::MetaError;
pub use leaderboard::{LEADERBOARD_CAPACITY, Leaderboard, MIN_FILE_COUNT, UpsertOutcome};
pub use query::{DEFAULT_SCORE, ScoreQuery, format_score};
pub use recent::{RECENT_CAPACITY, RecentList};
pub use record::{RecentEntry, ScoreRecord};
pub use store::{MetaSnapshot, MetadataStore};

/// Bucket holding all metadata records.
pub const META_BUCKET: &str = "metadata";

/// Key of the serialized [`Leaderboard`].
pub const SCORES_KEY: &str = "scores";

/// Key of the serialized [`RepoCounter`].
pub const TOTAL_REPOS_KEY: &str = "total_repos";

/// Key of the serialized [`RecentList`].
pub const RECENT_KEY: &str = "recent";

/// Result type for metadata operations.
pub type MetaResult<T> = Result<T, MetaError>;

/// Load a metadata value, treating a missing or unreadable value as `V::default()`.
///
/// A missing bucket is still an error.
pub(crate) fn load_lossy<T, V>(tx: &T, key: &str) -> MetaResult<V>
where
    T: reportcard_storage::DbTx + ?Sized,
    V: reportcard_storage::Decode + Default,
{
    match tx.get_value::<V>(META_BUCKET, key) {
        Ok(value) => Ok(value.unwrap_or_default()),
        Err(err) if err.is_decode() => {
            tracing::warn!(key, %err, "Discarding unreadable metadata value");
            Ok(V::default())
        }
        Err(err) => Err(err.into()),
    }
}
