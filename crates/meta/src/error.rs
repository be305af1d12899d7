//! Metadata error types.

use reportcard_storage::DatabaseError;

/// Errors from metadata operations.
///
/// A score that does not make it onto the leaderboard is not an error; see
/// [`UpsertOutcome`](crate::UpsertOutcome).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum MetaError {
    /// The metadata bucket was never provisioned.
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    /// A value could not be encoded for writing.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The store could not be opened, locked or committed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Score is NaN or infinite.
    #[error("invalid score: {0}")]
    InvalidScore(f64),
}

impl From<DatabaseError> for MetaError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::BucketNotFound(bucket) => MetaError::BucketNotFound(bucket),
            DatabaseError::Encode(reason) | DatabaseError::Decode(reason) => {
                MetaError::Serialization(reason)
            }
            other => MetaError::StoreUnavailable(other.to_string()),
        }
    }
}
