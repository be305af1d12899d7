use std::time::Duration;

/// Database error type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DatabaseError {
    /// Failed to open the database.
    #[error("failed to open the database: {0}")]
    Open(String),
    /// The requested bucket has not been created.
    #[error("bucket not found: {0}")]
    BucketNotFound(String),
    /// The database or its write lock could not be acquired in time.
    #[error("timed out after {0:?} waiting for the database")]
    Timeout(Duration),
    /// Failed to initiate a transaction.
    #[error("failed to initialize a transaction: {0}")]
    InitTx(String),
    /// Failed to read a value from a bucket.
    #[error("failed to read a value from a bucket: {0}")]
    Read(String),
    /// Failed to write a value into a bucket.
    #[error("failed to write a value into a bucket: {0}")]
    Write(String),
    /// Failed to commit transaction changes.
    #[error("failed to commit transaction changes: {0}")]
    Commit(String),
    /// Failed to encode a value.
    #[error("failed to encode a value: {0}")]
    Encode(String),
    /// Failed to decode a value.
    #[error("failed to decode a value: {0}")]
    Decode(String),
    /// Other unspecified error.
    #[error("{0}")]
    Other(String),
}

impl DatabaseError {
    /// Returns `true` if the value bytes were present but unreadable.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
