//! Storage engine traits.
//!
//! The [`Database`] trait abstracts over engines, allowing implementations
//! like redb or in-memory for testing.

use crate::{DatabaseError, DatabaseResult, Decode, Encode};

/// A bucketed key-value engine with transactional access.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Send + Sync). Write transactions are
/// serialized; acquiring the write lock is bounded by the engine's timeout
/// and fails with [`DatabaseError::Timeout`] when exceeded.
pub trait Database: Send + Sync {
    /// Read-only snapshot transaction.
    type Tx<'db>: DbTx
    where
        Self: 'db;

    /// Read-write transaction.
    type TxMut<'db>: DbTxMut
    where
        Self: 'db;

    /// Begin a read-only transaction.
    fn tx(&self) -> DatabaseResult<Self::Tx<'_>>;

    /// Begin a read-write transaction, waiting at most the engine timeout for
    /// the write lock.
    fn tx_mut(&self) -> DatabaseResult<Self::TxMut<'_>>;

    /// Run `f` against a read-only snapshot.
    fn view<'db, T, E, F>(&'db self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self::Tx<'db>) -> Result<T, E>,
        E: From<DatabaseError>,
    {
        let tx = self.tx()?;
        f(&tx)
    }

    /// Run `f` inside a read-write transaction.
    ///
    /// The transaction commits if `f` succeeds and is aborted otherwise, so
    /// either every write made by `f` lands or none does.
    fn update<'db, T, E, F>(&'db self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self::TxMut<'db>) -> Result<T, E>,
        E: From<DatabaseError>,
    {
        let mut tx = self.tx_mut()?;
        match f(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                tx.abort();
                Err(err)
            }
        }
    }
}

/// Read access to named buckets.
pub trait DbTx {
    /// Check if a bucket exists.
    fn has_bucket(&self, bucket: &str) -> DatabaseResult<bool>;

    /// Get a value's raw bytes.
    ///
    /// Returns `None` if the key is absent and [`DatabaseError::BucketNotFound`]
    /// if the bucket is.
    fn get(&self, bucket: &str, key: &str) -> DatabaseResult<Option<Vec<u8>>>;

    /// Get and decode a value.
    fn get_value<V: Decode>(&self, bucket: &str, key: &str) -> DatabaseResult<Option<V>> {
        self.get(bucket, key)?
            .map(|bytes| V::decode(&bytes))
            .transpose()
    }
}

/// Write access to named buckets.
///
/// Writes are only visible to this transaction until [`DbTxMut::commit`].
/// Dropping the transaction without committing discards them.
pub trait DbTxMut: DbTx {
    /// Create a bucket. Does nothing if it already exists.
    fn create_bucket(&mut self, bucket: &str) -> DatabaseResult<()>;

    /// Store a value's raw bytes, replacing any previous value.
    ///
    /// Fails with [`DatabaseError::BucketNotFound`] rather than creating the bucket.
    fn put(&mut self, bucket: &str, key: &str, value: &[u8]) -> DatabaseResult<()>;

    /// Encode and store a value.
    fn put_value<V: Encode + ?Sized>(
        &mut self,
        bucket: &str,
        key: &str,
        value: &V,
    ) -> DatabaseResult<()> {
        let bytes = value.encode()?;
        self.put(bucket, key, &bytes)
    }

    /// Commit all writes atomically.
    fn commit(self) -> DatabaseResult<()>;

    /// Discard all writes.
    fn abort(self);
}
