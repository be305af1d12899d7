//! In-memory storage engine.
//!
//! Committed state is an immutable snapshot behind an [`Arc`]. Readers clone
//! the pointer, writers work on a private copy and swap it in on commit, which
//! gives the same snapshot isolation and single-writer semantics as the redb
//! engine.

use std::collections::BTreeMap;
#[cfg(any(test, feature = "test-utils"))]
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard, RwLock};
use tracing::trace;

use crate::{Database, DatabaseError, DatabaseResult, DbTx, DbTxMut};

/// Default time to wait for the write lock.
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

type Buckets = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

/// In-memory database.
#[derive(Debug)]
pub struct MemoryDatabase {
    /// Last committed state.
    committed: RwLock<Arc<Buckets>>,
    /// Held for the lifetime of a write transaction.
    writer: Mutex<()>,
    /// Maximum wait for `writer`.
    lock_timeout: Duration,
    /// `(bucket, key)` pairs whose writes fail, see [`Self::fail_writes_to`].
    #[cfg(any(test, feature = "test-utils"))]
    failing_writes: Mutex<HashSet<(String, String)>>,
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::with_lock_timeout(DEFAULT_LOCK_TIMEOUT)
    }
}

impl MemoryDatabase {
    /// Create a new empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty database with a custom write-lock timeout.
    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            committed: RwLock::new(Arc::new(Buckets::new())),
            writer: Mutex::new(()),
            lock_timeout,
            #[cfg(any(test, feature = "test-utils"))]
            failing_writes: Mutex::new(HashSet::new()),
        }
    }

    /// Make every subsequent write to `bucket`/`key` fail with
    /// [`DatabaseError::Write`].
    ///
    /// Used to exercise abort paths in callers.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn fail_writes_to(&self, bucket: &str, key: &str) {
        self.failing_writes
            .lock()
            .insert((bucket.to_string(), key.to_string()));
    }

    /// Clear all injected write failures.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn clear_write_failures(&self) {
        self.failing_writes.lock().clear();
    }

    fn snapshot(&self) -> Arc<Buckets> {
        Arc::clone(&self.committed.read())
    }

    #[cfg(any(test, feature = "test-utils"))]
    fn write_fails(&self, bucket: &str, key: &str) -> bool {
        self.failing_writes
            .lock()
            .contains(&(bucket.to_string(), key.to_string()))
    }

    #[cfg(not(any(test, feature = "test-utils")))]
    fn write_fails(&self, _bucket: &str, _key: &str) -> bool {
        false
    }
}

impl Database for MemoryDatabase {
    type Tx<'db> = MemoryTx;
    type TxMut<'db> = MemoryTxMut<'db>;

    fn tx(&self) -> DatabaseResult<MemoryTx> {
        Ok(MemoryTx {
            snapshot: self.snapshot(),
        })
    }

    fn tx_mut(&self) -> DatabaseResult<MemoryTxMut<'_>> {
        let guard = self
            .writer
            .try_lock_for(self.lock_timeout)
            .ok_or(DatabaseError::Timeout(self.lock_timeout))?;
        let pending = self.snapshot().as_ref().clone();
        trace!("Began memory write transaction");
        Ok(MemoryTxMut {
            db: self,
            _guard: guard,
            pending,
        })
    }
}

fn read(buckets: &Buckets, bucket: &str, key: &str) -> DatabaseResult<Option<Vec<u8>>> {
    buckets
        .get(bucket)
        .ok_or_else(|| DatabaseError::BucketNotFound(bucket.to_string()))
        .map(|entries| entries.get(key).cloned())
}

/// Read-only snapshot of a [`MemoryDatabase`].
#[derive(Debug)]
pub struct MemoryTx {
    snapshot: Arc<Buckets>,
}

impl DbTx for MemoryTx {
    fn has_bucket(&self, bucket: &str) -> DatabaseResult<bool> {
        Ok(self.snapshot.contains_key(bucket))
    }

    fn get(&self, bucket: &str, key: &str) -> DatabaseResult<Option<Vec<u8>>> {
        read(&self.snapshot, bucket, key)
    }
}

/// Read-write transaction on a [`MemoryDatabase`].
#[derive(Debug)]
pub struct MemoryTxMut<'db> {
    db: &'db MemoryDatabase,
    _guard: MutexGuard<'db, ()>,
    pending: Buckets,
}

impl DbTx for MemoryTxMut<'_> {
    fn has_bucket(&self, bucket: &str) -> DatabaseResult<bool> {
        Ok(self.pending.contains_key(bucket))
    }

    fn get(&self, bucket: &str, key: &str) -> DatabaseResult<Option<Vec<u8>>> {
        read(&self.pending, bucket, key)
    }
}

impl DbTxMut for MemoryTxMut<'_> {
    fn create_bucket(&mut self, bucket: &str) -> DatabaseResult<()> {
        self.pending.entry(bucket.to_string()).or_default();
        Ok(())
    }

    fn put(&mut self, bucket: &str, key: &str, value: &[u8]) -> DatabaseResult<()> {
        if self.db.write_fails(bucket, key) {
            return Err(DatabaseError::Write(format!("injected failure for {bucket}/{key}")));
        }
        let entries = self
            .pending
            .get_mut(bucket)
            .ok_or_else(|| DatabaseError::BucketNotFound(bucket.to_string()))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn commit(self) -> DatabaseResult<()> {
        let Self { db, _guard, pending } = self;
        *db.committed.write() = Arc::new(pending);
        trace!("Committed memory write transaction");
        Ok(())
    }

    fn abort(self) {
        trace!("Aborted memory write transaction");
    }
}
