//! redb-based storage backend.
//!
//! This crate provides [`RedbDatabase`], a persistent [`Database`] backed by
//! the redb embedded database. Each bucket is a redb table keyed by string
//! with raw byte values.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};
use redb::{
    ReadTransaction, ReadableTable, TableDefinition, TableError, TableHandle, WriteTransaction,
};
use reportcard_storage::{Database, DatabaseError, DatabaseResult, DbTx, DbTxMut};
use tracing::{debug, trace, warn};

/// Delay between attempts to open a database file locked by another process.
const OPEN_RETRY_INTERVAL: Duration = Duration::from_millis(25);

/// Table definition for a bucket.
/// Key: value name
/// Value: encoded value bytes
fn bucket(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

/// redb-based database.
///
/// Uses redb for ACID-compliant persistent storage. redb already serializes
/// writers; the extra lock bounds how long a writer waits for its turn.
pub struct RedbDatabase {
    db: redb::Database,
    writer: Mutex<()>,
    timeout: Duration,
}

impl std::fmt::Debug for RedbDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbDatabase")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl RedbDatabase {
    /// Open or create a database at the given path.
    ///
    /// If another process holds the file, opening is retried until `timeout`
    /// elapses. The same `timeout` bounds the wait for the write lock.
    pub fn open<P: AsRef<Path>>(path: P, timeout: Duration) -> DatabaseResult<Self> {
        let path = path.as_ref();
        let deadline = Instant::now() + timeout;

        let db = loop {
            match redb::Database::create(path) {
                Ok(db) => break db,
                Err(redb::DatabaseError::DatabaseAlreadyOpen) if Instant::now() < deadline => {
                    trace!(path = %path.display(), "Database locked, retrying");
                    thread::sleep(OPEN_RETRY_INTERVAL);
                }
                Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                    warn!(path = %path.display(), ?timeout, "Timed out opening database");
                    return Err(DatabaseError::Timeout(timeout));
                }
                Err(err) => return Err(DatabaseError::Open(err.to_string())),
            }
        };

        debug!(path = %path.display(), "Opened redb database");
        Ok(Self {
            db,
            writer: Mutex::new(()),
            timeout,
        })
    }
}

impl Database for RedbDatabase {
    type Tx<'db> = RedbTx;
    type TxMut<'db> = RedbTxMut<'db>;

    fn tx(&self) -> DatabaseResult<RedbTx> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| DatabaseError::InitTx(e.to_string()))?;
        Ok(RedbTx { txn })
    }

    fn tx_mut(&self) -> DatabaseResult<RedbTxMut<'_>> {
        let guard = self
            .writer
            .try_lock_for(self.timeout)
            .ok_or(DatabaseError::Timeout(self.timeout))?;
        let txn = self
            .db
            .begin_write()
            .map_err(|e| DatabaseError::InitTx(e.to_string()))?;
        Ok(RedbTxMut { txn, _guard: guard })
    }
}

/// Read-only redb transaction.
pub struct RedbTx {
    txn: ReadTransaction,
}

impl std::fmt::Debug for RedbTx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbTx").finish_non_exhaustive()
    }
}

impl DbTx for RedbTx {
    fn has_bucket(&self, name: &str) -> DatabaseResult<bool> {
        let mut tables = self
            .txn
            .list_tables()
            .map_err(|e| DatabaseError::Read(e.to_string()))?;
        Ok(tables.any(|table| table.name() == name))
    }

    fn get(&self, name: &str, key: &str) -> DatabaseResult<Option<Vec<u8>>> {
        let table = match self.txn.open_table(bucket(name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => {
                return Err(DatabaseError::BucketNotFound(name.to_string()));
            }
            Err(err) => return Err(DatabaseError::Read(err.to_string())),
        };
        let value = table
            .get(key)
            .map_err(|e| DatabaseError::Read(e.to_string()))?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }
}

/// Read-write redb transaction.
pub struct RedbTxMut<'db> {
    txn: WriteTransaction,
    _guard: MutexGuard<'db, ()>,
}

impl std::fmt::Debug for RedbTxMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbTxMut").finish_non_exhaustive()
    }
}

impl RedbTxMut<'_> {
    fn require_bucket(&self, name: &str) -> DatabaseResult<()> {
        if self.has_bucket(name)? {
            Ok(())
        } else {
            Err(DatabaseError::BucketNotFound(name.to_string()))
        }
    }
}

impl DbTx for RedbTxMut<'_> {
    fn has_bucket(&self, name: &str) -> DatabaseResult<bool> {
        let mut tables = self
            .txn
            .list_tables()
            .map_err(|e| DatabaseError::Read(e.to_string()))?;
        Ok(tables.any(|table| table.name() == name))
    }

    fn get(&self, name: &str, key: &str) -> DatabaseResult<Option<Vec<u8>>> {
        // Opening a table in a write transaction creates it.
        self.require_bucket(name)?;
        let table = self
            .txn
            .open_table(bucket(name))
            .map_err(|e| DatabaseError::Read(e.to_string()))?;
        let value = table
            .get(key)
            .map_err(|e| DatabaseError::Read(e.to_string()))?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }
}

impl DbTxMut for RedbTxMut<'_> {
    fn create_bucket(&mut self, name: &str) -> DatabaseResult<()> {
        self.txn
            .open_table(bucket(name))
            .map_err(|e| DatabaseError::Write(e.to_string()))?;
        Ok(())
    }

    fn put(&mut self, name: &str, key: &str, value: &[u8]) -> DatabaseResult<()> {
        self.require_bucket(name)?;
        let mut table = self
            .txn
            .open_table(bucket(name))
            .map_err(|e| DatabaseError::Write(e.to_string()))?;
        table
            .insert(key, value)
            .map_err(|e| DatabaseError::Write(e.to_string()))?;
        Ok(())
    }

    fn commit(self) -> DatabaseResult<()> {
        self.txn
            .commit()
            .map_err(|e| DatabaseError::Commit(e.to_string()))
    }

    fn abort(self) {
        if let Err(err) = self.txn.abort() {
            warn!(%err, "Failed to abort write transaction");
        }
    }
}
