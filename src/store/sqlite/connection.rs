//! Connection management and bootstrap for TagStore.

use super::transaction::Transaction;
use super::{StoreInner, StoreOptions, TagStore};
use crate::store::schema::{backfill_tag_colors, create_schema, seed_system_tags};
use crate::store::{StoreError, StoreResult};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

impl TagStore {
    // ===========================================
    // In-Memory Connection
    // ===========================================

    /// Opens an in-memory store with default options.
    ///
    /// This is useful for testing and throwaway stores that don't need persistence.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open_in_memory_with(&StoreOptions::default())
    }

    /// Opens an in-memory store with the given options.
    pub fn open_in_memory_with(options: &StoreOptions) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, options)
    }

    // ===========================================
    // File-Based Connection
    // ===========================================

    /// Opens or creates a store at the given path with default options.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::open_with(path, &StoreOptions::default())
    }

    /// Opens or creates a store at the given path.
    ///
    /// Creates parent directories if they don't exist. Creates the schema and
    /// seeds the system tags if needed.
    pub fn open_with(path: &Path, options: &StoreOptions) -> StoreResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        tracing::debug!(path = %path.display(), "opening store");
        let conn = Connection::open(path)?;
        Self::from_connection(conn, options)
    }

    fn from_connection(conn: Connection, options: &StoreOptions) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(options.busy_timeout)?;

        let mut rng = match options.color_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        bootstrap(&conn, &mut rng).map_err(|source| {
            tracing::error!(error = %source, "store bootstrap failed");
            StoreError::Bootstrap { source }
        })?;

        Ok(Self {
            inner: Mutex::new(StoreInner { conn, rng }),
        })
    }

    // ===========================================
    // Connection Access
    // ===========================================

    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreInner>> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Runs `f` inside a single write transaction.
    ///
    /// Commits if `f` succeeds. Otherwise rolls back and returns the error,
    /// with driver errors tagged by `operation`.
    pub(crate) fn write<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&Transaction<'_>, &mut StdRng) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        let tx = Transaction::begin(&inner.conn)
            .map_err(|source| StoreError::Transaction { operation, source })?;

        match f(&tx, &mut inner.rng) {
            Ok(value) => {
                tx.commit()
                    .map_err(|source| StoreError::Transaction { operation, source })?;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(operation, error = %err, "rolling back transaction");
                if let Err(rollback_err) = tx.rollback() {
                    tracing::debug!(operation, error = %rollback_err, "explicit rollback failed");
                }
                Err(err.in_transaction(operation))
            }
        }
    }

    /// Runs a read against the connection outside any write transaction.
    pub(crate) fn read<T>(&self, f: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let guard = self.lock()?;
        f(&guard.conn)
    }

    /// Runs a raw query against the underlying connection.
    ///
    /// Intended for diagnostics and tests; writes made here bypass the
    /// store's transactional write paths.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> StoreResult<T> {
        let guard = self.lock()?;
        Ok(f(&guard.conn)?)
    }
}

/// Creates the schema, seeds system tags and backfills colors in one transaction.
fn bootstrap(conn: &Connection, rng: &mut StdRng) -> rusqlite::Result<()> {
    let tx = Transaction::begin(conn)?;
    create_schema(tx.conn())?;
    seed_system_tags(tx.conn())?;
    let filled = backfill_tag_colors(tx.conn(), rng)?;
    tx.commit()?;
    tracing::debug!(colors_filled = filled, "store schema ready");
    Ok(())
}
