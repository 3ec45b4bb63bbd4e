//! SQLite-backed tag store implementation.

mod connection;
mod files;
mod queries;
mod tags;
mod transaction;


use rand::rngs::StdRng;
use rusqlite::Connection;
use std::sync::Mutex;
use std::time::Duration;

pub use tags::TagWithCount;
pub use transaction::Transaction;

// ===========================================
// TagStore Struct
// ===========================================

/// SQLite-backed store of files, tags, and their associations.
///
/// The store owns a single connection behind a mutex, so every operation
/// takes `&self` and the store can be shared between threads. Write
/// operations never interleave, and reads never observe another caller's
/// open transaction.
pub struct TagStore {
    inner: Mutex<StoreInner>,
}

/// State guarded by the store mutex.
pub(crate) struct StoreInner {
    pub(crate) conn: Connection,
    pub(crate) rng: StdRng,
}

// ===========================================
// StoreOptions
// ===========================================

/// Connection settings applied once when a store is opened.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// How long SQLite waits on a locked database before failing.
    pub busy_timeout: Duration,

    /// Seed for tag color generation. `None` seeds from OS entropy.
    pub color_seed: Option<u64>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5000),
            color_seed: None,
        }
    }
}

impl StoreOptions {
    /// Sets the busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Seeds tag color generation for reproducible colors.
    pub fn color_seed(mut self, seed: u64) -> Self {
        self.color_seed = Some(seed);
        self
    }
}
