//! Store error type.

use crate::domain::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A tag name failed validation.
    #[error("invalid tag: {0}")]
    Validation(#[from] ValidationError),

    /// A file with this path is already tracked.
    #[error("file already exists in the store: {}", path.display())]
    DuplicateFile { path: PathBuf },

    /// No file with this path is tracked.
    #[error("file not found in the store: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// No tag with this name exists.
    #[error("tag not found: {name}")]
    TagNotFound { name: String },

    /// The operation would delete or recolor a reserved system tag.
    #[error("system tag '{name}' cannot be deleted or recolored")]
    SystemTagProtected { name: String },

    /// A tag filter query was given no tags.
    #[error("tag filter must name at least one tag")]
    EmptyTagFilter,

    /// A write transaction failed and was rolled back.
    #[error("{operation} failed and was rolled back: {source}")]
    Transaction {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// Schema creation or system-tag seeding failed. The store is unusable.
    #[error("failed to initialize store: {source}")]
    Bootstrap {
        #[source]
        source: rusqlite::Error,
    },

    /// A database error occurred outside a write transaction.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored value could not be decoded.
    #[error("invalid data in store: {0}")]
    InvalidData(String),

    /// An I/O error occurred.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A previous caller panicked while holding the connection.
    #[error("store connection lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Returns true if the store cannot be used after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StoreError::Bootstrap { .. } | StoreError::LockPoisoned
        )
    }

    /// Attaches the failed operation's name to a driver error.
    ///
    /// Non-driver errors pass through unchanged; they already describe the
    /// failure in domain terms.
    pub(crate) fn in_transaction(self, operation: &'static str) -> Self {
        match self {
            StoreError::Database(source) => StoreError::Transaction { operation, source },
            other => other,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
