//! SQLite-backed storage of files, tags and their associations

mod error;
pub mod schema;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use sqlite::{StoreOptions, TagStore, TagWithCount, Transaction};
