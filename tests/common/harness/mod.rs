//! Test harness for CLI integration tests.
//!
//! Provides isolated test environments with their own database and config
//! directories, and CLI assertion helpers using `assert_cmd`.

mod command;
mod env;

// Re-export main types for external use
#[allow(unused_imports)]
pub use command::ShelfCommand;
#[allow(unused_imports)]
pub use env::TestEnv;
