//! Isolated test environment with temp directory.

use super::ShelfCommand;
use std::path::{Path, PathBuf};
use tagshelf::store::TagStore;
use tempfile::TempDir;

/// Isolated test environment with a temporary database and file tree.
///
/// Creates a temp directory that is automatically cleaned up on drop. Files
/// to tag live under `files/`, the database under `data/`, and the config
/// directory under `config/`, so tests never see the user's real setup.
pub struct TestEnv {
    /// The temporary directory (kept for lifetime management)
    _temp_dir: TempDir,
    /// Canonical path of the temp directory
    root: PathBuf,
}

impl TestEnv {
    /// Creates a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp directory");
        std::fs::create_dir_all(root.join("files")).expect("Failed to create files directory");
        std::fs::create_dir_all(root.join("config")).expect("Failed to create config directory");
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Returns the root of the temp directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding files to tag.
    pub fn files_dir(&self) -> PathBuf {
        self.root.join("files")
    }

    /// Returns the directory used as `XDG_CONFIG_HOME`.
    pub fn config_home(&self) -> PathBuf {
        self.root.join("config")
    }

    /// Returns the path of the test database.
    pub fn db_path(&self) -> PathBuf {
        self.root.join("data").join("tagshelf.db")
    }

    /// Writes a file under `files/` and returns its absolute path.
    ///
    /// Parent directories are created as needed.
    pub fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.files_dir().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Writes `config.toml` into the isolated config directory.
    pub fn write_config(&self, contents: &str) -> PathBuf {
        let dir = self.config_home().join("tagshelf");
        std::fs::create_dir_all(&dir).expect("Failed to create config directory");
        let path = dir.join("config.toml");
        std::fs::write(&path, contents).expect("Failed to write config");
        path
    }

    /// Opens the test database directly.
    pub fn open_store(&self) -> TagStore {
        TagStore::open(&self.db_path()).expect("Failed to open store")
    }

    /// Creates a ShelfCommand configured for this test environment.
    pub fn cmd(&self) -> ShelfCommand {
        ShelfCommand::new()
            .env("XDG_CONFIG_HOME", &self.config_home())
            .env("XDG_DATA_HOME", &self.root.join("data-home"))
            .db(&self.db_path())
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===========================================
    // Phase 1: TestEnv Foundation
    // ===========================================

    #[test]
    fn test_env_creates_temp_directory() {
        let env = TestEnv::new();
        assert!(env.root().is_dir(), "root should be a directory");
        assert!(env.files_dir().is_dir(), "files directory should exist");
    }

    #[test]
    fn test_env_cleanup_on_drop() {
        let path = {
            let env = TestEnv::new();
            env.root().to_path_buf()
        };
        assert!(
            !path.exists(),
            "temp directory should be cleaned up on drop"
        );
    }

    #[test]
    fn test_env_file_creates_nested_file() {
        let env = TestEnv::new();
        let path = env.file("docs/readme.txt", "hello");

        assert!(path.is_file());
        assert!(path.starts_with(env.files_dir()));
    }

    #[test]
    fn test_env_provides_command() {
        let env = TestEnv::new();
        let cmd = env.cmd();
        let args = cmd.get_args();
        assert_eq!(args[0], "--db");
        assert_eq!(args[1], env.db_path().to_string_lossy());
    }
}
