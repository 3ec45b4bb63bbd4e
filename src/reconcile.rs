//! Missing-file reconciliation.
//!
//! Compares every stored path against the filesystem and toggles the
//! reserved `Missing` tag so it matches reality.

use crate::domain::{SystemTag, TaggedFile};
use crate::store::{StoreError, StoreResult, TagStore};
use serde::Serialize;
use std::path::{Path, PathBuf};

// ===========================================
// Path Probing
// ===========================================

/// Answers whether a stored path still exists.
pub trait PathProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Probes the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

impl<F> PathProbe for F
where
    F: Fn(&Path) -> bool,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

// ===========================================
// Report
// ===========================================

/// A file whose `Missing` tag could not be updated.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Number of stored files examined.
    pub checked: usize,
    /// Files that gained the `Missing` tag.
    pub marked_missing: Vec<PathBuf>,
    /// Files that lost the `Missing` tag.
    pub restored: Vec<PathBuf>,
    pub failures: Vec<ReconcileFailure>,
}

impl ReconcileReport {
    /// Returns true if nothing needed to change and nothing failed.
    pub fn is_clean(&self) -> bool {
        self.marked_missing.is_empty() && self.restored.is_empty() && self.failures.is_empty()
    }

    /// Number of files whose tag set changed or needs to change.
    pub fn changed(&self) -> usize {
        self.marked_missing.len() + self.restored.len()
    }
}

#[derive(Clone, Copy)]
enum Toggle {
    MarkMissing,
    Restore,
}

// ===========================================
// Reconciler
// ===========================================

/// Keeps the `Missing` tag in step with the filesystem.
pub struct Reconciler<'a, P = FsProbe> {
    store: &'a TagStore,
    probe: P,
}

impl<'a> Reconciler<'a, FsProbe> {
    /// Creates a reconciler that checks the local filesystem.
    pub fn new(store: &'a TagStore) -> Self {
        Self::with_probe(store, FsProbe)
    }
}

impl<'a, P: PathProbe> Reconciler<'a, P> {
    /// Creates a reconciler with a custom existence check.
    pub fn with_probe(store: &'a TagStore, probe: P) -> Self {
        Self { store, probe }
    }

    /// Reports which files would change without writing anything.
    pub fn scan(&self) -> StoreResult<ReconcileReport> {
        let files = self.store.all_files()?;
        let mut report = ReconcileReport {
            checked: files.len(),
            ..Default::default()
        };

        for file in &files {
            match self.toggle_for(file) {
                Some(Toggle::MarkMissing) => {
                    report.marked_missing.push(file.path().to_path_buf())
                }
                Some(Toggle::Restore) => report.restored.push(file.path().to_path_buf()),
                None => {}
            }
        }
        Ok(report)
    }

    /// Adds or removes `Missing` on every file whose state disagrees with disk.
    ///
    /// Each file is updated in its own transaction. A failure on one file is
    /// recorded in the report and the pass continues. A file deleted from the
    /// store mid-pass is skipped.
    ///
    /// # Errors
    ///
    /// Only if the initial listing fails, or on a fatal store error.
    pub fn run(&self) -> StoreResult<ReconcileReport> {
        let files = self.store.all_files()?;
        let mut report = ReconcileReport {
            checked: files.len(),
            ..Default::default()
        };

        for mut file in files {
            let Some(toggle) = self.toggle_for(&file) else {
                continue;
            };
            match toggle {
                Toggle::MarkMissing => file.add_tag(SystemTag::Missing.name()),
                Toggle::Restore => file.remove_tag(SystemTag::Missing.name()),
            };

            let path = file.path().to_path_buf();
            match self.store.update_file_tags(&file) {
                Ok(()) => match toggle {
                    Toggle::MarkMissing => {
                        tracing::info!(path = %path.display(), "marked file missing");
                        report.marked_missing.push(path);
                    }
                    Toggle::Restore => {
                        tracing::info!(path = %path.display(), "file found again");
                        report.restored.push(path);
                    }
                },
                Err(StoreError::FileNotFound { .. }) => {
                    tracing::debug!(path = %path.display(), "file removed during reconcile");
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to update missing tag"
                    );
                    report.failures.push(ReconcileFailure {
                        path,
                        error: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            checked = report.checked,
            marked_missing = report.marked_missing.len(),
            restored = report.restored.len(),
            failures = report.failures.len(),
            "reconcile finished"
        );
        Ok(report)
    }

    fn toggle_for(&self, file: &TaggedFile) -> Option<Toggle> {
        let missing = file.has_system_tag(SystemTag::Missing);
        let exists = self.probe.exists(file.path());
        match (exists, missing) {
            (false, false) => Some(Toggle::MarkMissing),
            (true, true) => Some(Toggle::Restore),
            _ => None,
        }
    }
}
