//! Validation gate in front of the store.
//!
//! [`TagService`] re-checks user input before it reaches the store and turns
//! store failures into [`UserError`]s that carry a category and a message fit
//! for display. Nothing here retries a failed write.

use crate::domain::{Color, Tag, TaggedFile, validate_tag_name};
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::store::{StoreError, TagStore, TagWithCount};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ===========================================
// User Errors
// ===========================================

/// Broad kind of a user-facing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    InvalidTag,
    DuplicateFile,
    SystemTag,
    NotFound,
    InvalidInput,
    Storage,
}

impl ErrorCategory {
    /// Short title for the category.
    pub fn title(self) -> &'static str {
        match self {
            Self::InvalidTag => "Invalid Tag",
            Self::DuplicateFile => "Duplicate File",
            Self::SystemTag => "System Tag",
            Self::NotFound => "Not Found",
            Self::InvalidInput => "Invalid Input",
            Self::Storage => "Database Error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A failure ready to be shown to the user.
#[derive(Debug, Error)]
#[error("{headline}")]
pub struct UserError {
    pub category: ErrorCategory,
    pub headline: String,
    pub detail: String,
    #[source]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl UserError {
    /// Builds a user error from a store failure.
    ///
    /// `headline` describes what was being attempted. Duplicate adds use a
    /// fixed headline instead.
    pub fn from_store(err: StoreError, headline: impl Into<String>) -> Self {
        let category = match &err {
            StoreError::Validation(_) => ErrorCategory::InvalidTag,
            StoreError::DuplicateFile { .. } => ErrorCategory::DuplicateFile,
            StoreError::SystemTagProtected { .. } => ErrorCategory::SystemTag,
            StoreError::FileNotFound { .. } | StoreError::TagNotFound { .. } => {
                ErrorCategory::NotFound
            }
            StoreError::EmptyTagFilter => ErrorCategory::InvalidInput,
            StoreError::Transaction { .. }
            | StoreError::Bootstrap { .. }
            | StoreError::Database(_)
            | StoreError::InvalidData(_)
            | StoreError::Io { .. }
            | StoreError::LockPoisoned => ErrorCategory::Storage,
        };
        let headline = match category {
            ErrorCategory::DuplicateFile => "This file has already been added".to_string(),
            _ => headline.into(),
        };
        Self {
            category,
            headline,
            detail: err.to_string(),
            source: Box::new(err),
        }
    }

    /// Builds an `InvalidInput` error from any parse or argument failure.
    pub fn invalid_input(
        headline: impl Into<String>,
        err: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category: ErrorCategory::InvalidInput,
            headline: headline.into(),
            detail: err.to_string(),
            source: Box::new(err),
        }
    }

    /// Returns the category title, e.g. "Invalid Tag".
    pub fn title(&self) -> &'static str {
        self.category.title()
    }
}

/// Result alias for facade operations.
pub type ServiceResult<T> = Result<T, UserError>;

// ===========================================
// TagService
// ===========================================

/// User-facing operations over a [`TagStore`].
pub struct TagService<'a> {
    store: &'a TagStore,
}

impl<'a> TagService<'a> {
    pub fn new(store: &'a TagStore) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &'a TagStore {
        self.store
    }

    // -------------------------------------------
    // Files
    // -------------------------------------------

    /// Adds a file. Tags outside `existing_tags` are validated.
    pub fn add_file(
        &self,
        file: &TaggedFile,
        existing_tags: &HashSet<String>,
    ) -> ServiceResult<()> {
        let headline = format!("Could not add file: {}", file.name());
        for tag in file.tags() {
            if !existing_tags.contains(tag) {
                validate(tag, &headline)?;
            }
        }
        self.store
            .add_file(file, existing_tags)
            .map_err(|e| UserError::from_store(e, headline))
    }

    /// Replaces a file's tag set.
    pub fn update_file_tags(&self, file: &TaggedFile) -> ServiceResult<()> {
        let headline = format!("Could not update tags for file: {}", file.name());
        for tag in file.tags() {
            validate(tag, &headline)?;
        }
        self.store
            .update_file_tags(file)
            .map_err(|e| UserError::from_store(e, headline))
    }

    /// Adds `tags` to a file's current tag set and returns the updated file.
    pub fn tag_file<I, S>(&self, path: &Path, tags: I) -> ServiceResult<TaggedFile>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut file = self.get_file(path)?;
        for tag in tags {
            file.add_tag(tag);
        }
        self.update_file_tags(&file)?;
        Ok(file)
    }

    /// Replaces a file's tag set with `tags` and returns the updated file.
    pub fn retag_file<I, S>(&self, path: &Path, tags: I) -> ServiceResult<TaggedFile>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut file = self.get_file(path)?;
        file.set_tags(tags.into_iter().map(Into::into).collect());
        self.update_file_tags(&file)?;
        Ok(file)
    }

    /// Deletes a file. Returns `true` if it was stored.
    pub fn delete_file(&self, path: &Path) -> ServiceResult<bool> {
        let headline = format!("Could not delete file: {}", path.display());
        self.store
            .delete_file(path)
            .map_err(|e| UserError::from_store(e, headline))
    }

    /// Bumps a file's last-accessed time.
    pub fn touch_file(&self, path: &Path) -> ServiceResult<()> {
        let headline = format!("Could not update file: {}", path.display());
        self.store
            .touch_file(path)
            .map_err(|e| UserError::from_store(e, headline))
    }

    /// Returns one file with its related paths.
    pub fn get_file(&self, path: &Path) -> ServiceResult<TaggedFile> {
        let headline = format!("Could not load file: {}", path.display());
        match self.store.get_file(path) {
            Ok(Some(file)) => Ok(file),
            Ok(None) => Err(UserError::from_store(
                StoreError::FileNotFound {
                    path: path.to_path_buf(),
                },
                headline,
            )),
            Err(e) => Err(UserError::from_store(e, headline)),
        }
    }

    /// Returns the paths recorded as related to `path`.
    pub fn related_files(&self, path: &Path) -> ServiceResult<BTreeSet<PathBuf>> {
        self.store
            .related_files(path)
            .map_err(|e| UserError::from_store(e, "Could not load related files"))
    }

    pub fn all_files(&self) -> ServiceResult<Vec<TaggedFile>> {
        self.store
            .all_files()
            .map_err(|e| UserError::from_store(e, "Could not load files from database"))
    }

    /// Returns files carrying every tag in `tags`. No tags means no filter.
    pub fn files_by_tags<I, S>(&self, tags: I) -> ServiceResult<Vec<TaggedFile>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags: Vec<S> = tags.into_iter().collect();
        if tags.is_empty() {
            return self.all_files();
        }
        self.store
            .files_by_tags(tags)
            .map_err(|e| UserError::from_store(e, "Failed to get files by tags"))
    }

    // -------------------------------------------
    // Tags
    // -------------------------------------------

    pub fn all_tags(&self) -> ServiceResult<BTreeSet<String>> {
        self.store
            .all_tags()
            .map_err(|e| UserError::from_store(e, "Failed to retrieve tags"))
    }

    pub fn all_tags_with_colors(&self) -> ServiceResult<BTreeMap<String, Tag>> {
        self.store
            .all_tags_with_colors()
            .map_err(|e| UserError::from_store(e, "Failed to retrieve tags"))
    }

    pub fn tag_counts(&self) -> ServiceResult<Vec<TagWithCount>> {
        self.store
            .tag_counts()
            .map_err(|e| UserError::from_store(e, "Failed to retrieve tags"))
    }

    /// Creates a tag, or returns the existing one.
    pub fn add_tag(&self, name: &str, color: Option<Color>) -> ServiceResult<Tag> {
        let headline = format!("Could not add tag: {name}");
        validate(name, &headline)?;
        self.store
            .add_tag(name, color)
            .map_err(|e| UserError::from_store(e, headline))
    }

    /// Sets a user tag's color from a `#RRGGBB` string.
    pub fn update_tag_color(&self, name: &str, hex: &str) -> ServiceResult<Tag> {
        let color = hex
            .parse::<Color>()
            .map_err(|e| UserError::invalid_input(format!("Invalid color for tag: {name}"), e))?;
        self.store
            .update_tag_color(name, color)
            .map_err(|e| UserError::from_store(e, format!("Could not recolor tag: {name}")))
    }

    /// Deletes a user tag from every file. Returns `true` if it existed.
    pub fn delete_tag(&self, name: &str) -> ServiceResult<bool> {
        let headline = format!("Could not delete tag: {name}");
        validate(name, &headline)?;
        self.store
            .delete_tag(name)
            .map_err(|e| UserError::from_store(e, headline))
    }

    /// Removes one tag from one file. Returns `true` if it was attached.
    pub fn delete_tag_from_file(&self, path: &Path, name: &str) -> ServiceResult<bool> {
        let headline = "Could not remove tag from file";
        validate(name, headline)?;
        self.store
            .delete_tag_from_file(path, name)
            .map_err(|e| UserError::from_store(e, headline))
    }

    // -------------------------------------------
    // Reconciliation
    // -------------------------------------------

    /// Brings the `Missing` tag in line with the filesystem.
    pub fn check_missing(&self) -> ServiceResult<ReconcileReport> {
        Reconciler::new(self.store)
            .run()
            .map_err(|e| UserError::from_store(e, "Error checking for missing files"))
    }

    /// Reports what [`TagService::check_missing`] would change.
    pub fn scan_missing(&self) -> ServiceResult<ReconcileReport> {
        Reconciler::new(self.store)
            .scan()
            .map_err(|e| UserError::from_store(e, "Error checking for missing files"))
    }
}

fn validate(name: &str, headline: &str) -> ServiceResult<()> {
    validate_tag_name(name).map_err(|e| UserError::from_store(e.into(), headline))
}
