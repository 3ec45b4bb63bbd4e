//! The tagged file value type.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::tag::SystemTag;

/// A file tracked by the store, with its tag set.
///
/// Values are disconnected copies of stored state: changing one has no
/// effect until it is passed back through a store update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedFile {
    path: PathBuf,
    name: String,
    tags: BTreeSet<String>,
    created_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
    related: BTreeSet<PathBuf>,
}

impl TaggedFile {
    /// Creates an untagged file stamped with the current time.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            path: path.into(),
            name: name.into(),
            tags: BTreeSet::new(),
            created_at: now,
            last_accessed_at: now,
            related: BTreeSet::new(),
        }
    }

    /// Creates a file whose display name is the final path component.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self::new(path, name)
    }

    /// Replaces the tag set.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Records a related file. A file is never related to itself.
    pub fn with_related(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path != self.path {
            self.related.insert(path);
        }
        self
    }

    /// Sets both timestamps.
    pub fn with_timestamps(
        mut self,
        created_at: DateTime<Utc>,
        last_accessed_at: DateTime<Utc>,
    ) -> Self {
        self.created_at = created_at;
        self.last_accessed_at = last_accessed_at;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> DateTime<Utc> {
        self.last_accessed_at
    }

    /// Paths this file references.
    ///
    /// Only populated by single-file lookups; listing queries leave it empty.
    pub fn related_paths(&self) -> &BTreeSet<PathBuf> {
        &self.related
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains(name)
    }

    /// Returns true if the file carries the given system tag.
    pub fn has_system_tag(&self, tag: SystemTag) -> bool {
        self.has_tag(tag.name())
    }

    /// Adds a tag, returning false if it was already present.
    pub fn add_tag(&mut self, name: impl Into<String>) -> bool {
        self.tags.insert(name.into())
    }

    /// Removes a tag, returning false if it was absent.
    pub fn remove_tag(&mut self, name: &str) -> bool {
        self.tags.remove(name)
    }

    pub fn set_tags(&mut self, tags: BTreeSet<String>) {
        self.tags = tags;
    }

    pub(crate) fn set_related(&mut self, related: BTreeSet<PathBuf>) {
        self.related = related;
    }
}
