//! File operations for TagStore.

use super::TagStore;
use super::queries::{
    FILE_COLUMNS, FILE_JOIN, ensure_tag, file_exists, format_timestamp, link_tag, path_key,
    query_files, related_paths, stored_colors,
};
use crate::domain::{TaggedFile, resolve_color, validate_tag_name};
use crate::store::{StoreError, StoreResult};
use chrono::Utc;
use rusqlite::params;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

impl TagStore {
    // ===========================================
    // Writes
    // ===========================================

    /// Adds a new file with its tags and relationships.
    ///
    /// Tags in `existing_tags` are assumed valid and skip validation; every
    /// other tag is validated first. Tags are created on first use. Related
    /// paths must already be stored. The whole operation is atomic.
    ///
    /// # Errors
    ///
    /// - `Validation` if a new tag name is invalid
    /// - `DuplicateFile` if the path is already stored
    /// - `FileNotFound` if a related path is not stored
    /// - `Transaction` if the database write fails
    pub fn add_file(&self, file: &TaggedFile, existing_tags: &HashSet<String>) -> StoreResult<()> {
        for tag in file.tags() {
            if !existing_tags.contains(tag) {
                validate_tag_name(tag)?;
            }
        }

        let path = path_key(file.path());
        self.write("add_file", |tx, rng| {
            if file_exists(tx.conn(), &path)? {
                return Err(StoreError::DuplicateFile {
                    path: file.path().to_path_buf(),
                });
            }

            tx.execute(
                "INSERT INTO files (file_path, file_name, created_at, last_accessed_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    path,
                    file.name(),
                    format_timestamp(file.created_at()),
                    format_timestamp(file.last_accessed_at()),
                ],
            )?;

            let colors = stored_colors(tx.conn())?;
            for tag in file.tags() {
                ensure_tag(tx.conn(), tag, resolve_color(tag, &colors, rng))?;
                link_tag(tx.conn(), &path, tag)?;
            }

            let now = format_timestamp(Utc::now());
            for related in file.related_paths() {
                let related_key = path_key(related);
                if !file_exists(tx.conn(), &related_key)? {
                    return Err(StoreError::FileNotFound {
                        path: related.clone(),
                    });
                }
                tx.execute(
                    "INSERT OR IGNORE INTO file_relationships
                         (source_file_path, related_file_path, created_at)
                     VALUES (?1, ?2, ?3)",
                    params![path, related_key, now],
                )?;
            }

            tracing::info!(path = %path, tags = file.tags().len(), "added file");
            Ok(())
        })
    }

    /// Replaces the stored tag set of a file and bumps its last-accessed time.
    ///
    /// Every tag is validated. Tags keep their stored color; new tags get a
    /// fresh one. The result is `file.tags()` exactly, never a merge with the
    /// previous set.
    ///
    /// # Errors
    ///
    /// - `Validation` if any tag name is invalid
    /// - `FileNotFound` if the path is not stored
    /// - `Transaction` if the database write fails
    pub fn update_file_tags(&self, file: &TaggedFile) -> StoreResult<()> {
        for tag in file.tags() {
            validate_tag_name(tag)?;
        }

        let path = path_key(file.path());
        self.write("update_file_tags", |tx, rng| {
            if !file_exists(tx.conn(), &path)? {
                return Err(StoreError::FileNotFound {
                    path: file.path().to_path_buf(),
                });
            }

            tx.execute("DELETE FROM file_tags WHERE file_path = ?", [&path])?;

            let colors = stored_colors(tx.conn())?;
            for tag in file.tags() {
                ensure_tag(tx.conn(), tag, resolve_color(tag, &colors, rng))?;
                link_tag(tx.conn(), &path, tag)?;
            }

            tx.execute(
                "UPDATE files SET last_accessed_at = ?1 WHERE file_path = ?2",
                params![format_timestamp(Utc::now()), path],
            )?;

            tracing::debug!(path = %path, tags = ?file.tags(), "replaced file tags");
            Ok(())
        })
    }

    /// Removes a file with all its associations and relationships.
    ///
    /// Children are deleted before the parent row, so this does not depend on
    /// `ON DELETE CASCADE`. Returns `true` if a file was removed.
    pub fn delete_file(&self, path: &Path) -> StoreResult<bool> {
        let key = path_key(path);
        self.write("delete_file", |tx, _| {
            tx.execute("DELETE FROM file_tags WHERE file_path = ?", [&key])?;
            tx.execute(
                "DELETE FROM file_relationships
                 WHERE source_file_path = ?1 OR related_file_path = ?1",
                [&key],
            )?;
            let removed = tx.execute("DELETE FROM files WHERE file_path = ?", [&key])?;
            if removed > 0 {
                tracing::info!(path = %key, "deleted file");
            }
            Ok(removed > 0)
        })
    }

    /// Bumps the last-accessed time of a file.
    ///
    /// # Errors
    ///
    /// `FileNotFound` if the path is not stored.
    pub fn touch_file(&self, path: &Path) -> StoreResult<()> {
        let key = path_key(path);
        self.write("touch_file", |tx, _| {
            let updated = tx.execute(
                "UPDATE files SET last_accessed_at = ?1 WHERE file_path = ?2",
                params![format_timestamp(Utc::now()), key],
            )?;
            if updated == 0 {
                return Err(StoreError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            Ok(())
        })
    }

    // ===========================================
    // Reads
    // ===========================================

    /// Returns every stored file with its tags, ordered by path.
    ///
    /// Files without tags are included with an empty tag set.
    pub fn all_files(&self) -> StoreResult<Vec<TaggedFile>> {
        let sql = format!("SELECT {FILE_COLUMNS} {FILE_JOIN} ORDER BY f.file_path");
        self.read(|conn| query_files(conn, &sql, []))
    }

    /// Returns one file with its tags and related paths.
    pub fn get_file(&self, path: &Path) -> StoreResult<Option<TaggedFile>> {
        let key = path_key(path);
        let sql = format!("SELECT {FILE_COLUMNS} {FILE_JOIN} WHERE f.file_path = ?1");
        self.read(|conn| {
            let Some(mut file) = query_files(conn, &sql, [&key])?.pop() else {
                return Ok(None);
            };
            file.set_related(related_paths(conn, &key)?);
            Ok(Some(file))
        })
    }

    /// Returns the paths recorded as related to `path`.
    pub fn related_files(&self, path: &Path) -> StoreResult<BTreeSet<PathBuf>> {
        let key = path_key(path);
        self.read(|conn| related_paths(conn, &key))
    }

    /// Returns the files carrying every tag in `names`.
    ///
    /// Duplicate names count once.
    ///
    /// # Errors
    ///
    /// `EmptyTagFilter` if `names` is empty. Callers that want "no filter"
    /// should use [`TagStore::all_files`] instead.
    pub fn files_by_tags<I, S>(&self, names: I) -> StoreResult<Vec<TaggedFile>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: BTreeSet<String> = names
            .into_iter()
            .map(|n| n.as_ref().to_string())
            .collect();
        if names.is_empty() {
            return Err(StoreError::EmptyTagFilter);
        }

        let placeholders = (1..=names.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let wanted = names.len() as i64;
        let count_param = names.len() + 1;
        let sql = format!(
            "SELECT {FILE_COLUMNS} {FILE_JOIN}
             WHERE f.file_path IN (
                 SELECT ft2.file_path FROM file_tags ft2
                 JOIN tags t2 ON ft2.tag_id = t2.tag_id
                 WHERE t2.tag_name IN ({placeholders})
                 GROUP BY ft2.file_path
                 HAVING COUNT(DISTINCT t2.tag_name) = ?{count_param}
             )
             ORDER BY f.file_path"
        );

        let mut values: Vec<rusqlite::types::Value> = names
            .into_iter()
            .map(rusqlite::types::Value::Text)
            .collect();
        values.push(rusqlite::types::Value::Integer(wanted));

        self.read(|conn| query_files(conn, &sql, rusqlite::params_from_iter(values)))
    }
}
