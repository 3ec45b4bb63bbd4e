//! Tag operations for TagStore.

use super::TagStore;
use super::queries::{decode_tag, ensure_tag, path_key, tag_color, tag_rows};
use crate::domain::{Color, SystemTag, Tag, default_color, is_system_tag, validate_tag_name};
use crate::store::{StoreError, StoreResult};
use rusqlite::{OptionalExtension, params};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// A tag along with the number of files carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagWithCount {
    pub tag: Tag,
    pub count: u32,
}

impl TagStore {
    // ===========================================
    // Reads
    // ===========================================

    /// Returns the names of all stored tags, including system tags.
    pub fn all_tags(&self) -> StoreResult<BTreeSet<String>> {
        self.read(|conn| {
            let names = conn
                .prepare("SELECT tag_name FROM tags")?
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<_>>()?;
            Ok(names)
        })
    }

    /// Returns every tag keyed by name with its display color.
    ///
    /// Nothing is generated or written here: a color that isn't `#RRGGBB`
    /// comes back as the tag's raw color, unchanged between calls.
    pub fn all_tags_with_colors(&self) -> StoreResult<BTreeMap<String, Tag>> {
        self.read(|conn| {
            Ok(tag_rows(conn)?
                .into_iter()
                .map(|(name, color)| (name.clone(), decode_tag(name, color)))
                .collect())
        })
    }

    /// Returns every tag with the number of files it is attached to.
    ///
    /// Ordered by count descending, then by name.
    pub fn tag_counts(&self) -> StoreResult<Vec<TagWithCount>> {
        self.read(|conn| {
            let rows = conn
                .prepare(
                    "SELECT t.tag_name, t.color, COUNT(ft.file_path)
                     FROM tags t
                     LEFT JOIN file_tags ft ON t.tag_id = ft.tag_id
                     GROUP BY t.tag_id
                     ORDER BY COUNT(ft.file_path) DESC, t.tag_name",
                )?
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, u32>(2)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(rows
                .into_iter()
                .map(|(name, color, count)| TagWithCount {
                    tag: decode_tag(name, color),
                    count,
                })
                .collect())
        })
    }

    // ===========================================
    // Writes
    // ===========================================

    /// Creates a tag if it doesn't exist and returns it with its stored color.
    ///
    /// System tags always end up with their canonical color. An existing user
    /// tag keeps its color and `color` is ignored; use
    /// [`TagStore::update_tag_color`] to change it. A new user tag gets
    /// `color` if given, otherwise a generated one.
    pub fn add_tag(&self, name: &str, color: Option<Color>) -> StoreResult<Tag> {
        validate_tag_name(name)?;

        self.write("add_tag", |tx, rng| {
            if let Some(system) = SystemTag::from_name(name) {
                tx.execute(
                    "INSERT INTO tags (tag_name, color) VALUES (?1, ?2)
                     ON CONFLICT(tag_name) DO UPDATE SET color = excluded.color",
                    params![name, system.color().to_hex()],
                )?;
                return Ok(Tag::system(system));
            }

            match tag_color(tx.conn(), name)? {
                Some(Some(stored)) if !stored.is_empty() => {
                    Ok(decode_tag(name.to_string(), Some(stored)))
                }
                _ => {
                    let color = color.unwrap_or_else(|| default_color(name, rng));
                    ensure_tag(tx.conn(), name, color)?;
                    Ok(Tag::new(name, color))
                }
            }
        })
    }

    /// Sets the color of an existing user tag.
    ///
    /// # Errors
    ///
    /// - `SystemTagProtected` for a system tag
    /// - `TagNotFound` if no such tag exists
    pub fn update_tag_color(&self, name: &str, color: Color) -> StoreResult<Tag> {
        if is_system_tag(name) {
            return Err(StoreError::SystemTagProtected {
                name: name.to_string(),
            });
        }

        self.write("update_tag_color", |tx, _| {
            let updated = tx.execute(
                "UPDATE tags SET color = ?1 WHERE tag_name = ?2",
                params![color.to_hex(), name],
            )?;
            if updated == 0 {
                return Err(StoreError::TagNotFound {
                    name: name.to_string(),
                });
            }
            tracing::info!(tag = name, color = %color, "recolored tag");
            Ok(Tag::new(name, color))
        })
    }

    /// Deletes a user tag and detaches it from every file.
    ///
    /// Returns `true` if the tag existed. The files themselves are kept.
    ///
    /// # Errors
    ///
    /// `SystemTagProtected` for a system tag; nothing is changed.
    pub fn delete_tag(&self, name: &str) -> StoreResult<bool> {
        if is_system_tag(name) {
            return Err(StoreError::SystemTagProtected {
                name: name.to_string(),
            });
        }

        self.write("delete_tag", |tx, _| {
            let detached = tx.execute(
                "DELETE FROM file_tags
                 WHERE tag_id IN (SELECT tag_id FROM tags WHERE tag_name = ?)",
                [name],
            )?;
            let removed = tx.execute("DELETE FROM tags WHERE tag_name = ?", [name])?;
            if removed > 0 {
                tracing::info!(tag = name, files = detached, "deleted tag");
            }
            Ok(removed > 0)
        })
    }

    /// Detaches one tag from one file.
    ///
    /// The tag itself is kept even if no file carries it anymore. Returns
    /// `true` if an association was removed.
    pub fn delete_tag_from_file(&self, path: &Path, name: &str) -> StoreResult<bool> {
        let key = path_key(path);
        self.write("delete_tag_from_file", |tx, _| {
            let tag_id: Option<i64> = tx
                .conn()
                .query_row(
                    "SELECT tag_id FROM tags WHERE tag_name = ?",
                    [name],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(tag_id) = tag_id else {
                return Ok(false);
            };

            let removed = tx.execute(
                "DELETE FROM file_tags WHERE file_path = ?1 AND tag_id = ?2",
                params![key, tag_id],
            )?;
            if removed > 0 {
                tracing::debug!(path = %key, tag = name, "removed tag from file");
            }
            Ok(removed > 0)
        })
    }
}
