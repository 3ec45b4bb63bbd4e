//! Shared row decoding and lookup helpers.

use crate::domain::{Color, SystemTag, Tag, TaggedFile, name_color};
use crate::store::{StoreError, StoreResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Params};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Columns selected by every file listing query, in order.
pub(super) const FILE_COLUMNS: &str =
    "f.file_path, f.file_name, f.created_at, f.last_accessed_at, t.tag_name";

/// Outer join from files to tag names; files with no tags yield one row with a NULL tag.
pub(super) const FILE_JOIN: &str = "FROM files f
     LEFT JOIN file_tags ft ON f.file_path = ft.file_path
     LEFT JOIN tags t ON ft.tag_id = t.tag_id";

// ===========================================
// Paths & Timestamps
// ===========================================

/// Returns the stored key for a path.
pub(super) fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Formats a timestamp for storage.
pub(super) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Decodes a stored timestamp.
///
/// Accepts RFC 3339 text, SQLite `CURRENT_TIMESTAMP` text (with optional
/// fractional seconds), and integer epoch milliseconds. NULL decodes to the
/// Unix epoch.
pub(super) fn parse_timestamp(value: &Value) -> StoreResult<DateTime<Utc>> {
    match value {
        Value::Null => Ok(DateTime::<Utc>::default()),
        Value::Integer(millis) => DateTime::from_timestamp_millis(*millis)
            .ok_or_else(|| StoreError::InvalidData(format!("timestamp out of range: {millis}"))),
        Value::Real(millis) => DateTime::from_timestamp_millis(*millis as i64)
            .ok_or_else(|| StoreError::InvalidData(format!("timestamp out of range: {millis}"))),
        Value::Text(text) => {
            if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
                return Ok(ts.with_timezone(&Utc));
            }
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
                .map(|naive| naive.and_utc())
                .map_err(|e| StoreError::InvalidData(format!("invalid timestamp '{text}': {e}")))
        }
        Value::Blob(_) => Err(StoreError::InvalidData(
            "timestamp stored as blob".to_string(),
        )),
    }
}

// ===========================================
// File Rows
// ===========================================

type FileRow = (String, String, Value, Value, Option<String>);

/// Runs a file listing query and folds tag rows into files.
///
/// The query must select [`FILE_COLUMNS`] and order by `f.file_path` so that
/// rows of one file are adjacent.
pub(super) fn query_files(
    conn: &Connection,
    sql: &str,
    params: impl Params,
) -> StoreResult<Vec<TaggedFile>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Value>(2)?,
            row.get::<_, Value>(3)?,
            row.get::<_, Option<String>>(4)?,
        ))
    })?;

    let mut files: Vec<TaggedFile> = Vec::new();
    for row in rows {
        let (path, name, created, accessed, tag): FileRow = row?;

        let same_file = files
            .last()
            .is_some_and(|last| last.path() == Path::new(&path));
        if !same_file {
            let file = TaggedFile::new(PathBuf::from(path), name)
                .with_timestamps(parse_timestamp(&created)?, parse_timestamp(&accessed)?);
            files.push(file);
        }

        if let (Some(tag), Some(file)) = (tag, files.last_mut()) {
            file.add_tag(tag);
        }
    }
    Ok(files)
}

/// Returns true if a file row exists for `path`.
pub(super) fn file_exists(conn: &Connection, path: &str) -> StoreResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM files WHERE file_path = ?",
            [path],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Returns the paths `path` is recorded as referencing.
pub(super) fn related_paths(conn: &Connection, path: &str) -> StoreResult<BTreeSet<PathBuf>> {
    let related = conn
        .prepare(
            "SELECT related_file_path FROM file_relationships
             WHERE source_file_path = ? ORDER BY related_file_path",
        )?
        .query_map([path], |row| row.get::<_, String>(0))?
        .map(|r| r.map(PathBuf::from))
        .collect::<rusqlite::Result<_>>()?;
    Ok(related)
}

// ===========================================
// Tag Rows
// ===========================================

/// Loads every tag name with its stored color value.
pub(super) fn tag_rows(conn: &Connection) -> StoreResult<Vec<(String, Option<String>)>> {
    let rows = conn
        .prepare("SELECT tag_name, color FROM tags ORDER BY tag_name")?
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Returns the stored color value of one tag, or `None` if the tag is absent.
pub(super) fn tag_color(conn: &Connection, name: &str) -> StoreResult<Option<Option<String>>> {
    let color = conn
        .query_row(
            "SELECT color FROM tags WHERE tag_name = ?",
            [name],
            |row| row.get::<_, Option<String>>(0),
        )
        .optional()?;
    Ok(color)
}

/// Builds a tag from its stored row.
///
/// A hex color is used as is. Any other non-empty value is kept verbatim as
/// the tag's raw color. With nothing stored, system tags get their canonical
/// color and user tags one derived from the name, so repeated reads agree.
pub(super) fn decode_tag(name: String, color: Option<String>) -> Tag {
    match color.as_deref() {
        None | Some("") => match SystemTag::from_name(&name) {
            Some(system) => Tag::system(system),
            None => {
                let color = name_color(&name);
                Tag::new(name, color)
            }
        },
        Some(stored) => match stored.parse::<Color>() {
            Ok(color) => Tag::new(name, color),
            Err(_) => {
                tracing::debug!(tag = %name, color = stored, "tag color is not hex");
                Tag::with_raw_color(name, stored)
            }
        },
    }
}

/// Loads the stored colors of all tags whose color is a hex color.
pub(super) fn stored_colors(conn: &Connection) -> StoreResult<HashMap<String, Color>> {
    Ok(tag_rows(conn)?
        .into_iter()
        .filter_map(|(name, color)| {
            let color = color?.parse::<Color>().ok()?;
            Some((name, color))
        })
        .collect())
}

/// Inserts a tag if absent, or fills in its color if none is stored.
///
/// An existing stored color is never replaced.
pub(super) fn ensure_tag(conn: &Connection, name: &str, color: Color) -> StoreResult<()> {
    let changed = conn.execute(
        "INSERT INTO tags (tag_name, color) VALUES (?1, ?2)
         ON CONFLICT(tag_name) DO UPDATE SET color = excluded.color
         WHERE tags.color IS NULL OR tags.color = ''",
        rusqlite::params![name, color.to_hex()],
    )?;
    if changed > 0 {
        tracing::debug!(tag = name, color = %color, "stored tag");
    }
    Ok(())
}

/// Associates an existing tag with a file.
pub(super) fn link_tag(conn: &Connection, path: &str, name: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO file_tags (file_path, tag_id)
         SELECT ?1, tag_id FROM tags WHERE tag_name = ?2",
        [path, name],
    )?;
    Ok(())
}
