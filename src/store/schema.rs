//! SQLite schema creation and system-tag seeding.

use rand::Rng;
use rusqlite::{Connection, params};

use crate::domain::{SystemTag, default_color};

/// Creates the database schema for the tag store.
///
/// This function creates all required tables and indexes. It is idempotent -
/// calling it multiple times is safe. Callers run it inside the bootstrap
/// transaction together with [`seed_system_tags`].
///
/// # Tables Created
/// - `files` - Tracked files keyed by absolute path
/// - `tags` - Tag names and display colors
/// - `file_tags` - Many-to-many junction for files and tags
/// - `file_relationships` - Directed references between files
pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS files (
            file_path TEXT PRIMARY KEY,
            file_name TEXT NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            last_accessed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );",
    )?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tags (
            tag_id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag_name TEXT UNIQUE NOT NULL,
            color TEXT
        );",
    )?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS file_tags (
            file_path TEXT,
            tag_id INTEGER,
            PRIMARY KEY (file_path, tag_id),
            FOREIGN KEY (file_path) REFERENCES files(file_path) ON DELETE CASCADE,
            FOREIGN KEY (tag_id) REFERENCES tags(tag_id) ON DELETE CASCADE
        );",
    )?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS file_relationships (
            source_file_path TEXT,
            related_file_path TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (source_file_path, related_file_path),
            FOREIGN KEY (source_file_path) REFERENCES files(file_path) ON DELETE CASCADE,
            FOREIGN KEY (related_file_path) REFERENCES files(file_path) ON DELETE CASCADE
        );",
    )?;

    // Databases written before tag colors existed lack the column.
    if !has_column(conn, "tags", "color")? {
        tracing::info!("adding missing tags.color column");
        conn.execute_batch("ALTER TABLE tags ADD COLUMN color TEXT;")?;
    }

    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_files_last_accessed ON files(last_accessed_at);
         CREATE INDEX IF NOT EXISTS idx_files_created_at ON files(created_at);
         CREATE INDEX IF NOT EXISTS idx_tags_name ON tags(tag_name);",
    )?;

    Ok(())
}

/// Ensures every system tag exists with its canonical color.
///
/// A system tag with a missing or stale color is overwritten. User tags are
/// not touched here.
pub fn seed_system_tags(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO tags (tag_name, color) VALUES (?1, ?2)
         ON CONFLICT(tag_name) DO UPDATE SET color = excluded.color
         WHERE tags.color IS NOT excluded.color",
    )?;
    for tag in SystemTag::ALL {
        let changed = stmt.execute(params![tag.name(), tag.color().to_hex()])?;
        if changed > 0 {
            tracing::debug!(tag = tag.name(), "seeded system tag");
        }
    }
    Ok(())
}

/// Gives every tag with no stored color a generated one.
///
/// Colors are persisted once so a tag keeps the same color across sessions.
/// A stored value is never replaced, even one that is not `#RRGGBB`.
pub fn backfill_tag_colors<R: Rng + ?Sized>(
    conn: &Connection,
    rng: &mut R,
) -> rusqlite::Result<usize> {
    let names: Vec<String> = conn
        .prepare("SELECT tag_name FROM tags WHERE color IS NULL OR color = ''")?
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<_>>()?;

    for name in &names {
        let color = default_color(name, rng);
        conn.execute(
            "UPDATE tags SET color = ?1 WHERE tag_name = ?2",
            params![color.to_hex(), name],
        )?;
        tracing::debug!(tag = %name, color = %color, "assigned color to uncolored tag");
    }
    Ok(names.len())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}
