//! Command handlers for the CLI.

mod check;
mod completions;
mod files;
mod tags;


use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub use check::handle_check;
pub use completions::handle_completions;
pub use files::{
    handle_add, handle_list, handle_retag, handle_rm, handle_show, handle_tag, handle_touch,
    handle_untag,
};
pub use tags::{handle_color, handle_delete_tag, handle_new_tag, handle_tags};

// ===========================================
// Shared Utilities
// ===========================================

/// Turns a user-supplied path into the absolute form the store keys on.
///
/// Existing paths are canonicalized. Paths that no longer exist (for example
/// files tagged Missing) are made absolute without touching the filesystem.
pub(crate) fn resolve_path(path: &Path) -> Result<PathBuf> {
    match path.canonicalize() {
        Ok(canonical) => Ok(canonical),
        Err(_) => std::path::absolute(path)
            .with_context(|| format!("invalid path: {}", path.display())),
    }
}

/// Joins tag names for display.
pub(crate) fn format_tags(tags: &BTreeSet<String>) -> String {
    if tags.is_empty() {
        "(none)".to_string()
    } else {
        tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

/// Truncates a string to a maximum display width, adding ellipsis if needed.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
