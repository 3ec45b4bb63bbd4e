//! Output format types for CLI commands.

use clap::ValueEnum;
use serde::Serialize;

use crate::domain::TaggedFile;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for programmatic consumption
    Json,
    /// Plain file paths, one per line
    Paths,
}

/// Wrapper for serializable command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> Output<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A single file in listing output.
#[derive(Debug, Serialize)]
pub struct FileListing {
    pub path: String,
    pub name: String,
    pub tags: Vec<String>,
    pub created_at: String,
    pub last_accessed_at: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
}

impl From<&TaggedFile> for FileListing {
    fn from(file: &TaggedFile) -> Self {
        Self {
            path: file.path().to_string_lossy().into_owned(),
            name: file.name().to_string(),
            tags: file.tags().iter().cloned().collect(),
            created_at: file.created_at().to_rfc3339(),
            last_accessed_at: file.last_accessed_at().to_rfc3339(),
            related: file
                .related_paths()
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// A tag with optional color and count.
#[derive(Debug, Serialize)]
pub struct TagListing {
    pub name: String,
    pub system: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

/// Prints a value as pretty JSON wrapped in [`Output`].
pub fn print_json<T: Serialize>(data: T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&Output::new(data))?);
    Ok(())
}
