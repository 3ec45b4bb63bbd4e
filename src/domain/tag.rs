//! Tags, reserved system tags, and tag-name validation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;
use thiserror::Error;

use super::color::{Color, name_color};

/// Longest tag name accepted by [`validate_tag_name`], in characters.
pub const MAX_TAG_LENGTH: usize = 50;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 _-]+$").expect("tag pattern is valid"));

// ===========================================
// Validation
// ===========================================

/// Reasons a tag name is rejected.
///
/// Each variant carries the offending value so callers can report it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The name is empty or whitespace-only.
    #[error("tag cannot be empty")]
    EmptyTag { name: String },

    /// The name exceeds [`MAX_TAG_LENGTH`] characters.
    #[error("tag '{name}' is longer than {MAX_TAG_LENGTH} characters")]
    TooLong { name: String },

    /// The name contains characters outside letters, digits, space, `_` and `-`.
    #[error("tag '{name}' can only contain letters, numbers, spaces, underscores and hyphens")]
    InvalidChars { name: String },
}

impl ValidationError {
    /// Returns the rejected tag name.
    pub fn value(&self) -> &str {
        match self {
            ValidationError::EmptyTag { name }
            | ValidationError::TooLong { name }
            | ValidationError::InvalidChars { name } => name,
        }
    }
}

/// Checks a tag name against the naming rules.
///
/// Rules are applied in order: non-blank, at most [`MAX_TAG_LENGTH`]
/// characters, and only `[A-Za-z0-9 _-]`. Names are case-sensitive and are
/// not trimmed or otherwise normalized.
///
/// # Examples
///
/// ```
/// use tagshelf::domain::{validate_tag_name, ValidationError};
///
/// assert!(validate_tag_name("In Progress").is_ok());
/// assert!(matches!(
///     validate_tag_name("tag!"),
///     Err(ValidationError::InvalidChars { .. })
/// ));
/// ```
pub fn validate_tag_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyTag {
            name: name.to_string(),
        });
    }
    if name.chars().count() > MAX_TAG_LENGTH {
        return Err(ValidationError::TooLong {
            name: name.to_string(),
        });
    }
    if !TAG_PATTERN.is_match(name) {
        return Err(ValidationError::InvalidChars {
            name: name.to_string(),
        });
    }
    Ok(())
}

// ===========================================
// System Tags
// ===========================================

/// The four reserved tags every store carries.
///
/// System tags have fixed colors and cannot be deleted or recolored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemTag {
    Done,
    InProgress,
    New,
    Missing,
}

impl SystemTag {
    /// All system tags, in seeding order.
    pub const ALL: [SystemTag; 4] = [
        SystemTag::Done,
        SystemTag::InProgress,
        SystemTag::New,
        SystemTag::Missing,
    ];

    /// Returns the stored tag name.
    pub fn name(self) -> &'static str {
        match self {
            SystemTag::Done => "Done",
            SystemTag::InProgress => "In Progress",
            SystemTag::New => "New",
            SystemTag::Missing => "Missing",
        }
    }

    /// Returns the canonical palette color.
    pub fn color(self) -> Color {
        match self {
            SystemTag::Done => Color::from_rgb(0x4C, 0xAF, 0x50),
            SystemTag::InProgress => Color::from_rgb(0xFF, 0xC1, 0x07),
            SystemTag::New => Color::from_rgb(0x21, 0x96, 0xF3),
            SystemTag::Missing => Color::from_rgb(0xF4, 0x43, 0x36),
        }
    }

    /// Looks up a system tag by exact (case-sensitive) name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.name() == name)
    }
}

impl fmt::Display for SystemTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns true if `name` is one of the reserved system tags.
pub fn is_system_tag(name: &str) -> bool {
    SystemTag::from_name(name).is_some()
}

// ===========================================
// Tag
// ===========================================

/// A named tag with its display color.
///
/// Identity is the name alone: two tags with the same name and different
/// colors compare equal and hash the same.
///
/// A stored color that isn't `#RRGGBB` is kept verbatim in `raw_color`; the
/// display color is then derived from the name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    name: String,
    color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw_color: Option<String>,
}

impl Tag {
    /// Creates a tag with an explicit color.
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
            raw_color: None,
        }
    }

    /// Creates a tag whose stored color isn't a hex color.
    pub fn with_raw_color(name: impl Into<String>, raw: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            color: name_color(&name),
            name,
            raw_color: Some(raw.into()),
        }
    }

    /// Creates a system tag with its canonical color.
    pub fn system(tag: SystemTag) -> Self {
        Self::new(tag.name(), tag.color())
    }

    /// Returns the tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns the stored color value when it isn't a hex color.
    pub fn raw_color(&self) -> Option<&str> {
        self.raw_color.as_deref()
    }

    /// Returns the color as stored: the raw value if present, else `#RRGGBB`.
    pub fn stored_color(&self) -> String {
        match &self.raw_color {
            Some(raw) => raw.clone(),
            None => self.color.to_hex(),
        }
    }

    /// Returns the system tag this tag corresponds to, if any.
    pub fn system_tag(&self) -> Option<SystemTag> {
        SystemTag::from_name(&self.name)
    }

    /// Returns true if this is a reserved system tag.
    pub fn is_system(&self) -> bool {
        self.system_tag().is_some()
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
