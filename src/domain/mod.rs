//! Core types: TaggedFile, Tag, SystemTag, Color

mod color;
mod file;
mod tag;

pub use color::{
    Color, ParseColorError, default_color, hsv_to_rgb, name_color, pastel, resolve_color,
};
pub use file::TaggedFile;
pub use tag::{
    MAX_TAG_LENGTH, SystemTag, Tag, ValidationError, is_system_tag, validate_tag_name,
};
