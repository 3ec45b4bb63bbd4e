//! Tag display colors and pastel color generation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::tag::SystemTag;

/// An RGB display color, written as `#RRGGBB`.
///
/// Parsing accepts either case; formatting always produces upper-case hex,
/// which is the form persisted in the `tags.color` column.
///
/// # Examples
///
/// ```
/// use tagshelf::domain::Color;
///
/// let color: Color = "#4caf50".parse().unwrap();
/// assert_eq!(color.to_string(), "#4CAF50");
/// assert_eq!(color.rgb(), (0x4C, 0xAF, 0x50));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

/// Error returned when parsing an invalid hex color.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color '{input}': expected #RRGGBB")]
pub struct ParseColorError {
    input: String,
}

impl Color {
    /// Creates a color from its red, green and blue components.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the `(r, g, b)` components.
    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Returns the color as an upper-case `#RRGGBB` string.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Builds a color from HSV components.
    ///
    /// `h` is in degrees `[0, 360)`, `s` and `v` are in `[0, 1]`.
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let (r, g, b) = hsv_to_rgb(h, s, v);
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(\"{}\")", self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError {
            input: s.to_string(),
        };

        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self::from_rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ===========================================
// HSV Conversion
// ===========================================

/// Converts hue in degrees and saturation/value in `[0, 1]` to 8-bit RGB.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let h = h.rem_euclid(360.0);
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r_prime, g_prime, b_prime) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    let to_channel = |p: f32| ((p + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_channel(r_prime), to_channel(g_prime), to_channel(b_prime))
}

// ===========================================
// Color Assignment
// ===========================================

/// Generates a random pastel color.
///
/// Hue is uniform over the wheel, saturation is drawn from `[0.5, 0.8)` and
/// value from `[0.7, 0.9)`.
pub fn pastel<R: Rng + ?Sized>(rng: &mut R) -> Color {
    let hue = rng.gen_range(0.0..360.0);
    let saturation = rng.gen_range(0.5..0.8);
    let value = rng.gen_range(0.7..0.9);
    Color::from_hsv(hue, saturation, value)
}

/// Derives a stable pastel color from a tag name.
///
/// Used for display when the stored color can't be read. The same name
/// always maps to the same color, within the ranges [`pastel`] draws from.
pub fn name_color(name: &str) -> Color {
    // FNV-1a
    let hash = name
        .bytes()
        .fold(0x811c_9dc5_u32, |h, b| (h ^ u32::from(b)).wrapping_mul(0x0100_0193));
    let hue = (hash % 360) as f32;
    let saturation = 0.5 + ((hash >> 9) % 30) as f32 / 100.0;
    let value = 0.7 + ((hash >> 17) % 20) as f32 / 100.0;
    Color::from_hsv(hue, saturation, value)
}

/// Returns the color a tag gets when nothing is stored for it yet.
///
/// System tags get their canonical palette color, everything else a fresh
/// pastel color.
pub fn default_color<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Color {
    match SystemTag::from_name(name) {
        Some(system) => system.color(),
        None => pastel(rng),
    }
}

/// Resolves the color to persist for `name` in a write path.
///
/// System tags always resolve to their canonical color. A user tag that
/// already has a stored color keeps it. Only a tag with no stored color
/// draws from `rng`.
pub fn resolve_color<R: Rng + ?Sized>(
    name: &str,
    existing: &HashMap<String, Color>,
    rng: &mut R,
) -> Color {
    if let Some(system) = SystemTag::from_name(name) {
        return system.color();
    }
    match existing.get(name) {
        Some(color) => *color,
        None => pastel(rng),
    }
}
