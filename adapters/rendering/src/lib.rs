#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for building hints adapters.
//!
//! Highlights are presented as cell background colours. [`Palette`] maps
//! every [`CellHighlight`] to a [`Color`], and [`OverviewTable`] records the
//! highlights pushed by the overlay so adapters can draw the building
//! overview table.

mod table;

use std::{error::Error, fmt, str::FromStr};

use building_hints_core::CellHighlight;
use serde::{Deserialize, Deserializer};

pub use table::{CellStyle, OverviewTable};

/// Opaque RGB colour used when presenting highlighted cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel intensity.
    pub red: u8,
    /// Green channel intensity.
    pub green: u8,
    /// Blue channel intensity.
    pub blue: u8,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Formats the color as a `#RRGGBB` string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    /// ANSI escape sequence selecting the color as terminal background.
    #[must_use]
    pub fn ansi_background(&self) -> String {
        format!("\x1b[48;2;{};{};{}m", self.red, self.green, self.blue)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ColorParseError {
            value: value.to_owned(),
        };
        let digits = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };
        Ok(Self::from_rgb_u8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Error returned when a colour is not written as `#RRGGBB`.
#[derive(Debug, PartialEq, Eq)]
pub struct ColorParseError {
    value: String,
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "colour `{}` is not of the form #RRGGBB", self.value)
    }
}

impl Error for ColorParseError {}

/// Background colours applied to highlighted cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    /// Cells that must be raised.
    pub upgrade: Color,
    /// Cells that must be lowered and interact with a slot special.
    pub blocked: Color,
    /// Cells that must be lowered.
    pub downgrade: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            upgrade: Color::from_rgb_u8(0x90, 0xEE, 0x90),
            blocked: Color::from_rgb_u8(0xFF, 0x63, 0x47),
            downgrade: Color::from_rgb_u8(0xFF, 0xA5, 0x00),
        }
    }
}

impl Palette {
    /// Background colour of the highlight. Unstyled cells have none.
    #[must_use]
    pub const fn color(&self, highlight: CellHighlight) -> Option<Color> {
        match highlight {
            CellHighlight::None => None,
            CellHighlight::UpgradeNeeded => Some(self.upgrade),
            CellHighlight::DowngradeBlockedBySpecial => Some(self.blocked),
            CellHighlight::DowngradeNeeded => Some(self.downgrade),
        }
    }
}
