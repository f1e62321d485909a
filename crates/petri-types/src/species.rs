//! Cell ownership tokens.
//!
//! A species is the color-token owner of a cell. On the wire it is a
//! lowercase seven-character hex color (`#` followed by six hex digits);
//! the empty string is the dead-cell sentinel. The grammar is enforced
//! when a token is parsed, so every in-memory [`Species`] re-serializes
//! byte-identically to the token it was decoded from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors produced when parsing a species token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeciesError {
    /// The token is neither empty nor a lowercase `#rrggbb` color.
    #[error("species must be empty or a lowercase #rrggbb color, got {0:?}")]
    BadColor(String),
}

/// A 24-bit color identifying one species.
///
/// The inner value is guaranteed to fit in 24 bits; construction goes
/// through [`Color::rgb`] or the [`Species`] parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(u32);

impl Color {
    /// Build a color from its red, green, and blue components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(u32::from_be_bytes([0, r, g, b]))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// The owner of a single cell.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Species {
    /// A dead cell, wire-encoded as `""`.
    #[default]
    Empty,
    /// A live cell owned by the species with the given color.
    Color(Color),
}

impl Species {
    /// Whether this is the dead-cell sentinel.
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Decode one lowercase hex digit.
fn hex_digit(byte: u8) -> Option<u32> {
    match byte {
        b'0'..=b'9' => Some(u32::from(byte.wrapping_sub(b'0'))),
        b'a'..=b'f' => Some(u32::from(byte.wrapping_sub(b'a')).wrapping_add(10)),
        _ => None,
    }
}

impl FromStr for Species {
    type Err = SpeciesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::Empty);
        }
        let Some(hex) = s.strip_prefix('#') else {
            return Err(SpeciesError::BadColor(s.to_owned()));
        };
        if hex.len() != 6 {
            return Err(SpeciesError::BadColor(s.to_owned()));
        }
        let mut value: u32 = 0;
        for byte in hex.bytes() {
            let Some(digit) = hex_digit(byte) else {
                return Err(SpeciesError::BadColor(s.to_owned()));
            };
            value = value.wrapping_shl(4) | digit;
        }
        Ok(Self::Color(Color(value)))
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Color(color) => color.fmt(f),
        }
    }
}

impl TryFrom<String> for Species {
    type Error = SpeciesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Species> for String {
    fn from(species: Species) -> Self {
        species.to_string()
    }
}
