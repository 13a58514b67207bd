//! Impact categories and display colours.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The impact a matched tag has on query quality.
///
/// Reports are filtered per impact category, and each category renders in
/// its own colour.
///
/// # Examples
///
/// ```rust
/// use plan_guard::core::{Colour, Impact};
///
/// let impact: Impact = serde_json::from_str("\"negative\"").unwrap();
/// assert_eq!(impact, Impact::Negative);
/// assert_eq!(impact.colour(), Colour::Red);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// The plan attribute hurts performance
    Negative,
    /// The plan attribute is a good sign
    Positive,
    /// The plan attribute deserves a second look
    Caution,
    /// Any impact name the engine does not know; never shown in reports
    #[default]
    #[serde(other)]
    Unknown,
}

impl Impact {
    /// The categories a report can show, in rendering order.
    pub const REPORTED: [Impact; 3] = [Impact::Negative, Impact::Positive, Impact::Caution];

    /// Returns the string representation of the impact.
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Negative => "negative",
            Impact::Positive => "positive",
            Impact::Caution => "caution",
            Impact::Unknown => "unknown",
        }
    }

    /// Returns the colour used to display this impact.
    pub fn colour(&self) -> Colour {
        match self {
            Impact::Negative => Colour::Red,
            Impact::Positive => Colour::Green,
            Impact::Caution => Colour::Yellow,
            Impact::Unknown => Colour::Plain,
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A terminal colour named in configuration (impacts, debt ranges).
///
/// Unrecognised colour names deserialize to [`Colour::Plain`] and render
/// without escape codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Colour {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    #[default]
    #[serde(other)]
    Plain,
}

impl Colour {
    fn ansi_code(&self) -> Option<u8> {
        match self {
            Colour::Black => Some(30),
            Colour::Red => Some(31),
            Colour::Green => Some(32),
            Colour::Yellow => Some(33),
            Colour::Blue => Some(34),
            Colour::Magenta => Some(35),
            Colour::Cyan => Some(36),
            Colour::White => Some(37),
            Colour::Plain => None,
        }
    }

    /// Wraps `text` in the ANSI escape codes for this colour.
    pub fn paint(&self, text: &str) -> String {
        match self.ansi_code() {
            Some(code) => format!("\x1b[{code}m{text}\x1b[0m"),
            None => text.to_string(),
        }
    }
}
