//! Recognition mode selection.

use crate::core::constants::{DIGIT_CLASSES, LETTER_CLASSES};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selects the preprocessing branch and the label alphabet of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Handwritten digits 0-9 (MNIST-style classifier).
    Digit,
    /// Handwritten letters A-Z (EMNIST / A-Z dataset classifier).
    Alphabet,
}

impl Mode {
    /// All modes, in registry order.
    pub const ALL: [Mode; 2] = [Mode::Digit, Mode::Alphabet];

    /// The class count the mode's classifier is normally trained with.
    pub fn expected_classes(self) -> usize {
        match self {
            Mode::Digit => DIGIT_CLASSES,
            Mode::Alphabet => LETTER_CLASSES,
        }
    }

    /// Lowercase identifier used in configuration and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Digit => "digit",
            Mode::Alphabet => "alphabet",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown recognition mode '{0}', expected 'digit' or 'alphabet'")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "digit" | "digits" => Ok(Mode::Digit),
            "alphabet" | "letter" | "letters" => Ok(Mode::Alphabet),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}
