//! Mapping of classifier class indices to character labels.
//!
//! Digits map to their decimal index. Letters map by ordinal offset from
//! `'A'`, with the behaviour for indices past `Z` depending on the
//! classifier's output arity:
//!
//! | arity | index 0..=25 | index 26       | index > 26        |
//! |-------|--------------|----------------|-------------------|
//! | 26    | `A`..`Z`     | `Unknown`      | `Unknown`         |
//! | 27    | `A`..`Z`     | `Special`      | `Unknown`         |
//! | other | `A`..`Z`     | `Class_26`     | `Class_N`         |

use crate::core::constants::LETTER_CLASSES;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// A decoded label, or one of the reserved sentinels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterLabel {
    /// A digit class, rendered as its decimal index.
    Digit(usize),
    /// An upper-case letter.
    Letter(char),
    /// The reserved non-letter class of 27-way alphabet classifiers.
    Special,
    /// An index that cannot occur for the declared arity.
    Unknown,
    /// A class outside the letter range of a classifier with an unexpected arity.
    OutOfRange(usize),
}

impl CharacterLabel {
    /// Returns `true` for labels that name a real character.
    pub fn is_character(&self) -> bool {
        matches!(self, CharacterLabel::Digit(_) | CharacterLabel::Letter(_))
    }
}

impl fmt::Display for CharacterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterLabel::Digit(d) => write!(f, "{d}"),
            CharacterLabel::Letter(c) => write!(f, "{c}"),
            CharacterLabel::Special => f.write_str("Special"),
            CharacterLabel::Unknown => f.write_str("Unknown"),
            CharacterLabel::OutOfRange(n) => write!(f, "Class_{n}"),
        }
    }
}

/// Decodes a digit-mode class index.
pub fn decode_digit(class_index: usize) -> CharacterLabel {
    CharacterLabel::Digit(class_index)
}

/// Decodes an alphabet-mode class index for a classifier of the given arity.
pub fn decode_letter(class_index: usize, arity: usize) -> CharacterLabel {
    if let Some(letter) = letter_for_index(class_index) {
        return CharacterLabel::Letter(letter);
    }

    match arity {
        26 => {
            warn!(
                "Class index {} is impossible for a 26-way classifier",
                class_index
            );
            CharacterLabel::Unknown
        }
        27 if class_index == LETTER_CLASSES => CharacterLabel::Special,
        27 => {
            warn!(
                "Class index {} is impossible for a 27-way classifier",
                class_index
            );
            CharacterLabel::Unknown
        }
        _ => CharacterLabel::OutOfRange(class_index),
    }
}

/// Returns the letter at ordinal offset `index` from `'A'`, if any.
pub fn letter_for_index(index: usize) -> Option<char> {
    if index < LETTER_CLASSES {
        Some((b'A' + index as u8) as char)
    } else {
        None
    }
}

/// Returns the class index of an ASCII letter (either case), if any.
pub fn index_for_letter(letter: char) -> Option<usize> {
    let upper = letter.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Some((upper as u8 - b'A') as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_digit_is_decimal_index() {
        assert_eq!(decode_digit(0).to_string(), "0");
        assert_eq!(decode_digit(7).to_string(), "7");
    }

    #[test]
    fn test_decode_letter_26_way() {
        assert_eq!(decode_letter(0, 26), CharacterLabel::Letter('A'));
        assert_eq!(decode_letter(25, 26), CharacterLabel::Letter('Z'));
        assert_eq!(decode_letter(26, 26), CharacterLabel::Unknown);
    }

    #[test]
    fn test_decode_letter_27_way_special_class() {
        assert_eq!(decode_letter(25, 27), CharacterLabel::Letter('Z'));
        assert_eq!(decode_letter(26, 27), CharacterLabel::Special);
        assert_eq!(decode_letter(26, 27).to_string(), "Special");
    }

    #[test]
    fn test_decode_letter_other_arity_keeps_index() {
        assert_eq!(decode_letter(3, 47), CharacterLabel::Letter('D'));
        let label = decode_letter(40, 47);
        assert_eq!(label, CharacterLabel::OutOfRange(40));
        assert_eq!(label.to_string(), "Class_40");
        assert!(!label.is_character());
    }

    #[test]
    fn test_letter_index_round_trip_bounds() {
        assert_eq!(index_for_letter('a'), Some(0));
        assert_eq!(index_for_letter('Z'), Some(25));
        assert_eq!(index_for_letter('7'), None);
        assert_eq!(letter_for_index(26), None);
    }
}
