//! Character sets a payload is drawn from.

use std::fmt;
use std::str::FromStr;

use crate::error::{GarbageError, Result};

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// An ordered, non-empty set of distinct printable ASCII characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<u8>,
}

impl Alphabet {
    /// `A` through `Z`.
    pub fn uppercase() -> Self {
        Self {
            chars: UPPERCASE.to_vec(),
        }
    }

    /// `A` through `Z` followed by `a` through `z`.
    pub fn letters() -> Self {
        Self {
            chars: LETTERS.to_vec(),
        }
    }

    /// Builds a custom alphabet, keeping the given order.
    ///
    /// # Errors
    ///
    /// Returns [`GarbageError::InvalidAlphabet`] if `chars` is empty, holds anything
    /// other than graphic ASCII, or repeats a character.
    pub fn new(chars: &str) -> Result<Self> {
        if chars.is_empty() {
            return Err(GarbageError::InvalidAlphabet("empty".to_string()));
        }

        let mut seen = [false; 128];
        for ch in chars.chars() {
            if !ch.is_ascii_graphic() {
                return Err(GarbageError::InvalidAlphabet(format!(
                    "{ch:?} is not a printable ASCII character"
                )));
            }
            let slot = &mut seen[ch as usize];
            if *slot {
                return Err(GarbageError::InvalidAlphabet(format!(
                    "{ch:?} appears more than once"
                )));
            }
            *slot = true;
        }

        Ok(Self {
            chars: chars.as_bytes().to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.chars
    }

    pub fn contains(&self, byte: u8) -> bool {
        self.chars.contains(&byte)
    }

    /// Index of `byte` within the alphabet order.
    pub fn position(&self, byte: u8) -> Option<usize> {
        self.chars.iter().position(|&c| c == byte)
    }
}

impl FromStr for Alphabet {
    type Err = GarbageError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uppercase" => Ok(Self::uppercase()),
            "letters" => Ok(Self::letters()),
            other => Self::new(other),
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only ASCII is ever stored.
        f.write_str(&String::from_utf8_lossy(&self.chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_have_expected_sizes() {
        assert_eq!(Alphabet::uppercase().len(), 26);
        assert_eq!(Alphabet::letters().len(), 52);
        assert_eq!(Alphabet::letters().as_bytes()[26], b'a');
    }

    #[test]
    fn parses_preset_names_and_literals() {
        assert_eq!("uppercase".parse::<Alphabet>().unwrap(), Alphabet::uppercase());
        assert_eq!("letters".parse::<Alphabet>().unwrap(), Alphabet::letters());

        let custom: Alphabet = "xyz".parse().unwrap();
        assert_eq!(custom.as_bytes(), b"xyz");
        assert_eq!(custom.position(b'z'), Some(2));
        assert!(!custom.contains(b'a'));
    }

    #[test]
    fn rejects_bad_character_sets() {
        assert!(Alphabet::new("").is_err());
        assert!(Alphabet::new("ab a").is_err());
        assert!(Alphabet::new("aba").is_err());
        assert!(Alphabet::new("é").is_err());
        assert!(Alphabet::new("a\n").is_err());
    }
}
