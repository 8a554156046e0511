//! Character classes recognized by the password policy.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Fixed punctuation set that satisfies the special character requirement.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()-_=+[]{}|;:'\",.<>/?\\`~";

const UPPERCASE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGIT_ALPHABET: &[u8] = b"0123456789";

/// Character class a password may be required to contain.
///
/// Membership checks are Unicode-aware: `'Ä'` is uppercase, `'ß'` is
/// lowercase and `'٣'` is a digit. Only the special class is restricted to
/// the fixed [`SPECIAL_CHARACTERS`] set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString)]
#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CharClass {
    /// Uppercase letters.
    Uppercase,
    /// Lowercase letters.
    Lowercase,
    /// Numeric characters.
    Digit,
    /// Characters from [`SPECIAL_CHARACTERS`].
    Special,
}

impl CharClass {
    /// All classes in policy evaluation order.
    pub const ALL: [CharClass; 4] = [
        CharClass::Uppercase,
        CharClass::Lowercase,
        CharClass::Digit,
        CharClass::Special,
    ];

    /// Returns `true` if `c` belongs to this class.
    #[must_use]
    pub fn matches(self, c: char) -> bool {
        match self {
            Self::Uppercase => c.is_uppercase(),
            Self::Lowercase => c.is_lowercase(),
            Self::Digit => c.is_numeric(),
            Self::Special => SPECIAL_CHARACTERS.contains(c),
        }
    }

    /// Returns `true` if at least one character of `raw` belongs to this class.
    #[must_use]
    pub fn is_present_in(self, raw: &str) -> bool {
        raw.chars().any(|c| self.matches(c))
    }

    /// ASCII characters of this class used when generating passwords.
    #[must_use]
    pub(crate) fn alphabet(self) -> &'static [u8] {
        match self {
            Self::Uppercase => UPPERCASE_ALPHABET,
            Self::Lowercase => LOWERCASE_ALPHABET,
            Self::Digit => DIGIT_ALPHABET,
            Self::Special => SPECIAL_CHARACTERS.as_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_membership() {
        assert!(CharClass::Uppercase.matches('Q'));
        assert!(CharClass::Lowercase.matches('q'));
        assert!(CharClass::Digit.matches('7'));
        assert!(CharClass::Special.matches('!'));
        assert!(CharClass::Special.matches('\\'));

        assert!(!CharClass::Uppercase.matches('q'));
        assert!(!CharClass::Digit.matches('a'));
        assert!(!CharClass::Special.matches(' '));
    }

    #[test]
    fn test_unicode_membership() {
        assert!(CharClass::Uppercase.matches('Ä'));
        assert!(CharClass::Lowercase.matches('ß'));
        assert!(CharClass::Digit.matches('٣'));
        assert!(!CharClass::Special.matches('§'));
    }

    #[test]
    fn test_alphabets_belong_to_their_class() {
        for class in CharClass::ALL {
            assert!(
                class.alphabet().iter().all(|&b| class.matches(b as char)),
                "alphabet for {class} contains a foreign character"
            );
        }
    }

    #[test]
    fn test_string_round_trip() {
        assert_eq!(CharClass::Special.as_ref(), "special");
        assert_eq!("digit".parse::<CharClass>().ok(), Some(CharClass::Digit));
    }
}
