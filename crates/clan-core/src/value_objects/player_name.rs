//! In-game player name
//!
//! Names are 1-12 characters and compared case-insensitively. The hiscores
//! feed encodes spaces as U+00A0; that is normalized to a plain space at
//! construction so all downstream comparisons agree. Ordering treats the
//! space as the lowest character, matching the in-game roster sort.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Maximum length of an in-game name
pub const MAX_NAME_LEN: usize = 12;

/// Case-insensitively compared in-game handle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    /// Parse and normalize a raw name
    ///
    /// Replaces U+00A0 with U+0020 and validates the 1-12 character limit.
    pub fn parse(raw: &str) -> Result<Self, PlayerNameError> {
        let normalized: String = raw.trim_end().replace('\u{00A0}', " ");
        let len = normalized.chars().count();
        if normalized.is_empty() || len > MAX_NAME_LEN {
            return Err(PlayerNameError::InvalidLength(len));
        }
        Ok(Self(normalized))
    }

    /// Get the name as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive equality against a raw string
    pub fn matches(&self, other: &str) -> bool {
        let other = other.replace('\u{00A0}', " ");
        self.0.eq_ignore_ascii_case(&other)
    }

    /// Case-insensitive substring test (partial-match search)
    pub fn contains(&self, fragment: &str) -> bool {
        self.0
            .to_ascii_lowercase()
            .contains(&fragment.replace('\u{00A0}', " ").to_ascii_lowercase())
    }

    /// Sort key: lowercased, with space mapped below every other character
    fn sort_key(&self) -> impl Iterator<Item = char> + '_ {
        self.0
            .chars()
            .map(|c| if c == ' ' { '\0' } else { c.to_ascii_lowercase() })
    }
}

/// Error when parsing a player name
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlayerNameError {
    #[error("invalid name length {0}: expected 1-12 characters")]
    InvalidLength(usize),
}

impl PartialEq for PlayerName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for PlayerName {}

impl PartialOrd for PlayerName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PlayerName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(other.sort_key())
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PlayerName {
    type Err = PlayerNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlayerName::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nbsp_normalized() {
        let name = PlayerName::parse("Zezima\u{00A0}II").unwrap();
        assert_eq!(name.as_str(), "Zezima II");
    }

    #[test]
    fn test_case_insensitive_equality() {
        let a = PlayerName::parse("Alice").unwrap();
        let b = PlayerName::parse("ALICE").unwrap();
        assert_eq!(a, b);
        assert!(a.matches("alice"));
    }

    #[test]
    fn test_matches_nbsp_input() {
        let name = PlayerName::parse("Zezima II").unwrap();
        assert!(name.matches("Zezima\u{00A0}II"));
    }

    #[test]
    fn test_length_limits() {
        assert!(PlayerName::parse("").is_err());
        assert!(PlayerName::parse("x".repeat(13).as_str()).is_err());
        assert!(PlayerName::parse("x".repeat(12).as_str()).is_ok());
    }

    #[test]
    fn test_space_sorts_lowest() {
        let spaced = PlayerName::parse("a b").unwrap();
        let solid = PlayerName::parse("aab").unwrap();
        assert!(spaced < solid);
    }

    #[test]
    fn test_partial_contains() {
        let name = PlayerName::parse("Ironman Bob").unwrap();
        assert!(name.contains("man bo"));
        assert!(!name.contains("alice"));
    }
}
