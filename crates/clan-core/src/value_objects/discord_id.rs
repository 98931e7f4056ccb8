//! Discord account ID - 64-bit snowflake issued by the chat platform
//!
//! Real account IDs are at least 17 decimal digits. The value `0` is a
//! sentinel meaning *no chat account linked*.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Chat-platform account ID (64-bit snowflake)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DiscordId(u64);

impl DiscordId {
    /// Sentinel for a member without a linked chat account
    pub const NONE: DiscordId = DiscordId(0);

    /// Minimum digit count of a real platform-issued ID
    pub const MIN_DIGITS: usize = 17;

    /// Create from a raw u64 value (no digit-count validation)
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    #[inline]
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// Check whether this is the *no account* sentinel
    #[inline]
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// Parse a user-supplied ID string
    ///
    /// Accepts only strings of 17 or more decimal digits. Stored-row parsing
    /// goes through [`DiscordId::from_row_cell`] instead, which also accepts
    /// the `0` sentinel.
    pub fn parse(s: &str) -> Result<Self, DiscordIdParseError> {
        let s = s.trim();
        if s.len() < Self::MIN_DIGITS || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DiscordIdParseError::InvalidFormat);
        }
        s.parse::<u64>()
            .map(DiscordId)
            .map_err(|_| DiscordIdParseError::InvalidFormat)
    }

    /// Parse a stored-row cell: `0` sentinel or a full ID
    pub fn from_row_cell(s: &str) -> Result<Self, DiscordIdParseError> {
        let s = s.trim();
        if s.is_empty() || s == "0" {
            return Ok(Self::NONE);
        }
        Self::parse(s)
    }
}

/// Error when parsing a DiscordId from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DiscordIdParseError {
    #[error("invalid discord id: expected 17+ decimal digits")]
    InvalidFormat,
}

impl fmt::Display for DiscordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DiscordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<DiscordId> for u64 {
    fn from(id: DiscordId) -> Self {
        id.0
    }
}

// Serialize as string for JSON (JavaScript BigInt safety)
impl Serialize for DiscordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

// Deserialize from string or number
impl<'de> Deserialize<'de> for DiscordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = DiscordId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing a discord id")
            }

            fn visit_u64<E>(self, value: u64) -> Result<DiscordId, E>
            where
                E: de::Error,
            {
                Ok(DiscordId(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<DiscordId, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(DiscordId)
                    .map_err(|_| de::Error::custom("negative discord id"))
            }

            fn visit_str<E>(self, value: &str) -> Result<DiscordId, E>
            where
                E: de::Error,
            {
                value
                    .parse::<u64>()
                    .map(DiscordId)
                    .map_err(|_| de::Error::custom("invalid discord id string"))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}
