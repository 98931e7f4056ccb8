//! Member lookup key
//!
//! The original tooling dispatched lookups by sniffing the runtime type of
//! the argument. Here the three identities are a closed tagged variant with
//! one parser at the boundary: long digit strings are chat-platform IDs,
//! site URLs are profile links, everything else is an in-game name.

use std::fmt;

use super::{DiscordId, PlayerName, PlayerNameError, ProfileLink};

/// Tagged member lookup key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberId {
    Discord(DiscordId),
    Profile(ProfileLink),
    Name(PlayerName),
}

impl MemberId {
    /// Parse a raw lookup argument
    ///
    /// Priority: discord id (17+ digits), then profile link, then name.
    pub fn parse(site_base: &str, raw: &str) -> Result<Self, MemberIdParseError> {
        let raw = raw.trim();
        if let Ok(id) = DiscordId::parse(raw) {
            return Ok(Self::Discord(id));
        }
        if raw.contains("://") || raw.contains("/members/") {
            return ProfileLink::parse(site_base, raw)
                .map(Self::Profile)
                .map_err(|_| MemberIdParseError::InvalidProfileLink);
        }
        PlayerName::parse(raw)
            .map(Self::Name)
            .map_err(MemberIdParseError::InvalidName)
    }
}

/// Error when parsing a member lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MemberIdParseError {
    #[error("not a valid profile link")]
    InvalidProfileLink,
    #[error(transparent)]
    InvalidName(PlayerNameError),
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discord(id) => write!(f, "{id}"),
            Self::Profile(link) => write!(f, "{link}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}
