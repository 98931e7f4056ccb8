//! Community-website profile link
//!
//! Canonical form is `<site-base>/members/<7-digit-id>`. Anything else is
//! rejected at the boundary. The stored-row sentinel `"no site"` maps to
//! `Option::<ProfileLink>::None` in the model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Row sentinel for a member without a website profile
pub const NO_SITE: &str = "no site";

/// Validated website profile URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileLink(String);

impl ProfileLink {
    /// Parse a profile link against the configured site base URL
    pub fn parse(site_base: &str, raw: &str) -> Result<Self, ProfileLinkError> {
        let raw = raw.trim().trim_end_matches('/');
        let base = site_base.trim_end_matches('/');
        let rest = raw
            .strip_prefix(base)
            .and_then(|r| r.strip_prefix("/members/"))
            .ok_or(ProfileLinkError::WrongForm)?;
        if rest.len() != 7 || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProfileLinkError::WrongForm);
        }
        Ok(Self(format!("{base}/members/{rest}")))
    }

    /// Parse a stored-row cell: `"no site"` (or empty) means no profile
    pub fn from_row_cell(site_base: &str, cell: &str) -> Result<Option<Self>, ProfileLinkError> {
        let cell = cell.trim();
        if cell.is_empty() || cell.eq_ignore_ascii_case(NO_SITE) {
            return Ok(None);
        }
        Self::parse(site_base, cell).map(Some)
    }

    /// The full URL
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 7-digit member id embedded in the link
    pub fn member_id(&self) -> &str {
        // Validated at construction, the last path segment is the id.
        self.0.rsplit('/').next().unwrap_or_default()
    }
}

/// Error when parsing a profile link
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProfileLinkError {
    #[error("profile link must be <site-base>/members/<7-digit-id>")]
    WrongForm,
}

impl fmt::Display for ProfileLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
