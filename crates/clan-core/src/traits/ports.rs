//! Port traits - interfaces to the external systems the core talks to
//!
//! The domain layer defines what it needs; the infrastructure crates
//! provide the implementations (live HTTP clients, the file-backed mirror)
//! and the tests provide in-memory fakes.

use async_trait::async_trait;

use crate::entities::{Activities, ClueCounts, Skills};
use crate::error::DomainError;
use crate::value_objects::{IngameRank, PlayerName, ProfileLink, SiteRank};

/// Result type for port operations
pub type PortResult<T> = Result<T, DomainError>;

/// One row of the clan-list feed: `name, rank, clan_xp, kills`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClanListEntry {
    pub name: PlayerName,
    pub rank: IngameRank,
    pub clan_xp: u64,
    pub kills: u64,
}

/// Per-player detail: skills, activities, and clue counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerDetail {
    pub skills: Skills,
    pub activities: Activities,
    pub clue_counts: ClueCounts,
}

/// The game's public stat service - the canonical membership oracle
#[async_trait]
pub trait HiscoresApi: Send + Sync {
    /// Fetch the authoritative in-game member list
    ///
    /// Failure here aborts the enclosing update; there is no useful partial
    /// result without the canonical list.
    async fn fetch_clan_list(&self) -> PortResult<Vec<ClanListEntry>>;

    /// Fetch per-player detail
    ///
    /// `Ok(None)` means the player is absent from the detail index (a new
    /// member not yet indexed, or retries exhausted) - a legitimate state,
    /// not an error.
    async fn fetch_player(&self, name: &PlayerName) -> PortResult<Option<PlayerDetail>>;
}

/// The community website's membership records
#[async_trait]
pub trait SiteApi: Send + Sync {
    /// Read the current site rank of a profile (unauthenticated)
    async fn get_rank(&self, profile: &ProfileLink) -> PortResult<SiteRank>;

    /// Write a site rank (sign in, patch, sign out per call batch)
    async fn set_rank(&self, profile: &ProfileLink, rank: SiteRank) -> PortResult<()>;
}

/// Tabs of the mirrored tabular document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RosterTab {
    CurrentMembers,
    OldMembers,
    BannedMembers,
    Warnings,
}

impl RosterTab {
    pub fn title(&self) -> &'static str {
        match self {
            Self::CurrentMembers => "Current Members",
            Self::OldMembers => "Old Members",
            Self::BannedMembers => "Banned Members",
            Self::Warnings => "Warnings",
        }
    }
}

/// The mirrored tabular document shared with human editors
#[async_trait]
pub trait RosterMirror: Send + Sync {
    /// Refresh the shared session token; must be called before each use
    async fn ensure_connected(&self) -> PortResult<()>;

    /// Replace the full contents of one tab (header row excluded)
    async fn replace_tab(&self, tab: RosterTab, rows: Vec<Vec<String>>) -> PortResult<()>;

    /// Publish a human-readable "update in progress" marker
    async fn publish_marker(&self, text: &str) -> PortResult<()>;

    /// Remove the marker once the update is done
    async fn clear_marker(&self) -> PortResult<()>;

    /// Insert lines into the recent-changes section, most recent first
    async fn insert_changelog(&self, lines: &[String]) -> PortResult<()>;
}
