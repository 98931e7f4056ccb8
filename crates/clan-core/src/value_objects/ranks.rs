//! Rank vocabularies
//!
//! Three independent controlled vocabularies track a member's standing:
//! the in-game clan rank (from the hiscores feed, plus the `Needs Invite`
//! sentinel used between staff pre-registration and first sighting), the
//! website rank (mapped to the site's fixed integer `rank_id` table), and
//! the chat-platform role name (validated free-form string).

use serde::{Deserialize, Serialize};
use std::fmt;

/// In-game clan rank, highest first, plus the pre-registration sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IngameRank {
    Recruit,
    Corporal,
    Sergeant,
    Lieutenant,
    Captain,
    General,
    Admin,
    Organiser,
    Coordinator,
    Overseer,
    DeputyOwner,
    Owner,
    /// Added by staff but not yet seen in the hiscores feed
    NeedsInvite,
}

impl IngameRank {
    /// Ranks at or above this are staff; the system never mutates them
    /// automatically.
    pub const STAFF_THRESHOLD: IngameRank = IngameRank::Organiser;

    /// Whether this rank is protected from automatic mutation
    #[inline]
    pub fn is_staff(&self) -> bool {
        *self != Self::NeedsInvite && *self >= Self::STAFF_THRESHOLD
    }

    /// The display string used by the game and the stored rows
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::DeputyOwner => "Deputy Owner",
            Self::Overseer => "Overseer",
            Self::Coordinator => "Coordinator",
            Self::Organiser => "Organiser",
            Self::Admin => "Admin",
            Self::General => "General",
            Self::Captain => "Captain",
            Self::Lieutenant => "Lieutenant",
            Self::Sergeant => "Sergeant",
            Self::Corporal => "Corporal",
            Self::Recruit => "Recruit",
            Self::NeedsInvite => "needs invite",
        }
    }
}

impl fmt::Display for IngameRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IngameRank {
    type Err = RankParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().replace('\u{00A0}', " ");
        let rank = match s.to_ascii_lowercase().as_str() {
            "owner" => Self::Owner,
            "deputy owner" => Self::DeputyOwner,
            "overseer" => Self::Overseer,
            "coordinator" => Self::Coordinator,
            "organiser" => Self::Organiser,
            "admin" => Self::Admin,
            "general" => Self::General,
            "captain" => Self::Captain,
            "lieutenant" => Self::Lieutenant,
            "sergeant" => Self::Sergeant,
            "corporal" => Self::Corporal,
            "recruit" => Self::Recruit,
            "needs invite" => Self::NeedsInvite,
            _ => return Err(RankParseError::UnknownRank),
        };
        Ok(rank)
    }
}

/// Website rank, carrying the site's fixed `rank_id` integer table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SiteRank {
    Owner,
    DeputyOwner,
    Overseer,
    Coordinator,
    Organiser,
    Admin,
    EliteMember,
    VeteranMember,
    FullMember,
    Recruit,
    RetiredMember,
    Banned,
    Guest,
}

impl SiteRank {
    /// The site's integer id for this rank (fixed table)
    pub fn rank_id(&self) -> u32 {
        match self {
            Self::Owner => 1,
            Self::DeputyOwner => 2,
            Self::Overseer => 3,
            Self::Coordinator => 4,
            Self::Organiser => 5,
            Self::Admin => 6,
            Self::EliteMember => 7,
            Self::VeteranMember => 8,
            Self::FullMember => 9,
            Self::Recruit => 10,
            Self::RetiredMember => 11,
            Self::Banned => 12,
            Self::Guest => 13,
        }
    }

    /// Inverse of [`SiteRank::rank_id`]
    pub fn from_rank_id(id: u32) -> Option<Self> {
        let rank = match id {
            1 => Self::Owner,
            2 => Self::DeputyOwner,
            3 => Self::Overseer,
            4 => Self::Coordinator,
            5 => Self::Organiser,
            6 => Self::Admin,
            7 => Self::EliteMember,
            8 => Self::VeteranMember,
            9 => Self::FullMember,
            10 => Self::Recruit,
            11 => Self::RetiredMember,
            12 => Self::Banned,
            13 => Self::Guest,
            _ => return None,
        };
        Some(rank)
    }

    /// Display string used by the site and the stored rows
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::DeputyOwner => "Deputy Owner",
            Self::Overseer => "Overseer",
            Self::Coordinator => "Coordinator",
            Self::Organiser => "Organiser",
            Self::Admin => "Admin",
            Self::EliteMember => "Elite Member",
            Self::VeteranMember => "Veteran Member",
            Self::FullMember => "Full Member",
            Self::Recruit => "Recruit",
            Self::RetiredMember => "Retired member",
            Self::Banned => "Banned",
            Self::Guest => "Guest",
        }
    }
}

impl fmt::Display for SiteRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SiteRank {
    type Err = RankParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rank = match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Self::Owner,
            "deputy owner" => Self::DeputyOwner,
            "overseer" => Self::Overseer,
            "coordinator" => Self::Coordinator,
            "organiser" => Self::Organiser,
            "admin" => Self::Admin,
            "elite member" => Self::EliteMember,
            "veteran member" => Self::VeteranMember,
            "full member" => Self::FullMember,
            "recruit" => Self::Recruit,
            "retired member" => Self::RetiredMember,
            "banned" => Self::Banned,
            "guest" => Self::Guest,
            _ => return Err(RankParseError::UnknownRank),
        };
        Ok(rank)
    }
}

/// Error when parsing a rank string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RankParseError {
    #[error("unknown rank")]
    UnknownRank,
}
