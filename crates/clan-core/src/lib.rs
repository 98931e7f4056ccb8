//! # clan-core
//!
//! Domain layer containing the member entity, value objects, port traits,
//! and the change-set type produced by reconciliation. This crate has zero
//! dependencies on infrastructure (HTTP, filesystem, chat platform).

pub mod changeset;
pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use changeset::{ChangeSet, Rename};
pub use entities::{rename_match_score, Member, DEFAULT_LEAVE_REASON};
pub use error::DomainError;
pub use traits::{
    ClanListEntry, HiscoresApi, PlayerDetail, PortResult, RosterMirror, RosterTab, SiteApi,
};
pub use value_objects::{
    DiscordId, IngameRank, MemberId, PlayerName, ProfileLink, SiteRank, Warning,
};
