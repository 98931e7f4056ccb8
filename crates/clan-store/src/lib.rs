//! # clan-store
//!
//! Roster persistence layer: the in-memory triple of member lists, the
//! durable mirror push, dated local backup files, and the per-command
//! permissions registry.

pub mod backup;
pub mod permissions;
pub mod persist;
pub mod roster;

// Re-export commonly used types at crate root
pub use backup::{
    load_latest_backups, member_from_backup_line, member_to_backup_line, parse_bracket,
    write_backups, BackupError, BracketValue,
};
pub use permissions::{ChannelRef, PermissionsRegistry};
pub use persist::persist;
pub use roster::{MatchKind, Roster, RosterSearch, RosterSnapshot, RosterStore, SearchHit};
