//! # clan-clients
//!
//! Infrastructure implementations of the domain ports: the hiscores HTTP
//! client, the community-site HTTP client, and the file-backed roster
//! mirror.

pub mod hiscores;
pub mod mirror;
pub mod site;

// Re-export commonly used types at crate root
pub use hiscores::{parse_clan_list, parse_player_detail, HiscoresClient};
pub use mirror::FileMirror;
pub use site::SiteClient;
