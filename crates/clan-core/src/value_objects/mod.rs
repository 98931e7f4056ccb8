//! Value objects - immutable types that represent domain concepts

mod discord_id;
mod member_id;
mod player_name;
mod profile_link;
mod ranks;
mod warning;

pub use discord_id::{DiscordId, DiscordIdParseError};
pub use member_id::{MemberId, MemberIdParseError};
pub use player_name::{PlayerName, PlayerNameError, MAX_NAME_LEN};
pub use profile_link::{ProfileLink, ProfileLinkError, NO_SITE};
pub use ranks::{IngameRank, RankParseError, SiteRank};
pub use warning::{current_points, Warning};
