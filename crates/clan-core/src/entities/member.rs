//! Member entity - one tracked player across game, chat platform, and site
//!
//! A member appears in exactly one of the three rosters (current, retired,
//! banned). Stats sourced from the game are monotonically non-decreasing for
//! the same identity; RuneScore is the one exception and may drift both ways.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{
    current_points, DiscordId, IngameRank, MemberId, PlayerName, ProfileLink, SiteRank, Warning,
};

use super::stats::{Activities, ClueCounts, Skills};

/// Leave reason recorded when reconciliation retires a member
pub const DEFAULT_LEAVE_REASON: &str = "left or inactive kick";

/// One tracked clan member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: PlayerName,
    pub rank_ingame: IngameRank,
    /// Chat-platform role name; empty = no role
    pub rank_discord: String,
    pub rank_site: SiteRank,
    pub join_date: Option<NaiveDate>,
    pub leave_date: Option<NaiveDate>,
    pub leave_reason: String,
    pub referral: String,
    pub discord_id: DiscordId,
    pub discord_name: String,
    pub profile_link: Option<ProfileLink>,
    /// Previous in-game names, oldest first
    pub old_names: Vec<String>,
    pub last_active: Option<DateTime<Utc>>,
    pub clan_xp: u64,
    pub kills: u64,
    pub skills: Skills,
    pub activities: Activities,
    pub clue_counts: ClueCounts,
    pub passed_gem: bool,
    pub warnings: Vec<Warning>,
    /// Mirrored warning-point total; kept in sync by [`Member::recompute_warning_points`]
    pub warning_points: u32,
    /// Stat names this member wants milestone pings for
    pub notify_stats: Vec<String>,
    /// Cached chat-platform role ids
    pub discord_roles: Vec<u64>,
    pub notes: [String; 3],
    /// Auxiliary attributes (highest role per combat style, hosted count, ...)
    pub misc: BTreeMap<String, String>,
    /// Opaque mirror row ids
    pub row_id: String,
    pub entry_id: String,
    /// Whether the last per-player detail fetch found this member.
    /// Transient; not persisted.
    #[serde(skip)]
    pub on_hiscores: bool,
}

impl Member {
    /// Blank member with the given name
    pub fn new(name: PlayerName) -> Self {
        Self {
            name,
            rank_ingame: IngameRank::Recruit,
            rank_discord: String::new(),
            rank_site: SiteRank::Guest,
            join_date: None,
            leave_date: None,
            leave_reason: String::new(),
            referral: String::new(),
            discord_id: DiscordId::NONE,
            discord_name: String::new(),
            profile_link: None,
            old_names: Vec::new(),
            last_active: None,
            clan_xp: 0,
            kills: 0,
            skills: Skills::default(),
            activities: Activities::default(),
            clue_counts: ClueCounts::default(),
            passed_gem: false,
            warnings: Vec::new(),
            warning_points: 0,
            notify_stats: Vec::new(),
            discord_roles: Vec::new(),
            notes: Default::default(),
            misc: BTreeMap::new(),
            row_id: String::new(),
            entry_id: String::new(),
            on_hiscores: true,
        }
    }

    /// Staff-preregistered member awaiting their first hiscores sighting
    pub fn needs_invite(name: PlayerName) -> Self {
        Self {
            rank_ingame: IngameRank::NeedsInvite,
            ..Self::new(name)
        }
    }

    /// RuneScore shortcut (may drift both ways, unlike every other counter)
    #[inline]
    pub fn runescore(&self) -> i64 {
        self.activities.runescore()
    }

    /// Identity test: case-insensitive name, or matching non-zero discord
    /// id, or matching profile link
    pub fn same_identity(&self, other: &Member) -> bool {
        if self.name == other.name {
            return true;
        }
        if !self.discord_id.is_none() && self.discord_id == other.discord_id {
            return true;
        }
        matches!((&self.profile_link, &other.profile_link), (Some(a), Some(b)) if a == b)
    }

    /// Whether this member answers to the given lookup key
    pub fn matches_id(&self, id: &MemberId) -> bool {
        match id {
            MemberId::Discord(did) => !did.is_none() && self.discord_id == *did,
            MemberId::Profile(link) => self.profile_link.as_ref() == Some(link),
            MemberId::Name(name) => self.name == *name,
        }
    }

    /// Whether the given raw name appears in the old-name history
    pub fn has_old_name(&self, name: &str) -> bool {
        self.old_names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    /// Activity predicate: this (newer) snapshot is active relative to
    /// `prior` iff any monotonic counter strictly increased. RuneScore is
    /// excluded because it can drift.
    pub fn is_active_since(&self, prior: &Member) -> bool {
        self.clan_xp > prior.clan_xp
            || self.kills > prior.kills
            || self
                .skills
                .iter()
                .zip(prior.skills.iter())
                .any(|((_, new), (_, old))| new.xp > old.xp)
            || self.activities.any_score_above(&prior.activities)
            || self.clue_counts.any_above(&prior.clue_counts)
    }

    /// Take over the stored identity of `leaver` after a detected rename
    ///
    /// The leaver's name joins the old-name history (kept oldest first,
    /// de-duplicated in case the handle was used before), and identity
    /// fields tracked outside the game carry over.
    pub fn adopt_identity_of(&mut self, leaver: &Member) {
        self.old_names = leaver.old_names.clone();
        let former = leaver.name.as_str().to_string();
        self.old_names.retain(|n| !n.eq_ignore_ascii_case(&former));
        // A rename back to an earlier handle also drops it from history.
        let new_name = self.name.as_str().to_string();
        self.old_names.retain(|n| !n.eq_ignore_ascii_case(&new_name));
        self.old_names.push(former);

        self.rank_discord = leaver.rank_discord.clone();
        self.rank_site = leaver.rank_site;
        self.join_date = leaver.join_date;
        self.referral = leaver.referral.clone();
        self.discord_id = leaver.discord_id;
        self.discord_name = leaver.discord_name.clone();
        self.profile_link = leaver.profile_link.clone();
        self.passed_gem = leaver.passed_gem;
        self.warnings = leaver.warnings.clone();
        self.warning_points = leaver.warning_points;
        self.notify_stats = leaver.notify_stats.clone();
        self.discord_roles = leaver.discord_roles.clone();
        self.notes = leaver.notes.clone();
        self.misc = leaver.misc.clone();
        self.row_id = leaver.row_id.clone();
        self.entry_id = leaver.entry_id.clone();
    }

    /// Mark as retired with the standard bookkeeping
    pub fn retire(&mut self, leave_date: NaiveDate) {
        self.leave_date = Some(leave_date);
        if self.leave_reason.is_empty() {
            self.leave_reason = DEFAULT_LEAVE_REASON.to_string();
        }
        self.rank_site = SiteRank::RetiredMember;
        self.rank_discord.clear();
    }

    /// Refresh the mirrored warning-point total from the warning list
    pub fn recompute_warning_points(&mut self, today: NaiveDate) {
        self.warning_points = current_points(&self.warnings, today);
    }
}

/// Rename match score between a tentative leaver and a tentative joiner
///
/// `None` means the two cannot be the same identity: any monotonic counter
/// that is lower on the joiner side rules the pair out. Otherwise the score
/// is the Euclidean norm of four normalized per-day deltas; lower is closer,
/// and anything under the configured threshold is a probable rename.
pub fn rename_match_score(leaver: &Member, joiner: &Member, now: DateTime<Utc>) -> Option<f64> {
    if joiner.clan_xp < leaver.clan_xp
        || joiner.kills < leaver.kills
        || joiner.skills.any_xp_below(&leaver.skills)
        || joiner.clue_counts.total() < leaver.clue_counts.total()
        || joiner.clue_counts.any_below(&leaver.clue_counts)
    {
        return None;
    }

    // Deltas are normalized to one day of progress since the leaver was
    // last seen active; a member missing a timestamp counts as one day.
    let days = leaver
        .last_active
        .map_or(1, |t| (now - t).num_days().max(1)) as f64;

    let clan_xp = (joiner.clan_xp - leaver.clan_xp) as f64 / days / 20_000_000.0;
    let runescore = (joiner.runescore() - leaver.runescore()).abs() as f64 / days / 1_000.0;
    let overall =
        (joiner.skills.overall().xp - leaver.skills.overall().xp) as f64 / days / 20_000_000.0;
    let constitution = (joiner.skills.constitution().xp - leaver.skills.constitution().xp) as f64
        / days
        / 4_000_000.0;

    Some(
        (clan_xp * clan_xp + runescore * runescore + overall * overall + constitution * constitution)
            .sqrt(),
    )
}
