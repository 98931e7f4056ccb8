//! Reconciliation engine
//!
//! Classifies every member considered by one pass as staying, joining,
//! leaving, or renamed, and produces the new current roster plus the
//! retired additions. The engine is pure with respect to the roster
//! store: it takes a snapshot in and hands lists back, and the caller
//! installs them atomically under the lock.
//!
//! Name disappearances are not trusted at face value. A stored member
//! missing from the clan list is only a leaver if their hiscores page
//! still exists under the old name; a vanished page means either a rename
//! (resolved against the joiners by stat deltas) or a hiscores dropout
//! (kept, with a one-point clan-xp decay so repeat dropouts surface).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use clan_common::ReconcileConfig;
use clan_core::changeset::{ChangeSet, Rename};
use clan_core::entities::{rename_match_score, Member};
use clan_core::traits::{ClanListEntry, HiscoresApi, PlayerDetail};
use clan_core::value_objects::IngameRank;

/// Where one reconciliation slot currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilePhase {
    #[default]
    Idle,
    Snapshotting,
    Fetching,
    Matching,
    Applying,
    Persisting,
}

impl ReconcilePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Snapshotting => "snapshotting",
            Self::Fetching => "fetching",
            Self::Matching => "matching",
            Self::Applying => "applying",
            Self::Persisting => "persisting",
        }
    }
}

impl std::fmt::Display for ReconcilePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine tunables, lifted from configuration
#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    /// Rename match scores below this are treated as probable renames
    pub rename_threshold: f64,
    /// Leaver counts above this suppress automatic external deranks
    pub leaver_cap: usize,
    /// Concurrent per-player detail fetches
    pub detail_concurrency: usize,
}

impl From<&ReconcileConfig> for ReconcileOptions {
    fn from(config: &ReconcileConfig) -> Self {
        Self {
            rename_threshold: config.rename_threshold,
            leaver_cap: config.leaver_cap,
            detail_concurrency: config.detail_concurrency,
        }
    }
}

/// Everything one pass produces
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub change_set: ChangeSet,
    /// The full replacement for the current roster
    pub current: Vec<Member>,
    /// Leavers to append to the retired roster, bookkeeping applied
    pub retired_additions: Vec<Member>,
}

fn apply_detail(member: &mut Member, detail: &PlayerDetail) {
    member.skills = detail.skills.clone();
    member.activities = detail.activities.clone();
    member.clue_counts = detail.clue_counts;
}

fn update_from_entry(member: &mut Member, entry: &ClanListEntry) {
    member.rank_ingame = entry.rank;
    member.clan_xp = entry.clan_xp;
    member.kills = entry.kills;
}

/// Run one reconciliation pass
///
/// `stored` is the current-roster snapshot; `ingame` the freshly fetched
/// clan list. Detail fetches are dispatched concurrently but consumed in
/// clan-list order, so the forward pass stays deterministic.
#[instrument(skip_all, fields(stored = stored.len(), ingame = ingame.len()))]
pub async fn reconcile(
    stored: Vec<Member>,
    ingame: Vec<ClanListEntry>,
    hiscores: &dyn HiscoresApi,
    now: DateTime<Utc>,
    options: &ReconcileOptions,
) -> ReconcileOutcome {
    let today = now.date_naive();

    // Dispatch detail fetches for the whole list up front; a failed fetch
    // degrades to None rather than aborting the pass.
    let details: Vec<Option<PlayerDetail>> = stream::iter(
        ingame
            .iter()
            .map(|entry| async move { hiscores.fetch_player(&entry.name).await.unwrap_or(None) }),
    )
    .buffered(options.detail_concurrency.max(1))
    .collect()
    .await;

    // Forward pass: everyone on the clan list.
    let mut remaining = stored;
    let mut staying: Vec<Member> = Vec::new();
    let mut joining: Vec<Member> = Vec::new();

    for (entry, detail) in ingame.iter().zip(details) {
        if let Some(pos) = remaining.iter().position(|m| m.name == entry.name) {
            let mut member = remaining.remove(pos);
            if member.rank_ingame == IngameRank::NeedsInvite {
                // Pre-registered member now observed in game.
                update_from_entry(&mut member, entry);
                if let Some(d) = &detail {
                    apply_detail(&mut member, d);
                }
                member.on_hiscores = detail.is_some();
                if member.join_date.is_none() {
                    member.join_date = Some(today);
                }
                member.last_active = Some(now);
                joining.push(member);
            } else if let Some(d) = &detail {
                let prior = member.clone();
                update_from_entry(&mut member, entry);
                apply_detail(&mut member, d);
                member.on_hiscores = true;
                if member.is_active_since(&prior) && member.last_active.map_or(true, |t| t <= now)
                {
                    member.last_active = Some(now);
                }
                staying.push(member);
            } else {
                // Detail index dropped them; keep stored stats and decay
                // clan xp by one so the drift is visible over time.
                member.clan_xp = member.clan_xp.saturating_sub(1);
                member.on_hiscores = false;
                staying.push(member);
            }
        } else {
            let mut member = Member::new(entry.name.clone());
            update_from_entry(&mut member, entry);
            if let Some(d) = &detail {
                apply_detail(&mut member, d);
            }
            member.on_hiscores = detail.is_some();
            member.join_date = Some(today);
            member.last_active = Some(now);
            joining.push(member);
        }
    }

    // Reverse pass: everyone stored but unseen is a tentative leaver.
    let tentative_leaving = remaining;

    // Rename resolution. A leaver can only participate with a known,
    // positive runescore; exact-name matches were already consumed by the
    // forward pass, so every candidate pair here is name-disjoint.
    let mut claimed: HashSet<usize> = HashSet::new();
    let mut pending: Vec<(usize, Member)> = Vec::new();
    let mut still_leaving: Vec<Member> = Vec::new();

    for leaver in tentative_leaving {
        if leaver.runescore() <= 0 {
            still_leaving.push(leaver);
            continue;
        }
        let mut best: Option<(usize, f64)> = None;
        for (j, joiner) in joining.iter().enumerate() {
            if let Some(score) = rename_match_score(&leaver, joiner, now) {
                if best.map_or(true, |(_, b)| score < b) {
                    best = Some((j, score));
                }
            }
        }
        match best {
            // First leaver in iteration order wins a contested joiner;
            // later claimants revert to genuine leavers.
            Some((j, score)) if score < options.rename_threshold && !claimed.contains(&j) => {
                debug!(leaver = %leaver.name, score, "Rename candidate accepted");
                claimed.insert(j);
                pending.push((j, leaver));
            }
            _ => still_leaving.push(leaver),
        }
    }

    let mut renamed: Vec<Rename> = Vec::new();
    pending.sort_by(|a, b| b.0.cmp(&a.0));
    for (j, leaver) in pending {
        let mut member = joining.remove(j);
        member.adopt_identity_of(&leaver);
        member.last_active = Some(now);
        renamed.push(Rename {
            old_name: leaver.name.to_string(),
            member,
        });
    }
    renamed.reverse();

    // Needs-invite members were never in game, so they cannot have left.
    let mut confirmed_leaving: Vec<Member> = Vec::new();
    for leaver in still_leaving {
        if leaver.rank_ingame == IngameRank::NeedsInvite {
            staying.push(leaver);
            continue;
        }
        // A leaver whose hiscores page is gone may just have dropped off
        // the index; keep them with a one-point clan-xp decay.
        match hiscores.fetch_player(&leaver.name).await {
            Ok(Some(_)) => confirmed_leaving.push(leaver),
            Ok(None) | Err(_) => {
                let mut member = leaver;
                member.clan_xp = member.clan_xp.saturating_sub(1);
                member.on_hiscores = false;
                staying.push(member);
            }
        }
    }

    let suppress_external_updates = confirmed_leaving.len() > options.leaver_cap;
    if suppress_external_updates {
        warn!(
            leaving = confirmed_leaving.len(),
            cap = options.leaver_cap,
            "Leaver count exceeds safety cap; external updates suppressed"
        );
    }

    let mut retired_additions = confirmed_leaving;
    for member in &mut retired_additions {
        member.retire(today);
    }

    // Apply: the new current roster is everyone classified as staying,
    // renamed, or joining.
    let mut current = staying.clone();
    current.extend(renamed.iter().map(|r| r.member.clone()));
    current.extend(joining.iter().cloned());

    let change_set = ChangeSet {
        joining,
        leaving: retired_additions.clone(),
        renamed,
        staying,
        suppress_external_updates,
    };

    info!(
        joining = change_set.joining.len(),
        leaving = change_set.leaving.len(),
        renamed = change_set.renamed.len(),
        staying = change_set.staying.len(),
        "Reconciliation pass complete"
    );

    ReconcileOutcome {
        change_set,
        current,
        retired_additions,
    }
}
