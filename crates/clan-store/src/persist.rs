//! Durable persistence of a roster snapshot
//!
//! The mirrored tabular document is written first - it is the authoritative
//! post-apply state used for recovery - and the dated local backup files
//! after it.

use std::path::Path;

use chrono::NaiveDate;
use tracing::{info, instrument};

use clan_core::entities::{Member, DATE_FMT};
use clan_core::error::DomainError;
use clan_core::traits::{RosterMirror, RosterTab};

use crate::backup::write_backups;
use crate::roster::RosterSnapshot;

fn member_rows(members: &[Member]) -> Vec<Vec<String>> {
    members.iter().map(Member::to_row).collect()
}

fn warning_rows(snapshot: &RosterSnapshot) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for member in snapshot
        .current
        .iter()
        .chain(&snapshot.retired)
        .chain(&snapshot.banned)
    {
        for warning in &member.warnings {
            rows.push(vec![
                member.name.to_string(),
                warning.points.to_string(),
                warning.expires.format(DATE_FMT).to_string(),
                warning.reason.clone(),
            ]);
        }
    }
    rows
}

/// Write the snapshot to the mirror and then to the local backup files
#[instrument(skip(snapshot, mirror), fields(current = snapshot.current.len()))]
pub async fn persist(
    snapshot: &RosterSnapshot,
    mirror: &dyn RosterMirror,
    backup_dir: &Path,
    today: NaiveDate,
) -> Result<(), DomainError> {
    mirror.ensure_connected().await?;
    mirror
        .replace_tab(RosterTab::CurrentMembers, member_rows(&snapshot.current))
        .await?;
    mirror
        .replace_tab(RosterTab::OldMembers, member_rows(&snapshot.retired))
        .await?;
    mirror
        .replace_tab(RosterTab::BannedMembers, member_rows(&snapshot.banned))
        .await?;
    mirror
        .replace_tab(RosterTab::Warnings, warning_rows(snapshot))
        .await?;

    write_backups(backup_dir, snapshot, today)?;

    info!(
        current = snapshot.current.len(),
        retired = snapshot.retired.len(),
        banned = snapshot.banned.len(),
        "Roster persisted"
    );
    Ok(())
}
