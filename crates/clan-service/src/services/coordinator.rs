//! Update coordinator - owns the roster lock and runs full updates
//!
//! A full update is the only long-lived lock holder: countdown markers,
//! snapshot, fetch, reconcile, atomic apply, external deranks, change log,
//! persist. Ad-hoc commands take the same lock for their short critical
//! sections and get a busy error while an update runs.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{info, instrument, warn};

use clan_core::value_objects::SiteRank;
use clan_store::persist;

use super::changelog::ChangeReport;
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::reconcile::{reconcile, ReconcileOptions, ReconcilePhase};

/// Lock reason used for the full update
pub const UPDATE_REASON: &str = "Memberlist update";

/// Coordinates full updates and exposes the roster lock to commands
#[derive(Debug, Clone)]
pub struct UpdateCoordinator {
    ctx: ServiceContext,
    phase: Arc<Mutex<ReconcilePhase>>,
}

impl UpdateCoordinator {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            phase: Arc::new(Mutex::new(ReconcilePhase::Idle)),
        }
    }

    /// Where the current (or last) update slot is
    pub fn phase(&self) -> ReconcilePhase {
        *self.phase.lock()
    }

    fn set_phase(&self, phase: ReconcilePhase) {
        *self.phase.lock() = phase;
    }

    /// Run one full update now
    pub async fn full_update(&self) -> ServiceResult<ChangeReport> {
        self.full_update_at(Utc::now()).await
    }

    /// Run one full update with an explicit timestamp
    #[instrument(skip(self))]
    pub async fn full_update_at(&self, now: DateTime<Utc>) -> ServiceResult<ChangeReport> {
        let _guard = self.ctx.roster_lock().lock(UPDATE_REASON)?;

        self.countdown().await;
        if let Err(e) = self
            .ctx
            .mirror()
            .publish_marker("Memberlist update in progress - please stop editing")
            .await
        {
            warn!(error = %e, "Could not publish update marker");
        }

        let result = self.run(now).await;

        if let Err(e) = self.ctx.mirror().clear_marker().await {
            warn!(error = %e, "Could not clear update marker");
        }
        self.set_phase(ReconcilePhase::Idle);
        result
    }

    /// Countdown markers so external editors can stop typing
    async fn countdown(&self) {
        let minutes = self.ctx.config().schedule.countdown_minutes;
        for remaining in (1..=minutes).rev() {
            let text = format!("Memberlist update in {remaining} min - please stop editing");
            if let Err(e) = self.ctx.mirror().publish_marker(&text).await {
                warn!(error = %e, "Could not publish countdown marker");
            }
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
    }

    async fn run(&self, now: DateTime<Utc>) -> ServiceResult<ChangeReport> {
        self.set_phase(ReconcilePhase::Snapshotting);
        let stored = self.ctx.roster().read().snapshot();

        // A failed clan-list fetch aborts with no mutation; there is no
        // useful partial result without the canonical list.
        self.set_phase(ReconcilePhase::Fetching);
        let ingame = self.ctx.hiscores().fetch_clan_list().await?;

        self.set_phase(ReconcilePhase::Matching);
        let options = ReconcileOptions::from(&self.ctx.config().reconcile);
        let outcome = reconcile(
            stored.current,
            ingame,
            self.ctx.hiscores(),
            now,
            &options,
        )
        .await;

        self.set_phase(ReconcilePhase::Applying);
        self.ctx
            .roster()
            .write()
            .apply_reconcile(outcome.current, outcome.retired_additions);

        if outcome.change_set.suppress_external_updates {
            warn!("Safety cap tripped; skipping site deranks - manual review required");
        } else {
            for leaver in &outcome.change_set.leaving {
                let Some(link) = &leaver.profile_link else {
                    continue;
                };
                // Best effort: a failed derank is logged and retried by a
                // human, never allowed to abort the update.
                if let Err(e) = self.ctx.site().set_rank(link, SiteRank::RetiredMember).await {
                    warn!(member = %leaver.name, error = %e, "Site derank failed");
                }
            }
        }

        let report = ChangeReport::from_change_set(&outcome.change_set, now.date_naive());
        if let Err(e) = report.publish(self.ctx.mirror()).await {
            warn!(error = %e, "Could not publish change log");
        }

        self.set_phase(ReconcilePhase::Persisting);
        let snapshot = self.ctx.roster().read().snapshot();
        persist(
            &snapshot,
            self.ctx.mirror(),
            Path::new(&self.ctx.config().storage.backup_dir),
            now.date_naive(),
        )
        .await?;

        info!(summary = %report.summary(), "Full update complete");
        Ok(report)
    }
}

/// Delay until the next daily firing of the configured UTC hour
///
/// Recomputed on every start so a restart never double-fires.
pub fn next_fire_delay(now: DateTime<Utc>, update_hour: u32) -> Duration {
    let today = now
        .date_naive()
        .and_hms_opt(update_hour, 0, 0)
        .unwrap_or_default()
        .and_utc();
    let fire = if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    };
    (fire - now).to_std().unwrap_or_default()
}
