//! Clan daemon entry point
//!
//! Run with:
//! ```bash
//! cargo run -p clan-daemon
//! ```
//!
//! Configuration is loaded from environment variables. The daemon restores
//! the roster from the newest local backups, then runs one full update per
//! day at the configured UTC hour.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use clan_clients::{FileMirror, HiscoresClient, SiteClient};
use clan_common::{try_init_tracing, AppConfig};
use clan_service::{next_fire_delay, ServiceContext, UpdateCoordinator};
use clan_store::{load_latest_backups, PermissionsRegistry, RosterStore};

#[tokio::main]
async fn main() {
    // Initialize tracing
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Daemon failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting clan daemon...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        clan = %config.app.clan_name,
        update_hour = config.schedule.update_hour,
        "Configuration loaded"
    );

    // Validate the permissions file early; command front-ends consult it.
    let permissions =
        PermissionsRegistry::load(Path::new(&config.storage.permissions_path))?;
    info!(
        restricted_commands = permissions.len(),
        "Permissions registry loaded"
    );

    let hiscores = Arc::new(HiscoresClient::new(&config.hiscores, &config.app.clan_name)?);
    let site = Arc::new(SiteClient::new(&config.site)?);
    let mirror = Arc::new(FileMirror::new(&config.storage.mirror_dir));

    // Restore from the newest backups; a first run starts empty and is
    // populated by the first update.
    let store = match load_latest_backups(
        Path::new(&config.storage.backup_dir),
        &config.site.base_url,
    )? {
        Some(snapshot) => {
            info!(
                current = snapshot.current.len(),
                retired = snapshot.retired.len(),
                banned = snapshot.banned.len(),
                "Roster restored from backups"
            );
            RosterStore::from_lists(snapshot.current, snapshot.retired, snapshot.banned)
        }
        None => {
            warn!("No backups found; starting with an empty roster");
            RosterStore::new()
        }
    };

    let ctx = ServiceContext::new(config.clone(), hiscores, site, mirror, store);
    let coordinator = UpdateCoordinator::new(ctx);

    loop {
        let delay = next_fire_delay(Utc::now(), config.schedule.update_hour);
        info!(secs = delay.as_secs(), "Next full update scheduled");
        tokio::time::sleep(delay).await;

        match coordinator.full_update().await {
            Ok(report) => {
                if report.suppressed() {
                    warn!(summary = %report.summary(), "Update finished with suppressed external changes");
                } else {
                    info!(summary = %report.summary(), "Update finished");
                }
            }
            Err(e) if e.is_transient() => {
                warn!(error = %e, "Update failed transiently; will retry tomorrow");
            }
            Err(e) => {
                error!(error = %e, "Update failed");
            }
        }
    }
}
