//! Service context - dependency container for services
//!
//! Assembled once at startup from configuration and the concrete port
//! implementations, then passed by value (cheap clones, everything shared
//! is behind an `Arc`) to the coordinator and command services. There is
//! no global singleton; nothing reads configuration after assembly.

use std::sync::Arc;

use parking_lot::RwLock;

use clan_common::AppConfig;
use clan_core::traits::{HiscoresApi, RosterMirror, SiteApi};
use clan_store::RosterStore;

use super::lock::RosterLock;

/// Service context containing all dependencies
///
/// Provides access to:
/// - The configuration loaded at startup
/// - The hiscores and site clients (behind their port traits)
/// - The roster mirror
/// - The shared in-memory roster and its advisory lock
#[derive(Clone)]
pub struct ServiceContext {
    config: AppConfig,
    hiscores: Arc<dyn HiscoresApi>,
    site: Arc<dyn SiteApi>,
    mirror: Arc<dyn RosterMirror>,
    roster: Arc<RwLock<RosterStore>>,
    roster_lock: RosterLock,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        config: AppConfig,
        hiscores: Arc<dyn HiscoresApi>,
        site: Arc<dyn SiteApi>,
        mirror: Arc<dyn RosterMirror>,
        roster: RosterStore,
    ) -> Self {
        Self {
            config,
            hiscores,
            site,
            mirror,
            roster: Arc::new(RwLock::new(roster)),
            roster_lock: RosterLock::new(),
        }
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the hiscores client
    pub fn hiscores(&self) -> &dyn HiscoresApi {
        self.hiscores.as_ref()
    }

    /// Get the community-site client
    pub fn site(&self) -> &dyn SiteApi {
        self.site.as_ref()
    }

    /// Get the roster mirror
    pub fn mirror(&self) -> &dyn RosterMirror {
        self.mirror.as_ref()
    }

    /// Get the shared roster store
    pub fn roster(&self) -> &RwLock<RosterStore> {
        &self.roster
    }

    /// Get the advisory roster lock
    pub fn roster_lock(&self) -> &RosterLock {
        &self.roster_lock
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("clan_name", &self.config.app.clan_name)
            .field("lock_holder", &self.roster_lock.holder())
            .finish()
    }
}
