//! Test fixtures - in-memory port implementations and member builders
//!
//! Provides the fakes behind the domain ports plus builders for members,
//! clan-list entries, and per-player details, so scenario tests read as
//! stored-state / in-game-state tables.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use clan_common::{
    AppConfig, AppSettings, Environment, HiscoresConfig, ReconcileConfig, ScheduleConfig,
    SiteConfig, StorageConfig,
};
use clan_core::entities::{Member, SKILL_CONSTITUTION, SKILL_OVERALL};
use clan_core::error::DomainError;
use clan_core::traits::{
    ClanListEntry, HiscoresApi, PlayerDetail, PortResult, RosterMirror, RosterTab, SiteApi,
};
use clan_core::value_objects::{IngameRank, PlayerName, ProfileLink, SiteRank};
use clan_service::ServiceContext;
use clan_store::RosterStore;

/// Site base URL used by every fixture
pub const SITE_BASE: &str = "https://clan.example.com";

// ---------------------------------------------------------------------------
// Port fakes
// ---------------------------------------------------------------------------

/// In-memory hiscores: a settable clan list plus a name-keyed detail index
pub struct FakeHiscores {
    clan_list: Mutex<Option<Vec<ClanListEntry>>>,
    details: Mutex<HashMap<String, PlayerDetail>>,
}

impl Default for FakeHiscores {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHiscores {
    pub fn new() -> Self {
        Self {
            clan_list: Mutex::new(Some(Vec::new())),
            details: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the clan list returned by the next fetch
    pub fn set_clan_list(&self, list: Vec<ClanListEntry>) {
        *self.clan_list.lock() = Some(list);
    }

    /// Make the next clan-list fetch fail
    pub fn fail_clan_list(&self) {
        *self.clan_list.lock() = None;
    }

    /// Install a per-player detail page
    pub fn set_detail(&self, name: &str, detail: PlayerDetail) {
        self.details.lock().insert(name.to_string(), detail);
    }

    /// Remove a player from the detail index (simulates a 404)
    pub fn remove_detail(&self, name: &str) {
        self.details.lock().remove(name);
    }
}

#[async_trait]
impl HiscoresApi for FakeHiscores {
    async fn fetch_clan_list(&self) -> PortResult<Vec<ClanListEntry>> {
        self.clan_list
            .lock()
            .clone()
            .ok_or_else(|| DomainError::External("clan list unavailable".into()))
    }

    async fn fetch_player(&self, name: &PlayerName) -> PortResult<Option<PlayerDetail>> {
        Ok(self.details.lock().get(name.as_str()).cloned())
    }
}

/// Records every rank write; reads always answer `FullMember`
#[derive(Default)]
pub struct FakeSite {
    set_calls: Mutex<Vec<(String, SiteRank)>>,
}

impl FakeSite {
    pub fn set_rank_calls(&self) -> Vec<(String, SiteRank)> {
        self.set_calls.lock().clone()
    }
}

#[async_trait]
impl SiteApi for FakeSite {
    async fn get_rank(&self, _profile: &ProfileLink) -> PortResult<SiteRank> {
        Ok(SiteRank::FullMember)
    }

    async fn set_rank(&self, profile: &ProfileLink, rank: SiteRank) -> PortResult<()> {
        self.set_calls
            .lock()
            .push((profile.as_str().to_string(), rank));
        Ok(())
    }
}

/// In-memory mirror: tab contents, the marker, and the changelog
#[derive(Default)]
pub struct FakeMirror {
    tabs: Mutex<HashMap<&'static str, Vec<Vec<String>>>>,
    marker: Mutex<Option<String>>,
    changelog: Mutex<Vec<String>>,
}

impl FakeMirror {
    pub fn tab(&self, tab: RosterTab) -> Vec<Vec<String>> {
        self.tabs.lock().get(tab.title()).cloned().unwrap_or_default()
    }

    pub fn marker(&self) -> Option<String> {
        self.marker.lock().clone()
    }

    pub fn changelog(&self) -> Vec<String> {
        self.changelog.lock().clone()
    }
}

#[async_trait]
impl RosterMirror for FakeMirror {
    async fn ensure_connected(&self) -> PortResult<()> {
        Ok(())
    }

    async fn replace_tab(&self, tab: RosterTab, rows: Vec<Vec<String>>) -> PortResult<()> {
        self.tabs.lock().insert(tab.title(), rows);
        Ok(())
    }

    async fn publish_marker(&self, text: &str) -> PortResult<()> {
        *self.marker.lock() = Some(text.to_string());
        Ok(())
    }

    async fn clear_marker(&self) -> PortResult<()> {
        *self.marker.lock() = None;
        Ok(())
    }

    async fn insert_changelog(&self, lines: &[String]) -> PortResult<()> {
        let mut log = self.changelog.lock();
        for (i, line) in lines.iter().enumerate() {
            log.insert(i, line.clone());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn member(name: &str) -> Member {
    Member::new(PlayerName::parse(name).unwrap())
}

/// Stored member with the four stats the rename matcher cares about
pub fn member_with_stats(
    name: &str,
    clan_xp: u64,
    runescore: i64,
    overall: u64,
    con: u64,
) -> Member {
    let mut m = member(name);
    m.clan_xp = clan_xp;
    m.activities.set_runescore(runescore);
    m.skills.0[SKILL_OVERALL].xp = overall;
    m.skills.0[SKILL_CONSTITUTION].xp = con;
    m
}

pub fn entry(name: &str, clan_xp: u64) -> ClanListEntry {
    ClanListEntry {
        name: PlayerName::parse(name).unwrap(),
        rank: IngameRank::Recruit,
        clan_xp,
        kills: 0,
    }
}

pub fn detail(runescore: i64, overall: u64, con: u64) -> PlayerDetail {
    let mut d = PlayerDetail::default();
    d.activities.set_runescore(runescore);
    d.skills.0[SKILL_OVERALL].xp = overall;
    d.skills.0[SKILL_CONSTITUTION].xp = con;
    d
}

pub fn profile(id: u32) -> ProfileLink {
    ProfileLink::parse(SITE_BASE, &format!("{SITE_BASE}/members/{id:07}")).unwrap()
}

pub fn test_config(backup_dir: &Path) -> AppConfig {
    AppConfig {
        app: AppSettings {
            clan_name: "Test Clan".to_string(),
            env: Environment::Development,
        },
        hiscores: HiscoresConfig {
            base_url: "http://localhost".to_string(),
            timeout_secs: 1,
            retries: 0,
        },
        site: SiteConfig {
            base_url: SITE_BASE.to_string(),
            email: "bot@example.com".to_string(),
            password: "secret".to_string(),
            timeout_secs: 1,
        },
        storage: StorageConfig {
            backup_dir: backup_dir.display().to_string(),
            mirror_dir: String::new(),
            permissions_path: String::new(),
        },
        reconcile: ReconcileConfig {
            rename_threshold: 2.0,
            leaver_cap: 10,
            detail_concurrency: 4,
        },
        schedule: ScheduleConfig {
            update_hour: 20,
            // Tests never sleep through a countdown.
            countdown_minutes: 0,
        },
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Fully wired service context over the fakes
pub struct TestHarness {
    pub ctx: ServiceContext,
    pub hiscores: Arc<FakeHiscores>,
    pub site: Arc<FakeSite>,
    pub mirror: Arc<FakeMirror>,
    backup_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn with_store(store: RosterStore) -> Self {
        let backup_dir = tempfile::tempdir().unwrap();
        let hiscores = Arc::new(FakeHiscores::new());
        let site = Arc::new(FakeSite::default());
        let mirror = Arc::new(FakeMirror::default());
        let ctx = ServiceContext::new(
            test_config(backup_dir.path()),
            Arc::clone(&hiscores) as Arc<dyn HiscoresApi>,
            Arc::clone(&site) as Arc<dyn SiteApi>,
            Arc::clone(&mirror) as Arc<dyn RosterMirror>,
            store,
        );
        Self {
            ctx,
            hiscores,
            site,
            mirror,
            backup_dir,
        }
    }

    pub fn new() -> Self {
        Self::with_store(RosterStore::new())
    }

    pub fn backup_dir(&self) -> &Path {
        self.backup_dir.path()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
