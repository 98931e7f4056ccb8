//! Persistence across a full update
//!
//! A full update pushes the roster to the mirror and writes dated backup
//! files; a restart restores the exact same members from the newest
//! backups.

use chrono::{DateTime, Utc};

use clan_core::traits::RosterTab;
use clan_core::value_objects::Warning;
use clan_service::UpdateCoordinator;
use clan_store::{load_latest_backups, Roster, RosterStore};

use integration_tests::fixtures::{
    detail, entry, member_with_stats, profile, TestHarness, SITE_BASE,
};

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_backup_restores_a_fully_populated_member() {
    let mut gale = member_with_stats("Gale", 300, 20, 1000, 100);
    gale.profile_link = Some(profile(42));
    gale.join_date = Some("2024-03-01".parse().unwrap());
    gale.discord_name = "gale#0001".to_string();
    gale.referral = "forum post".to_string();
    gale.passed_gem = true;
    gale.old_names = vec!["Gail".to_string()];
    gale.notes[0] = "hosts skilling events".to_string();
    gale.notify_stats = vec!["Slayer".to_string()];
    gale.discord_roles = vec![111, 222];
    gale.warnings
        .push(Warning::new(2, "2026-12-31".parse().unwrap(), "afk in event"));
    gale.recompute_warning_points("2026-08-23".parse().unwrap());
    gale.misc
        .insert("events_hosted".to_string(), "4".to_string());

    let mut store = RosterStore::new();
    store.add(Roster::Current, gale).unwrap();
    let harness = TestHarness::with_store(store);
    harness.hiscores.set_clan_list(vec![entry("Gale", 350)]);
    harness.hiscores.set_detail("Gale", detail(25, 1500, 150));

    let coordinator = UpdateCoordinator::new(harness.ctx.clone());
    coordinator
        .full_update_at(at("2026-08-23T20:00:00Z"))
        .await
        .unwrap();

    let snapshot = harness.ctx.roster().read().snapshot();
    let restored = load_latest_backups(harness.backup_dir(), SITE_BASE)
        .unwrap()
        .expect("backups were written");

    assert_eq!(restored.current, snapshot.current);
    assert_eq!(restored.retired, snapshot.retired);
    assert_eq!(restored.banned, snapshot.banned);

    let gale = &restored.current[0];
    assert_eq!(gale.clan_xp, 350);
    assert_eq!(gale.skills.overall().xp, 1500);
    assert_eq!(gale.warnings.len(), 1);
    assert_eq!(gale.misc["events_hosted"], "4");
    assert_eq!(gale.last_active, Some(at("2026-08-23T20:00:00Z")));
}

#[tokio::test]
async fn test_newest_backup_wins_after_two_updates() {
    let harness = TestHarness::new();
    harness.hiscores.set_clan_list(vec![entry("Hana", 5)]);
    harness.hiscores.set_detail("Hana", detail(1, 0, 0));

    let coordinator = UpdateCoordinator::new(harness.ctx.clone());
    coordinator
        .full_update_at(at("2026-08-22T20:00:00Z"))
        .await
        .unwrap();

    harness
        .hiscores
        .set_clan_list(vec![entry("Hana", 6), entry("Ivy", 1)]);
    harness.hiscores.set_detail("Ivy", detail(1, 0, 0));
    coordinator
        .full_update_at(at("2026-08-23T20:00:00Z"))
        .await
        .unwrap();

    let restored = load_latest_backups(harness.backup_dir(), SITE_BASE)
        .unwrap()
        .unwrap();
    assert_eq!(restored.current.len(), 2);
}

#[tokio::test]
async fn test_mirror_tabs_reflect_the_applied_roster() {
    let mut frank = member_with_stats("Frank", 200, 10, 0, 0);
    frank
        .warnings
        .push(Warning::new(1, "2026-12-31".parse().unwrap(), "late to event"));
    let mut store = RosterStore::new();
    store.add(Roster::Current, frank).unwrap();

    let harness = TestHarness::with_store(store);
    // Frank leaves; his page still exists.
    harness.hiscores.set_detail("Frank", detail(10, 0, 0));

    let coordinator = UpdateCoordinator::new(harness.ctx.clone());
    coordinator
        .full_update_at(at("2026-08-23T20:00:00Z"))
        .await
        .unwrap();

    assert!(harness.mirror.tab(RosterTab::CurrentMembers).is_empty());
    let old = harness.mirror.tab(RosterTab::OldMembers);
    assert_eq!(old.len(), 1);
    assert_eq!(old[0][0], "Frank");

    // Warnings follow the member into the retired tab's source data.
    let warnings = harness.mirror.tab(RosterTab::Warnings);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0][0], "Frank");
}
