//! End-to-end full updates through the coordinator
//!
//! Each test sets up a stored roster and an in-game state on the fakes,
//! runs one full update, and checks the resulting roster, mirror, and
//! external rank calls.

use chrono::{DateTime, Utc};

use clan_core::traits::RosterTab;
use clan_core::value_objects::{IngameRank, SiteRank};
use clan_service::{MemberService, UpdateCoordinator};
use clan_store::{Roster, RosterStore};

use integration_tests::fixtures::{detail, entry, member_with_stats, profile, TestHarness};

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_rename_survives_full_update() {
    let mut store = RosterStore::new();
    store
        .add(
            Roster::Current,
            member_with_stats("Alice", 1000, 500, 1_000_000, 100_000),
        )
        .unwrap();
    let harness = TestHarness::with_store(store);
    // Alice's page is gone; "Aria" appears with slightly higher counters.
    harness.hiscores.set_clan_list(vec![entry("Aria", 1001)]);
    harness
        .hiscores
        .set_detail("Aria", detail(502, 1_000_100, 100_010));

    let coordinator = UpdateCoordinator::new(harness.ctx.clone());
    let report = coordinator
        .full_update_at(at("2026-08-23T20:00:00Z"))
        .await
        .unwrap();

    assert_eq!(report.summary(), "0 joined, 0 left, 1 renamed");
    {
        let store = harness.ctx.roster().read();
        assert_eq!(store.len(Roster::Current), 1);
        assert_eq!(store.len(Roster::Retired), 0);

        // The identity carried over: Alice is findable by her old name.
        let hits = store.search("Alice");
        assert_eq!(hits.current.len(), 1);
        assert_eq!(hits.current[0].member.name.as_str(), "Aria");
        assert_eq!(
            hits.current[0].member.old_names,
            vec!["Alice".to_string()]
        );
    }
    assert_eq!(
        harness.mirror.changelog(),
        vec!["2026-08-23: Alice renamed to Aria".to_string()]
    );
    // No leaver, so no external derank.
    assert!(harness.site.set_rank_calls().is_empty());
}

#[tokio::test]
async fn test_lookalike_joiner_does_not_mask_a_leaver() {
    // Bob's counters are below Alice's, so he cannot be her rename; Alice's
    // page still exists under her own name, confirming a genuine departure.
    let mut alice = member_with_stats("Alice", 1000, 500, 0, 0);
    alice.profile_link = Some(profile(1));
    let mut store = RosterStore::new();
    store.add(Roster::Current, alice).unwrap();

    let harness = TestHarness::with_store(store);
    harness.hiscores.set_clan_list(vec![entry("Bob", 999)]);
    harness.hiscores.set_detail("Bob", detail(100, 0, 0));
    harness.hiscores.set_detail("Alice", detail(500, 0, 0));

    let coordinator = UpdateCoordinator::new(harness.ctx.clone());
    let report = coordinator
        .full_update_at(at("2026-08-23T20:00:00Z"))
        .await
        .unwrap();

    assert_eq!(report.summary(), "1 joined, 1 left, 0 renamed");
    {
        let store = harness.ctx.roster().read();
        assert_eq!(store.search("Bob").current.len(), 1);
        let retired = store.search("Alice").retired;
        assert_eq!(retired.len(), 1);
        assert_eq!(
            retired[0].member.leave_date,
            Some("2026-08-23".parse().unwrap())
        );
    }
    let calls = harness.site.set_rank_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, SiteRank::RetiredMember);
}

#[tokio::test]
async fn test_preregistered_member_joins_on_first_sighting() {
    let harness = TestHarness::new();
    let service = MemberService::new(harness.ctx.clone());
    service.add_member("Carol", None, None).await.unwrap();

    harness.hiscores.set_clan_list(vec![entry("Carol", 50)]);
    harness.hiscores.set_detail("Carol", detail(10, 0, 0));

    let coordinator = UpdateCoordinator::new(harness.ctx.clone());
    let report = coordinator
        .full_update_at(at("2026-08-23T20:00:00Z"))
        .await
        .unwrap();

    assert_eq!(report.summary(), "1 joined, 0 left, 0 renamed");
    let store = harness.ctx.roster().read();
    let carol = &store.search("Carol").current[0].member;
    assert_eq!(carol.rank_ingame, IngameRank::Recruit);
    assert_eq!(carol.join_date, Some("2026-08-23".parse().unwrap()));
    assert!(carol.last_active.is_some());
}

#[tokio::test]
async fn test_index_dropout_is_kept_with_decay() {
    let mut store = RosterStore::new();
    store
        .add(Roster::Current, member_with_stats("Dan", 5000, 0, 0, 0))
        .unwrap();
    let harness = TestHarness::with_store(store);
    // Dan is absent from the clan list and his page 404s: a dropout.

    let coordinator = UpdateCoordinator::new(harness.ctx.clone());
    let report = coordinator
        .full_update_at(at("2026-08-23T20:00:00Z"))
        .await
        .unwrap();

    assert!(report.is_empty());
    let store = harness.ctx.roster().read();
    assert_eq!(store.len(Roster::Current), 1);
    assert_eq!(store.len(Roster::Retired), 0);
    let dan = &store.search("Dan").current[0].member;
    assert_eq!(dan.clan_xp, 4999);
}

#[tokio::test]
async fn test_mass_departure_trips_the_cap() {
    // Twelve confirmed leavers against a cap of ten: the roster and the
    // change log update, but external deranks are held for manual review.
    let mut store = RosterStore::new();
    let names: Vec<String> = (0..12).map(|i| format!("Leaver{i}")).collect();
    for (i, name) in names.iter().enumerate() {
        let mut m = member_with_stats(name, 100, 0, 0, 0);
        m.profile_link = Some(profile(1_000_000 + i as u32));
        store.add(Roster::Current, m).unwrap();
    }
    let harness = TestHarness::with_store(store);
    for name in &names {
        harness.hiscores.set_detail(name, detail(0, 0, 0));
    }

    let coordinator = UpdateCoordinator::new(harness.ctx.clone());
    let report = coordinator
        .full_update_at(at("2026-08-23T20:00:00Z"))
        .await
        .unwrap();

    assert!(report.suppressed());
    assert!(report.summary().contains("manual review required"));
    assert!(harness.site.set_rank_calls().is_empty());
    assert_eq!(harness.ctx.roster().read().len(Roster::Retired), 12);
    assert_eq!(harness.mirror.changelog().len(), 12);
}

#[tokio::test]
async fn test_second_update_is_a_no_op() {
    let harness = TestHarness::new();
    harness.hiscores.set_clan_list(vec![entry("Hana", 5)]);
    harness.hiscores.set_detail("Hana", detail(1, 100, 10));

    let coordinator = UpdateCoordinator::new(harness.ctx.clone());
    let first = coordinator
        .full_update_at(at("2026-08-23T20:00:00Z"))
        .await
        .unwrap();
    assert_eq!(first.summary(), "1 joined, 0 left, 0 renamed");

    let second = coordinator
        .full_update_at(at("2026-08-24T20:00:00Z"))
        .await
        .unwrap();
    assert!(second.is_empty());

    // The change log only grew once, and the mirror holds one member row.
    assert_eq!(harness.mirror.changelog().len(), 1);
    let rows = harness.mirror.tab(RosterTab::CurrentMembers);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "Hana");
}
