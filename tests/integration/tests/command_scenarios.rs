//! Staff commands contending with the update lock
//!
//! The roster lock is advisory and non-blocking: whoever holds it names a
//! reason, and everyone else gets a busy error carrying that reason.

use clan_core::value_objects::SiteRank;
use clan_service::{MemberService, ServiceError, UpdateCoordinator, UPDATE_REASON};

use integration_tests::fixtures::{TestHarness, SITE_BASE};

#[tokio::test]
async fn test_update_lock_blocks_commands_until_released() {
    let harness = TestHarness::new();
    let service = MemberService::new(harness.ctx.clone());

    let guard = harness.ctx.roster_lock().lock(UPDATE_REASON).unwrap();
    let err = service.add_member("Eve", None, None).await.unwrap_err();
    match err {
        ServiceError::Busy { reason } => assert_eq!(reason, UPDATE_REASON),
        other => panic!("expected busy, got {other}"),
    }

    drop(guard);
    service.add_member("Eve", None, None).await.unwrap();
    assert_eq!(service.find("Eve").current.len(), 1);
}

#[tokio::test]
async fn test_command_lock_blocks_the_update() {
    let harness = TestHarness::new();
    let coordinator = UpdateCoordinator::new(harness.ctx.clone());

    let guard = harness.ctx.roster_lock().lock("Adding Eve").unwrap();
    let err = coordinator.full_update().await.unwrap_err();
    assert!(err.is_busy());
    match err {
        ServiceError::Busy { reason } => assert_eq!(reason, "Adding Eve"),
        other => panic!("expected busy, got {other}"),
    }

    drop(guard);
    coordinator.full_update().await.unwrap();
}

#[tokio::test]
async fn test_member_lifecycle_through_commands() {
    let harness = TestHarness::new();
    let service = MemberService::new(harness.ctx.clone());

    service
        .add_member("Eve", Some("123456789012345678"), None)
        .await
        .unwrap();
    service
        .edit_member("Eve", "site profile", &format!("{SITE_BASE}/members/0000042"))
        .await
        .unwrap();
    service.edit_member("Eve", "join date", "2026-08-01").await.unwrap();
    let eve = service.set_rank("Eve", "Recruit").await.unwrap();
    assert_eq!(eve.join_date, Some("2026-08-01".parse().unwrap()));
    assert!(eve.profile_link.is_some());

    // Commands resolve members by any identity, not just the name.
    let by_discord = service
        .edit_member("123456789012345678", "note1", "recruited at the citadel")
        .await
        .unwrap();
    assert_eq!(by_discord.name.as_str(), "Eve");

    let retired = service.set_rank("Eve", "Retired").await.unwrap();
    assert_eq!(retired.rank_site, SiteRank::RetiredMember);
    let hits = service.find("Eve");
    assert!(hits.current.is_empty());
    assert_eq!(hits.retired.len(), 1);
    assert_eq!(hits.retired[0].member.notes[0], "recruited at the citadel");
}
