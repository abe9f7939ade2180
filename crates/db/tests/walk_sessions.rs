//! Repository-level tests for walk session lifecycle and contact lookups.

use assert_matches::assert_matches;
use safewalk_core::geo::GeoPoint;
use safewalk_core::identity::{IdentityKey, PROVIDER_EMAIL};
use safewalk_db::models::contact::CreateContact;
use safewalk_db::models::user::{CreateUser, User};
use safewalk_db::models::walk_session::CreateWalkSession;
use safewalk_db::repositories::{ContactRepo, UserRepo, WalkSessionRepo};
use sqlx::PgPool;

async fn create_user(pool: &PgPool, email: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: Some("Test Walker".to_string()),
            email: Some(email.to_string()),
            phone: None,
            provider: PROVIDER_EMAIL.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

async fn start_walk(pool: &PgPool, user_id: i64, guardian_ids: Vec<i64>) -> i64 {
    WalkSessionRepo::create(
        pool,
        &CreateWalkSession {
            user_id,
            mode: "guardian".to_string(),
            start_location: GeoPoint::new(40.0, -74.0),
            contact_ids: Vec::new(),
            guardian_ids,
        },
    )
    .await
    .expect("walk creation should succeed")
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_walk_starts_active_with_empty_lists(pool: PgPool) {
    let user = create_user(&pool, "walker@test.com").await;
    let id = start_walk(&pool, user.id, Vec::new()).await;

    let session = WalkSessionRepo::find_by_id(&pool, id)
        .await
        .unwrap()
        .expect("session should exist");
    assert!(session.is_active);
    assert!(session.end_time.is_none());
    assert!(session.duration().is_none());
    assert!(session.current_fix().is_none());
    assert!(session.check_ins.is_empty());
    assert!(session.panic_events.is_empty());
    assert_eq!(session.start_point(), GeoPoint::new(40.0, -74.0));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_location_update_overwrites_current_fix(pool: PgPool) {
    let user = create_user(&pool, "walker@test.com").await;
    let id = start_walk(&pool, user.id, Vec::new()).await;

    WalkSessionRepo::update_location(&pool, id, user.id, GeoPoint::new(40.1, -74.1))
        .await
        .unwrap()
        .expect("active session should accept a location");
    let session = WalkSessionRepo::update_location(&pool, id, user.id, GeoPoint::new(40.2, -74.2))
        .await
        .unwrap()
        .expect("active session should accept a location");

    let fix = session.current_fix().expect("fix should be set");
    assert_eq!(fix.point(), GeoPoint::new(40.2, -74.2));
    assert!(fix.updated_at >= session.start_time);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mutations_require_owner(pool: PgPool) {
    let owner = create_user(&pool, "owner@test.com").await;
    let other = create_user(&pool, "other@test.com").await;
    let id = start_walk(&pool, owner.id, Vec::new()).await;

    let result = WalkSessionRepo::append_check_in(&pool, id, other.id)
        .await
        .unwrap();
    assert!(result.is_none());

    let result = WalkSessionRepo::end(&pool, id, other.id, None).await.unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_check_ins_are_non_decreasing(pool: PgPool) {
    let user = create_user(&pool, "walker@test.com").await;
    let id = start_walk(&pool, user.id, Vec::new()).await;

    for _ in 0..3 {
        WalkSessionRepo::append_check_in(&pool, id, user.id)
            .await
            .unwrap()
            .expect("check-in should succeed");
    }
    let session = WalkSessionRepo::find_by_id(&pool, id).await.unwrap().unwrap();

    assert_eq!(session.check_ins.len(), 3);
    assert!(session.check_ins.windows(2).all(|w| w[0] <= w[1]));
    assert!(session.check_ins[0] >= session.start_time);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_end_is_single_shot(pool: PgPool) {
    let user = create_user(&pool, "walker@test.com").await;
    let id = start_walk(&pool, user.id, Vec::new()).await;

    let ended = WalkSessionRepo::end(&pool, id, user.id, Some(GeoPoint::new(41.0, -73.0)))
        .await
        .unwrap()
        .expect("first end should succeed");
    assert!(!ended.is_active);
    let end_time = ended.end_time.expect("end time should be set");
    assert!(end_time >= ended.start_time);
    assert_eq!(ended.end_location.map(|l| l.0), Some(GeoPoint::new(41.0, -73.0)));
    assert_matches!(ended.duration(), Some(d) if d.len() >= 5);

    let second = WalkSessionRepo::end(&pool, id, user.id, None).await.unwrap();
    assert!(second.is_none());

    let session = WalkSessionRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(session.end_time, Some(end_time));

    let after = WalkSessionRepo::append_panic(&pool, id, user.id).await.unwrap();
    assert!(after.is_none(), "ended sessions reject panics");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_end_without_location_keeps_last_fix(pool: PgPool) {
    let user = create_user(&pool, "walker@test.com").await;
    let id = start_walk(&pool, user.id, Vec::new()).await;

    WalkSessionRepo::update_location(&pool, id, user.id, GeoPoint::new(40.5, -74.5))
        .await
        .unwrap();
    let ended = WalkSessionRepo::end(&pool, id, user.id, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(ended.end_location.map(|l| l.0), Some(GeoPoint::new(40.5, -74.5)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_is_newest_first(pool: PgPool) {
    let user = create_user(&pool, "walker@test.com").await;
    let first = start_walk(&pool, user.id, Vec::new()).await;
    let second = start_walk(&pool, user.id, Vec::new()).await;

    let history = WalkSessionRepo::list_for_user(&pool, user.id, 20).await.unwrap();
    let ids: Vec<i64> = history.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![second, first]);

    let limited = WalkSessionRepo::list_for_user(&pool, user.id, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_guardian_lookup_finds_active_walks(pool: PgPool) {
    let walker = create_user(&pool, "walker@test.com").await;
    let guardian = create_user(&pool, "g@x.com").await;

    let contact = ContactRepo::create(
        &pool,
        walker.id,
        &CreateContact {
            name: "Guard".to_string(),
            phone: "555-0100".to_string(),
            email: Some(" G@X.com ".to_string()),
            role: "guardian".to_string(),
        },
    )
    .await
    .unwrap();

    let active = start_walk(&pool, walker.id, vec![contact.id]).await;
    let ended = start_walk(&pool, walker.id, vec![contact.id]).await;
    WalkSessionRepo::end(&pool, ended, walker.id, None).await.unwrap();

    let identity = IdentityKey::new(guardian.email.as_deref(), guardian.phone.as_deref());
    let matches = ContactRepo::find_guardians_matching(&pool, &identity)
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, contact.id);

    let sessions = WalkSessionRepo::list_active_for_guardian_contacts(&pool, &[contact.id])
        .await
        .unwrap();
    let ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![active]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_owned_ids_filters_foreign_contacts(pool: PgPool) {
    let walker = create_user(&pool, "walker@test.com").await;
    let other = create_user(&pool, "other@test.com").await;
    let input = CreateContact {
        name: "Friend".to_string(),
        phone: "555-0101".to_string(),
        email: None,
        role: "emergency".to_string(),
    };
    let mine = ContactRepo::create(&pool, walker.id, &input).await.unwrap();
    let theirs = ContactRepo::create(&pool, other.id, &input).await.unwrap();

    let owned = ContactRepo::owned_ids(&pool, walker.id, &[mine.id, theirs.id])
        .await
        .unwrap();
    assert_eq!(owned, vec![mine.id]);
}
