//! Repository-level tests for the notification store.

use safewalk_core::identity::PROVIDER_PHONE;
use safewalk_core::notification::{NotificationDraft, TYPE_PANIC, TYPE_SYSTEM};
use safewalk_db::models::user::CreateUser;
use safewalk_db::repositories::{NotificationRepo, UserRepo};
use sqlx::PgPool;

async fn create_user(pool: &PgPool, phone: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            name: None,
            email: None,
            phone: Some(phone.to_string()),
            provider: PROVIDER_PHONE.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
    .id
}

fn draft(recipient_id: i64, notification_type: &'static str, title: &str) -> NotificationDraft {
    NotificationDraft {
        recipient_id,
        notification_type,
        title: title.to_string(),
        message: format!("{title} body"),
        walk_id: None,
        metadata: serde_json::json!({}),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_batch_insert_and_list_newest_first(pool: PgPool) {
    let user = create_user(&pool, "555-0001").await;

    let ids = NotificationRepo::create_batch(
        &pool,
        &[draft(user, TYPE_SYSTEM, "first"), draft(user, TYPE_PANIC, "second")],
    )
    .await
    .unwrap();
    assert_eq!(ids.len(), 2);

    let list = NotificationRepo::list_for_user(&pool, user, false, 50).await.unwrap();
    let titles: Vec<&str> = list.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["second", "first"]);
    assert!(list.iter().all(|n| !n.is_read && n.read_at.is_none()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_batch_is_noop(pool: PgPool) {
    let ids = NotificationRepo::create_batch(&pool, &[]).await.unwrap();
    assert!(ids.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_batch_is_all_or_nothing(pool: PgPool) {
    let user = create_user(&pool, "555-0002").await;

    // The second recipient does not exist, so the FK rejects it.
    let result = NotificationRepo::create_batch(
        &pool,
        &[draft(user, TYPE_PANIC, "ok"), draft(user + 10_000, TYPE_PANIC, "bad")],
    )
    .await;
    assert!(result.is_err());

    let count = NotificationRepo::unread_count(&pool, user).await.unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_read_is_scoped_and_idempotent(pool: PgPool) {
    let owner = create_user(&pool, "555-0003").await;
    let stranger = create_user(&pool, "555-0004").await;
    let ids = NotificationRepo::create_batch(&pool, &[draft(owner, TYPE_PANIC, "alert")])
        .await
        .unwrap();

    assert!(!NotificationRepo::mark_read(&pool, ids[0], stranger).await.unwrap());
    assert!(NotificationRepo::mark_read(&pool, ids[0], owner).await.unwrap());

    let first = NotificationRepo::list_for_user(&pool, owner, false, 50).await.unwrap();
    let read_at = first[0].read_at.expect("read_at should be set");

    assert!(NotificationRepo::mark_read(&pool, ids[0], owner).await.unwrap());
    let second = NotificationRepo::list_for_user(&pool, owner, false, 50).await.unwrap();
    assert_eq!(second[0].read_at, Some(read_at));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_all_read_counts_only_unread(pool: PgPool) {
    let user = create_user(&pool, "555-0005").await;
    NotificationRepo::create_batch(
        &pool,
        &[
            draft(user, TYPE_PANIC, "a"),
            draft(user, TYPE_PANIC, "b"),
            draft(user, TYPE_SYSTEM, "c"),
        ],
    )
    .await
    .unwrap();

    assert_eq!(NotificationRepo::unread_count(&pool, user).await.unwrap(), 3);
    assert_eq!(NotificationRepo::mark_all_read(&pool, user).await.unwrap(), 3);
    assert_eq!(NotificationRepo::mark_all_read(&pool, user).await.unwrap(), 0);
    assert_eq!(NotificationRepo::unread_count(&pool, user).await.unwrap(), 0);

    let unread = NotificationRepo::list_for_user(&pool, user, true, 50).await.unwrap();
    assert!(unread.is_empty());
}
