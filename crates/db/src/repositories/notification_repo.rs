//! Repository for the `notifications` table.

use safewalk_core::notification::NotificationDraft;
use safewalk_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::Notification;

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, user_id, notification_type, title, message, walk_id, \
                       is_read, read_at, metadata, created_at";

/// Append-only notification store with per-recipient read state.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Persist a batch of drafts in one transaction, returning the new ids
    /// in draft order. Either every draft is stored or none is.
    pub async fn create_batch(
        pool: &PgPool,
        drafts: &[NotificationDraft],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = pool.begin().await?;
        let mut ids = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let id: DbId = sqlx::query_scalar(
                "INSERT INTO notifications \
                    (user_id, notification_type, title, message, walk_id, metadata) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING id",
            )
            .bind(draft.recipient_id)
            .bind(draft.notification_type)
            .bind(&draft.title)
            .bind(&draft.message)
            .bind(draft.walk_id)
            .bind(&draft.metadata)
            .fetch_one(&mut *tx)
            .await?;
            ids.push(id);
        }

        tx.commit().await?;
        tracing::debug!(count = ids.len(), "Notification batch persisted");
        Ok(ids)
    }

    /// List notifications for a recipient, newest first.
    ///
    /// When `unread_only` is `true`, only notifications with `is_read = false`
    /// are returned.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only {
            "AND is_read = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if the notification belongs to `user_id`, whether or
    /// not it was already read; `false` if it does not exist for that user.
    /// An existing `read_at` is preserved.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE notifications \
             SET is_read = true, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING id",
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(updated.is_some())
    }

    /// Mark all unread notifications as read for a user.
    ///
    /// Returns the number of notifications that were marked read; zero is
    /// not an error.
    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Get the number of unread notifications for a user.
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }
}
