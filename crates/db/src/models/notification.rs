//! Notification entity model.

use safewalk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    /// Recipient account.
    pub user_id: DbId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub walk_id: Option<DbId>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}
