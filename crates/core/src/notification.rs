//! Notification type constants, paging limits, and the draft type the
//! dispatcher hands to the notification store.
//!
//! Type values must match the CHECK constraint on `notifications.notification_type`.

use serde::Serialize;

use crate::types::DbId;

pub const TYPE_PANIC: &str = "panic";
pub const TYPE_WALK_STARTED: &str = "walk_started";
pub const TYPE_WALK_ENDED: &str = "walk_ended";
pub const TYPE_CHECK_IN: &str = "check_in";
pub const TYPE_REPORT: &str = "report";
pub const TYPE_SYSTEM: &str = "system";

/// All valid notification types.
pub const VALID_TYPES: &[&str] = &[
    TYPE_PANIC,
    TYPE_WALK_STARTED,
    TYPE_WALK_ENDED,
    TYPE_CHECK_IN,
    TYPE_REPORT,
    TYPE_SYSTEM,
];

/// Default page size for notification listing.
pub const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for notification listing.
pub const MAX_LIMIT: i64 = 100;

/// Clamp a requested page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// A notification ready to be persisted for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationDraft {
    pub recipient_id: DbId,
    pub notification_type: &'static str,
    pub title: String,
    pub message: String,
    pub walk_id: Option<DbId>,
    pub metadata: serde_json::Value,
}
