//! Walk session constants, mode validation, and duration formatting.
//!
//! Elapsed seconds are computed by the database when a walk ends; this
//! module only renders them.

/// Walker shares the walk with a friend.
pub const MODE_FRIEND: &str = "friend";

/// Walker is watched by designated guardians.
pub const MODE_GUARDIAN: &str = "guardian";

/// Walker is heading to a safe place.
pub const MODE_SAFE_PLACE: &str = "safe-place";

/// All valid walk modes.
pub const VALID_MODES: &[&str] = &[MODE_FRIEND, MODE_GUARDIAN, MODE_SAFE_PLACE];

/// Default page size for walk history.
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;

/// Maximum page size for walk history.
pub const MAX_HISTORY_LIMIT: i64 = 100;

/// Validate that a mode string is one of the accepted values.
pub fn validate_mode(mode: &str) -> Result<(), String> {
    if VALID_MODES.contains(&mode) {
        Ok(())
    } else {
        Err(format!(
            "Invalid mode '{mode}'. Must be one of: {}",
            VALID_MODES.join(", ")
        ))
    }
}

/// Format a walk duration as `MM:SS`.
///
/// Minutes are not rolled over into hours, so a 75-minute walk renders as
/// `75:00`.
pub fn format_duration(total_secs: i64) -> String {
    let total_secs = total_secs.max(0);
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Clamp a requested history page size into `1..=MAX_HISTORY_LIMIT`.
pub fn clamp_history_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT)
}
