//! Walk session entity model and DTOs.

use safewalk_core::contacts::dedup_ids;
use safewalk_core::geo::{GeoPoint, LocationFix};
use safewalk_core::types::{DbId, Timestamp};
use safewalk_core::walk::format_duration;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `walk_sessions` table.
///
/// `end_time` and `duration_secs` are set exactly when `is_active` is false
/// (enforced by `ck_walk_sessions_end_state`). `check_ins` and
/// `panic_events` only ever grow, in non-decreasing order.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WalkSession {
    pub id: DbId,
    /// The walker who owns the session.
    pub user_id: DbId,
    pub mode: String,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub duration_secs: Option<i64>,
    pub start_location: Json<GeoPoint>,
    pub current_location: Option<Json<LocationFix>>,
    pub end_location: Option<Json<GeoPoint>>,
    pub contact_ids: Vec<DbId>,
    pub guardian_ids: Vec<DbId>,
    pub check_ins: Vec<Timestamp>,
    pub panic_events: Vec<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WalkSession {
    /// Duration formatted as `MM:SS`, once the walk has ended.
    pub fn duration(&self) -> Option<String> {
        self.duration_secs.map(format_duration)
    }

    pub fn start_point(&self) -> GeoPoint {
        self.start_location.0
    }

    pub fn current_fix(&self) -> Option<&LocationFix> {
        self.current_location.as_ref().map(|loc| &loc.0)
    }

    /// Union of the contact and guardian lists, sorted and deduplicated.
    pub fn referenced_contact_ids(&self) -> Vec<DbId> {
        let all: Vec<DbId> = self
            .contact_ids
            .iter()
            .chain(self.guardian_ids.iter())
            .copied()
            .collect();
        dedup_ids(&all)
    }

    pub fn last_check_in(&self) -> Option<Timestamp> {
        self.check_ins.last().copied()
    }

    pub fn last_panic(&self) -> Option<Timestamp> {
        self.panic_events.last().copied()
    }
}

/// DTO for inserting a new walk session.
#[derive(Debug)]
pub struct CreateWalkSession {
    pub user_id: DbId,
    pub mode: String,
    pub start_location: GeoPoint,
    pub contact_ids: Vec<DbId>,
    pub guardian_ids: Vec<DbId>,
}

/// Compact history entry for a walk.
#[derive(Debug, Clone, Serialize)]
pub struct WalkSummary {
    pub id: DbId,
    pub mode: String,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub duration: Option<String>,
    pub is_active: bool,
    pub start_location: GeoPoint,
    pub end_location: Option<GeoPoint>,
    pub check_in_count: usize,
    pub panic_count: usize,
}

impl From<&WalkSession> for WalkSummary {
    fn from(session: &WalkSession) -> Self {
        Self {
            id: session.id,
            mode: session.mode.clone(),
            start_time: session.start_time,
            end_time: session.end_time,
            duration: session.duration(),
            is_active: session.is_active,
            start_location: session.start_point(),
            end_location: session.end_location.as_ref().map(|loc| loc.0),
            check_in_count: session.check_ins.len(),
            panic_count: session.panic_events.len(),
        }
    }
}
