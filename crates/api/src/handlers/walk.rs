//! Handlers for the `/walks` resource.
//!
//! Owner-side lifecycle endpoints (start, location, check-in, panic, end,
//! history) and guardian-side read endpoints (active walks, live location).
//! All endpoints require authentication via [`AuthUser`].

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use safewalk_core::contacts::{dedup_ids, foreign_contact_ids};
use safewalk_core::error::CoreError;
use safewalk_core::geo::{GeoPoint, LocationFix};
use safewalk_core::guardian::{authorize_session_view, ViewerRole};
use safewalk_core::identity::{HasIdentity, IdentityKey};
use safewalk_core::panic_alert::{resolve_alert_location, walker_display_name};
use safewalk_core::types::{DbId, Timestamp};
use safewalk_core::walk::{clamp_history_limit, validate_mode};
use safewalk_db::models::walk_session::{CreateWalkSession, WalkSession, WalkSummary};
use safewalk_db::repositories::{ContactRepo, UserRepo, WalkSessionRepo};
use safewalk_db::DbPool;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::alerts::{PanicDispatcher, PanicOutcome};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A coordinate supplied by the client.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct LocationInput {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

impl LocationInput {
    /// Validate the range and finiteness of the coordinate.
    fn into_point(self) -> AppResult<GeoPoint> {
        self.validate()?;
        let point = GeoPoint::new(self.lat, self.lng);
        point.validate()?;
        Ok(point)
    }
}

/// Request body for `POST /walks`.
#[derive(Debug, Deserialize)]
pub struct StartWalkRequest {
    pub mode: String,
    pub location: Option<LocationInput>,
    #[serde(default)]
    pub contact_ids: Vec<DbId>,
    #[serde(default)]
    pub guardian_ids: Vec<DbId>,
}

/// Request body for `POST /walks/{id}/panic` and `POST /walks/{id}/end`.
/// The body itself may be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct OptionalLocationRequest {
    pub location: Option<LocationInput>,
}

/// Query parameters for `GET /walks/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct StartWalkResponse {
    pub session_id: DbId,
    pub mode: String,
    pub location: GeoPoint,
    pub started_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct LocationUpdateResponse {
    pub session_id: DbId,
    pub location: GeoPoint,
    pub updated_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub session_id: DbId,
    pub check_in_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct EndWalkResponse {
    pub session_id: DbId,
    pub ended_at: Timestamp,
    pub duration: String,
}

/// An active walk as seen by one of its guardians.
#[derive(Debug, Serialize)]
pub struct GuardianWalkView {
    pub session_id: DbId,
    pub walker_id: DbId,
    pub walker_name: String,
    pub mode: String,
    pub start_time: Timestamp,
    pub last_known_location: GeoPoint,
    pub location_updated_at: Option<Timestamp>,
    pub check_in_count: usize,
    pub panic_count: usize,
    pub last_panic_at: Option<Timestamp>,
}

/// Live location view for the owner or a guardian.
#[derive(Debug, Serialize)]
pub struct LiveLocationView {
    pub session_id: DbId,
    pub viewer_role: ViewerRole,
    pub walker_id: DbId,
    pub mode: String,
    pub is_active: bool,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub start_location: GeoPoint,
    pub current_location: Option<LocationFix>,
    pub last_known_location: GeoPoint,
    pub check_in_count: usize,
    pub last_check_in_at: Option<Timestamp>,
    pub panic_count: usize,
    pub last_panic_at: Option<Timestamp>,
}

/// Build the error returned whenever a session is absent, not owned by
/// the caller, or no longer active.
fn walk_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "WalkSession",
        id,
    }
}

/// Resolve an optional client location into a validated point.
fn optional_point(location: Option<LocationInput>) -> AppResult<Option<GeoPoint>> {
    location.map(LocationInput::into_point).transpose()
}

/// Location from an optional request body. A request without a JSON
/// body is treated as `{}`.
fn body_location(input: Option<Json<OptionalLocationRequest>>) -> Option<LocationInput> {
    input.map(|Json(body)| body).unwrap_or_default().location
}

/// Identity of the caller as stored on their account. A caller without an
/// account row gets an empty key, which matches nothing.
async fn caller_identity(pool: &DbPool, user_id: DbId) -> Result<IdentityKey, sqlx::Error> {
    let user = UserRepo::find_by_id(pool, user_id).await?;
    Ok(user.map(|u| u.identity()).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Owner lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/walks
///
/// Start a walk. Every referenced contact must belong to the caller.
pub async fn start_walk(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<StartWalkRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<StartWalkResponse>>)> {
    validate_mode(&input.mode).map_err(CoreError::Validation)?;
    let location = input
        .location
        .ok_or_else(|| CoreError::Validation("location is required".into()))?
        .into_point()?;

    let contact_ids = dedup_ids(&input.contact_ids);
    let guardian_ids = dedup_ids(&input.guardian_ids);
    let requested: Vec<DbId> = contact_ids.iter().chain(&guardian_ids).copied().collect();

    let owned = ContactRepo::owned_ids(&state.pool, auth.user_id, &requested).await?;
    let foreign = foreign_contact_ids(&requested, &owned);
    if !foreign.is_empty() {
        return Err(CoreError::Validation(format!(
            "Unknown contact ids: {}",
            foreign
                .iter()
                .map(DbId::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ))
        .into());
    }

    let session = WalkSessionRepo::create(
        &state.pool,
        &CreateWalkSession {
            user_id: auth.user_id,
            mode: input.mode,
            start_location: location,
            contact_ids,
            guardian_ids,
        },
    )
    .await?;

    tracing::info!(
        walk_id = session.id,
        user_id = auth.user_id,
        mode = %session.mode,
        guardians = session.guardian_ids.len(),
        "Walk started"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: StartWalkResponse {
                session_id: session.id,
                mode: session.mode.clone(),
                location: session.start_point(),
                started_at: session.start_time,
            },
        }),
    ))
}

/// POST /api/v1/walks/{id}/location
///
/// Overwrite the walker's current location. Last write wins.
pub async fn update_location(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(walk_id): Path<DbId>,
    Json(input): Json<LocationInput>,
) -> AppResult<Json<DataResponse<LocationUpdateResponse>>> {
    let point = input.into_point()?;

    let session = WalkSessionRepo::update_location(&state.pool, walk_id, auth.user_id, point)
        .await?
        .ok_or_else(|| walk_not_found(walk_id))?;

    let fix = session
        .current_fix()
        .copied()
        .ok_or_else(|| CoreError::Internal("Location update returned no current location".into()))?;

    tracing::debug!(walk_id, user_id = auth.user_id, "Walk location updated");

    Ok(Json(DataResponse {
        data: LocationUpdateResponse {
            session_id: session.id,
            location: fix.point(),
            updated_at: fix.updated_at,
        },
    }))
}

/// POST /api/v1/walks/{id}/check-in
pub async fn check_in(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(walk_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CheckInResponse>>> {
    let session = WalkSessionRepo::append_check_in(&state.pool, walk_id, auth.user_id)
        .await?
        .ok_or_else(|| walk_not_found(walk_id))?;

    let check_in_at = session
        .last_check_in()
        .ok_or_else(|| CoreError::Internal("Check-in append returned no timestamp".into()))?;

    tracing::info!(
        walk_id,
        user_id = auth.user_id,
        check_ins = session.check_ins.len(),
        "Walk check-in"
    );

    Ok(Json(DataResponse {
        data: CheckInResponse {
            session_id: session.id,
            check_in_at,
        },
    }))
}

/// POST /api/v1/walks/{id}/panic
///
/// Record a panic and notify every resolved guardian account once. The
/// panic is recorded even when no guardian can be notified.
pub async fn panic(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(walk_id): Path<DbId>,
    input: Option<Json<OptionalLocationRequest>>,
) -> AppResult<Json<DataResponse<PanicOutcome>>> {
    let reported = optional_point(body_location(input))?;

    let outcome = PanicDispatcher::new(state.pool.clone())
        .dispatch(walk_id, auth.user_id, reported)
        .await?;

    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/walks/{id}/end
///
/// End an active walk. Ending an already-ended walk returns 404 and leaves
/// the original end time untouched.
pub async fn end_walk(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(walk_id): Path<DbId>,
    input: Option<Json<OptionalLocationRequest>>,
) -> AppResult<Json<DataResponse<EndWalkResponse>>> {
    let end_location = optional_point(body_location(input))?;

    let session = WalkSessionRepo::end(&state.pool, walk_id, auth.user_id, end_location)
        .await?
        .ok_or_else(|| walk_not_found(walk_id))?;

    let (ended_at, duration) = session
        .end_time
        .zip(session.duration())
        .ok_or_else(|| CoreError::Internal("Ended walk is missing end time".into()))?;

    tracing::info!(walk_id, user_id = auth.user_id, %duration, "Walk ended");

    Ok(Json(DataResponse {
        data: EndWalkResponse {
            session_id: session.id,
            ended_at,
            duration,
        },
    }))
}

/// GET /api/v1/walks/history
///
/// The caller's walks, most recently started first.
pub async fn history(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> AppResult<Json<DataResponse<Vec<WalkSummary>>>> {
    let limit = clamp_history_limit(params.limit);
    let sessions = WalkSessionRepo::list_for_user(&state.pool, auth.user_id, limit).await?;

    Ok(Json(DataResponse {
        data: sessions.iter().map(WalkSummary::from).collect(),
    }))
}

// ---------------------------------------------------------------------------
// Guardian views
// ---------------------------------------------------------------------------

/// GET /api/v1/walks/guardian/active
///
/// Active walks on which the caller is listed as a guardian. Resolution is
/// account -> matching guardian contacts -> sessions referencing them.
/// The steps are not locked together; a walk started mid-request may or may
/// not appear.
pub async fn guardian_active_walks(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<GuardianWalkView>>>> {
    let identity = caller_identity(&state.pool, auth.user_id).await?;
    let contacts = ContactRepo::find_guardians_matching(&state.pool, &identity).await?;
    let contact_ids: Vec<DbId> = contacts.iter().map(|c| c.id).collect();

    let sessions =
        WalkSessionRepo::list_active_for_guardian_contacts(&state.pool, &contact_ids).await?;

    let mut walker_names: HashMap<DbId, String> = HashMap::new();
    let mut views = Vec::with_capacity(sessions.len());
    for session in &sessions {
        if !walker_names.contains_key(&session.user_id) {
            let walker = UserRepo::find_by_id(&state.pool, session.user_id).await?;
            let name = walker_display_name(
                walker.as_ref().and_then(|u| u.name.as_deref()),
                walker.as_ref().and_then(|u| u.email.as_deref()),
            );
            walker_names.insert(session.user_id, name);
        }
        let walker_name = walker_names
            .get(&session.user_id)
            .cloned()
            .unwrap_or_default();
        views.push(guardian_view(session, walker_name));
    }

    tracing::debug!(
        user_id = auth.user_id,
        matched_contacts = contact_ids.len(),
        walks = views.len(),
        "Guardian active walks resolved"
    );

    Ok(Json(DataResponse { data: views }))
}

fn guardian_view(session: &WalkSession, walker_name: String) -> GuardianWalkView {
    GuardianWalkView {
        session_id: session.id,
        walker_id: session.user_id,
        walker_name,
        mode: session.mode.clone(),
        start_time: session.start_time,
        last_known_location: resolve_alert_location(
            None,
            session.current_fix(),
            Some(session.start_point()),
        ),
        location_updated_at: session.current_fix().map(|f| f.updated_at),
        check_in_count: session.check_ins.len(),
        panic_count: session.panic_events.len(),
        last_panic_at: session.last_panic(),
    }
}

/// GET /api/v1/walks/{id}/location
///
/// Live location for the owner or a guardian. Authorization is recomputed
/// from the session's current guardian contacts on every request.
pub async fn live_location(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(walk_id): Path<DbId>,
) -> AppResult<Json<DataResponse<LiveLocationView>>> {
    let session = WalkSessionRepo::find_by_id(&state.pool, walk_id)
        .await?
        .ok_or_else(|| walk_not_found(walk_id))?;

    let viewer_role = if auth.user_id == session.user_id {
        ViewerRole::Owner
    } else {
        let identity = caller_identity(&state.pool, auth.user_id).await?;
        let guardians = ContactRepo::list_by_ids(&state.pool, &session.guardian_ids).await?;
        authorize_session_view(auth.user_id, &identity, session.user_id, &guardians)
            .inspect_err(|_| {
                tracing::warn!(walk_id, user_id = auth.user_id, "Live location access denied");
            })?
    };

    Ok(Json(DataResponse {
        data: LiveLocationView {
            session_id: session.id,
            viewer_role,
            walker_id: session.user_id,
            mode: session.mode.clone(),
            is_active: session.is_active,
            start_time: session.start_time,
            end_time: session.end_time,
            start_location: session.start_point(),
            current_location: session.current_fix().copied(),
            last_known_location: resolve_alert_location(
                None,
                session.current_fix(),
                Some(session.start_point()),
            ),
            check_in_count: session.check_ins.len(),
            last_check_in_at: session.last_check_in(),
            panic_count: session.panic_events.len(),
            last_panic_at: session.last_panic(),
        },
    }))
}
