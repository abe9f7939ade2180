//! Repository for the `walk_sessions` table.
//!
//! Every owner mutation is a single conditional `UPDATE` keyed by
//! `(id, user_id, is_active = true)`. A call that matches no row returns
//! `None`; concurrent `end` calls therefore race safely, with exactly one
//! winner. List appends use `array_append` inside the same statement, so
//! they hold the row lock and never lose a concurrent append.

use sqlx::types::Json;
use sqlx::PgPool;
use safewalk_core::geo::GeoPoint;
use safewalk_core::types::DbId;

use crate::models::walk_session::{CreateWalkSession, WalkSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, mode, start_time, end_time, duration_secs, \
                       start_location, current_location, end_location, contact_ids, guardian_ids, \
                       check_ins, panic_events, is_active, created_at, updated_at";

/// Predicate matching a session the caller may still mutate.
const ACTIVE_OWNED: &str = "id = $1 AND user_id = $2 AND is_active = true";

/// Provides lifecycle operations and queries for walk sessions.
pub struct WalkSessionRepo;

impl WalkSessionRepo {
    /// Insert a new active session, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateWalkSession,
    ) -> Result<WalkSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO walk_sessions (user_id, mode, start_location, contact_ids, guardian_ids)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WalkSession>(&query)
            .bind(input.user_id)
            .bind(&input.mode)
            .bind(Json(input.start_location))
            .bind(&input.contact_ids)
            .bind(&input.guardian_ids)
            .fetch_one(pool)
            .await
    }

    /// Find a session by internal ID, whatever its state or owner.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WalkSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM walk_sessions WHERE id = $1");
        sqlx::query_as::<_, WalkSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the current location (and, mirroring it, the end location)
    /// with a fresh fix. Last write wins; no history is kept.
    ///
    /// The fix timestamp is never earlier than `start_time`.
    pub async fn update_location(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        point: GeoPoint,
    ) -> Result<Option<WalkSession>, sqlx::Error> {
        let query = format!(
            "UPDATE walk_sessions SET
                current_location = jsonb_build_object(
                    'lat', $3::FLOAT8,
                    'lng', $4::FLOAT8,
                    'updated_at', GREATEST(NOW(), start_time)
                ),
                end_location = jsonb_build_object('lat', $3::FLOAT8, 'lng', $4::FLOAT8)
             WHERE {ACTIVE_OWNED}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WalkSession>(&query)
            .bind(id)
            .bind(user_id)
            .bind(point.lat)
            .bind(point.lng)
            .fetch_optional(pool)
            .await
    }

    /// Append a check-in timestamp.
    ///
    /// The appended value is clamped to be no earlier than the previous
    /// entry, so the sequence stays non-decreasing even if clocks step back.
    pub async fn append_check_in(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<WalkSession>, sqlx::Error> {
        let query = format!(
            "UPDATE walk_sessions SET
                check_ins = array_append(
                    check_ins,
                    GREATEST(NOW(), start_time, check_ins[cardinality(check_ins)])
                )
             WHERE {ACTIVE_OWNED}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WalkSession>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Append a panic timestamp. Same ordering guarantee as
    /// [`append_check_in`](Self::append_check_in).
    pub async fn append_panic(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<WalkSession>, sqlx::Error> {
        let query = format!(
            "UPDATE walk_sessions SET
                panic_events = array_append(
                    panic_events,
                    GREATEST(NOW(), start_time, panic_events[cardinality(panic_events)])
                )
             WHERE {ACTIVE_OWNED}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WalkSession>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// End an active session: set `end_time`, `duration_secs`, flip
    /// `is_active`, and record `end_location` when given.
    ///
    /// Returns `None` if the session is unknown, not owned by `user_id`, or
    /// already ended, so a second `end` never overwrites the first.
    pub async fn end(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        end_location: Option<GeoPoint>,
    ) -> Result<Option<WalkSession>, sqlx::Error> {
        let query = format!(
            "UPDATE walk_sessions SET
                is_active = false,
                end_time = GREATEST(NOW(), start_time),
                duration_secs = FLOOR(EXTRACT(EPOCH FROM
                    (GREATEST(NOW(), start_time) - start_time)))::BIGINT,
                end_location = COALESCE($3, end_location)
             WHERE {ACTIVE_OWNED}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WalkSession>(&query)
            .bind(id)
            .bind(user_id)
            .bind(end_location.map(Json))
            .fetch_optional(pool)
            .await
    }

    /// List a walker's sessions, most recently started first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<WalkSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM walk_sessions
             WHERE user_id = $1
             ORDER BY start_time DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, WalkSession>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// List active sessions whose guardian list references any of
    /// `contact_ids`, most recently started first.
    pub async fn list_active_for_guardian_contacts(
        pool: &PgPool,
        contact_ids: &[DbId],
    ) -> Result<Vec<WalkSession>, sqlx::Error> {
        if contact_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM walk_sessions
             WHERE is_active = true AND guardian_ids && $1::BIGINT[]
             ORDER BY start_time DESC, id DESC"
        );
        sqlx::query_as::<_, WalkSession>(&query)
            .bind(contact_ids)
            .fetch_all(pool)
            .await
    }
}
