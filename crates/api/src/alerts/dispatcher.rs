//! Panic alert dispatcher.
//!
//! [`PanicDispatcher`] records the panic on the session, then fans it out
//! to every guardian account resolved from the session's contacts. The two
//! steps are separate units of work: once the panic timestamp is stored it
//! is never rolled back, even if notification delivery fails.

use chrono::Utc;
use safewalk_core::error::CoreError;
use safewalk_core::geo::GeoPoint;
use safewalk_core::identity::lookup_terms;
use safewalk_core::panic_alert::{
    build_panic_notifications, count_emergency, guardian_keys, plan_recipients,
    resolve_alert_location, walker_display_name,
};
use safewalk_core::types::{DbId, Timestamp};
use safewalk_db::models::walk_session::WalkSession;
use safewalk_db::repositories::{ContactRepo, NotificationRepo, UserRepo, WalkSessionRepo};
use safewalk_db::DbPool;
use serde::Serialize;

use crate::error::AppResult;

/// Result of a panic dispatch, returned to the walker.
#[derive(Debug, Clone, Serialize)]
pub struct PanicOutcome {
    pub session_id: DbId,
    /// Guardian accounts that received a notification.
    pub notifications_sent: usize,
    /// Emergency-role contacts on the session. No delivery channel exists
    /// for them yet; the count is informational.
    pub emergency_contacts: usize,
    /// When the panic was recorded.
    pub timestamp: Timestamp,
    /// `true` when the panic was recorded but notification fan-out failed.
    pub delivery_failed: bool,
}

/// Counts produced by a fan-out, possibly partial.
#[derive(Debug, Clone, Copy, Default)]
struct FanOut {
    delivered: usize,
    emergency_contacts: usize,
}

/// Records panic events and delivers guardian notifications.
pub struct PanicDispatcher {
    pool: DbPool,
}

impl PanicDispatcher {
    /// Create a new dispatcher with the given database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record a panic on an active session owned by `owner_id` and notify
    /// its guardians.
    ///
    /// Fails with `NotFound` only if the panic could not be recorded. A
    /// failure after that point is logged and reported through
    /// [`PanicOutcome::delivery_failed`].
    pub async fn dispatch(
        &self,
        walk_id: DbId,
        owner_id: DbId,
        reported: Option<GeoPoint>,
    ) -> AppResult<PanicOutcome> {
        let session = WalkSessionRepo::append_panic(&self.pool, walk_id, owner_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "WalkSession",
                id: walk_id,
            })?;

        let timestamp = session.last_panic().unwrap_or_else(Utc::now);
        tracing::warn!(
            walk_id,
            user_id = owner_id,
            panic_count = session.panic_events.len(),
            "Panic recorded"
        );

        let mut fan_out = FanOut::default();
        let delivery_failed = match self
            .fan_out(&session, reported, timestamp, &mut fan_out)
            .await
        {
            Ok(()) => false,
            Err(e) => {
                tracing::error!(
                    walk_id,
                    user_id = owner_id,
                    emergency_contacts = fan_out.emergency_contacts,
                    error = %e,
                    "Panic recorded but notification fan-out failed"
                );
                fan_out.delivered = 0;
                true
            }
        };

        Ok(PanicOutcome {
            session_id: session.id,
            notifications_sent: fan_out.delivered,
            emergency_contacts: fan_out.emergency_contacts,
            timestamp,
            delivery_failed,
        })
    }

    /// Resolve guardian accounts and persist one notification per account.
    ///
    /// Counts are written into `progress` as soon as they are known, so a
    /// later failure still reports the session's emergency contacts.
    async fn fan_out(
        &self,
        session: &WalkSession,
        reported: Option<GeoPoint>,
        triggered_at: Timestamp,
        progress: &mut FanOut,
    ) -> Result<(), sqlx::Error> {
        let contacts =
            ContactRepo::list_by_ids(&self.pool, &session.referenced_contact_ids()).await?;
        progress.emergency_contacts = count_emergency(&contacts);

        let keys = guardian_keys(&contacts);
        let (emails, phones) = lookup_terms(&keys);
        let candidates = UserRepo::find_by_identity_terms(&self.pool, &emails, &phones).await?;

        let plan = plan_recipients(&contacts, &candidates);

        if plan.emergency_contacts > 0 {
            tracing::info!(
                walk_id = session.id,
                emergency_contacts = plan.emergency_contacts,
                "No out-of-band channel configured, emergency contacts not alerted"
            );
        }

        if plan.recipients.is_empty() {
            tracing::warn!(
                walk_id = session.id,
                guardian_contacts = plan.guardian_contacts,
                "Panic has no registered guardian accounts to notify"
            );
            return Ok(());
        }

        let walker = UserRepo::find_by_id(&self.pool, session.user_id).await?;
        let walker_name = walker_display_name(
            walker.as_ref().and_then(|u| u.name.as_deref()),
            walker.as_ref().and_then(|u| u.email.as_deref()),
        );
        let location = resolve_alert_location(
            reported,
            session.current_fix(),
            Some(session.start_point()),
        );

        let drafts = build_panic_notifications(
            &plan.recipients,
            session.id,
            &walker_name,
            location,
            triggered_at,
        );
        let ids = NotificationRepo::create_batch(&self.pool, &drafts).await?;

        tracing::info!(
            walk_id = session.id,
            recipients = ids.len(),
            guardian_contacts = plan.guardian_contacts,
            "Panic notifications delivered"
        );

        progress.delivered = ids.len();
        Ok(())
    }
}
