//! Guardian authorization for live-location reads.
//!
//! The decision is recomputed for every request from the session's current
//! guardian contacts; nothing is cached, so removing a guardian contact
//! revokes access on the next poll.

use serde::Serialize;

use crate::contacts::ContactEntry;
use crate::error::CoreError;
use crate::identity::IdentityKey;
use crate::types::DbId;

/// How the caller is allowed to view a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerRole {
    /// The walker who owns the session.
    Owner,
    /// A registered account matching one of the session's guardian contacts.
    Guardian,
}

/// Decide whether `caller_id` may read the live location of a session.
///
/// `guardian_contacts` are the contacts referenced by the session's
/// guardian list; entries whose role is not `guardian` are ignored.
pub fn authorize_session_view<C: ContactEntry>(
    caller_id: DbId,
    caller_identity: &IdentityKey,
    owner_id: DbId,
    guardian_contacts: &[C],
) -> Result<ViewerRole, CoreError> {
    if caller_id == owner_id {
        return Ok(ViewerRole::Owner);
    }

    let is_guardian = guardian_contacts
        .iter()
        .filter(|c| c.is_guardian())
        .any(|c| c.identity().matches(caller_identity));

    if is_guardian {
        Ok(ViewerRole::Guardian)
    } else {
        Err(CoreError::Forbidden(
            "Not authorized to view this walk".into(),
        ))
    }
}
