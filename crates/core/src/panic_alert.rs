//! Panic alert planning: who gets notified, where the walker is, and what
//! each notification says.
//!
//! Everything here is pure so the fan-out set can be tested without a
//! database. The dispatcher in the API crate loads contacts and accounts,
//! calls [`plan_recipients`], and persists the drafts from
//! [`build_panic_notifications`] as one batch.

use std::collections::BTreeSet;

use serde_json::json;

use crate::contacts::ContactEntry;
use crate::geo::{GeoPoint, LocationFix, FALLBACK_POINT};
use crate::identity::{resolve_accounts, Account, IdentityKey};
use crate::notification::{NotificationDraft, TYPE_PANIC};
use crate::types::{DbId, Timestamp};

/// Label used when the walker has neither a name nor an email on file.
pub const GENERIC_WALKER_LABEL: &str = "A SafeWalk user";

/// Title of every panic notification.
pub const PANIC_TITLE: &str = "Emergency alert";

/// Resolved fan-out set for a single panic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientPlan {
    /// Deduplicated account ids to notify.
    pub recipients: BTreeSet<DbId>,
    /// Distinct guardian contacts considered.
    pub guardian_contacts: usize,
    /// Distinct emergency contacts on the session (informational only).
    pub emergency_contacts: usize,
}

/// Guardian-role identity keys among `contacts`, each contact counted once.
pub fn guardian_keys<C: ContactEntry>(contacts: &[C]) -> Vec<IdentityKey> {
    let mut seen = BTreeSet::new();
    contacts
        .iter()
        .filter(|c| c.is_guardian() && seen.insert(c.contact_id()))
        .map(|c| c.identity())
        .collect()
}

/// Compute the deduplicated recipient set for a panic.
///
/// `contacts` is the union of the session's contact and guardian lists;
/// only guardian-role contacts produce recipients. `candidates` are the
/// accounts pre-filtered by identity terms.
pub fn plan_recipients<C: ContactEntry, A: Account>(
    contacts: &[C],
    candidates: &[A],
) -> RecipientPlan {
    let keys = guardian_keys(contacts);

    RecipientPlan {
        recipients: resolve_accounts(&keys, candidates),
        guardian_contacts: keys.len(),
        emergency_contacts: count_emergency(contacts),
    }
}

/// Number of distinct emergency-role contacts among `contacts`.
pub fn count_emergency<C: ContactEntry>(contacts: &[C]) -> usize {
    contacts
        .iter()
        .filter(|c| c.is_emergency())
        .map(|c| c.contact_id())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Pick the location guardians see, in priority order: the location reported
/// with the panic, the walker's last fix, the start point, then
/// [`FALLBACK_POINT`].
pub fn resolve_alert_location(
    reported: Option<GeoPoint>,
    current: Option<&LocationFix>,
    start: Option<GeoPoint>,
) -> GeoPoint {
    reported
        .or_else(|| current.map(LocationFix::point))
        .or(start)
        .unwrap_or(FALLBACK_POINT)
}

/// Display name for the walker: name, then email, then a generic label.
pub fn walker_display_name(name: Option<&str>, email: Option<&str>) -> String {
    [name, email]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(GENERIC_WALKER_LABEL)
        .to_string()
}

/// Build one unread panic notification per recipient.
pub fn build_panic_notifications(
    recipients: &BTreeSet<DbId>,
    walk_id: DbId,
    walker_name: &str,
    location: GeoPoint,
    triggered_at: Timestamp,
) -> Vec<NotificationDraft> {
    let message = format!(
        "{walker_name} triggered a panic alert. Last known location: {:.5}, {:.5}.",
        location.lat, location.lng
    );
    let metadata = json!({
        "location": { "lat": location.lat, "lng": location.lng },
        "walker_name": walker_name,
        "session_id": walk_id,
        "triggered_at": triggered_at,
    });

    recipients
        .iter()
        .map(|&recipient_id| NotificationDraft {
            recipient_id,
            notification_type: TYPE_PANIC,
            title: PANIC_TITLE.to_string(),
            message: message.clone(),
            walk_id: Some(walk_id),
            metadata: metadata.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::contacts::{ROLE_EMERGENCY, ROLE_GUARDIAN};
    use crate::guardian::test_support::TestContact;
    use crate::identity::HasIdentity;

    struct TestAccount {
        id: DbId,
        email: Option<&'static str>,
        phone: Option<&'static str>,
    }

    impl HasIdentity for TestAccount {
        fn identity(&self) -> IdentityKey {
            IdentityKey::new(self.email, self.phone)
        }
    }

    impl Account for TestAccount {
        fn account_id(&self) -> DbId {
            self.id
        }
    }

    fn guardian(id: DbId, email: Option<&'static str>, phone: Option<&'static str>) -> TestContact {
        TestContact {
            id,
            role: ROLE_GUARDIAN,
            email,
            phone,
        }
    }

    fn emergency(id: DbId) -> TestContact {
        TestContact {
            id,
            role: ROLE_EMERGENCY,
            email: Some("sos@x.com"),
            phone: Some("112"),
        }
    }

    #[test]
    fn test_account_matched_by_two_contacts_notified_once() {
        let contacts = vec![
            guardian(1, Some("g@x.com"), None),
            guardian(2, None, Some("+1555")),
        ];
        let accounts = vec![TestAccount {
            id: 42,
            email: Some("g@x.com"),
            phone: Some("+1555"),
        }];

        let plan = plan_recipients(&contacts, &accounts);
        assert_eq!(plan.recipients.len(), 1);
        assert!(plan.recipients.contains(&42));
        assert_eq!(plan.guardian_contacts, 2);
    }

    #[test]
    fn test_contact_listed_twice_counted_once() {
        let contacts = vec![
            guardian(1, Some("g@x.com"), None),
            guardian(1, Some("g@x.com"), None),
        ];
        let plan = plan_recipients(&contacts, &Vec::<TestAccount>::new());
        assert_eq!(plan.guardian_contacts, 1);
        assert!(plan.recipients.is_empty());
    }

    #[test]
    fn test_emergency_contacts_never_become_recipients() {
        let contacts = vec![emergency(5), emergency(5), emergency(6)];
        let accounts = vec![TestAccount {
            id: 9,
            email: Some("sos@x.com"),
            phone: None,
        }];

        let plan = plan_recipients(&contacts, &accounts);
        assert!(plan.recipients.is_empty());
        assert_eq!(plan.emergency_contacts, 2);
        assert_eq!(plan.guardian_contacts, 0);
    }

    #[test]
    fn test_emergency_count_ignores_guardians_and_duplicates() {
        let contacts = vec![
            emergency(5),
            guardian(1, Some("g@x.com"), None),
            emergency(5),
        ];
        assert_eq!(count_emergency(&contacts), 1);
        assert_eq!(count_emergency::<TestContact>(&[]), 0);
    }

    #[test]
    fn test_unregistered_guardian_yields_no_recipients() {
        let contacts = vec![guardian(1, Some("nobody@x.com"), Some("000"))];
        let accounts = vec![TestAccount {
            id: 3,
            email: Some("g@x.com"),
            phone: None,
        }];
        assert!(plan_recipients(&contacts, &accounts).recipients.is_empty());
    }

    #[test]
    fn test_location_priority_order() {
        let reported = GeoPoint::new(1.0, 1.0);
        let current = LocationFix {
            lat: 2.0,
            lng: 2.0,
            updated_at: Utc::now(),
        };
        let start = GeoPoint::new(3.0, 3.0);

        assert_eq!(resolve_alert_location(Some(reported), Some(&current), Some(start)), reported);
        assert_eq!(resolve_alert_location(None, Some(&current), Some(start)), current.point());
        assert_eq!(resolve_alert_location(None, None, Some(start)), start);
        assert_eq!(resolve_alert_location(None, None, None), FALLBACK_POINT);
    }

    #[test]
    fn test_walker_name_fallbacks() {
        assert_eq!(walker_display_name(Some("Ada"), Some("ada@x.com")), "Ada");
        assert_eq!(walker_display_name(Some("  "), Some("ada@x.com")), "ada@x.com");
        assert_eq!(walker_display_name(None, None), GENERIC_WALKER_LABEL);
        assert_eq!(walker_display_name(Some(""), Some(" ")), GENERIC_WALKER_LABEL);
    }

    #[test]
    fn test_panic_notifications_carry_location_metadata() {
        let recipients: BTreeSet<DbId> = [7, 8].into_iter().collect();
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 22, 15, 0).unwrap();
        let location = GeoPoint::new(51.5, -0.12);
        let drafts = build_panic_notifications(&recipients, 99, "Ada", location, at);

        assert_eq!(drafts.len(), 2);
        for draft in &drafts {
            assert_eq!(draft.notification_type, TYPE_PANIC);
            assert_eq!(draft.walk_id, Some(99));
            assert_eq!(draft.metadata["location"]["lat"], 51.5);
            assert_eq!(draft.metadata["location"]["lng"], -0.12);
            assert_eq!(draft.metadata["walker_name"], "Ada");
            assert_eq!(draft.metadata["session_id"], 99);
            assert!(draft.message.starts_with("Ada triggered a panic alert"));
        }
        assert_eq!(drafts[0].recipient_id, 7);
        assert_eq!(drafts[1].recipient_id, 8);
    }

    #[test]
    fn test_no_recipients_builds_no_drafts() {
        let drafts =
            build_panic_notifications(&BTreeSet::new(), 1, "Ada", FALLBACK_POINT, Utc::now());
        assert!(drafts.is_empty());
    }
}
