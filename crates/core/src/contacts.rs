//! Contact roles and contact field validation.

use crate::error::CoreError;
use crate::identity::HasIdentity;
use crate::types::DbId;

/// Contact alerted out-of-band (SMS); no delivery channel exists yet.
pub const ROLE_EMERGENCY: &str = "emergency";

/// Contact who may watch live location and receives panic notifications.
pub const ROLE_GUARDIAN: &str = "guardian";

/// All valid contact roles.
pub const VALID_ROLES: &[&str] = &[ROLE_EMERGENCY, ROLE_GUARDIAN];

/// Maximum length of a contact display name.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a contact phone number.
pub const MAX_PHONE_LEN: usize = 32;

/// A stored contact as seen by the resolver and the authorization checker.
pub trait ContactEntry: HasIdentity {
    fn contact_id(&self) -> DbId;
    fn role(&self) -> &str;

    fn is_guardian(&self) -> bool {
        self.role() == ROLE_GUARDIAN
    }

    fn is_emergency(&self) -> bool {
        self.role() == ROLE_EMERGENCY
    }
}

/// Validate that a role string is one of the accepted values.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}

/// Validate a contact's name and phone after trimming.
pub fn validate_contact_fields(name: &str, phone: &str) -> Result<(), CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Contact name must not be blank".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Contact name must be at most {MAX_NAME_LEN} characters"
        )));
    }

    let phone = phone.trim();
    if phone.is_empty() {
        return Err(CoreError::Validation(
            "Contact phone must not be blank".into(),
        ));
    }
    if phone.chars().count() > MAX_PHONE_LEN {
        return Err(CoreError::Validation(format!(
            "Contact phone must be at most {MAX_PHONE_LEN} characters"
        )));
    }
    Ok(())
}

/// Find the ids in `requested` that are not in `owned`.
///
/// Used when starting a walk: every referenced contact must belong to the
/// walker. The returned ids are sorted and deduplicated.
pub fn foreign_contact_ids(requested: &[DbId], owned: &[DbId]) -> Vec<DbId> {
    let mut missing: Vec<DbId> = requested
        .iter()
        .copied()
        .filter(|id| !owned.contains(id))
        .collect();
    missing.sort_unstable();
    missing.dedup();
    missing
}

/// Sort and deduplicate a list of contact ids.
pub fn dedup_ids(ids: &[DbId]) -> Vec<DbId> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_valid_roles_accepted() {
        assert!(validate_role(ROLE_EMERGENCY).is_ok());
        assert!(validate_role(ROLE_GUARDIAN).is_ok());
    }

    #[test]
    fn test_invalid_role_rejected() {
        assert!(validate_role("friend").unwrap_err().contains("Invalid role"));
    }

    #[test]
    fn test_blank_name_rejected() {
        assert_matches!(
            validate_contact_fields("   ", "+1555"),
            Err(CoreError::Validation(msg)) if msg.contains("name")
        );
    }

    #[test]
    fn test_blank_phone_rejected() {
        assert_matches!(
            validate_contact_fields("Mum", " "),
            Err(CoreError::Validation(msg)) if msg.contains("phone")
        );
    }

    #[test]
    fn test_overlong_name_rejected() {
        let name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_contact_fields(&name, "+1555").is_err());
    }

    #[test]
    fn test_foreign_ids_reported_once() {
        assert_eq!(foreign_contact_ids(&[3, 1, 9, 9, 4], &[1, 3]), vec![4, 9]);
        assert!(foreign_contact_ids(&[1, 3], &[1, 3, 5]).is_empty());
        assert!(foreign_contact_ids(&[], &[]).is_empty());
    }

    #[test]
    fn test_dedup_ids() {
        assert_eq!(dedup_ids(&[5, 2, 5, 1]), vec![1, 2, 5]);
    }
}
