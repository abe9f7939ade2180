//! Identity resolution between contacts and registered accounts.
//!
//! Contacts reference people by email and phone rather than by account id,
//! because the person may not have registered yet. Matching is re-evaluated
//! on every call so guardian membership always reflects the current contact
//! list and account table.
//!
//! Matching rules:
//! - email: trimmed, then compared case-insensitively
//! - phone: trimmed only (no international normalization)
//! - a key with both fields set matches on either one
//! - blank fields never match anything

use std::collections::BTreeSet;

use crate::types::DbId;

/// Account signed up with a phone number.
pub const PROVIDER_PHONE: &str = "phone";

/// Account signed up with an email address.
pub const PROVIDER_EMAIL: &str = "email";

/// Account signed up through Google.
pub const PROVIDER_GOOGLE: &str = "google";

/// Normalize an email for identity comparison. Returns `None` for blank input.
pub fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Normalize a phone number for identity comparison. Returns `None` for blank input.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Normalized (email, phone) pair identifying a person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl IdentityKey {
    /// Build a key from raw, possibly blank, fields.
    pub fn new(email: Option<&str>, phone: Option<&str>) -> Self {
        Self {
            email: email.and_then(normalize_email),
            phone: phone.and_then(normalize_phone),
        }
    }

    /// A key with neither field can never match.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }

    pub fn matches(&self, other: &IdentityKey) -> bool {
        let email_match = matches!((&self.email, &other.email), (Some(a), Some(b)) if a == b);
        let phone_match = matches!((&self.phone, &other.phone), (Some(a), Some(b)) if a == b);
        email_match || phone_match
    }
}

/// Anything that carries a person's email/phone identity.
pub trait HasIdentity {
    fn identity(&self) -> IdentityKey;
}

/// A registered account that identity resolution can return.
pub trait Account: HasIdentity {
    fn account_id(&self) -> DbId;
}

/// Collect normalized lookup terms for a batch of keys.
///
/// The persistence layer uses these to pre-filter accounts by index before
/// [`resolve_accounts`] applies the exact matching rule.
pub fn lookup_terms<'a>(
    keys: impl IntoIterator<Item = &'a IdentityKey>,
) -> (Vec<String>, Vec<String>) {
    let mut emails = BTreeSet::new();
    let mut phones = BTreeSet::new();
    for key in keys {
        if let Some(email) = &key.email {
            emails.insert(email.clone());
        }
        if let Some(phone) = &key.phone {
            phones.insert(phone.clone());
        }
    }
    (emails.into_iter().collect(), phones.into_iter().collect())
}

/// Return the ids of every account whose identity matches any of `keys`.
///
/// The result is a set, so an account matched through several keys appears
/// once.
pub fn resolve_accounts<A: Account>(keys: &[IdentityKey], accounts: &[A]) -> BTreeSet<DbId> {
    accounts
        .iter()
        .filter(|account| {
            let identity = account.identity();
            keys.iter().any(|key| key.matches(&identity))
        })
        .map(Account::account_id)
        .collect()
}
