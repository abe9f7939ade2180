//! User entity model and DTOs.
//!
//! Accounts are created by the authentication service; this crate only
//! reads them for identity resolution and walker display names.

use safewalk_core::identity::{Account, HasIdentity, IdentityKey};
use safewalk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// One of `phone`, `email`, `google`.
    pub provider: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl HasIdentity for User {
    fn identity(&self) -> IdentityKey {
        IdentityKey::new(self.email.as_deref(), self.phone.as_deref())
    }
}

impl Account for User {
    fn account_id(&self) -> DbId {
        self.id
    }
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub provider: String,
}
