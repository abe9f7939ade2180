//! Contact entity model and DTOs.

use safewalk_core::contacts::ContactEntry;
use safewalk_core::identity::{HasIdentity, IdentityKey};
use safewalk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `contacts` table.
///
/// A contact never stores an account id; the account it refers to (if
/// any) is resolved from `email`/`phone` on demand.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contact {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    /// One of `emergency`, `guardian`.
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl HasIdentity for Contact {
    fn identity(&self) -> IdentityKey {
        IdentityKey::new(self.email.as_deref(), Some(&self.phone))
    }
}

impl ContactEntry for Contact {
    fn contact_id(&self) -> DbId {
        self.id
    }

    fn role(&self) -> &str {
        &self.role
    }
}

/// DTO for creating a contact.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContact {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    pub role: String,
}

/// DTO for updating a contact. All fields are optional.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateContact {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub role: Option<String>,
}
