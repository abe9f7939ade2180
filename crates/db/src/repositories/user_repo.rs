//! Repository for the `users` table.

use sqlx::PgPool;
use safewalk_core::types::DbId;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, phone, provider, created_at, updated_at";

/// Provides lookups over registered accounts.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, phone, provider)
             VALUES ($1, NULLIF(TRIM($2), ''), NULLIF(TRIM($3), ''), $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.provider)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find every account whose normalized email is in `emails` or whose
    /// trimmed phone is in `phones`.
    ///
    /// Terms must already be normalized (see
    /// [`safewalk_core::identity::lookup_terms`]). This is an indexed
    /// pre-filter; callers apply the exact rule with
    /// [`safewalk_core::identity::resolve_accounts`].
    pub async fn find_by_identity_terms(
        pool: &PgPool,
        emails: &[String],
        phones: &[String],
    ) -> Result<Vec<User>, sqlx::Error> {
        if emails.is_empty() && phones.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE (email IS NOT NULL AND LOWER(TRIM(email)) = ANY($1))
                OR (phone IS NOT NULL AND TRIM(phone) = ANY($2))
             ORDER BY id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(emails)
            .bind(phones)
            .fetch_all(pool)
            .await
    }
}
