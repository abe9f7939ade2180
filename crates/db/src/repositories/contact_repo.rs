//! Repository for the `contacts` table.

use sqlx::PgPool;
use safewalk_core::contacts::ROLE_GUARDIAN;
use safewalk_core::identity::IdentityKey;
use safewalk_core::types::DbId;

use crate::models::contact::{Contact, CreateContact, UpdateContact};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, phone, email, role, created_at, updated_at";

/// Provides CRUD operations for a user's contacts plus identity lookups.
pub struct ContactRepo;

impl ContactRepo {
    /// Insert a contact owned by `user_id`. Name, phone and email are
    /// stored trimmed; a blank email is stored as NULL.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateContact,
    ) -> Result<Contact, sqlx::Error> {
        let query = format!(
            "INSERT INTO contacts (user_id, name, phone, email, role)
             VALUES ($1, TRIM($2), TRIM($3), NULLIF(TRIM($4), ''), $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a contact by id, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's contacts, newest first, optionally filtered by role.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        role: Option<&str>,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contacts
             WHERE user_id = $1 AND ($2::TEXT IS NULL OR role = $2)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(user_id)
            .bind(role)
            .fetch_all(pool)
            .await
    }

    /// Update a contact. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no contact with that id belongs to `user_id`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateContact,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!(
            "UPDATE contacts SET
                name = COALESCE(TRIM($3), name),
                phone = COALESCE(TRIM($4), phone),
                email = CASE WHEN $5::TEXT IS NULL THEN email ELSE NULLIF(TRIM($5), '') END,
                role = COALESCE($6, role)
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.role)
            .fetch_optional(pool)
            .await
    }

    /// Delete a contact. Returns `true` if a row owned by `user_id` was removed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Return the subset of `ids` that belong to `user_id`.
    pub async fn owned_ids(
        pool: &PgPool,
        user_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar("SELECT id FROM contacts WHERE user_id = $1 AND id = ANY($2)")
            .bind(user_id)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Load contacts by id regardless of owner. Unknown ids are skipped.
    pub async fn list_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Contact>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM contacts WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Contact>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Find guardian-role contacts, across all owners, that refer to the
    /// person identified by `identity`.
    ///
    /// This is the reverse direction of identity resolution: an account
    /// discovering which walkers have listed it as a guardian.
    pub async fn find_guardians_matching(
        pool: &PgPool,
        identity: &IdentityKey,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        if identity.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM contacts
             WHERE role = $1
               AND (($2::TEXT IS NOT NULL AND email IS NOT NULL AND LOWER(TRIM(email)) = $2)
                 OR ($3::TEXT IS NOT NULL AND TRIM(phone) = $3))
             ORDER BY id"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(ROLE_GUARDIAN)
            .bind(&identity.email)
            .bind(&identity.phone)
            .fetch_all(pool)
            .await
    }
}
