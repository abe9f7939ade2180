//! Handlers for the `/contacts` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use safewalk_core::contacts::{validate_contact_fields, validate_role};
use safewalk_core::error::CoreError;
use safewalk_core::types::DbId;
use safewalk_db::models::contact::{Contact, CreateContact, UpdateContact};
use safewalk_db::repositories::ContactRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /contacts`.
#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    pub role: Option<String>,
}

fn contact_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Contact",
        id,
    }
}

/// GET /api/v1/contacts?role=guardian
pub async fn list_contacts(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ContactListQuery>,
) -> AppResult<Json<DataResponse<Vec<Contact>>>> {
    if let Some(role) = params.role.as_deref() {
        validate_role(role).map_err(CoreError::Validation)?;
    }
    let contacts =
        ContactRepo::list_for_user(&state.pool, auth.user_id, params.role.as_deref()).await?;
    Ok(Json(DataResponse { data: contacts }))
}

/// POST /api/v1/contacts
pub async fn create_contact(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateContact>,
) -> AppResult<(StatusCode, Json<DataResponse<Contact>>)> {
    input.validate()?;
    validate_role(&input.role).map_err(CoreError::Validation)?;
    validate_contact_fields(&input.name, &input.phone)?;

    let contact = ContactRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(
        contact_id = contact.id,
        user_id = auth.user_id,
        role = %contact.role,
        "Contact created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: contact })))
}

/// PUT /api/v1/contacts/{id}
///
/// Partial update. The merged name and phone must still be valid.
pub async fn update_contact(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contact_id): Path<DbId>,
    Json(input): Json<UpdateContact>,
) -> AppResult<Json<DataResponse<Contact>>> {
    input.validate()?;
    if let Some(role) = input.role.as_deref() {
        validate_role(role).map_err(CoreError::Validation)?;
    }

    let existing = ContactRepo::find_by_id(&state.pool, contact_id, auth.user_id)
        .await?
        .ok_or_else(|| contact_not_found(contact_id))?;
    validate_contact_fields(
        input.name.as_deref().unwrap_or(&existing.name),
        input.phone.as_deref().unwrap_or(&existing.phone),
    )?;

    let contact = ContactRepo::update(&state.pool, contact_id, auth.user_id, &input)
        .await?
        .ok_or_else(|| contact_not_found(contact_id))?;

    Ok(Json(DataResponse { data: contact }))
}

/// DELETE /api/v1/contacts/{id}
///
/// Sessions that reference the contact keep the dangling id; it simply
/// stops resolving.
pub async fn delete_contact(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contact_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = ContactRepo::delete(&state.pool, contact_id, auth.user_id).await?;
    if !deleted {
        return Err(contact_not_found(contact_id).into());
    }
    tracing::info!(contact_id, user_id = auth.user_id, "Contact deleted");
    Ok(StatusCode::NO_CONTENT)
}
