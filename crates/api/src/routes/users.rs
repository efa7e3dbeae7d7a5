//! User management routes.
//!
//! Credentials are stored as an opaque hash; no hashing or token issuance
//! happens here.

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use ledgerbook_core::ledger::{parse_reference, EntityKind, LedgerError};
use ledgerbook_db::entities::sea_orm_active_enums::{UserRole, UserStatus};
use ledgerbook_db::repositories::user::{UserInput, UserRepository, UserUpdate};

use crate::response::{created, ok, ApiResult};
use crate::AppState;

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/", post(store))
        .route("/{id}", get(show))
        .route("/{id}", put(update))
        .route("/{id}", delete(destroy))
}

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Display name.
    pub name: String,
    /// Sign-in email; unique.
    pub email: String,
    /// Opaque credential hash.
    pub password_hash: String,
    /// Role; defaults to staff.
    pub role: Option<UserRole>,
    /// Status; defaults to active.
    pub status: Option<UserStatus>,
}

/// Request body for updating a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// Display name.
    pub name: Option<String>,
    /// Sign-in email.
    pub email: Option<String>,
    /// Role.
    pub role: Option<UserRole>,
    /// Status.
    pub status: Option<UserStatus>,
}

/// GET `/users` - List users.
async fn index(State(state): State<AppState>) -> ApiResult {
    let repo = UserRepository::new(state.conn());
    let users = repo.list().await?;
    Ok(ok("SUCCESS", users))
}

/// POST `/users` - Create a user.
async fn store(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult {
    let repo = UserRepository::new(state.conn());
    let user = repo
        .create(UserInput {
            name: payload.name,
            email: payload.email,
            password_hash: payload.password_hash,
            role: payload.role,
            status: payload.status,
        })
        .await?;
    info!(user_id = %user.id, "user created");
    Ok(created("CREATED", user))
}

/// GET `/users/{id}` - Show one user.
async fn show(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = parse_reference(EntityKind::User, Some(&raw_id))?;
    let repo = UserRepository::new(state.conn());
    let user = repo.find(id).await?.ok_or(LedgerError::NotFound {
        kind: EntityKind::User,
        id,
    })?;
    Ok(ok("SUCCESS", user))
}

/// PUT `/users/{id}` - Update a user.
async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult {
    let id = parse_reference(EntityKind::User, Some(&raw_id))?;
    let repo = UserRepository::new(state.conn());
    let user = repo
        .update(
            id,
            UserUpdate {
                name: payload.name,
                email: payload.email,
                role: payload.role,
                status: payload.status,
            },
        )
        .await?;
    Ok(ok("UPDATED", user))
}

/// DELETE `/users/{id}` - Delete a user.
async fn destroy(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = parse_reference(EntityKind::User, Some(&raw_id))?;
    let repo = UserRepository::new(state.conn());
    repo.delete(id).await?;
    info!(user_id = %id, "user deleted");
    Ok(ok("DELETED", serde_json::Value::Null))
}
