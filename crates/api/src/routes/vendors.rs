//! Vendor management routes.

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use ledgerbook_core::ledger::{parse_reference, EntityKind, LedgerError};
use ledgerbook_db::repositories::vendor::{VendorInput, VendorRepository};

use crate::response::{created, ok, ApiResult};
use crate::AppState;

/// Creates the vendor routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/", post(store))
        .route("/{id}", get(show))
        .route("/{id}", put(update))
        .route("/{id}", delete(destroy))
}

/// Request body for creating or renaming a vendor.
#[derive(Debug, Deserialize)]
pub struct VendorRequest {
    /// Vendor name.
    pub name: String,
}

/// GET `/vendors` - List vendors.
async fn index(State(state): State<AppState>) -> ApiResult {
    let repo = VendorRepository::new(state.conn());
    let vendors = repo.list().await?;
    Ok(ok("SUCCESS", vendors))
}

/// POST `/vendors` - Create a vendor.
async fn store(State(state): State<AppState>, Json(payload): Json<VendorRequest>) -> ApiResult {
    let repo = VendorRepository::new(state.conn());
    let vendor = repo.create(VendorInput { name: payload.name }).await?;
    info!(vendor_id = %vendor.id, "vendor created");
    Ok(created("CREATED", vendor))
}

/// GET `/vendors/{id}` - Show one vendor.
async fn show(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = parse_reference(EntityKind::Vendor, Some(&raw_id))?;
    let repo = VendorRepository::new(state.conn());
    let vendor = repo.find(id).await?.ok_or(LedgerError::NotFound {
        kind: EntityKind::Vendor,
        id,
    })?;
    Ok(ok("SUCCESS", vendor))
}

/// PUT `/vendors/{id}` - Rename a vendor.
async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(payload): Json<VendorRequest>,
) -> ApiResult {
    let id = parse_reference(EntityKind::Vendor, Some(&raw_id))?;
    let repo = VendorRepository::new(state.conn());
    let vendor = repo.update(id, VendorInput { name: payload.name }).await?;
    Ok(ok("UPDATED", vendor))
}

/// DELETE `/vendors/{id}` - Delete a vendor.
///
/// Refused while transaction lines still reference the vendor.
async fn destroy(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = parse_reference(EntityKind::Vendor, Some(&raw_id))?;
    let repo = VendorRepository::new(state.conn());
    repo.delete(id).await?;
    info!(vendor_id = %id, "vendor deleted");
    Ok(ok("DELETED", serde_json::Value::Null))
}
