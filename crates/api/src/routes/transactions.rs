//! Transaction header routes.

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use ledgerbook_core::ledger::{parse_reference, EntityKind, HeaderDraft, LedgerError};
use ledgerbook_core::query::TransactionSearchParams;
use ledgerbook_db::repositories::transaction::TransactionRepository;
use ledgerbook_db::repositories::transaction_line::TransactionLineRepository;

use crate::response::{created, ok, ok_with_total, ApiResult};
use crate::AppState;

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/", post(store))
        .route("/group", get(group))
        .route("/{id}", get(show))
        .route("/{id}", put(update))
        .route("/{id}", delete(destroy))
}

/// Query parameters for the group endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct GroupQuery {
    /// Grouping dimension: account or vendor.
    pub by: Option<String>,
}

/// GET `/transactions` - Search transaction headers.
async fn index(
    State(state): State<AppState>,
    Query(params): Query<TransactionSearchParams>,
) -> ApiResult {
    let repo = TransactionRepository::new(state.conn());
    let (rows, total) = repo.search(&params).await?;
    Ok(ok_with_total("SUCCESS", rows, total))
}

/// POST `/transactions` - Create a transaction header.
///
/// Validation, sequence allocation, and the insert run in that order;
/// nothing is persisted when allocation fails.
async fn store(State(state): State<AppState>, Json(draft): Json<HeaderDraft>) -> ApiResult {
    let repo = TransactionRepository::new(state.conn());
    let transaction = repo.create(draft).await?;
    info!(transaction_id = %transaction.id, name = %transaction.name, "transaction created");
    Ok(created("CREATED", transaction))
}

/// GET `/transactions/group` - Group posted lines by a dimension.
async fn group(State(state): State<AppState>, Query(query): Query<GroupQuery>) -> ApiResult {
    let repo = TransactionLineRepository::new(state.conn());
    let groups = repo.group(query.by.as_deref().unwrap_or_default()).await?;
    Ok(ok("SUCCESS", groups))
}

/// GET `/transactions/{id}` - Show one transaction with its user.
async fn show(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = parse_reference(EntityKind::Transaction, Some(&raw_id))?;
    let repo = TransactionRepository::new(state.conn());
    let transaction = repo.find(id).await?.ok_or(LedgerError::NotFound {
        kind: EntityKind::Transaction,
        id,
    })?;
    Ok(ok("SUCCESS", transaction))
}

/// PUT `/transactions/{id}` - Update a transaction header.
///
/// The sequence name is never recomputed.
async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(draft): Json<HeaderDraft>,
) -> ApiResult {
    let id = parse_reference(EntityKind::Transaction, Some(&raw_id))?;
    let repo = TransactionRepository::new(state.conn());
    let transaction = repo.update(id, draft).await?;
    Ok(ok("UPDATED", transaction))
}

/// DELETE `/transactions/{id}` - Delete a transaction header.
///
/// Refused while lines still reference the header.
async fn destroy(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = parse_reference(EntityKind::Transaction, Some(&raw_id))?;
    let repo = TransactionRepository::new(state.conn());
    repo.delete(id).await?;
    info!(transaction_id = %id, "transaction deleted");
    Ok(ok("DELETED", serde_json::Value::Null))
}
