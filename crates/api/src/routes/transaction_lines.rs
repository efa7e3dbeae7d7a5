//! Transaction line routes.

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use ledgerbook_core::ledger::{parse_reference, EntityKind, LedgerError, LineDraft};
use ledgerbook_core::query::LineSearchParams;
use ledgerbook_db::repositories::transaction_line::TransactionLineRepository;

use crate::response::{created, ok, ok_with_total, ApiResult};
use crate::AppState;

/// Creates the transaction line routes.
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

/// GET `/transaction-lines` - Search lines with joined references.
async fn index(
    State(state): State<AppState>,
    Query(params): Query<LineSearchParams>,
) -> ApiResult {
    let repo = TransactionLineRepository::new(state.conn());
    let (rows, total) = repo.search(&params).await?;
    Ok(ok_with_total("SUCCESS", rows, total))
}

/// POST `/transaction-lines` - Create a line.
///
/// The posting rule decides the debit/credit sides from the referenced
/// account's type; the suppressed side is stored as zero whatever the
/// client sent.
async fn store(State(state): State<AppState>, Json(draft): Json<LineDraft>) -> ApiResult {
    let repo = TransactionLineRepository::new(state.conn());
    let line = repo.create(draft).await?;
    info!(line_id = %line.id, "transaction line created");
    Ok(created("CREATED", line))
}

/// GET `/transaction-lines/group` - Group lines by a dimension.
async fn group(State(state): State<AppState>, Query(query): Query<GroupQuery>) -> ApiResult {
    let repo = TransactionLineRepository::new(state.conn());
    let groups = repo.group(query.by.as_deref().unwrap_or_default()).await?;
    Ok(ok("SUCCESS", groups))
}

/// GET `/transaction-lines/{id}` - Show one line with joined references.
async fn show(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = parse_reference(EntityKind::TransactionLine, Some(&raw_id))?;
    let repo = TransactionLineRepository::new(state.conn());
    let line = repo.find(id).await?.ok_or(LedgerError::NotFound {
        kind: EntityKind::TransactionLine,
        id,
    })?;
    Ok(ok("SUCCESS", line))
}

/// PUT `/transaction-lines/{id}` - Update a line.
///
/// The merged record passes the full validation again; a partial update
/// cannot bypass the posting rule.
async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(draft): Json<LineDraft>,
) -> ApiResult {
    let id = parse_reference(EntityKind::TransactionLine, Some(&raw_id))?;
    let repo = TransactionLineRepository::new(state.conn());
    let line = repo.update(id, draft).await?;
    Ok(ok("UPDATED", line))
}

/// DELETE `/transaction-lines/{id}` - Delete a line.
async fn destroy(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = parse_reference(EntityKind::TransactionLine, Some(&raw_id))?;
    let repo = TransactionLineRepository::new(state.conn());
    repo.delete(id).await?;
    info!(line_id = %id, "transaction line deleted");
    Ok(ok("DELETED", serde_json::Value::Null))
}
