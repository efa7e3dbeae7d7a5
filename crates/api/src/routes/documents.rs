//! Document routes.
//!
//! Export records only; rendering is out of scope.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;

use ledgerbook_core::ledger::{parse_reference, EntityKind, LedgerError};
use ledgerbook_db::repositories::document::DocumentRepository;

use crate::response::{ok, ApiResult};
use crate::AppState;

/// Creates the document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{id}", get(show))
}

/// GET `/documents` - List export records.
async fn index(State(state): State<AppState>) -> ApiResult {
    let repo = DocumentRepository::new(state.conn());
    let documents = repo.list().await?;
    Ok(ok("SUCCESS", documents))
}

/// GET `/documents/{id}` - Show one export record.
async fn show(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = parse_reference(EntityKind::Document, Some(&raw_id))?;
    let repo = DocumentRepository::new(state.conn());
    let document = repo.find(id).await?.ok_or(LedgerError::NotFound {
        kind: EntityKind::Document,
        id,
    })?;
    Ok(ok("SUCCESS", document))
}
