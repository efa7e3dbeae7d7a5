//! Account management routes.

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use ledgerbook_core::ledger::{parse_reference, AccountType, EntityKind, LedgerError};
use ledgerbook_db::repositories::account::{AccountInput, AccountRepository, AccountUpdate};

use crate::response::{created, ok, ApiResult};
use crate::AppState;

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/", post(store))
        .route("/{id}", get(show))
        .route("/{id}", put(update))
        .route("/{id}", delete(destroy))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Account name.
    pub name: String,
    /// Account type: income or expense.
    #[serde(rename = "type")]
    pub account_type: AccountType,
}

/// Request body for updating an account.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// Account name.
    pub name: Option<String>,
    /// Account type: income or expense.
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
}

/// GET `/accounts` - List accounts.
async fn index(State(state): State<AppState>) -> ApiResult {
    let repo = AccountRepository::new(state.conn());
    let accounts = repo.list().await?;
    Ok(ok("SUCCESS", accounts))
}

/// POST `/accounts` - Create an account.
async fn store(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> ApiResult {
    let repo = AccountRepository::new(state.conn());
    let account = repo
        .create(AccountInput {
            name: payload.name,
            account_type: payload.account_type,
        })
        .await?;
    info!(account_id = %account.id, "account created");
    Ok(created("CREATED", account))
}

/// GET `/accounts/{id}` - Show one account.
async fn show(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = parse_reference(EntityKind::Account, Some(&raw_id))?;
    let repo = AccountRepository::new(state.conn());
    let account = repo.find(id).await?.ok_or(LedgerError::NotFound {
        kind: EntityKind::Account,
        id,
    })?;
    Ok(ok("SUCCESS", account))
}

/// PUT `/accounts/{id}` - Update an account.
async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(payload): Json<UpdateAccountRequest>,
) -> ApiResult {
    let id = parse_reference(EntityKind::Account, Some(&raw_id))?;
    let repo = AccountRepository::new(state.conn());
    let account = repo
        .update(
            id,
            AccountUpdate {
                name: payload.name,
                account_type: payload.account_type,
            },
        )
        .await?;
    Ok(ok("UPDATED", account))
}

/// DELETE `/accounts/{id}` - Delete an account.
///
/// Refused while transaction lines still reference the account.
async fn destroy(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = parse_reference(EntityKind::Account, Some(&raw_id))?;
    let repo = AccountRepository::new(state.conn());
    repo.delete(id).await?;
    info!(account_id = %id, "account deleted");
    Ok(ok("DELETED", serde_json::Value::Null))
}
