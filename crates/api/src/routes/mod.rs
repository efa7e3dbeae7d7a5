//! REST API routes.
//!
//! Routing owns no business logic; handlers parse path identifiers through
//! the core resolver, delegate to a repository, and wrap the outcome in the
//! fixed envelope.

pub mod accounts;
pub mod documents;
pub mod health;
pub mod transaction_lines;
pub mod transactions;
pub mod users;
pub mod vendors;

use axum::Router;

use crate::AppState;

/// Combines all route groups.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .nest("/accounts", accounts::routes())
        .nest("/vendors", vendors::routes())
        .nest("/users", users::routes())
        .nest("/transactions", transactions::routes())
        .nest("/transaction-lines", transaction_lines::routes())
        .nest("/documents", documents::routes())
}
