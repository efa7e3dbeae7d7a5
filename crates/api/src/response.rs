//! The fixed response envelope and error mapping.
//!
//! Every response, success or failure, is `{status, message, data}` with an
//! optional `total` on paginated lists. Failures map through the domain
//! error's `http_status_code()` and carry its display text as the message
//! plus the machine-readable `code`; routing never invents its own status
//! codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use ledgerbook_core::ledger::LedgerError;

/// A success response in the fixed envelope.
pub fn ok<T: Serialize>(message: &str, data: T) -> Response {
    envelope(StatusCode::OK, message, data, None)
}

/// A success response carrying an unpaginated total.
pub fn ok_with_total<T: Serialize>(message: &str, data: T, total: u64) -> Response {
    envelope(StatusCode::OK, message, data, Some(total))
}

/// A creation response in the fixed envelope.
pub fn created<T: Serialize>(message: &str, data: T) -> Response {
    envelope(StatusCode::CREATED, message, data, None)
}

fn envelope<T: Serialize>(
    status: StatusCode,
    message: &str,
    data: T,
    total: Option<u64>,
) -> Response {
    let mut body = json!({
        "status": true,
        "message": message,
        "data": data,
    });
    if let (Some(total), Some(map)) = (total, body.as_object_mut()) {
        map.insert("total".to_owned(), json!(total));
    }
    (status, Json(body)).into_response()
}

/// Wrapper turning a domain error into an envelope response.
#[derive(Debug)]
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(code = self.0.error_code(), error = %self.0, "request failed");
        } else {
            tracing::debug!(code = self.0.error_code(), error = %self.0, "request rejected");
        }
        (
            status,
            Json(json!({
                "status": false,
                "message": self.0.to_string(),
                "data": serde_json::Value::Null,
                "code": self.0.error_code(),
            })),
        )
            .into_response()
    }
}

/// Handler result alias.
pub type ApiResult = Result<Response, ApiError>;
