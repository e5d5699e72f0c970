use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use campay_core::DomainError;
use campay_ledger::LedgerError;

/// Map a ledger service error onto an HTTP response.
///
/// Domain errors keep their stable kind; storage failures are logged for
/// operators and returned as a generic internal error.
pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Domain(e) => domain_error_to_response(e),
        LedgerError::Storage(e) => {
            tracing::error!(error = %e, "storage failure during ledger operation");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            )
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match &err {
        DomainError::Validation { field, message } => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "validation_error",
                "field": field,
                "message": message,
            })),
        )
            .into_response(),
        DomainError::InvalidId(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", msg.clone())
        }
        DomainError::NotFound => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "not found or already processed",
        ),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg.clone()),
        DomainError::InsufficientFunds {
            requested,
            available,
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({
                "error": "insufficient_funds",
                "requested": requested,
                "available": available,
                "shortfall": *requested - *available,
            })),
        )
            .into_response(),
        DomainError::State(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_state", msg.clone())
        }
        DomainError::Unauthorized => {
            json_error(StatusCode::FORBIDDEN, "unauthorized", "unauthorized")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
