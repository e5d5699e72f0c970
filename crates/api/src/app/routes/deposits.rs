use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use uuid::Uuid;

use campay_auth::AuthContext;
use campay_core::DepositId;
use campay_ledger::{AdjudicationAction, DepositFilter, DepositStatus, Network};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/deposits", post(request_deposit).get(list_deposits))
        .route("/deposits/:id/evidence", post(submit_evidence))
        .route("/deposits/:id/adjudicate", post(adjudicate))
}

pub async fn request_deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<dto::RequestDepositRequest>,
) -> axum::response::Response {
    let network = match body.network.parse::<Network>() {
        Ok(n) => n,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.deposits.request_deposit(&ctx, network, body.amount) {
        Ok(ticket) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "deposit_id": ticket.deposit_id,
                "address": ticket.address,
                "memo": ticket.memo,
                "expiry_hint_secs": ticket.expiry_hint_secs,
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn submit_evidence(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<dto::SubmitEvidenceRequest>,
) -> axum::response::Response {
    let deposit_id = DepositId::from_uuid(id);
    match services
        .deposits
        .submit_evidence(&ctx, deposit_id, &body.evidence)
    {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list_deposits(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<dto::ListDepositsQuery>,
) -> axum::response::Response {
    let status = match query.status.as_deref() {
        Some(raw) => match raw.parse::<DepositStatus>() {
            Ok(s) => Some(s),
            Err(e) => return errors::domain_error_to_response(e),
        },
        None => None,
    };

    let filter = DepositFilter {
        status,
        search: query.search,
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(0),
    };

    match services.deposits.list_deposits(&ctx, filter) {
        Ok(page) => (StatusCode::OK, Json(dto::page_to_json(&page))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn adjudicate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<dto::AdjudicateRequest>,
) -> axum::response::Response {
    let action = match body.action.parse::<AdjudicationAction>() {
        Ok(a) => a,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let deposit_id = DepositId::from_uuid(id);
    match services
        .adjudication
        .adjudicate(&ctx, deposit_id, action, body.notes)
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "ok": true,
                "new_status": outcome.new_status,
                "amount_credited": outcome.amount_credited,
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
