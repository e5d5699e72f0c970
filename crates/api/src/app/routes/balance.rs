use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use campay_auth::AuthContext;
use campay_core::{EntryRef, UserId};
use campay_ledger::EntryKind;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/balance", get(get_balance))
        .route("/debits", post(debit))
}

pub async fn get_balance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    match services.balances.get_balance(ctx.user_id()) {
        Ok(account) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "balance": account.balance,
                "total_credited": account.total_credited,
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// Campaign-cost deduction hook. Called by the campaign subsystem when a
/// campaign is approved, so it runs under the internal (admin) role.
pub async fn debit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<dto::DebitRequest>,
) -> axum::response::Response {
    if let Err(e) = ctx.require_admin() {
        return errors::domain_error_to_response(e);
    }

    let owner = UserId::new(body.owner);
    let reference = EntryRef::from_uuid(body.reference);
    match services
        .balances
        .debit(owner, body.amount, EntryKind::CampaignDebit, reference)
    {
        Ok((_, account)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "ok": true,
                "balance": account.balance,
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
