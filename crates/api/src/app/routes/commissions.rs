use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use campay_auth::AuthContext;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/commissions", get(summary))
        .route("/commissions/convert", post(convert))
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    match services.commissions.summary(ctx.user_id()) {
        Ok(summary) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "available": summary.available,
                "converted": summary.converted,
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn convert(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<dto::ConvertRequest>,
) -> axum::response::Response {
    match services.commissions.convert(&ctx, body.amount) {
        Ok(receipt) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "ok": true,
                "batch_id": receipt.batch_id,
                "new_available": receipt.new_available,
                "new_converted": receipt.new_converted,
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
