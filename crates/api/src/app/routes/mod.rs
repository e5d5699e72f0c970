use axum::Router;

pub mod balance;
pub mod commissions;
pub mod deposits;
pub mod system;

/// All context-protected routes.
pub fn router() -> Router {
    Router::new()
        .merge(deposits::router())
        .merge(balance::router())
        .merge(commissions::router())
}
