//! HTTP API: routing and request/response mapping over the ledger services.
//!
//! The API owns no invariants; it derives an `AuthContext` per request and
//! forwards to `campay-ledger`.

pub mod app;
pub mod middleware;
