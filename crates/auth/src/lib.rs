//! `campay-auth` — request identity and role checks.
//!
//! Every ledger operation takes an [`AuthContext`] validated once at the
//! boundary; nothing downstream re-checks raw role strings.

pub mod context;
pub mod role;

pub use context::AuthContext;
pub use role::Role;
