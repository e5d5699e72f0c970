//! `campay-core` — domain foundation for the campay ledger.
//!
//! Pure domain primitives only (ids, money, errors); no infrastructure concerns.

pub mod error;
pub mod id;
pub mod money;

pub use error::{DomainError, DomainResult};
pub use id::{BatchId, CommissionId, DepositId, EntryRef, JournalEntryId, UserId};
pub use money::{Amount, units};
