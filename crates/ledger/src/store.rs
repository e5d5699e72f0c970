//! Transactional repository seam.
//!
//! Every balance-affecting operation runs inside [`LedgerStore::within_transaction`]:
//! the closure either commits as a whole or leaves no trace. Backends provide
//! the serialization guarantee (row locks, a conditional update, or — for the
//! in-memory store — one big lock); the ledger services only assume atomicity.

use chrono::{DateTime, Utc};
use thiserror::Error;

use campay_core::{Amount, CommissionId, DepositId, DomainError, EntryRef, UserId};

use crate::balance::BalanceAccount;
use crate::commission::Commission;
use crate::deposit::Deposit;
use crate::journal::{EntryKind, JournalEntry};

/// Infrastructure-level storage failure.
///
/// Never shown to end users in detail; the API maps it to a generic internal
/// error after logging.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Error returned by ledger services: an expected domain outcome or an
/// infrastructure failure that rolled the transaction back.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("internal storage failure")]
    Storage(#[from] StoreError),
}

impl LedgerError {
    /// The domain error, if this is an expected outcome.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            LedgerError::Domain(e) => Some(e),
            LedgerError::Storage(_) => None,
        }
    }
}

/// Operations available inside one atomic unit of work.
///
/// Writes made through a `LedgerTx` become visible only when the enclosing
/// transaction commits.
pub trait LedgerTx {
    fn insert_deposit(&mut self, deposit: Deposit) -> Result<(), StoreError>;
    fn deposit(&self, id: DepositId) -> Result<Option<Deposit>, StoreError>;
    /// Persist an updated deposit row (keyed by id).
    fn update_deposit(&mut self, deposit: Deposit) -> Result<(), StoreError>;
    /// All deposits, newest first.
    fn deposits(&self) -> Result<Vec<Deposit>, StoreError>;

    /// Balance row for `owner`, zero-initialized if the owner has none yet.
    fn balance(&self, owner: UserId) -> Result<BalanceAccount, StoreError>;
    /// Increment balance and total_credited by `amount` (positive).
    fn apply_credit(&mut self, owner: UserId, amount: Amount) -> Result<BalanceAccount, StoreError>;
    /// Decrement balance by `amount` (positive). Precondition checks are the
    /// caller's job; the store only applies the delta.
    fn apply_debit(&mut self, owner: UserId, amount: Amount) -> Result<BalanceAccount, StoreError>;

    fn append_journal(&mut self, entry: JournalEntry) -> Result<(), StoreError>;
    fn journal_for(&self, owner: UserId) -> Result<Vec<JournalEntry>, StoreError>;
    /// Idempotency lookup: has an entry with this (kind, reference) been applied?
    fn journal_exists(&self, kind: EntryKind, reference: EntryRef) -> Result<bool, StoreError>;

    fn insert_commission(&mut self, commission: Commission) -> Result<(), StoreError>;
    /// Commission rows for `owner` in creation order (oldest first).
    fn commissions_for(&self, owner: UserId) -> Result<Vec<Commission>, StoreError>;
    fn mark_commission_converted(
        &mut self,
        id: CommissionId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// Handle to the shared persistent store.
pub trait LedgerStore: Send + Sync {
    type Tx: LedgerTx;

    /// Run `f` as one atomic unit of work. On `Ok` the writes commit; on
    /// `Err` every write is discarded. Transactions against the same store
    /// serialize, so at most one concurrent caller observes a given row in
    /// its pre-transition state.
    fn within_transaction<T, F>(&self, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Self::Tx) -> Result<T, LedgerError>;

    /// Read-only view of the latest committed state.
    fn read<T, F>(&self, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&Self::Tx) -> Result<T, LedgerError>;
}
