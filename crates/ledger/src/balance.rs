//! Per-user balance account and the service wrappers around the journal.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use campay_core::{Amount, EntryRef, UserId};

use crate::journal::{self, EntryKind, JournalEntry};
use crate::store::{LedgerError, LedgerStore, LedgerTx};

/// Balance row for one owner.
///
/// `balance` equals the signed sum of the owner's journal entries at all
/// times; `total_credited` accumulates every credit ever applied and never
/// decreases. Rows are mutated only through `post_credit`/`post_debit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceAccount {
    pub owner: UserId,
    pub balance: Amount,
    pub total_credited: Amount,
}

impl BalanceAccount {
    pub fn zero(owner: UserId) -> Self {
        Self {
            owner,
            balance: Amount::ZERO,
            total_credited: Amount::ZERO,
        }
    }
}

/// Journal-backed balance operations, one transaction per call.
///
/// External collaborators (the campaign subsystem's cost deduction) go through
/// this service; the adjudication and conversion paths post directly into
/// their own enclosing transactions instead.
pub struct BalanceLedger<S: LedgerStore> {
    store: Arc<S>,
}

impl<S: LedgerStore> BalanceLedger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn credit(
        &self,
        owner: UserId,
        amount: Amount,
        kind: EntryKind,
        reference: EntryRef,
    ) -> Result<(JournalEntry, BalanceAccount), LedgerError> {
        self.store
            .within_transaction(|tx| journal::post_credit(tx, owner, amount, kind, reference))
    }

    pub fn debit(
        &self,
        owner: UserId,
        amount: Amount,
        kind: EntryKind,
        reference: EntryRef,
    ) -> Result<(JournalEntry, BalanceAccount), LedgerError> {
        self.store
            .within_transaction(|tx| journal::post_debit(tx, owner, amount, kind, reference))
    }

    /// Latest committed balance for `owner` (zero row if never credited).
    pub fn get_balance(&self, owner: UserId) -> Result<BalanceAccount, LedgerError> {
        self.store.read(|tx| Ok(tx.balance(owner)?))
    }

    /// Full journal for `owner`, oldest first. Reporting/audit use.
    pub fn journal(&self, owner: UserId) -> Result<Vec<JournalEntry>, LedgerError> {
        self.store.read(|tx| Ok(tx.journal_for(owner)?))
    }
}
