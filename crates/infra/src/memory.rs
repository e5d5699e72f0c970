//! In-memory `LedgerStore`.
//!
//! One mutex guards the whole state. A transaction clones the committed
//! state, runs the closure against the clone, and swaps it back in only on
//! `Ok` — so a failed operation leaves no partial writes, and transactions
//! serialize fully (the in-memory equivalent of row locking: the second of
//! two racing adjudications always sees the first one's terminal row).

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use campay_core::{Amount, CommissionId, DepositId, EntryRef, UserId};
use campay_ledger::balance::BalanceAccount;
use campay_ledger::commission::Commission;
use campay_ledger::deposit::Deposit;
use campay_ledger::journal::{EntryKind, JournalEntry};
use campay_ledger::store::{LedgerError, LedgerStore, LedgerTx, StoreError};

/// Committed ledger state; doubles as the transaction handle.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    deposits: HashMap<DepositId, Deposit>,
    balances: HashMap<UserId, BalanceAccount>,
    journal: Vec<JournalEntry>,
    commissions: Vec<Commission>,
}

impl LedgerTx for LedgerState {
    fn insert_deposit(&mut self, deposit: Deposit) -> Result<(), StoreError> {
        self.deposits.insert(deposit.id, deposit);
        Ok(())
    }

    fn deposit(&self, id: DepositId) -> Result<Option<Deposit>, StoreError> {
        Ok(self.deposits.get(&id).cloned())
    }

    fn update_deposit(&mut self, deposit: Deposit) -> Result<(), StoreError> {
        self.deposits.insert(deposit.id, deposit);
        Ok(())
    }

    fn deposits(&self) -> Result<Vec<Deposit>, StoreError> {
        let mut all: Vec<Deposit> = self.deposits.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    fn balance(&self, owner: UserId) -> Result<BalanceAccount, StoreError> {
        Ok(self
            .balances
            .get(&owner)
            .cloned()
            .unwrap_or_else(|| BalanceAccount::zero(owner)))
    }

    fn apply_credit(&mut self, owner: UserId, amount: Amount) -> Result<BalanceAccount, StoreError> {
        let account = self
            .balances
            .entry(owner)
            .or_insert_with(|| BalanceAccount::zero(owner));
        account.balance += amount;
        account.total_credited += amount;
        Ok(account.clone())
    }

    fn apply_debit(&mut self, owner: UserId, amount: Amount) -> Result<BalanceAccount, StoreError> {
        let account = self
            .balances
            .entry(owner)
            .or_insert_with(|| BalanceAccount::zero(owner));
        account.balance -= amount;
        Ok(account.clone())
    }

    fn append_journal(&mut self, entry: JournalEntry) -> Result<(), StoreError> {
        self.journal.push(entry);
        Ok(())
    }

    fn journal_for(&self, owner: UserId) -> Result<Vec<JournalEntry>, StoreError> {
        Ok(self
            .journal
            .iter()
            .filter(|e| e.owner == owner)
            .cloned()
            .collect())
    }

    fn journal_exists(&self, kind: EntryKind, reference: EntryRef) -> Result<bool, StoreError> {
        Ok(self
            .journal
            .iter()
            .any(|e| e.kind == kind && e.reference == reference))
    }

    fn insert_commission(&mut self, commission: Commission) -> Result<(), StoreError> {
        self.commissions.push(commission);
        Ok(())
    }

    fn commissions_for(&self, owner: UserId) -> Result<Vec<Commission>, StoreError> {
        // Insertion order == creation order, which convert() relies on.
        Ok(self
            .commissions
            .iter()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect())
    }

    fn mark_commission_converted(
        &mut self,
        id: CommissionId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let row = self
            .commissions
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::Backend(format!("commission {id} vanished mid-transaction")))?;
        row.converted = true;
        if row.converted_at.is_none() {
            row.converted_at = Some(at);
        }
        Ok(())
    }
}

/// Serialized in-memory store. Intended for tests, dev and single-process
/// deployments; swap in a database-backed `LedgerStore` for anything else.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    state: Mutex<LedgerState>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    type Tx = LedgerState;

    fn within_transaction<T, F>(&self, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Self::Tx) -> Result<T, LedgerError>,
    {
        let mut committed = self
            .state
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let mut working = committed.clone();
        match f(&mut working) {
            Ok(value) => {
                *committed = working;
                Ok(value)
            }
            Err(e) => Err(e),
        }
    }

    fn read<T, F>(&self, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&Self::Tx) -> Result<T, LedgerError>,
    {
        let committed = self
            .state
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        f(&committed)
    }
}
