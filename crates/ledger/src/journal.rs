//! Transaction journal: append-only record of every balance-affecting event.
//!
//! `post_credit`/`post_debit` are the only writers of balance rows and journal
//! entries. Each call is exactly one journal append plus one balance update
//! inside the caller's transaction, so `balance == Σ entries` holds by
//! construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campay_core::{Amount, DomainError, EntryRef, JournalEntryId, UserId};

use crate::balance::BalanceAccount;
use crate::store::{LedgerError, LedgerTx};

/// What kind of event produced a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Approved deposit credited to the owner.
    Deposit,
    /// Campaign cost deducted at campaign approval.
    CampaignDebit,
    /// Commission batch converted into spendable balance.
    CommissionConvert,
}

/// Entries are applied whole or not at all; there is no pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Completed,
}

/// One immutable journal row. Positive amount = credit, negative = debit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalEntryId,
    pub owner: UserId,
    pub amount: Amount,
    pub kind: EntryKind,
    pub reference: EntryRef,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
}

/// Credit `owner` by `amount` inside the caller's transaction.
///
/// Idempotent per (kind, reference): a second credit for the same reference is
/// rejected with a conflict instead of double-applying, which protects the
/// at-most-once contract even when adjudication is retried.
pub fn post_credit<T: LedgerTx>(
    tx: &mut T,
    owner: UserId,
    amount: Amount,
    kind: EntryKind,
    reference: EntryRef,
) -> Result<(JournalEntry, BalanceAccount), LedgerError> {
    if amount <= Amount::ZERO {
        return Err(DomainError::validation("amount", "credit amount must be positive").into());
    }

    if tx.journal_exists(kind, reference)? {
        return Err(DomainError::conflict(format!(
            "reference {reference} already credited"
        ))
        .into());
    }

    let account = tx.apply_credit(owner, amount)?;
    let entry = JournalEntry {
        id: JournalEntryId::new(),
        owner,
        amount,
        kind,
        reference,
        status: EntryStatus::Completed,
        created_at: Utc::now(),
    };
    tx.append_journal(entry.clone())?;

    tracing::info!(
        owner = %owner,
        amount = %amount,
        kind = ?kind,
        reference = %reference,
        "credit posted"
    );

    Ok((entry, account))
}

/// Debit `owner` by `amount` inside the caller's transaction.
///
/// Fails with `InsufficientFunds` (and changes nothing) when the committed
/// balance does not cover the amount.
pub fn post_debit<T: LedgerTx>(
    tx: &mut T,
    owner: UserId,
    amount: Amount,
    kind: EntryKind,
    reference: EntryRef,
) -> Result<(JournalEntry, BalanceAccount), LedgerError> {
    if amount <= Amount::ZERO {
        return Err(DomainError::validation("amount", "debit amount must be positive").into());
    }

    let current = tx.balance(owner)?;
    if current.balance < amount {
        return Err(DomainError::insufficient_funds(amount, current.balance).into());
    }

    let account = tx.apply_debit(owner, amount)?;
    let entry = JournalEntry {
        id: JournalEntryId::new(),
        owner,
        amount: -amount,
        kind,
        reference,
        status: EntryStatus::Completed,
        created_at: Utc::now(),
    };
    tx.append_journal(entry.clone())?;

    tracing::info!(
        owner = %owner,
        amount = %amount,
        kind = ?kind,
        reference = %reference,
        "debit posted"
    );

    Ok((entry, account))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_kinds_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&EntryKind::CampaignDebit).unwrap(),
            "\"campaign_debit\""
        );
        assert_eq!(
            serde_json::to_string(&EntryKind::CommissionConvert).unwrap(),
            "\"commission_convert\""
        );
        assert_eq!(
            serde_json::to_string(&EntryStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
