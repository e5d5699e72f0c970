//! Referral commission ledger.
//!
//! Rows are accrued by the referral subsystem with `converted = false` and
//! consumed here. Conversion marks rows oldest-first until the requested
//! amount is covered, then credits the convertible balance — one transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campay_auth::AuthContext;
use campay_core::{Amount, BatchId, CommissionId, DomainError, UserId};

use crate::config::LedgerConfig;
use crate::journal::{self, EntryKind};
use crate::store::{LedgerError, LedgerStore, LedgerTx};

/// One commission row. `converted` is monotonic false→true; `converted_at`
/// is stamped once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commission {
    pub id: CommissionId,
    pub owner: UserId,
    pub amount: Amount,
    pub converted: bool,
    pub created_at: DateTime<Utc>,
    pub converted_at: Option<DateTime<Utc>>,
}

impl Commission {
    pub fn accrued(owner: UserId, amount: Amount, now: DateTime<Utc>) -> Self {
        Self {
            id: CommissionId::new(),
            owner,
            amount,
            converted: false,
            created_at: now,
            converted_at: None,
        }
    }
}

/// Unconverted/converted totals for one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSummary {
    pub available: Amount,
    pub converted: Amount,
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReceipt {
    pub batch_id: BatchId,
    pub amount: Amount,
    pub new_available: Amount,
    pub new_converted: Amount,
}

/// Commission accrual and conversion.
pub struct CommissionLedger<S: LedgerStore> {
    store: Arc<S>,
    config: LedgerConfig,
}

impl<S: LedgerStore> CommissionLedger<S> {
    pub fn new(store: Arc<S>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Record a referral commission for `owner`. Called by the referral
    /// collaborator when a referred-user event pays out.
    pub fn accrue(&self, owner: UserId, amount: Amount) -> Result<CommissionId, LedgerError> {
        if amount <= Amount::ZERO {
            return Err(
                DomainError::validation("amount", "commission amount must be positive").into(),
            );
        }
        let commission = Commission::accrued(owner, amount, Utc::now());
        let id = commission.id;
        self.store.within_transaction(|tx| {
            tx.insert_commission(commission)?;
            Ok(())
        })?;
        tracing::info!(owner = %owner, amount = %amount, commission_id = %id, "commission accrued");
        Ok(id)
    }

    /// Unconverted and converted totals for `owner`.
    pub fn summary(&self, owner: UserId) -> Result<CommissionSummary, LedgerError> {
        self.store.read(|tx| Ok(summarize(&tx.commissions_for(owner)?)))
    }

    /// Convert `amount` of unconverted commission into spendable balance.
    ///
    /// Rows are marked converted in creation order until the marked sum
    /// covers `amount` (rows are not split, so the last row may over-cover);
    /// the credit posted is exactly `amount`. Row marking and the credit
    /// commit together or not at all.
    pub fn convert(
        &self,
        ctx: &AuthContext,
        amount: Amount,
    ) -> Result<ConversionReceipt, LedgerError> {
        let minimum = self.config.min_conversion(ctx.role());
        if amount <= Amount::ZERO {
            return Err(
                DomainError::validation("amount", "conversion amount must be positive").into(),
            );
        }
        if amount < minimum {
            return Err(DomainError::validation(
                "amount",
                format!("minimum conversion is {minimum}"),
            )
            .into());
        }

        let owner = ctx.user_id();
        let batch_id = BatchId::new();

        let receipt = self.store.within_transaction(|tx| {
            let rows = tx.commissions_for(owner)?;
            let available: Amount = rows
                .iter()
                .filter(|c| !c.converted)
                .map(|c| c.amount)
                .sum();
            if amount > available {
                return Err(DomainError::insufficient_funds(amount, available).into());
            }

            let now = Utc::now();
            let mut covered = Amount::ZERO;
            for row in rows.iter().filter(|c| !c.converted) {
                if covered >= amount {
                    break;
                }
                tx.mark_commission_converted(row.id, now)?;
                covered += row.amount;
            }

            journal::post_credit(tx, owner, amount, EntryKind::CommissionConvert, batch_id.into())?;

            let summary = summarize(&tx.commissions_for(owner)?);
            Ok(ConversionReceipt {
                batch_id,
                amount,
                new_available: summary.available,
                new_converted: summary.converted,
            })
        })?;

        tracing::info!(
            owner = %owner,
            amount = %amount,
            batch_id = %batch_id,
            "commission converted"
        );
        Ok(receipt)
    }
}

fn summarize(rows: &[Commission]) -> CommissionSummary {
    let mut summary = CommissionSummary {
        available: Amount::ZERO,
        converted: Amount::ZERO,
    };
    for row in rows {
        if row.converted {
            summary.converted += row.amount;
        } else {
            summary.available += row.amount;
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_splits_by_converted_flag() {
        let owner = UserId::new(7);
        let now = Utc::now();
        let mut rows = vec![
            Commission::accrued(owner, Amount::from(3), now),
            Commission::accrued(owner, Amount::from(2), now),
        ];
        rows[1].converted = true;
        rows[1].converted_at = Some(now);

        let summary = summarize(&rows);
        assert_eq!(summary.available, Amount::from(3));
        assert_eq!(summary.converted, Amount::from(2));
    }
}
