//! Admin adjudication of deposits.
//!
//! Single entry point for approve/reject. The status transition and (on
//! approval) the balance credit happen inside one transaction; if the credit
//! fails the deposit stays in its pre-adjudication state. Concurrent calls
//! against the same deposit serialize at the store, so at most one approval
//! ever credits.

use core::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use campay_auth::AuthContext;
use campay_core::{Amount, DepositId, DomainError, UserId};

use crate::deposit::DepositStatus;
use crate::journal::{self, EntryKind};
use crate::store::{LedgerError, LedgerStore, LedgerTx};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjudicationAction {
    Approve,
    Reject,
}

impl FromStr for AdjudicationAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "approve" => Ok(AdjudicationAction::Approve),
            "reject" => Ok(AdjudicationAction::Reject),
            other => Err(DomainError::validation(
                "action",
                format!("unknown action '{other}'"),
            )),
        }
    }
}

/// What the admin gets back after a successful adjudication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjudicationOutcome {
    pub deposit_id: DepositId,
    pub owner: UserId,
    pub new_status: DepositStatus,
    /// Present only on approval.
    pub amount_credited: Option<Amount>,
}

/// Admin-only gateway guaranteeing at-most-once effect per deposit.
pub struct AdjudicationGateway<S: LedgerStore> {
    store: Arc<S>,
}

impl<S: LedgerStore> AdjudicationGateway<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn adjudicate(
        &self,
        ctx: &AuthContext,
        deposit_id: DepositId,
        action: AdjudicationAction,
        notes: Option<String>,
    ) -> Result<AdjudicationOutcome, LedgerError> {
        ctx.require_admin()?;

        let outcome = self.store.within_transaction(|tx| {
            let mut deposit = tx.deposit(deposit_id)?.ok_or(DomainError::not_found())?;
            let now = Utc::now();

            let amount_credited = match action {
                AdjudicationAction::Approve => {
                    deposit.approve(notes.clone(), now)?;
                    journal::post_credit(
                        tx,
                        deposit.owner,
                        deposit.amount,
                        EntryKind::Deposit,
                        deposit.id.into(),
                    )?;
                    Some(deposit.amount)
                }
                AdjudicationAction::Reject => {
                    deposit.reject(notes.clone(), now)?;
                    None
                }
            };

            let outcome = AdjudicationOutcome {
                deposit_id: deposit.id,
                owner: deposit.owner,
                new_status: deposit.status,
                amount_credited,
            };
            tx.update_deposit(deposit)?;
            Ok(outcome)
        })?;

        tracing::info!(
            admin = %ctx.user_id(),
            deposit_id = %deposit_id,
            action = ?action,
            new_status = %outcome.new_status,
            "deposit adjudicated"
        );
        Ok(outcome)
    }
}
