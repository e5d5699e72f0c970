//! Deposit lifecycle: address generation, evidence submission, state machine.
//!
//! Status only moves forward: `pending → checking → {approved, rejected}`,
//! with direct adjudication from `pending` also allowed. Terminal rows are
//! immutable and deposits are never physically deleted.

use core::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campay_auth::AuthContext;
use campay_core::{Amount, DepositId, DomainError, DomainResult, UserId};

use crate::config::LedgerConfig;
use crate::store::{LedgerError, LedgerStore, LedgerTx};

/// Supported deposit networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Network {
    Trc20,
    Erc20,
    Bep20,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Trc20 => "TRC20",
            Network::Erc20 => "ERC20",
            Network::Bep20 => "BEP20",
        }
    }

    fn address_prefix(&self) -> &'static str {
        match self {
            Network::Trc20 => "T",
            Network::Erc20 | Network::Bep20 => "0x",
        }
    }
}

impl core::fmt::Display for Network {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TRC20" => Ok(Network::Trc20),
            "ERC20" => Ok(Network::Erc20),
            "BEP20" => Ok(Network::Bep20),
            other => Err(DomainError::validation(
                "network",
                format!("unsupported network '{other}'"),
            )),
        }
    }
}

/// Deposit lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    Pending,
    Checking,
    Approved,
    Rejected,
}

impl DepositStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DepositStatus::Approved | DepositStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Pending => "pending",
            DepositStatus::Checking => "checking",
            DepositStatus::Approved => "approved",
            DepositStatus::Rejected => "rejected",
        }
    }
}

impl core::fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepositStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(DepositStatus::Pending),
            "checking" => Ok(DepositStatus::Checking),
            "approved" => Ok(DepositStatus::Approved),
            "rejected" => Ok(DepositStatus::Rejected),
            other => Err(DomainError::validation(
                "status",
                format!("unknown status '{other}'"),
            )),
        }
    }
}

/// One deposit request, from address generation to terminal resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: DepositId,
    pub owner: UserId,
    pub amount: Amount,
    pub network: Network,
    pub address: String,
    pub memo: String,
    pub status: DepositStatus,
    /// Transaction hash supplied by the owner; set when moving to `checking`.
    pub evidence: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deposit {
    fn new(
        owner: UserId,
        network: Network,
        amount: Amount,
        address: String,
        memo: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DepositId::new(),
            owner,
            amount,
            network,
            address,
            memo,
            status: DepositStatus::Pending,
            evidence: None,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// `pending → checking`, storing the evidence reference.
    pub fn record_evidence(&mut self, evidence: &str, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != DepositStatus::Pending {
            return Err(DomainError::state(format!(
                "evidence only accepted while pending (status: {})",
                self.status
            )));
        }
        self.status = DepositStatus::Checking;
        self.evidence = Some(evidence.to_string());
        self.updated_at = now;
        Ok(())
    }

    /// `{pending, checking} → approved`.
    pub fn approve(&mut self, notes: Option<String>, now: DateTime<Utc>) -> DomainResult<()> {
        self.resolve(DepositStatus::Approved, notes, now)
    }

    /// `{pending, checking} → rejected`. No balance effect.
    pub fn reject(&mut self, notes: Option<String>, now: DateTime<Utc>) -> DomainResult<()> {
        self.resolve(DepositStatus::Rejected, notes, now)
    }

    fn resolve(
        &mut self,
        terminal: DepositStatus,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::conflict("deposit already processed"));
        }
        self.status = terminal;
        self.admin_notes = notes;
        self.updated_at = now;
        Ok(())
    }
}

/// Returned to the caller after address generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositTicket {
    pub deposit_id: DepositId,
    pub address: String,
    pub memo: String,
    /// Advisory validity window; never enforced by the state machine.
    pub expiry_hint_secs: u64,
}

/// Listing filters for the reporting endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositFilter {
    pub status: Option<DepositStatus>,
    /// Substring match over address, memo and evidence.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

/// One page of a filtered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}

const MAX_PAGE_LIMIT: u32 = 100;
const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Deposit-side operations exposed to users and reporting.
pub struct DepositLifecycle<S: LedgerStore> {
    store: Arc<S>,
    config: LedgerConfig,
}

impl<S: LedgerStore> DepositLifecycle<S> {
    pub fn new(store: Arc<S>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Validate the request, generate a destination address + memo, and
    /// persist a `pending` deposit.
    pub fn request_deposit(
        &self,
        ctx: &AuthContext,
        network: Network,
        amount: Amount,
    ) -> Result<DepositTicket, LedgerError> {
        if amount < self.config.min_deposit {
            return Err(DomainError::validation(
                "amount",
                format!("minimum deposit is {}", self.config.min_deposit),
            )
            .into());
        }

        let owner = ctx.user_id();
        let address = generate_address(network);
        let memo = format!("UID{owner}");
        let deposit = Deposit::new(owner, network, amount, address, memo, Utc::now());
        let ticket = DepositTicket {
            deposit_id: deposit.id,
            address: deposit.address.clone(),
            memo: deposit.memo.clone(),
            expiry_hint_secs: self.config.deposit_expiry_secs,
        };

        self.store.within_transaction(|tx| {
            tx.insert_deposit(deposit)?;
            Ok(())
        })?;

        tracing::info!(
            owner = %owner,
            deposit_id = %ticket.deposit_id,
            network = %network,
            amount = %amount,
            "deposit requested"
        );

        Ok(ticket)
    }

    /// Attach transfer evidence to the caller's own `pending` deposit.
    ///
    /// Missing, foreign and already-handled deposits are all reported as
    /// not-found so callers cannot probe other users' records; a repeated
    /// submission falls into the same bucket ("already handled").
    pub fn submit_evidence(
        &self,
        ctx: &AuthContext,
        deposit_id: DepositId,
        evidence: &str,
    ) -> Result<(), LedgerError> {
        if evidence.trim().is_empty() {
            return Err(DomainError::validation("evidence", "evidence reference required").into());
        }

        let owner = ctx.user_id();
        self.store.within_transaction(|tx| {
            let mut deposit = tx.deposit(deposit_id)?.ok_or(DomainError::not_found())?;
            if deposit.owner != owner || deposit.status != DepositStatus::Pending {
                return Err(DomainError::not_found().into());
            }
            deposit.record_evidence(evidence, Utc::now())?;
            tx.update_deposit(deposit)?;
            Ok(())
        })?;

        tracing::info!(owner = %owner, deposit_id = %deposit_id, "deposit evidence submitted");
        Ok(())
    }

    /// Filtered, paginated listing. Admins see every deposit; members only
    /// their own. Owned by reporting, not by the ledger invariants.
    pub fn list_deposits(
        &self,
        ctx: &AuthContext,
        filter: DepositFilter,
    ) -> Result<Page<Deposit>, LedgerError> {
        let limit = if filter.limit == 0 {
            DEFAULT_PAGE_LIMIT
        } else {
            filter.limit.min(MAX_PAGE_LIMIT)
        };
        let page = filter.page.max(1);

        self.store.read(|tx| {
            let mut deposits = tx.deposits()?;
            if !ctx.is_admin() {
                deposits.retain(|d| d.owner == ctx.user_id());
            }
            if let Some(status) = filter.status {
                deposits.retain(|d| d.status == status);
            }
            if let Some(search) = filter.search.as_deref() {
                let needle = search.to_ascii_lowercase();
                deposits.retain(|d| {
                    d.address.to_ascii_lowercase().contains(&needle)
                        || d.memo.to_ascii_lowercase().contains(&needle)
                        || d.evidence
                            .as_deref()
                            .is_some_and(|e| e.to_ascii_lowercase().contains(&needle))
                });
            }

            let total = deposits.len();
            let start = (page as usize - 1).saturating_mul(limit as usize);
            let items = deposits
                .into_iter()
                .skip(start)
                .take(limit as usize)
                .collect();

            Ok(Page {
                items,
                total,
                page,
                limit,
            })
        })
    }
}

/// Simulated destination address: network-shaped prefix + random hex.
///
/// Real address derivation lives in the custody collaborator; the ledger only
/// needs a stable, network-recognizable string.
fn generate_address(network: Network) -> String {
    format!("{}{}", network.address_prefix(), Uuid::now_v7().simple())
}
