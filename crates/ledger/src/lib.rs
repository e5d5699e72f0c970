//! `campay-ledger` — the monetary ledger core.
//!
//! Deposit lifecycle, per-user balance + append-only journal, referral
//! commission conversion, and the admin adjudication gateway, all over a
//! transactional [`store::LedgerStore`] seam. No transport or persistence
//! concerns live here.

pub mod adjudicate;
pub mod balance;
pub mod commission;
pub mod config;
pub mod deposit;
pub mod journal;
pub mod store;

pub use adjudicate::{AdjudicationAction, AdjudicationGateway, AdjudicationOutcome};
pub use balance::{BalanceAccount, BalanceLedger};
pub use commission::{Commission, CommissionLedger, CommissionSummary, ConversionReceipt};
pub use config::LedgerConfig;
pub use deposit::{
    Deposit, DepositFilter, DepositLifecycle, DepositStatus, DepositTicket, Network, Page,
};
pub use journal::{EntryKind, EntryStatus, JournalEntry};
pub use store::{LedgerError, LedgerStore, LedgerTx, StoreError};
