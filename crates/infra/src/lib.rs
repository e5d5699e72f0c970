//! `campay-infra` — storage backends for the ledger.
//!
//! Currently one backend: a serialized in-memory store with snapshot/rollback
//! transactions. The cross-component test suite for the whole ledger also
//! lives here, since it needs a concrete store.

pub mod memory;

mod integration_tests;

pub use memory::MemoryLedgerStore;
