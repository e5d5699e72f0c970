use std::sync::Arc;

use campay_infra::MemoryLedgerStore;
use campay_ledger::{
    AdjudicationGateway, BalanceLedger, CommissionLedger, DepositLifecycle, LedgerConfig,
};

/// Ledger services shared by all request handlers.
pub struct AppServices {
    pub deposits: DepositLifecycle<MemoryLedgerStore>,
    pub balances: BalanceLedger<MemoryLedgerStore>,
    pub commissions: CommissionLedger<MemoryLedgerStore>,
    pub adjudication: AdjudicationGateway<MemoryLedgerStore>,
}

/// Construct the store once and hand every service the same handle; all
/// balance-affecting operations then serialize through it.
pub fn build_services() -> AppServices {
    let store = Arc::new(MemoryLedgerStore::new());
    let config = LedgerConfig::default();

    AppServices {
        deposits: DepositLifecycle::new(store.clone(), config.clone()),
        balances: BalanceLedger::new(store.clone()),
        commissions: CommissionLedger::new(store.clone(), config),
        adjudication: AdjudicationGateway::new(store),
    }
}
