//! Ledger configuration constants.

use campay_auth::Role;
use campay_core::{Amount, units};

/// Tunables consumed by the ledger services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Minimum accepted deposit amount.
    pub min_deposit: Amount,
    /// Advisory validity window returned with a generated address.
    /// Not enforced anywhere in the state machine.
    pub deposit_expiry_secs: u64,
    /// Minimum commission conversion for ordinary members.
    pub min_conversion_member: Amount,
    /// Minimum commission conversion for admins.
    pub min_conversion_admin: Amount,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_deposit: units(10),
            deposit_expiry_secs: 3600,
            min_conversion_member: units(10),
            min_conversion_admin: Amount::ZERO,
        }
    }
}

impl LedgerConfig {
    /// Role-dependent conversion threshold.
    pub fn min_conversion(&self, role: Role) -> Amount {
        match role {
            Role::Admin => self.min_conversion_admin,
            Role::Member => self.min_conversion_member,
        }
    }
}
