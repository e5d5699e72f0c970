use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use uuid::Uuid;

use campay_core::Amount;
use campay_ledger::{Deposit, Page};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RequestDepositRequest {
    pub network: String,
    pub amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct SubmitEvidenceRequest {
    pub evidence: String,
}

#[derive(Debug, Deserialize)]
pub struct AdjudicateRequest {
    pub action: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DebitRequest {
    pub owner: u64,
    pub amount: Amount,
    /// Campaign record this debit pays for.
    pub reference: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub amount: Amount,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListDepositsQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn deposit_to_json(deposit: &Deposit) -> JsonValue {
    json!({
        "id": deposit.id,
        "owner": deposit.owner,
        "amount": deposit.amount,
        "network": deposit.network,
        "address": deposit.address,
        "memo": deposit.memo,
        "status": deposit.status,
        "evidence": deposit.evidence,
        "admin_notes": deposit.admin_notes,
        "created_at": deposit.created_at,
        "updated_at": deposit.updated_at,
    })
}

pub fn page_to_json(page: &Page<Deposit>) -> JsonValue {
    json!({
        "items": page.items.iter().map(deposit_to_json).collect::<Vec<_>>(),
        "total": page.total,
        "page": page.page,
        "limit": page.limit,
    })
}
