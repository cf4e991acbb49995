use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{LedgerEntryKind, ledger_entry_entity};

/// 流水查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct LedgerEntryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// 流水响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LedgerEntryResponse {
    pub id: i64,
    pub account_id: i64,
    pub kind: LedgerEntryKind,
    pub amount_cents: i64,
    pub balance_before_cents: i64,
    pub balance_after_cents: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ledger_entry_entity::Model> for LedgerEntryResponse {
    fn from(m: ledger_entry_entity::Model) -> Self {
        LedgerEntryResponse {
            id: m.id,
            account_id: m.account_id,
            kind: m.kind,
            amount_cents: m.amount_cents,
            balance_before_cents: m.balance_before_cents,
            balance_after_cents: m.balance_after_cents,
            description: m.description,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}
