use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::purchase::{PurchasedItem, UnitDraw};
use crate::entities::{AuditStatus, audit_record_entity};

/// 审计记录查询参数
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AuditRecordQuery {
    pub account_id: Option<i64>,
    pub status: Option<AuditStatus>,
    /// 起始时间 (RFC 3339, 含)
    pub start: Option<DateTime<Utc>>,
    /// 结束时间 (RFC 3339, 不含)
    pub end: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// 审计记录响应 (items / per_unit_draw 从 JSON 文本还原为结构)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditRecordResponse {
    pub purchase_id: String,
    pub account_id: i64,
    pub items: Vec<PurchasedItem>,
    pub per_unit_draw: Vec<UnitDraw>,
    pub total_debited_cents: i64,
    pub total_won_cents: i64,
    pub balance_before_cents: i64,
    pub balance_after_cents: i64,
    pub status: AuditStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<audit_record_entity::Model> for AuditRecordResponse {
    fn from(m: audit_record_entity::Model) -> Self {
        // 历史记录损坏时仍可列出: 解析失败降级为空列表并记日志
        let items: Vec<PurchasedItem> = serde_json::from_str(&m.items).unwrap_or_else(|e| {
            log::error!("Corrupt items payload on audit record {}: {e}", m.purchase_id);
            Vec::new()
        });
        let per_unit_draw: Vec<UnitDraw> =
            serde_json::from_str(&m.per_unit_draw).unwrap_or_else(|e| {
                log::error!(
                    "Corrupt per_unit_draw payload on audit record {}: {e}",
                    m.purchase_id
                );
                Vec::new()
            });
        AuditRecordResponse {
            purchase_id: m.purchase_id,
            account_id: m.account_id,
            items,
            per_unit_draw,
            total_debited_cents: m.total_debited_cents,
            total_won_cents: m.total_won_cents,
            balance_before_cents: m.balance_before_cents,
            balance_after_cents: m.balance_after_cents,
            status: m.status,
            error_message: m.error_message,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// 对账扫描请求 (时间窗口)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DiscrepancyScanRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// 单条对账发现
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiscrepancyFinding {
    pub purchase_id: String,
    pub account_id: i64,
    pub reasons: Vec<String>,
}

/// 对账扫描报告 (只读, 不修改任何账务状态)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiscrepancyReport {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub scanned: u64,
    pub flagged_count: u64,
    pub findings: Vec<DiscrepancyFinding>,
}
