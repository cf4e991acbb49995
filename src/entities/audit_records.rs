use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "audit_status")]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "error")]
    Error,
    #[sea_orm(string_value = "flagged")]
    Flagged,
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditStatus::Completed => write!(f, "completed"),
            AuditStatus::Error => write!(f, "error"),
            AuditStatus::Flagged => write!(f, "flagged"),
        }
    }
}

/// 购买审计记录: 幂等回放与对账的锚点
/// - items / per_unit_draw 以 JSON 文本存储, 金额字段全部为整数美分,
///   序列化往返不会有任何精度损失
/// - 同一个 purchase_id 只允许一条 completed 记录 (数据库部分唯一索引)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "audit_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub purchase_id: String,
    pub account_id: i64,
    pub items: String,
    pub per_unit_draw: String,
    pub total_debited_cents: i64,
    pub total_won_cents: i64,
    pub balance_before_cents: i64,
    pub balance_after_cents: i64,
    pub status: AuditStatus,
    pub error_message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
