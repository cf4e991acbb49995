use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::catalog::{BoxResponse, PrizeResponse};
use crate::entities::prize_entity;

/// 旧版两阶段流程: 扣款请求 (Idle -> Debited)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LegacyDebitRequest {
    pub account_id: i64,
    pub box_id: i64,
}

/// 扣款响应: 立即扣款并返回奖品表, 但不抽奖
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LegacyDebitResponse {
    #[serde(rename = "box")]
    pub box_info: BoxResponse,
    pub prize_table: Vec<PrizeResponse>,
    pub balance_cents: i64,
}

/// 抽奖请求 (Debited -> Drawn)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LegacyDrawRequest {
    pub account_id: i64,
    pub box_id: i64,
}

/// 抽中的奖品 (此时尚未入账, 供前端先做开盒展示)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LegacyWonPrize {
    pub id: i64,
    pub name: String,
    pub value_cents: i64,
}

impl From<prize_entity::Model> for LegacyWonPrize {
    fn from(m: prize_entity::Model) -> Self {
        LegacyWonPrize {
            id: m.id,
            name: m.name,
            value_cents: m.value_cents,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LegacyDrawResponse {
    pub prize: LegacyWonPrize,
}

/// 入账请求 (Drawn -> Credited)
/// declared_value_cents 永远不会作为入账金额使用, 仅用于差异日志;
/// 真实金额一律由目录按 prize_id 查出
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LegacyCreditRequest {
    pub account_id: i64,
    pub prize_id: i64,
    pub declared_value_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LegacyCreditResponse {
    /// 实际入账金额; 未知或仅展示奖品为 0
    pub credited_cents: i64,
    pub balance_cents: i64,
}
