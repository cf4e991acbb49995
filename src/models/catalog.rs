use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{AccountMode, box_entity, prize_entity};

/// 盲盒信息响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BoxResponse {
    pub id: i64,
    pub name: String,
    /// 单价(美分)
    pub price_cents: i64,
    pub is_active: bool,
}

impl From<box_entity::Model> for BoxResponse {
    fn from(m: box_entity::Model) -> Self {
        BoxResponse {
            id: m.id,
            name: m.name,
            price_cents: m.price_cents,
            is_active: m.is_active,
        }
    }
}

/// 奖品信息响应 (展示列表会包含 is_drawable = false 的橱窗奖品)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrizeResponse {
    pub id: i64,
    pub box_id: i64,
    pub mode: AccountMode,
    pub name: String,
    /// 奖品价值(美分)
    pub value_cents: i64,
    /// 相对权重 (按奖品表总权重归一化)
    pub weight: f64,
    /// false = 仅展示, 永远不会被抽中
    pub is_drawable: bool,
}

impl From<prize_entity::Model> for PrizeResponse {
    fn from(m: prize_entity::Model) -> Self {
        PrizeResponse {
            id: m.id,
            box_id: m.box_id,
            mode: m.mode,
            name: m.name,
            value_cents: m.value_cents,
            weight: m.weight,
            is_drawable: m.is_drawable,
        }
    }
}

/// 奖品列表查询参数
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PrizeListQuery {
    /// real / demo (默认 real)
    pub mode: Option<AccountMode>,
}
