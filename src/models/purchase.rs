use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 购买请求中的一行 (盲盒 + 数量)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseLineItem {
    pub box_id: i64,
    pub quantity: u32,
}

/// 批量购买请求
/// purchase_id 是调用方生成的幂等键 (UUID): 同一个 id 重试时
/// 返回与首次完全一致的结果, 余额只变动一次
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PurchaseRequest {
    pub purchase_id: String,
    pub account_id: i64,
    pub items: Vec<PurchaseLineItem>,
    /// 可选的会话引用, 仅透传记录, 本服务不做鉴权
    pub session_ref: Option<String>,
}

/// 审计记录中持久化的购买明细行 (JSON, 金额全部为整数美分)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PurchasedItem {
    pub box_id: i64,
    pub box_name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub line_cost_cents: i64,
}

/// 审计记录中持久化的单次抽取明细 (JSON)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UnitDraw {
    pub box_id: i64,
    pub prize_id: i64,
    pub prize_name: String,
    pub value_cents: i64,
}

/// 批量购买结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseResultResponse {
    pub purchase_id: String,
    pub total_debited_cents: i64,
    pub total_won_cents: i64,
    pub final_balance_cents: i64,
    pub per_unit_results: Vec<UnitDraw>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // 审计 JSON 往返必须逐分保真 (金额为整数, 不经过二进制浮点)
    #[test]
    fn test_purchased_items_json_round_trip_is_exact() {
        let items = vec![
            PurchasedItem {
                box_id: 1,
                box_name: "Starter Case".to_string(),
                unit_price_cents: 999,
                quantity: 100,
                line_cost_cents: 99_900,
            },
            PurchasedItem {
                box_id: 2,
                box_name: "Premium Case".to_string(),
                unit_price_cents: 9_007_199_254_740_993, // > 2^53, f64 表示不了
                quantity: 1,
                line_cost_cents: 9_007_199_254_740_993,
            },
        ];
        let json = serde_json::to_string(&items).unwrap();
        let back: Vec<PurchasedItem> = serde_json::from_str(&json).unwrap();
        assert_eq!(items, back);
    }

    #[test]
    fn test_unit_draw_json_round_trip_is_exact() {
        let draws = vec![UnitDraw {
            box_id: 1,
            prize_id: 7,
            prize_name: "Collector Figurine".to_string(),
            value_cents: 2000,
        }];
        let json = serde_json::to_string(&draws).unwrap();
        let back: Vec<UnitDraw> = serde_json::from_str(&json).unwrap();
        assert_eq!(draws, back);
    }
}
