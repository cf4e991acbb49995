use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{AuditStatus, audit_record_entity as records};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuditRecordQuery, AuditRecordResponse, DiscrepancyFinding, DiscrepancyReport,
    PaginatedResponse, PaginationParams, PurchasedItem, UnitDraw,
};

/// 对账判定的容差: 0.01 货币单位 = 1 美分。
/// 金额全部为整数美分, 任何 >= 1 美分的偏差都视为不一致。
const EPSILON_CENTS: i64 = 1;

/// 审计记录: 只追加写入, 既是幂等回放的依据也是对账的原始素材。
/// purchase_id 上的部分唯一索引 (status = completed) 是防止重复处理的
/// 第二道防线, 独立于编排层自己的幂等检查。
#[derive(Clone)]
pub struct AuditService {
    pool: DatabaseConnection,
}

impl AuditService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 幂等检查用: 按 purchase_id 查找已完成的记录
    pub async fn find_completed(&self, purchase_id: &str) -> Result<Option<records::Model>, DbErr> {
        records::Entity::find()
            .filter(records::Column::PurchaseId.eq(purchase_id))
            .filter(records::Column::Status.eq(AuditStatus::Completed))
            .one(&self.pool)
            .await
    }

    /// 在结算事务内追加一条 completed 记录
    #[allow(clippy::too_many_arguments)]
    pub async fn record_completed(
        &self,
        txn: &DatabaseTransaction,
        purchase_id: &str,
        account_id: i64,
        items_json: String,
        per_unit_draw_json: String,
        total_debited_cents: i64,
        total_won_cents: i64,
        balance_before_cents: i64,
        balance_after_cents: i64,
    ) -> Result<records::Model, DbErr> {
        records::ActiveModel {
            purchase_id: Set(purchase_id.to_string()),
            account_id: Set(account_id),
            items: Set(items_json),
            per_unit_draw: Set(per_unit_draw_json),
            total_debited_cents: Set(total_debited_cents),
            total_won_cents: Set(total_won_cents),
            balance_before_cents: Set(balance_before_cents),
            balance_after_cents: Set(balance_after_cents),
            status: Set(AuditStatus::Completed),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(txn)
        .await
    }

    /// 失败留痕: 独立于结算事务的尽力而为写入, 自身失败只记日志,
    /// 永远不能阻断原始错误的传播。error 记录不伴随任何账务变动,
    /// 也不占用幂等键。
    pub async fn record_error(
        &self,
        purchase_id: &str,
        account_id: i64,
        items_json: String,
        per_unit_draw_json: String,
        message: &str,
    ) {
        let result = records::ActiveModel {
            purchase_id: Set(purchase_id.to_string()),
            account_id: Set(account_id),
            items: Set(items_json),
            per_unit_draw: Set(per_unit_draw_json),
            status: Set(AuditStatus::Error),
            error_message: Set(Some(message.chars().take(1000).collect())),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await;
        if let Err(e) = result {
            log::error!("Failed to write error audit record for purchase {purchase_id}: {e}");
        }
    }

    pub async fn get_record(&self, purchase_id: &str) -> AppResult<AuditRecordResponse> {
        let model = records::Entity::find()
            .filter(records::Column::PurchaseId.eq(purchase_id))
            .order_by_desc(records::Column::Id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Audit record {purchase_id} not found"))
            })?;
        Ok(model.into())
    }

    /// 审计记录列表 (按账户/状态/时间窗过滤, 分页, 倒序)
    pub async fn list_records(
        &self,
        query: &AuditRecordQuery,
    ) -> AppResult<PaginatedResponse<AuditRecordResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query = records::Entity::find();
        if let Some(account_id) = query.account_id {
            base_query = base_query.filter(records::Column::AccountId.eq(account_id));
        }
        if let Some(status) = query.status {
            base_query = base_query.filter(records::Column::Status.eq(status));
        }
        if let Some(start) = query.start {
            base_query = base_query.filter(records::Column::CreatedAt.gte(start));
        }
        if let Some(end) = query.end {
            base_query = base_query.filter(records::Column::CreatedAt.lt(end));
        }

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(records::Column::CreatedAt, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<AuditRecordResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }

    /// 对账扫描: 对窗口内每条 completed 记录, 用其自身存储的明细重新
    /// 计算应有的金额并与存储值比对。只读, 绝不修改账务状态 ——
    /// 更正是另外的人工触发操作。
    pub async fn run_discrepancy_scan(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<DiscrepancyReport> {
        if end <= start {
            return Err(AppError::ValidationError(
                "Scan window end must be after start".to_string(),
            ));
        }

        let completed = records::Entity::find()
            .filter(records::Column::Status.eq(AuditStatus::Completed))
            .filter(records::Column::CreatedAt.gte(start))
            .filter(records::Column::CreatedAt.lt(end))
            .order_by_asc(records::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let scanned = completed.len() as u64;
        let mut findings = Vec::new();
        for record in &completed {
            let reasons = verify_record(record);
            if !reasons.is_empty() {
                log::warn!(
                    "Discrepancy on purchase {}: {}",
                    record.purchase_id,
                    reasons.join("; ")
                );
                findings.push(DiscrepancyFinding {
                    purchase_id: record.purchase_id.clone(),
                    account_id: record.account_id,
                    reasons,
                });
            }
        }

        Ok(DiscrepancyReport {
            window_start: start,
            window_end: end,
            scanned,
            flagged_count: findings.len() as u64,
            findings,
        })
    }
}

/// 单条记录的对账核验: 返回不一致原因列表 (空 = 一致)。
/// 纯函数, 只依赖记录自身存储的内容。
pub fn verify_record(record: &records::Model) -> Vec<String> {
    let mut reasons = Vec::new();

    let items: Vec<PurchasedItem> = match serde_json::from_str(&record.items) {
        Ok(v) => v,
        Err(e) => {
            reasons.push(format!("items payload does not parse: {e}"));
            return reasons;
        }
    };
    let draws: Vec<UnitDraw> = match serde_json::from_str(&record.per_unit_draw) {
        Ok(v) => v,
        Err(e) => {
            reasons.push(format!("per_unit_draw payload does not parse: {e}"));
            return reasons;
        }
    };

    let expected_debited: i64 = items
        .iter()
        .map(|i| i.unit_price_cents * i.quantity as i64)
        .sum();
    let expected_units: u64 = items.iter().map(|i| i.quantity as u64).sum();
    let expected_won: i64 = draws.iter().map(|d| d.value_cents).sum();

    if (record.total_debited_cents - expected_debited).abs() >= EPSILON_CENTS {
        reasons.push(format!(
            "stored total_debited {} != {} recomputed from items",
            record.total_debited_cents, expected_debited
        ));
    }
    if draws.len() as u64 != expected_units {
        reasons.push(format!(
            "{} per-unit draws recorded for {} purchased units",
            draws.len(),
            expected_units
        ));
    }
    if (record.total_won_cents - expected_won).abs() >= EPSILON_CENTS {
        reasons.push(format!(
            "stored total_won {} != {} recomputed from per-unit draws",
            record.total_won_cents, expected_won
        ));
    }
    let expected_after =
        record.balance_before_cents - record.total_debited_cents + record.total_won_cents;
    if (record.balance_after_cents - expected_after).abs() >= EPSILON_CENTS {
        reasons.push(format!(
            "balance_after {} != before - debited + won = {}",
            record.balance_after_cents, expected_after
        ));
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed_record() -> records::Model {
        let items = vec![PurchasedItem {
            box_id: 1,
            box_name: "Starter Case".to_string(),
            unit_price_cents: 200,
            quantity: 2,
            line_cost_cents: 400,
        }];
        let draws = vec![
            UnitDraw {
                box_id: 1,
                prize_id: 10,
                prize_name: "Sticker Pack".to_string(),
                value_cents: 50,
            },
            UnitDraw {
                box_id: 1,
                prize_id: 11,
                prize_name: "Keychain".to_string(),
                value_cents: 150,
            },
        ];
        records::Model {
            id: 1,
            purchase_id: "7a4c8e1a-0000-0000-0000-000000000001".to_string(),
            account_id: 42,
            items: serde_json::to_string(&items).unwrap(),
            per_unit_draw: serde_json::to_string(&draws).unwrap(),
            total_debited_cents: 400,
            total_won_cents: 200,
            balance_before_cents: 1000,
            balance_after_cents: 800,
            status: AuditStatus::Completed,
            error_message: None,
            created_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_untampered_record_passes() {
        let record = completed_record();
        assert!(verify_record(&record).is_empty());
    }

    #[test]
    fn test_tampered_total_won_is_flagged() {
        let mut record = completed_record();
        record.total_won_cents += 100;
        let reasons = verify_record(&record);
        assert!(reasons.iter().any(|r| r.contains("total_won")));
    }

    #[test]
    fn test_tampered_balance_after_is_flagged() {
        let mut record = completed_record();
        record.balance_after_cents += 1;
        let reasons = verify_record(&record);
        assert!(reasons.iter().any(|r| r.contains("balance_after")));
    }

    #[test]
    fn test_missing_draw_detail_is_flagged() {
        let mut record = completed_record();
        record.per_unit_draw = "[]".to_string();
        let reasons = verify_record(&record);
        assert!(reasons.iter().any(|r| r.contains("per-unit draws")));
    }

    #[test]
    fn test_corrupt_payload_is_flagged() {
        let mut record = completed_record();
        record.items = "not json".to_string();
        let reasons = verify_record(&record);
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].contains("does not parse"));
    }
}
