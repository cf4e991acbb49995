use std::time::Duration;

use sea_orm::{DatabaseConnection, SqlErr, TransactionTrait};
use uuid::Uuid;

use crate::entities::{AccountMode, LedgerEntryKind, audit_record_entity as records};
use crate::error::{AppError, AppResult};
use crate::models::{PurchaseLineItem, PurchaseRequest, PurchaseResultResponse, PurchasedItem, UnitDraw};
use crate::services::{AuditService, CatalogService, LedgerService, draw_engine};

/// 单次请求允许的最大行数
const MAX_LINE_ITEMS: usize = 50;
/// 每行允许的数量范围
const MIN_QUANTITY: u32 = 1;
const MAX_QUANTITY: u32 = 100;

/// 购买编排器: 批量购买的规范路径。
///
/// 抽奖阶段刻意放在任何存储事务之外, 避免在行锁内做大量独立抽取;
/// 只有最后的 读取-校验-扣款-入账-审计 序列包在一个事务里, 并对账户
/// 行加排他锁。失败要么整体回滚, 要么整体提交, 不存在可观察的半提交。
#[derive(Clone)]
pub struct PurchaseService {
    pool: DatabaseConnection,
    catalog: CatalogService,
    ledger: LedgerService,
    audit: AuditService,
    txn_timeout: Duration,
}

impl PurchaseService {
    pub fn new(
        pool: DatabaseConnection,
        catalog: CatalogService,
        ledger: LedgerService,
        audit: AuditService,
        txn_timeout_ms: u64,
    ) -> Self {
        Self {
            pool,
            catalog,
            ledger,
            audit,
            txn_timeout: Duration::from_millis(txn_timeout_ms),
        }
    }

    /// 处理一次批量购买。
    ///
    /// 1. 幂等检查: 同一 purchase_id 的 completed 记录直接回放
    /// 2. 校验与定价
    /// 3. 余额预检 (纯读取, 不足即失败, 无任何变动)
    /// 4. 抽奖阶段 (事务之外)
    /// 5. 原子结算: 行锁下复核余额, 扣款, 入账, 写流水与审计, 一次提交
    pub async fn process_purchase(
        &self,
        request: &PurchaseRequest,
    ) -> AppResult<PurchaseResultResponse> {
        Uuid::parse_str(&request.purchase_id).map_err(|_| {
            AppError::ValidationError(format!(
                "purchase_id '{}' is not a valid UUID",
                request.purchase_id
            ))
        })?;

        // 幂等回放: 重试与首次调用在可观察效果上不可区分
        if let Some(record) = self
            .audit
            .find_completed(&request.purchase_id)
            .await
            .map_err(AppError::DatabaseError)?
        {
            log::info!(
                "Replaying completed purchase {} for account {}",
                request.purchase_id,
                record.account_id
            );
            return replay_from_record(&record);
        }

        validate_items(&request.items)?;

        // 定价
        let mut purchased_items: Vec<PurchasedItem> = Vec::with_capacity(request.items.len());
        let mut total_cost: i64 = 0;
        for item in &request.items {
            let box_model = self.catalog.get_box(item.box_id).await?;
            if !box_model.is_active {
                return Err(AppError::ValidationError(format!(
                    "Box {} is not active",
                    item.box_id
                )));
            }
            let line_cost = line_cost(box_model.price_cents, item.quantity).ok_or_else(|| {
                AppError::ValidationError("Purchase total overflows".to_string())
            })?;
            total_cost = total_cost
                .checked_add(line_cost)
                .ok_or_else(|| AppError::ValidationError("Purchase total overflows".to_string()))?;
            purchased_items.push(PurchasedItem {
                box_id: box_model.id,
                box_name: box_model.name,
                unit_price_cents: box_model.price_cents,
                quantity: item.quantity,
                line_cost_cents: line_cost,
            });
        }

        // 余额预检 (失败时未发生任何变动)
        let account = self.ledger.get_account(request.account_id).await?;
        if !account.is_active {
            return Err(AppError::ValidationError(format!(
                "Account {} is not active",
                request.account_id
            )));
        }
        let mode = account.account_mode;
        ensure_funds(account.balance_for(mode), total_cost)?;

        // 抽奖阶段: 每个购买单位一次独立抽取, 全部在事务之外完成
        let mut unit_draws: Vec<UnitDraw> = Vec::new();
        let mut total_won: i64 = 0;
        for item in &request.items {
            let table = self.catalog.get_prize_table(item.box_id, mode).await?;
            for _ in 0..item.quantity {
                let prize = draw_engine::draw(&table)?;
                // 目录层已过滤橱窗奖品; 万一混入也绝不计入赢取金额
                let value_cents = if prize.is_drawable {
                    prize.value_cents
                } else {
                    log::warn!(
                        "Non-drawable prize {} surfaced in draw for box {}",
                        prize.id,
                        item.box_id
                    );
                    0
                };
                total_won += value_cents;
                unit_draws.push(UnitDraw {
                    box_id: item.box_id,
                    prize_id: prize.id,
                    prize_name: prize.name.clone(),
                    value_cents,
                });
            }
        }

        let items_json = serde_json::to_string(&purchased_items)?;
        let draws_json = serde_json::to_string(&unit_draws)?;

        // 原子结算, 时长有上界; 超时回滚并以可重试错误返回,
        // 调用方可用同一个 purchase_id 安全地重新提交
        let commit = self.commit_purchase(
            request,
            mode,
            total_cost,
            total_won,
            &items_json,
            &draws_json,
            unit_draws,
        );
        let result = match tokio::time::timeout(self.txn_timeout, commit).await {
            Ok(r) => r,
            Err(_) => Err(AppError::ConcurrencyError(format!(
                "Purchase transaction exceeded the {}ms bound and was rolled back",
                self.txn_timeout.as_millis()
            ))),
        };

        match result {
            Ok(response) => Ok(response),
            Err(err) => {
                // 结算阶段的失败已整体回滚; 留痕不能掩盖原始错误
                self.audit
                    .record_error(
                        &request.purchase_id,
                        request.account_id,
                        items_json,
                        draws_json,
                        &err.to_string(),
                    )
                    .await;
                Err(err)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn commit_purchase(
        &self,
        request: &PurchaseRequest,
        mode: AccountMode,
        total_cost: i64,
        total_won: i64,
        items_json: &str,
        draws_json: &str,
        unit_draws: Vec<UnitDraw>,
    ) -> AppResult<PurchaseResultResponse> {
        let txn = self
            .pool
            .begin()
            .await
            .map_err(AppError::from_txn_db_err)?;

        // 行锁下重读余额: 同一账户上的并发购买在这里串行化,
        // 消除读到过期余额导致的丢失更新
        let account = self
            .ledger
            .get_account_for_update(&txn, request.account_id)
            .await
            .map_err(AppError::from_txn_db_err)?
            .ok_or_else(|| {
                AppError::NotFound(format!("Account {} not found", request.account_id))
            })?;
        if !account.is_active {
            return Err(AppError::ValidationError(format!(
                "Account {} is not active",
                request.account_id
            )));
        }
        let balance_before = account.balance_for(mode);
        ensure_funds(balance_before, total_cost)?;

        let debited = self
            .ledger
            .adjust_balance(&txn, request.account_id, mode, -total_cost)
            .await
            .map_err(AppError::from_txn_db_err)?;
        if !debited {
            return Err(AppError::InsufficientFunds(format!(
                "Debit of {total_cost} cents rejected for account {}",
                request.account_id
            )));
        }
        let after_debit = balance_before - total_cost;
        self.ledger
            .insert_entry(
                &txn,
                request.account_id,
                LedgerEntryKind::Debit,
                total_cost,
                balance_before,
                after_debit,
                format!(
                    "purchase {}: {} unit(s) across {} line(s)",
                    request.purchase_id,
                    unit_draws.len(),
                    request.items.len()
                ),
            )
            .await
            .map_err(AppError::from_txn_db_err)?;

        let balance_after = after_debit + total_won;
        if total_won > 0 {
            let credited = self
                .ledger
                .adjust_balance(&txn, request.account_id, mode, total_won)
                .await
                .map_err(AppError::from_txn_db_err)?;
            if !credited {
                return Err(AppError::InternalError(format!(
                    "Credit of {total_won} cents rejected for account {}",
                    request.account_id
                )));
            }
            self.ledger
                .insert_entry(
                    &txn,
                    request.account_id,
                    LedgerEntryKind::Credit,
                    total_won,
                    after_debit,
                    balance_after,
                    format!("purchase {}: prize winnings", request.purchase_id),
                )
                .await
                .map_err(AppError::from_txn_db_err)?;
        }

        self.audit
            .record_completed(
                &txn,
                &request.purchase_id,
                request.account_id,
                items_json.to_string(),
                draws_json.to_string(),
                total_cost,
                total_won,
                balance_before,
                balance_after,
            )
            .await
            .map_err(|e| match e.sql_err() {
                // 部分唯一索引兜底: 并发重试已提交同一 purchase_id,
                // 让调用方重试走幂等回放
                Some(SqlErr::UniqueConstraintViolation(_)) => AppError::ConcurrencyError(format!(
                    "Purchase {} was committed concurrently; retry to replay the result",
                    request.purchase_id
                )),
                _ => AppError::from_txn_db_err(e),
            })?;

        txn.commit().await.map_err(AppError::from_txn_db_err)?;

        log::info!(
            "Purchase {} completed for account {}: debited {} cents, won {} cents",
            request.purchase_id,
            request.account_id,
            total_cost,
            total_won
        );

        Ok(PurchaseResultResponse {
            purchase_id: request.purchase_id.clone(),
            total_debited_cents: total_cost,
            total_won_cents: total_won,
            final_balance_cents: balance_after,
            per_unit_results: unit_draws,
        })
    }
}

/// 从已完成的审计记录回放结果 (与首次返回逐字段一致)
fn replay_from_record(record: &records::Model) -> AppResult<PurchaseResultResponse> {
    let per_unit_results: Vec<UnitDraw> = serde_json::from_str(&record.per_unit_draw)?;
    Ok(PurchaseResultResponse {
        purchase_id: record.purchase_id.clone(),
        total_debited_cents: record.total_debited_cents,
        total_won_cents: record.total_won_cents,
        final_balance_cents: record.balance_after_cents,
        per_unit_results,
    })
}

fn validate_items(items: &[PurchaseLineItem]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::ValidationError(
            "Purchase must contain at least one item".to_string(),
        ));
    }
    if items.len() > MAX_LINE_ITEMS {
        return Err(AppError::ValidationError(format!(
            "Purchase may contain at most {MAX_LINE_ITEMS} line items"
        )));
    }
    for item in items {
        if item.quantity < MIN_QUANTITY || item.quantity > MAX_QUANTITY {
            return Err(AppError::ValidationError(format!(
                "Quantity for box {} must be between {MIN_QUANTITY} and {MAX_QUANTITY}",
                item.box_id
            )));
        }
    }
    Ok(())
}

fn line_cost(unit_price_cents: i64, quantity: u32) -> Option<i64> {
    unit_price_cents.checked_mul(quantity as i64)
}

fn ensure_funds(balance_cents: i64, total_cost_cents: i64) -> AppResult<()> {
    if balance_cents < total_cost_cents {
        return Err(AppError::InsufficientFunds(format!(
            "Balance {balance_cents} cents is less than total cost {total_cost_cents} cents"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AuditStatus, account_entity as accounts};
    use chrono::Utc;

    #[test]
    fn test_empty_items_rejected() {
        let err = validate_items(&[]).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_quantity_bounds() {
        let ok = vec![PurchaseLineItem {
            box_id: 1,
            quantity: 100,
        }];
        assert!(validate_items(&ok).is_ok());

        let zero = vec![PurchaseLineItem {
            box_id: 1,
            quantity: 0,
        }];
        assert!(validate_items(&zero).is_err());

        let over = vec![PurchaseLineItem {
            box_id: 1,
            quantity: 101,
        }];
        assert!(validate_items(&over).is_err());
    }

    #[test]
    fn test_line_item_count_bound() {
        let items: Vec<PurchaseLineItem> = (0..51)
            .map(|i| PurchaseLineItem {
                box_id: i,
                quantity: 1,
            })
            .collect();
        assert!(validate_items(&items).is_err());
        assert!(validate_items(&items[..50]).is_ok());
    }

    // 余额 9.99, 花费 10.00 -> InsufficientFunds
    #[test]
    fn test_insufficient_funds_boundary() {
        let err = ensure_funds(999, 1000).unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds(_)));
        assert!(ensure_funds(1000, 1000).is_ok());
    }

    #[test]
    fn test_line_cost_overflow_detected() {
        assert_eq!(line_cost(200, 3), Some(600));
        assert_eq!(line_cost(i64::MAX, 2), None);
    }

    // 模式隔离: real 模式的结算只看 real 余额, demo 同理
    #[test]
    fn test_balance_selection_is_mode_isolated() {
        let account = accounts::Model {
            id: 1,
            display_name: "t".to_string(),
            real_balance_cents: 1000,
            demo_balance_cents: 500,
            account_mode: AccountMode::Real,
            is_active: true,
            created_at: None,
            updated_at: None,
        };
        assert_eq!(account.balance_for(AccountMode::Real), 1000);
        assert_eq!(account.balance_for(AccountMode::Demo), 500);
        assert!(ensure_funds(account.balance_for(AccountMode::Demo), 600).is_err());
        assert!(ensure_funds(account.balance_for(AccountMode::Real), 600).is_ok());
    }

    // 幂等回放: 同一条记录回放两次, 结果逐字段一致
    #[test]
    fn test_replay_is_deterministic() {
        let draws = vec![UnitDraw {
            box_id: 1,
            prize_id: 3,
            prize_name: "Keychain".to_string(),
            value_cents: 150,
        }];
        let record = records::Model {
            id: 9,
            purchase_id: "3b9f2e60-0000-0000-0000-00000000beef".to_string(),
            account_id: 7,
            items: "[]".to_string(),
            per_unit_draw: serde_json::to_string(&draws).unwrap(),
            total_debited_cents: 200,
            total_won_cents: 150,
            balance_before_cents: 1000,
            balance_after_cents: 950,
            status: AuditStatus::Completed,
            error_message: None,
            created_at: Some(Utc::now()),
        };
        let first = replay_from_record(&record).unwrap();
        let second = replay_from_record(&record).unwrap();
        assert_eq!(first.purchase_id, second.purchase_id);
        assert_eq!(first.total_debited_cents, second.total_debited_cents);
        assert_eq!(first.total_won_cents, second.total_won_cents);
        assert_eq!(first.final_balance_cents, second.final_balance_cents);
        assert_eq!(first.per_unit_results, second.per_unit_results);
        // 守恒: after = before - debited + won
        assert_eq!(
            record.balance_after_cents,
            record.balance_before_cents - first.total_debited_cents + first.total_won_cents
        );
    }
}
