use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{
    DrawSessionState, LedgerEntryKind, draw_session_entity as sessions, prize_entity as prizes,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    LegacyCreditResponse, LegacyDebitResponse, LegacyDrawResponse, LegacyWonPrize, PrizeResponse,
};
use crate::services::{CatalogService, LedgerService, draw_engine};

/// 旧版单盒购买的两阶段兼容路径: debit -> draw -> credit 三次往返,
/// 服务端状态存于 draw_sessions (每个账户+盲盒一条)。
///
/// 已知结构性缺陷: debit 与 draw 之间没有把两次往返绑定到同一笔购买
/// 的事务标识, 在 draw 之前重复调用 debit 会重复扣款。兼容性测试依赖
/// 这一确切行为, 必须原样保留; 新接入方一律使用批量购买路径
/// (PurchaseService), 那是修正后的设计。
#[derive(Clone)]
pub struct LegacyPurchaseService {
    pool: DatabaseConnection,
    catalog: CatalogService,
    ledger: LedgerService,
}

impl LegacyPurchaseService {
    pub fn new(pool: DatabaseConnection, catalog: CatalogService, ledger: LedgerService) -> Self {
        Self {
            pool,
            catalog,
            ledger,
        }
    }

    /// Idle -> Debited: 校验余额, 立即扣款并写流水, 返回奖品表但不抽奖。
    /// 注意: 重复调用会再次扣款 (见类型注释)。
    pub async fn debit(&self, account_id: i64, box_id: i64) -> AppResult<LegacyDebitResponse> {
        let box_model = self.catalog.get_box(box_id).await?;
        if !box_model.is_active {
            return Err(AppError::ValidationError(format!(
                "Box {box_id} is not active"
            )));
        }
        // 奖品表在扣款前解析, 配置错误不应扣钱
        let mode_hint = self.ledger.get_account(account_id).await?.account_mode;
        let prize_table = self.catalog.get_prize_table(box_id, mode_hint).await?;

        let txn = self
            .pool
            .begin()
            .await
            .map_err(AppError::from_txn_db_err)?;

        let account = self
            .ledger
            .get_account_for_update(&txn, account_id)
            .await
            .map_err(AppError::from_txn_db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Account {account_id} not found")))?;
        if !account.is_active {
            return Err(AppError::ValidationError(format!(
                "Account {account_id} is not active"
            )));
        }
        let mode = account.account_mode;
        let balance_before = account.balance_for(mode);
        if balance_before < box_model.price_cents {
            return Err(AppError::InsufficientFunds(format!(
                "Balance {balance_before} cents is less than box price {} cents",
                box_model.price_cents
            )));
        }

        let debited = self
            .ledger
            .adjust_balance(&txn, account_id, mode, -box_model.price_cents)
            .await
            .map_err(AppError::from_txn_db_err)?;
        if !debited {
            return Err(AppError::InsufficientFunds(format!(
                "Debit of {} cents rejected for account {account_id}",
                box_model.price_cents
            )));
        }
        let balance_after = balance_before - box_model.price_cents;
        self.ledger
            .insert_entry(
                &txn,
                account_id,
                LedgerEntryKind::Debit,
                box_model.price_cents,
                balance_before,
                balance_after,
                format!("legacy debit: box {} ({})", box_model.id, box_model.name),
            )
            .await
            .map_err(AppError::from_txn_db_err)?;

        self.upsert_session(&txn, account_id, box_id)
            .await
            .map_err(AppError::from_txn_db_err)?;

        txn.commit().await.map_err(AppError::from_txn_db_err)?;

        Ok(LegacyDebitResponse {
            box_info: box_model.into(),
            prize_table: prize_table.into_iter().map(PrizeResponse::from).collect(),
            balance_cents: balance_after,
        })
    }

    /// Debited -> Drawn: 抽奖并返回奖品, 但不入账 —— 这个拆分让前端可以
    /// 先做开盒展示再入账。
    pub async fn draw(&self, account_id: i64, box_id: i64) -> AppResult<LegacyDrawResponse> {
        let txn = self
            .pool
            .begin()
            .await
            .map_err(AppError::from_txn_db_err)?;

        let session = sessions::Entity::find()
            .filter(sessions::Column::AccountId.eq(account_id))
            .filter(sessions::Column::BoxId.eq(box_id))
            .one(&txn)
            .await
            .map_err(AppError::from_txn_db_err)?
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "No pending purchase for account {account_id} and box {box_id}; call debit first"
                ))
            })?;
        if session.state != DrawSessionState::Debited {
            return Err(AppError::ValidationError(format!(
                "Cannot draw in state '{}'",
                session.state
            )));
        }

        let account = self.ledger.get_account(account_id).await?;
        let table = self
            .catalog
            .get_prize_table(box_id, account.account_mode)
            .await?;
        let prize = draw_engine::draw(&table)?.clone();

        let mut am = session.into_active_model();
        am.state = Set(DrawSessionState::Drawn);
        am.prize_id = Set(Some(prize.id));
        am.updated_at = Set(Some(Utc::now()));
        am.update(&txn).await.map_err(AppError::from_txn_db_err)?;

        txn.commit().await.map_err(AppError::from_txn_db_err)?;

        Ok(LegacyDrawResponse {
            prize: LegacyWonPrize::from(prize),
        })
    }

    /// Drawn -> Credited: 入账金额一律按 prize_id 从目录查出, 调用方声明
    /// 的金额永不采信。prize_id 不是已知的可抽取奖品时, 调用成功但余额
    /// 零变动 (仅展示奖品无可入账金额), 伪造金额因此无效。
    pub async fn credit(
        &self,
        account_id: i64,
        prize_id: i64,
        declared_value_cents: Option<i64>,
    ) -> AppResult<LegacyCreditResponse> {
        let txn = self
            .pool
            .begin()
            .await
            .map_err(AppError::from_txn_db_err)?;

        let account = self
            .ledger
            .get_account_for_update(&txn, account_id)
            .await
            .map_err(AppError::from_txn_db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Account {account_id} not found")))?;

        let session = sessions::Entity::find()
            .filter(sessions::Column::AccountId.eq(account_id))
            .filter(sessions::Column::State.eq(DrawSessionState::Drawn))
            .order_by_desc(sessions::Column::UpdatedAt)
            .one(&txn)
            .await
            .map_err(AppError::from_txn_db_err)?
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "No drawn prize awaiting credit for account {account_id}"
                ))
            })?;
        if session.prize_id != Some(prize_id) {
            log::warn!(
                "Credit prize id {prize_id} differs from drawn prize {:?} for account {account_id}",
                session.prize_id
            );
        }

        let credited_cents = creditable_value(self.catalog.find_prize(prize_id).await?.as_ref());
        if let Some(declared) = declared_value_cents
            && declared != credited_cents
        {
            log::warn!(
                "Declared credit value {declared} ignored for prize {prize_id}; catalog value is {credited_cents}"
            );
        }

        let mode = account.account_mode;
        let balance_before = account.balance_for(mode);
        let balance_after = balance_before + credited_cents;
        if credited_cents > 0 {
            let credited = self
                .ledger
                .adjust_balance(&txn, account_id, mode, credited_cents)
                .await
                .map_err(AppError::from_txn_db_err)?;
            if !credited {
                return Err(AppError::InternalError(format!(
                    "Credit of {credited_cents} cents rejected for account {account_id}"
                )));
            }
            self.ledger
                .insert_entry(
                    &txn,
                    account_id,
                    LedgerEntryKind::Credit,
                    credited_cents,
                    balance_before,
                    balance_after,
                    format!("legacy credit: prize {prize_id}"),
                )
                .await
                .map_err(AppError::from_txn_db_err)?;
        }

        let mut am = session.into_active_model();
        am.state = Set(DrawSessionState::Credited);
        am.updated_at = Set(Some(Utc::now()));
        am.update(&txn).await.map_err(AppError::from_txn_db_err)?;

        txn.commit().await.map_err(AppError::from_txn_db_err)?;

        Ok(LegacyCreditResponse {
            credited_cents,
            balance_cents: balance_after,
        })
    }

    /// 会话写入: 存在则重置为 Debited (清掉上一轮的奖品), 否则新建。
    /// 覆盖而不是拒绝, 正是旧流程双重扣款缺陷的载体。
    async fn upsert_session(
        &self,
        txn: &DatabaseTransaction,
        account_id: i64,
        box_id: i64,
    ) -> Result<sessions::Model, DbErr> {
        if let Some(existing) = sessions::Entity::find()
            .filter(sessions::Column::AccountId.eq(account_id))
            .filter(sessions::Column::BoxId.eq(box_id))
            .one(txn)
            .await?
        {
            let mut am = existing.into_active_model();
            am.state = Set(DrawSessionState::Debited);
            am.prize_id = Set(None);
            am.updated_at = Set(Some(Utc::now()));
            return am.update(txn).await;
        }
        sessions::ActiveModel {
            account_id: Set(account_id),
            box_id: Set(box_id),
            state: Set(DrawSessionState::Debited),
            prize_id: Set(None),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(txn)
        .await
    }
}

/// 可入账金额: 只有目录中已知、启用且可抽取的奖品才有入账价值;
/// 其余 (未知 id, 下架, 仅展示) 一律为 0
fn creditable_value(prize: Option<&prizes::Model>) -> i64 {
    match prize {
        Some(p) if p.is_active && p.is_drawable => p.value_cents,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::AccountMode;

    fn prize(value_cents: i64, is_drawable: bool, is_active: bool) -> prizes::Model {
        prizes::Model {
            id: 1,
            box_id: 1,
            mode: AccountMode::Real,
            name: "Gold Trophy".to_string(),
            value_cents,
            weight: 0.0,
            is_drawable,
            is_active,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_drawable_prize_credits_catalog_value() {
        let p = prize(2000, true, true);
        assert_eq!(creditable_value(Some(&p)), 2000);
    }

    // 仅展示奖品: credit 成功但余额零变动
    #[test]
    fn test_illustrative_prize_credits_zero() {
        let p = prize(250_000, false, true);
        assert_eq!(creditable_value(Some(&p)), 0);
    }

    #[test]
    fn test_inactive_prize_credits_zero() {
        let p = prize(2000, true, false);
        assert_eq!(creditable_value(Some(&p)), 0);
    }

    #[test]
    fn test_unknown_prize_credits_zero() {
        assert_eq!(creditable_value(None), 0);
    }
}
