use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{
    AccountMode, LedgerEntryKind, account_entity as accounts, ledger_entry_entity as entries,
};
use crate::error::{AppError, AppResult};
use crate::models::{LedgerEntryQuery, LedgerEntryResponse, PaginatedResponse, PaginationParams};

/// 账本存储接口: 账户行的加锁读取与原子余额调整。
/// real/demo 两个余额在同一行上, 共享该行的行锁 —— 同一账户上的
/// 混合模式操作会串行化, 用少量并行度换取简单的正确性推理。
#[derive(Clone)]
pub struct LedgerService {
    pool: DatabaseConnection,
}

impl LedgerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 普通读取 (无锁)
    pub async fn get_account(&self, account_id: i64) -> AppResult<accounts::Model> {
        accounts::Entity::find_by_id(account_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account {account_id} not found")))
    }

    /// 行锁读取 (SELECT ... FOR UPDATE)。
    /// 同一账户上的并发购买在这把锁上串行; 不同账户互不影响。
    pub async fn get_account_for_update(
        &self,
        txn: &DatabaseTransaction,
        account_id: i64,
    ) -> Result<Option<accounts::Model>, DbErr> {
        accounts::Entity::find_by_id(account_id)
            .lock_exclusive()
            .one(txn)
            .await
    }

    /// 原子余额调整: 单条 UPDATE, 以 balance + delta >= 0 作为守护条件,
    /// 结果为负时拒绝 (rows_affected == 0)。
    pub async fn adjust_balance(
        &self,
        txn: &DatabaseTransaction,
        account_id: i64,
        mode: AccountMode,
        delta_cents: i64,
    ) -> Result<bool, DbErr> {
        let column = match mode {
            AccountMode::Real => accounts::Column::RealBalanceCents,
            AccountMode::Demo => accounts::Column::DemoBalanceCents,
        };
        let result = accounts::Entity::update_many()
            .col_expr(column, Expr::col(column).add(delta_cents))
            .col_expr(
                accounts::Column::UpdatedAt,
                Expr::current_timestamp().into(),
            )
            .filter(accounts::Column::Id.eq(account_id))
            .filter(Expr::expr(Expr::col(column).add(delta_cents)).gte(0i64))
            .exec(txn)
            .await?;
        Ok(result.rows_affected == 1)
    }

    /// 追加一条流水 (创建后永不修改)
    pub async fn insert_entry(
        &self,
        txn: &DatabaseTransaction,
        account_id: i64,
        kind: LedgerEntryKind,
        amount_cents: i64,
        balance_before_cents: i64,
        balance_after_cents: i64,
        description: String,
    ) -> Result<entries::Model, DbErr> {
        entries::ActiveModel {
            account_id: Set(account_id),
            kind: Set(kind),
            amount_cents: Set(amount_cents),
            balance_before_cents: Set(balance_before_cents),
            balance_after_cents: Set(balance_after_cents),
            description: Set(Some(description)),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(txn)
        .await
    }

    /// 账户流水 (分页, 倒序)
    pub async fn list_entries(
        &self,
        account_id: i64,
        query: &LedgerEntryQuery,
    ) -> AppResult<PaginatedResponse<LedgerEntryResponse>> {
        // 账户必须存在, 否则 404
        self.get_account(account_id).await?;

        let params = PaginationParams::new(query.page, query.per_page);
        let base_query = entries::Entity::find().filter(entries::Column::AccountId.eq(account_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by_desc(entries::Column::CreatedAt)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<LedgerEntryResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }
}
