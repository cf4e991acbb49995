use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 账户模式: real = 真实余额, demo = 体验余额。
/// 两个余额是同一行上的两个独立字段, 只会被各自模式的操作触碰。
#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_mode")]
#[serde(rename_all = "snake_case")]
pub enum AccountMode {
    #[sea_orm(string_value = "real")]
    Real,
    #[sea_orm(string_value = "demo")]
    Demo,
}

impl std::fmt::Display for AccountMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountMode::Real => write!(f, "real"),
            AccountMode::Demo => write!(f, "demo"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub display_name: String,
    /// 真实余额(美分)
    pub real_balance_cents: i64,
    /// 体验余额(美分)
    pub demo_balance_cents: i64,
    pub account_mode: AccountMode,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 当前模式对应的余额
    pub fn balance_for(&self, mode: AccountMode) -> i64 {
        match mode {
            AccountMode::Real => self.real_balance_cents,
            AccountMode::Demo => self.demo_balance_cents,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
