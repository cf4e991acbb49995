use super::accounts::AccountMode;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 奖品配置实体
/// 概念说明:
/// - weight: 相对权重, 抽奖时按奖品表总权重归一化, 总和不要求等于 1.0
/// - is_drawable: FALSE 表示仅橱窗展示 (illustrative), 永远不会被抽中
/// - value_cents: 奖品价值(美分), "谢谢参与"类为 0
/// - mode: 同一个盲盒在 real/demo 两种模式下各有独立奖品表
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub box_id: i64,
    pub mode: AccountMode,
    pub name: String,
    /// 奖品价值(美分)
    pub value_cents: i64,
    /// 相对权重
    pub weight: f64,
    /// 是否可被抽中 (FALSE = 仅展示)
    pub is_drawable: bool,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
