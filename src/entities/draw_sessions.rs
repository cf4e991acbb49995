use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 两阶段流程状态机: Debited -> Drawn -> Credited
/// (Idle 即不存在记录或上一轮已 Credited)
#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "draw_session_state")]
#[serde(rename_all = "snake_case")]
pub enum DrawSessionState {
    #[sea_orm(string_value = "debited")]
    Debited,
    #[sea_orm(string_value = "drawn")]
    Drawn,
    #[sea_orm(string_value = "credited")]
    Credited,
}

impl std::fmt::Display for DrawSessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawSessionState::Debited => write!(f, "debited"),
            DrawSessionState::Drawn => write!(f, "drawn"),
            DrawSessionState::Credited => write!(f, "credited"),
        }
    }
}

/// 旧版两阶段(扣款/抽奖/入账分离)流程的服务端状态,
/// 每个 (account_id, box_id) 一条记录
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "draw_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub account_id: i64,
    pub box_id: i64,
    pub state: DrawSessionState,
    pub prize_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
