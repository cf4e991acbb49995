use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::{AccountMode, box_entity as boxes, prize_entity as prizes};
use crate::error::{AppError, AppResult};
use crate::models::{BoxResponse, PrizeResponse};

/// 目录提供方: 盲盒与奖品表的唯一读取入口。
/// 同一个盲盒在 real/demo 模式下的奖品表彼此独立
/// (demo 表刻意调高期望回报用于体验展示)。
#[derive(Clone)]
pub struct CatalogService {
    pool: DatabaseConnection,
}

impl CatalogService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_box(&self, box_id: i64) -> AppResult<boxes::Model> {
        boxes::Entity::find_by_id(box_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Box {box_id} not found")))
    }

    /// 抽奖用的奖品表: 仅启用且可抽取的奖品, 按 id 升序。
    /// 空表或总权重不为正是配置错误, 不是抽奖结果。
    pub async fn get_prize_table(
        &self,
        box_id: i64,
        mode: AccountMode,
    ) -> AppResult<Vec<prizes::Model>> {
        let table = prizes::Entity::find()
            .filter(prizes::Column::BoxId.eq(box_id))
            .filter(prizes::Column::Mode.eq(mode))
            .filter(prizes::Column::IsActive.eq(true))
            .filter(prizes::Column::IsDrawable.eq(true))
            .order_by_asc(prizes::Column::Id)
            .all(&self.pool)
            .await?;

        if table.is_empty() {
            return Err(AppError::ConfigurationError(format!(
                "Box {box_id} has no active drawable prizes in {mode} mode"
            )));
        }
        let total: f64 = table.iter().map(|p| p.weight).sum();
        if total <= 0.0 {
            return Err(AppError::ConfigurationError(format!(
                "Box {box_id} prize table has non-positive total weight in {mode} mode"
            )));
        }
        Ok(table)
    }

    /// 按 id 查单个奖品 (旧版 credit 流程用; 未知 id 不是错误)
    pub async fn find_prize(&self, prize_id: i64) -> AppResult<Option<prizes::Model>> {
        Ok(prizes::Entity::find_by_id(prize_id).one(&self.pool).await?)
    }

    pub async fn list_boxes(&self) -> AppResult<Vec<BoxResponse>> {
        let list = boxes::Entity::find()
            .filter(boxes::Column::IsActive.eq(true))
            .order_by_asc(boxes::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 展示用奖品列表: 包含仅橱窗展示 (is_drawable = false) 的奖品
    pub async fn list_prizes(
        &self,
        box_id: i64,
        mode: AccountMode,
    ) -> AppResult<Vec<PrizeResponse>> {
        // 盲盒必须存在, 否则 404
        self.get_box(box_id).await?;
        let list = prizes::Entity::find()
            .filter(prizes::Column::BoxId.eq(box_id))
            .filter(prizes::Column::Mode.eq(mode))
            .filter(prizes::Column::IsActive.eq(true))
            .order_by_asc(prizes::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }
}
