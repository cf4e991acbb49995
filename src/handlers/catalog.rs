use crate::entities::AccountMode;
use crate::models::*;
use crate::services::CatalogService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/boxes",
    tag = "catalog",
    responses(
        (status = 200, description = "获取盲盒列表成功", body = [BoxResponse])
    )
)]
/// 获取当前上架的盲盒列表
pub async fn list_boxes(service: web::Data<CatalogService>) -> Result<HttpResponse> {
    match service.list_boxes().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/boxes/{box_id}",
    tag = "catalog",
    params(
        ("box_id" = i64, Path, description = "盲盒ID")
    ),
    responses(
        (status = 200, description = "获取盲盒成功", body = BoxResponse),
        (status = 404, description = "盲盒不存在")
    )
)]
pub async fn get_box(
    service: web::Data<CatalogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.get_box(path.into_inner()).await {
        Ok(b) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": BoxResponse::from(b) }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/boxes/{box_id}/prizes",
    tag = "catalog",
    params(
        ("box_id" = i64, Path, description = "盲盒ID"),
        ("mode" = Option<AccountMode>, Query, description = "real / demo (默认 real)")
    ),
    responses(
        (status = 200, description = "获取奖品列表成功 (含仅展示奖品)", body = [PrizeResponse]),
        (status = 404, description = "盲盒不存在")
    )
)]
/// 获取某个盲盒在指定模式下的奖品列表 (含 is_drawable = false 的橱窗奖品)
pub async fn list_prizes(
    service: web::Data<CatalogService>,
    path: web::Path<i64>,
    query: web::Query<PrizeListQuery>,
) -> Result<HttpResponse> {
    let mode = query.mode.unwrap_or(AccountMode::Real);
    match service.list_prizes(path.into_inner(), mode).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn catalog_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/boxes")
            .route("", web::get().to(list_boxes))
            .route("/{box_id}", web::get().to(get_box))
            .route("/{box_id}/prizes", web::get().to(list_prizes)),
    );
}
