use crate::models::*;
use crate::services::LegacyPurchaseService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/legacy/debit",
    tag = "legacy",
    request_body = LegacyDebitRequest,
    responses(
        (status = 200, description = "扣款成功, 返回奖品表 (未抽奖)", body = LegacyDebitResponse),
        (status = 402, description = "余额不足"),
        (status = 404, description = "账户或盲盒不存在")
    )
)]
/// 旧版流程第一步: 立即扣款。与 draw 之间没有事务标识绑定,
/// 重复调用会重复扣款 —— 兼容性保留的历史行为, 新接入请使用 /purchases。
pub async fn debit(
    service: web::Data<LegacyPurchaseService>,
    body: web::Json<LegacyDebitRequest>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    match service.debit(req.account_id, req.box_id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": resp }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/legacy/draw",
    tag = "legacy",
    request_body = LegacyDrawRequest,
    responses(
        (status = 200, description = "抽奖成功 (尚未入账)", body = LegacyDrawResponse),
        (status = 400, description = "状态机不允许 (需先 debit)")
    )
)]
/// 旧版流程第二步: 抽奖但不入账, 供前端先做开盒展示
pub async fn draw(
    service: web::Data<LegacyPurchaseService>,
    body: web::Json<LegacyDrawRequest>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    match service.draw(req.account_id, req.box_id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": resp }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/legacy/credit",
    tag = "legacy",
    request_body = LegacyCreditRequest,
    responses(
        (status = 200, description = "入账完成 (未知/仅展示奖品为零变动)", body = LegacyCreditResponse),
        (status = 400, description = "状态机不允许 (需先 draw)")
    )
)]
/// 旧版流程第三步: 按目录价值入账; 调用方声明的金额永不采信
pub async fn credit(
    service: web::Data<LegacyPurchaseService>,
    body: web::Json<LegacyCreditRequest>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    match service
        .credit(req.account_id, req.prize_id, req.declared_value_cents)
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": resp }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn legacy_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/legacy")
            .route("/debit", web::post().to(debit))
            .route("/draw", web::post().to(draw))
            .route("/credit", web::post().to(credit)),
    );
}
