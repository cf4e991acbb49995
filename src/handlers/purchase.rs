use crate::models::*;
use crate::services::PurchaseService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/purchases",
    tag = "purchase",
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "购买完成 (重试时回放首次结果)", body = PurchaseResultResponse),
        (status = 400, description = "请求校验失败"),
        (status = 402, description = "余额不足"),
        (status = 404, description = "账户或盲盒不存在"),
        (status = 409, description = "并发冲突, 可用同一 purchase_id 安全重试")
    )
)]
/// 批量购买并抽奖:
/// 1. purchase_id 为幂等键, 重复提交返回与首次一致的结果
/// 2. 每个购买单位独立抽取一次
/// 3. 扣款/入账/流水/审计在一个原子事务中提交
pub async fn process_purchase(
    service: web::Data<PurchaseService>,
    body: web::Json<PurchaseRequest>,
) -> Result<HttpResponse> {
    match service.process_purchase(&body.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn purchase_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/purchases", web::post().to(process_purchase));
}
