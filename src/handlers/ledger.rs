use crate::models::*;
use crate::services::LedgerService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/accounts/{account_id}/ledger",
    tag = "ledger",
    params(
        ("account_id" = i64, Path, description = "账户ID"),
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    responses(
        (status = 200, description = "获取流水成功", body = PaginatedResponse<LedgerEntryResponse>),
        (status = 404, description = "账户不存在")
    )
)]
/// 账户余额流水 (分页, 倒序)
pub async fn list_ledger_entries(
    service: web::Data<LedgerService>,
    path: web::Path<i64>,
    query: web::Query<LedgerEntryQuery>,
) -> Result<HttpResponse> {
    match service
        .list_entries(path.into_inner(), &query.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn ledger_config(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/accounts/{account_id}/ledger",
        web::get().to(list_ledger_entries),
    );
}
