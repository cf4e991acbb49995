use crate::models::*;
use crate::services::AuditService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/audits/{purchase_id}",
    tag = "audit",
    params(
        ("purchase_id" = String, Path, description = "购买幂等键 (UUID)")
    ),
    responses(
        (status = 200, description = "获取审计记录成功", body = AuditRecordResponse),
        (status = 404, description = "记录不存在")
    )
)]
pub async fn get_audit_record(
    service: web::Data<AuditService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match service.get_record(&path.into_inner()).await {
        Ok(record) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": record }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/audits",
    tag = "audit",
    params(
        ("account_id" = Option<i64>, Query, description = "按账户过滤"),
        ("status" = Option<String>, Query, description = "completed / error / flagged"),
        ("start" = Option<String>, Query, description = "起始时间 (RFC 3339, 含)"),
        ("end" = Option<String>, Query, description = "结束时间 (RFC 3339, 不含)"),
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    responses(
        (status = 200, description = "获取审计记录列表成功", body = PaginatedResponse<AuditRecordResponse>)
    )
)]
/// 审计记录列表 (分页, 倒序)
pub async fn list_audit_records(
    service: web::Data<AuditService>,
    query: web::Query<AuditRecordQuery>,
) -> Result<HttpResponse> {
    match service.list_records(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/audits/discrepancy-scan",
    tag = "audit",
    request_body = DiscrepancyScanRequest,
    responses(
        (status = 200, description = "对账扫描完成", body = DiscrepancyReport),
        (status = 400, description = "时间窗口非法")
    )
)]
/// 对时间窗口内的 completed 记录做只读对账扫描, 返回不一致项。
/// 不修改任何账务状态; 更正需要另行人工操作。
pub async fn run_discrepancy_scan(
    service: web::Data<AuditService>,
    body: web::Json<DiscrepancyScanRequest>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    match service.run_discrepancy_scan(req.start, req.end).await {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": report }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn audit_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/audits")
            .route("", web::get().to(list_audit_records))
            .route("/discrepancy-scan", web::post().to(run_discrepancy_scan))
            .route("/{purchase_id}", web::get().to(get_audit_record)),
    );
}
