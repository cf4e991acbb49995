use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{AccountMode, AuditStatus, LedgerEntryKind};
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::purchase::process_purchase,
        handlers::catalog::list_boxes,
        handlers::catalog::get_box,
        handlers::catalog::list_prizes,
        handlers::audit::get_audit_record,
        handlers::audit::list_audit_records,
        handlers::audit::run_discrepancy_scan,
        handlers::ledger::list_ledger_entries,
        handlers::legacy::debit,
        handlers::legacy::draw,
        handlers::legacy::credit,
    ),
    components(
        schemas(
            AccountMode,
            AuditStatus,
            LedgerEntryKind,
            BoxResponse,
            PrizeResponse,
            PurchaseLineItem,
            PurchaseRequest,
            PurchasedItem,
            UnitDraw,
            PurchaseResultResponse,
            AuditRecordResponse,
            DiscrepancyScanRequest,
            DiscrepancyFinding,
            DiscrepancyReport,
            LedgerEntryResponse,
            LegacyDebitRequest,
            LegacyDebitResponse,
            LegacyDrawRequest,
            LegacyDrawResponse,
            LegacyWonPrize,
            LegacyCreditRequest,
            LegacyCreditResponse,
            ApiError,
        )
    ),
    tags(
        (name = "purchase", description = "Atomic purchase API"),
        (name = "catalog", description = "Box and prize catalog API"),
        (name = "audit", description = "Audit record and discrepancy scan API"),
        (name = "ledger", description = "Account ledger API"),
        (name = "legacy", description = "Legacy two-phase purchase API"),
    ),
    info(
        title = "MysteryBox Backend API",
        version = "1.0.0",
        description = "MysteryBox Backend REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
