//! Operator endpoints.
//!
//! ```text
//! GET /api/v1/admin/orphans?limit=50
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{DEFAULT_ORPHAN_LIMIT, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::deadline::within_deadline;
use crate::inbound::http::schemas::OrphanReportResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_optional_limit};

/// Query string for `GET /api/v1/admin/orphans`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct OrphanQuery {
    /// Most orphans to report (1 to 1000, default 100).
    #[param(value_type = Option<u32>)]
    pub limit: Option<String>,
}

/// List identities that have no ledger account.
///
/// Read-only: orphans are reported, never repaired.
#[utoipa::path(
    get,
    path = "/api/v1/admin/orphans",
    params(OrphanQuery),
    responses(
        (status = 200, description = "Orphan report", body = OrphanReportResponse),
        (status = 400, description = "Invalid limit", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listOrphans"
)]
#[get("/admin/orphans")]
pub async fn list_orphans(
    state: web::Data<HttpState>,
    query: web::Query<OrphanQuery>,
) -> ApiResult<web::Json<OrphanReportResponse>> {
    let limit = parse_optional_limit(query.limit.as_deref(), FieldName::new("limit"))?
        .unwrap_or(DEFAULT_ORPHAN_LIMIT);
    let report = within_deadline(
        state.request_timeout,
        "find_orphans",
        state.reconciliation.find_orphans(limit),
    )
    .await?;
    Ok(web::Json(OrphanReportResponse::from(&report)))
}
