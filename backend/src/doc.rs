//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer together
//! with the request and response schemas. The document backs Swagger UI in
//! debug builds and is exported by `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::accounts::CreateAccountRequest;
use crate::inbound::http::misc::{PingResponse, WebhookPayload};
use crate::inbound::http::schemas::{
    LedgerAccountView, OrphanReportResponse, OrphanView, UserProfileResponse, UserView,
};
use crate::inbound::http::users::CreateUserRequest;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Karma backend API",
        description = "Identity provisioning joined with ledger accounts, plus operator reads.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::accounts::get_account,
        crate::inbound::http::accounts::create_account,
        crate::inbound::http::admin::list_orphans,
        crate::inbound::http::misc::webhook,
        crate::inbound::http::misc::callback,
        crate::inbound::http::misc::ping,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CreateUserRequest,
        CreateAccountRequest,
        UserView,
        LedgerAccountView,
        UserProfileResponse,
        OrphanView,
        OrphanReportResponse,
        WebhookPayload,
        PingResponse,
    )),
    tags(
        (name = "users", description = "Identity provisioning and profile reads"),
        (name = "accounts", description = "Direct ledger account access"),
        (name = "admin", description = "Operator reconciliation reads"),
        (name = "plumbing", description = "Webhook and connectivity endpoints"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
