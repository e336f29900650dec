//! Plumbing endpoints with no business logic.
//!
//! ```text
//! POST /api/v1/webhook   echoes the JSON body
//! GET  /api/v1/callback  "App authorized!"
//! GET  /api/v1/ping      {"message":"pong"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use utoipa::ToSchema;

/// Arbitrary JSON delivered to the webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct WebhookPayload(pub Value);

/// Body of `GET /api/v1/ping`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PingResponse {
    #[schema(example = "pong")]
    pub message: String,
}

/// Echo a webhook delivery back to the sender.
#[utoipa::path(
    post,
    path = "/api/v1/webhook",
    request_body = WebhookPayload,
    responses((status = 200, description = "The received payload", body = WebhookPayload)),
    tags = ["plumbing"],
    operation_id = "webhook"
)]
#[post("/webhook")]
pub async fn webhook(payload: web::Json<WebhookPayload>) -> web::Json<WebhookPayload> {
    let payload = payload.into_inner();
    let action = payload.0.get("action").and_then(Value::as_str).unwrap_or("none");
    info!(action, "webhook received");
    web::Json(payload)
}

/// OAuth-style install callback.
#[utoipa::path(
    get,
    path = "/api/v1/callback",
    responses((status = 200, description = "Authorisation acknowledged", body = String)),
    tags = ["plumbing"],
    operation_id = "callback"
)]
#[get("/callback")]
pub async fn callback() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("App authorized!")
}

/// Liveness check for API clients.
#[utoipa::path(
    get,
    path = "/api/v1/ping",
    responses((status = 200, description = "Pong", body = PingResponse)),
    tags = ["plumbing"],
    operation_id = "ping"
)]
#[get("/ping")]
pub async fn ping() -> web::Json<PingResponse> {
    web::Json(PingResponse {
        message: "pong".to_owned(),
    })
}
