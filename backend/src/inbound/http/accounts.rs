//! Ledger account administration handlers.
//!
//! ```text
//! GET /api/v1/accounts/6512131979280412370
//! POST /api/v1/accounts {"id":"6512131979280412370"}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::deadline::within_deadline;
use crate::inbound::http::schemas::LedgerAccountView;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_account_id};

const ID_FIELD: FieldName = FieldName::new("id");

/// Body for `POST /api/v1/accounts`.
///
/// The id is accepted as a JSON number or a decimal string, since clients
/// in languages without 64-bit integers cannot send large ids as numbers.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateAccountRequest {
    /// Identifier of the account to create.
    #[schema(value_type = String, example = "6512131979280412370")]
    pub id: AccountIdInput,
}

/// Account id as sent by the client.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AccountIdInput {
    Number(u64),
    Text(String),
}

impl AccountIdInput {
    fn into_text(self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value,
        }
    }
}

/// Fetch a ledger account by identifier.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(("id" = String, Path, description = "Unsigned 64-bit account identifier")),
    responses(
        (status = 200, description = "Ledger account", body = LedgerAccountView),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 404, description = "No such account", body = Error),
        (status = 503, description = "Ledger engine unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "getAccount"
)]
#[get("/accounts/{id}")]
pub async fn get_account(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<LedgerAccountView>> {
    let identifier = parse_account_id(&path.into_inner(), ID_FIELD)?;
    let account = within_deadline(
        state.request_timeout,
        "get_account",
        state.accounts.get_account(identifier),
    )
    .await?;
    Ok(web::Json(LedgerAccountView::from(&account)))
}

/// Create a ledger account without an identity.
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 200, description = "Created account", body = LedgerAccountView),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 500, description = "Ledger engine refused or failed", body = Error),
        (status = 503, description = "Deadline elapsed", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "createAccount"
)]
#[post("/accounts")]
pub async fn create_account(
    state: web::Data<HttpState>,
    payload: web::Json<CreateAccountRequest>,
) -> ApiResult<web::Json<LedgerAccountView>> {
    let raw = payload.into_inner().id.into_text();
    let identifier = parse_account_id(&raw, ID_FIELD)?;
    let account = within_deadline(
        state.request_timeout,
        "create_account",
        state.accounts.create_account(identifier),
    )
    .await?;

    info!(%identifier, "ledger account created");
    Ok(web::Json(LedgerAccountView::from(&account)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::domain::ports::{
        LedgerAccountError, LedgerRejection, LedgerStoreError, MockLedgerAccounts,
        MockOrphanReconciliation, MockProfileQuery, MockUserProvisioning,
    };
    use crate::domain::{AccountIdentifier, AccountSnapshot, LedgerAccount};
    use crate::inbound::http::state::HttpStatePorts;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn snapshot(id: AccountIdentifier) -> AccountSnapshot {
        AccountSnapshot::try_from(&LedgerAccount::zeroed(id)).expect("narrow")
    }

    async fn call(accounts: MockLedgerAccounts, request: actix_test::TestRequest) -> (StatusCode, Value) {
        let state = HttpState::new(
            HttpStatePorts {
                provisioning: Arc::new(MockUserProvisioning::new()),
                profiles: Arc::new(MockProfileQuery::new()),
                accounts: Arc::new(accounts),
                reconciliation: Arc::new(MockOrphanReconciliation::new()),
            },
            Duration::from_secs(1),
        );
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").service(get_account).service(create_account)),
        )
        .await;
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    #[rstest]
    #[actix_web::test]
    async fn get_returns_the_account() {
        let mut accounts = MockLedgerAccounts::new();
        accounts
            .expect_get_account()
            .withf(|id| *id == AccountIdentifier::new(42))
            .times(1)
            .returning(|id| Ok(snapshot(id)));

        let request = actix_test::TestRequest::get().uri("/api/v1/accounts/42");
        let (status, body) = call(accounts, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 42);
        assert_eq!(body["code"], 718);
    }

    #[rstest]
    #[case("abc")]
    #[case("-5")]
    #[case("18446744073709551616")]
    #[actix_web::test]
    async fn malformed_ids_are_bad_requests(#[case] raw: &str) {
        let mut accounts = MockLedgerAccounts::new();
        accounts.expect_get_account().never();

        let request = actix_test::TestRequest::get().uri(&format!("/api/v1/accounts/{raw}"));
        let (status, body) = call(accounts, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "id");
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_account_is_not_found() {
        let mut accounts = MockLedgerAccounts::new();
        accounts
            .expect_get_account()
            .times(1)
            .returning(|identifier| Err(LedgerAccountError::NotFound { identifier }));

        let request = actix_test::TestRequest::get().uri("/api/v1/accounts/7");
        let (status, body) = call(accounts, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["details"]["reason"], "account_not_found");
    }

    #[rstest]
    #[case(json!({"id": "9007199254740993"}), 9_007_199_254_740_993)]
    #[case(json!({"id": 77}), 77)]
    #[actix_web::test]
    async fn create_accepts_string_or_number_ids(#[case] payload: Value, #[case] expected: u64) {
        let mut accounts = MockLedgerAccounts::new();
        accounts
            .expect_create_account()
            .withf(move |id| *id == AccountIdentifier::new(expected))
            .times(1)
            .returning(|id| Ok(snapshot(id)));

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/accounts")
            .set_json(payload);
        let (status, body) = call(accounts, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["debitsPosted"], 0);
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_create_surfaces_the_ledger_result() {
        let mut accounts = MockLedgerAccounts::new();
        accounts.expect_create_account().times(1).returning(|identifier| {
            Err(LedgerAccountError::ProvisioningFailed {
                identifier,
                cause: LedgerStoreError::rejected(LedgerRejection::Exists),
            })
        });

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/accounts")
            .set_json(json!({"id": "5"}));
        let (status, body) = call(accounts, request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["details"]["reason"], "ledger_rejected");
        assert_eq!(body["details"]["ledgerResult"], "exists");
    }
}
