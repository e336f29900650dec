//! User provisioning and profile handlers.
//!
//! ```text
//! POST /api/v1/users {"username":"bob","email":"bob@example.com","password":"s3cr3t"}
//! GET /api/v1/users/bob
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{Error, SignupCredentials, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::deadline::within_deadline;
use crate::inbound::http::schemas::UserProfileResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::identity_validation_error;

/// Signup body for `POST /api/v1/users`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[schema(example = "bob")]
    pub username: String,
    #[schema(example = "bob@example.com")]
    pub email: String,
    #[schema(example = "s3cr3t")]
    pub password: String,
}

impl TryFrom<CreateUserRequest> for SignupCredentials {
    type Error = Error;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        let CreateUserRequest {
            username,
            email,
            password,
        } = value;
        let password = Zeroizing::new(password);
        Self::try_from_parts(&username, &email, &password)
            .map_err(|err| identity_validation_error(&err))
    }
}

/// Provision an identity and its ledger account.
///
/// The coordinator bounds each store step itself. Wrapping the whole call in
/// the request deadline could drop it after the identity is written and hide
/// the orphan it must report.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Provisioned profile", body = UserProfileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username already taken", body = Error),
        (status = 500, description = "Ledger account not created; identity left in place", body = Error),
        (status = 503, description = "Identity store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let credentials = SignupCredentials::try_from(payload.into_inner())?;
    let profile = state.provisioning.provision(credentials).await?;

    info!(
        username = %profile.identity().username(),
        identifier = %profile.identity().identifier(),
        "user provisioned"
    );
    Ok(web::Json(UserProfileResponse::from(&profile)))
}

/// Resolve a user's identity and ledger balances.
#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Username to resolve")),
    responses(
        (status = 200, description = "Profile", body = UserProfileResponse),
        (status = 400, description = "Invalid username", body = Error),
        (status = 404, description = "Unknown user, or user without a ledger account", body = Error),
        (status = 500, description = "Balance does not fit the response", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{username}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let username =
        Username::new(path.into_inner()).map_err(|err| identity_validation_error(&err))?;
    let profile = within_deadline(
        state.request_timeout,
        "resolve_profile",
        state.profiles.resolve(&username),
    )
    .await?;
    Ok(web::Json(UserProfileResponse::from(&profile)))
}
