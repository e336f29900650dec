//! Behavioural tests for provisioning, profile resolution and orphan listing
//! over HTTP, backed by the in-memory adapters.
//!
//! The world owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. Dropping the fixture stops the server
//! even if a step panics.

use std::cell::RefCell;
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};
use argon2::Params;
use async_trait::async_trait;
use karma_backend::Trace;
use karma_backend::domain::ports::{LedgerRejection, LedgerStore, LedgerStoreError};
use karma_backend::domain::{
    AccountIdentifier, Argon2Digester, CredentialDeriver, LedgerAccount, LedgerAccountService,
    OrphanScanService, ProfileService, ProvisioningService, RetryPolicy,
};
use karma_backend::inbound::http::admin::list_orphans;
use karma_backend::inbound::http::state::{HttpState, HttpStatePorts};
use karma_backend::inbound::http::users::{create_user, get_user};
use karma_backend::outbound::ledger::InMemoryLedgerEngine;
use karma_backend::outbound::memory::InMemoryIdentityStore;
use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

/// In-memory engine that can be told to reject creates and counts lookups.
struct SwitchableLedger {
    inner: InMemoryLedgerEngine,
    refuse_creates: AtomicBool,
    lookups: AtomicUsize,
}

impl SwitchableLedger {
    fn new() -> Self {
        Self {
            inner: InMemoryLedgerEngine::new(Arc::new(DefaultClock)),
            refuse_creates: AtomicBool::new(false),
            lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LedgerStore for SwitchableLedger {
    async fn create(&self, identifier: AccountIdentifier) -> Result<LedgerAccount, LedgerStoreError> {
        if self.refuse_creates.load(Ordering::SeqCst) {
            return Err(LedgerStoreError::rejected(
                LedgerRejection::ExistsWithDifferentFields,
            ));
        }
        self.inner.create(identifier).await
    }

    async fn lookup(
        &self,
        identifiers: &[AccountIdentifier],
    ) -> Result<Vec<LedgerAccount>, LedgerStoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(identifiers).await
    }
}

struct ProvisioningWorld {
    runtime: Runtime,
    local: LocalSet,
    base_url: String,
    server: ServerHandle,
    ledger: Arc<SwitchableLedger>,
    last_status: Option<u16>,
    last_body: Option<Value>,
    provisioned_identifier: Option<u64>,
}

struct WorldFixture {
    world: RefCell<ProvisioningWorld>,
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        let ctx = self.world.borrow();
        let server = ctx.server.clone();
        ctx.local.block_on(&ctx.runtime, async move {
            server.stop(true).await;
        });
    }
}

impl WorldFixture {
    fn send(&self, method: reqwest::Method, path: &str, payload: Option<Value>) {
        let (status, body) = {
            let ctx = self.world.borrow();
            let url = format!("{}{path}", ctx.base_url);
            ctx.local.block_on(&ctx.runtime, async move {
                let client = reqwest::Client::new();
                let mut request = client.request(method, url);
                if let Some(payload) = payload {
                    request = request.json(&payload);
                }
                let response = request.send().await.expect("request reaches the server");
                let status = response.status().as_u16();
                let body = response.json::<Value>().await.ok();
                (status, body)
            })
        };
        let mut ctx = self.world.borrow_mut();
        ctx.last_status = Some(status);
        ctx.last_body = body;
    }

    fn last_body(&self) -> Value {
        self.world
            .borrow()
            .last_body
            .clone()
            .expect("response body")
    }
}

fn fast_deriver() -> CredentialDeriver {
    let params = Params::new(Params::MIN_M_COST, 1, 1, None).expect("valid argon2 params");
    CredentialDeriver::new(Arc::new(Argon2Digester::with_params(params)))
}

fn http_state(ledger: Arc<SwitchableLedger>) -> HttpState {
    let identities = Arc::new(InMemoryIdentityStore::new());
    let retry = RetryPolicy::none();
    HttpState::new(
        HttpStatePorts {
            provisioning: Arc::new(ProvisioningService::new(
                identities.clone(),
                ledger.clone(),
                fast_deriver(),
            )),
            profiles: Arc::new(ProfileService::new(
                identities.clone(),
                ledger.clone(),
                retry,
            )),
            accounts: Arc::new(LedgerAccountService::new(ledger.clone(), retry)),
            reconciliation: Arc::new(OrphanScanService::new(identities, ledger, retry)),
        },
        Duration::from_secs(5),
    )
}

async fn spawn_server(state: HttpState) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new().app_data(data.clone()).wrap(Trace).service(
            web::scope("/api/v1")
                .service(create_user)
                .service(get_user)
                .service(list_orphans),
        )
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    Ok((format!("http://{addr}"), handle))
}

#[fixture]
fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let ledger = Arc::new(SwitchableLedger::new());
    let state = http_state(ledger.clone());
    let (base_url, server) = local
        .block_on(&runtime, async { spawn_server(state).await })
        .expect("server should start");

    WorldFixture {
        world: RefCell::new(ProvisioningWorld {
            runtime,
            local,
            base_url,
            server,
            ledger,
            last_status: None,
            last_body: None,
            provisioned_identifier: None,
        }),
    }
}

// -----------------------------------------------------------------------------
// Given Steps
// -----------------------------------------------------------------------------

#[given("a running server with in-memory stores")]
fn a_running_server_with_in_memory_stores(world: &WorldFixture) {
    let _ = world;
}

#[given("the ledger engine refuses new accounts")]
fn the_ledger_engine_refuses_new_accounts(world: &WorldFixture) {
    world
        .world
        .borrow()
        .ledger
        .refuse_creates
        .store(true, Ordering::SeqCst);
}

// -----------------------------------------------------------------------------
// When Steps
// -----------------------------------------------------------------------------

#[when("{username} signs up with password {password}")]
fn user_signs_up(world: &WorldFixture, username: String, password: String) {
    world.send(
        reqwest::Method::POST,
        "/api/v1/users",
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": password,
        })),
    );
    let status = world.world.borrow().last_status;
    if status == Some(200) {
        let identifier = world.last_body()["user"]["identifier"].as_u64();
        world.world.borrow_mut().provisioned_identifier = identifier;
    }
}

#[when("the client resolves {username}")]
fn the_client_resolves(world: &WorldFixture, username: String) {
    world.send(
        reqwest::Method::GET,
        &format!("/api/v1/users/{username}"),
        None,
    );
}

#[when("the operator lists orphans")]
fn the_operator_lists_orphans(world: &WorldFixture) {
    world.send(reqwest::Method::GET, "/api/v1/admin/orphans", None);
}

// -----------------------------------------------------------------------------
// Then Steps
// -----------------------------------------------------------------------------

#[then("the response status is {status}")]
fn the_response_status_is(world: &WorldFixture, status: u16) {
    assert_eq!(world.world.borrow().last_status, Some(status));
}

#[then("the profile has a non-zero identifier and zero balances")]
fn the_profile_has_a_non_zero_identifier_and_zero_balances(world: &WorldFixture) {
    let body = world.last_body();
    let identifier = body["user"]["identifier"].as_u64().expect("identifier");
    assert_ne!(identifier, 0);
    assert_eq!(body["account"]["id"].as_u64(), Some(identifier));
    for counter in ["debitsPending", "debitsPosted", "creditsPending", "creditsPosted"] {
        assert_eq!(body["account"][counter].as_u64(), Some(0), "{counter}");
    }
    assert!(body["user"].get("credentialDigest").is_none());
}

#[then("the resolved identifier matches the provisioned one")]
fn the_resolved_identifier_matches_the_provisioned_one(world: &WorldFixture) {
    let body = world.last_body();
    let provisioned = world
        .world
        .borrow()
        .provisioned_identifier
        .expect("earlier signup");
    assert_eq!(body["user"]["identifier"].as_u64(), Some(provisioned));
    assert_eq!(body["account"]["creditsPosted"].as_u64(), Some(0));
}

#[then("the error reason is {reason}")]
fn the_error_reason_is(world: &WorldFixture, reason: String) {
    let body = world.last_body();
    assert_eq!(body["details"]["reason"].as_str(), Some(reason.as_str()));
    assert!(body["traceId"].is_string());
}

#[then("the ledger was never consulted")]
fn the_ledger_was_never_consulted(world: &WorldFixture) {
    let lookups = world.world.borrow().ledger.lookups.load(Ordering::SeqCst);
    assert_eq!(lookups, 0);
}

#[then("the orphan report names {username}")]
fn the_orphan_report_names(world: &WorldFixture, username: String) {
    let body = world.last_body();
    let orphans = body["orphans"].as_array().expect("orphans array");
    assert!(
        orphans
            .iter()
            .any(|orphan| orphan["username"].as_str() == Some(username.as_str())),
        "{username} missing from {orphans:?}"
    );
    assert_eq!(body["truncated"].as_bool(), Some(false));
}

// -----------------------------------------------------------------------------
// Scenario Bindings
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/provisioning.feature",
    name = "Provision, resolve and re-provision bob"
)]
fn provision_resolve_and_reprovision(world: WorldFixture) {
    let _ = world;
}

#[scenario(
    path = "tests/features/provisioning.feature",
    name = "Resolving a user that was never provisioned"
)]
fn resolving_an_unknown_user(world: WorldFixture) {
    let _ = world;
}

#[scenario(
    path = "tests/features/provisioning.feature",
    name = "A refused ledger account leaves an orphaned identity"
)]
fn refused_ledger_account_leaves_orphan(world: WorldFixture) {
    let _ = world;
}
