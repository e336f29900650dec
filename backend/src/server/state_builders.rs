//! Builders wiring driven adapters into the services behind HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use karma_backend::domain::ports::{IdentityStore, LedgerStore};
use karma_backend::domain::{
    Argon2Digester, CredentialDeriver, LedgerAccountService, OrphanScanService, ProfileService,
    ProvisioningService,
};
use karma_backend::inbound::http::state::{HttpState, HttpStatePorts};
use karma_backend::outbound::ledger::{
    HttpLedgerEngine, InMemoryLedgerEngine, LedgerClientBuildError,
};
use karma_backend::outbound::memory::InMemoryIdentityStore;
use karma_backend::outbound::persistence::DieselIdentityStore;

use super::ServerConfig;

/// Select the identity store: PostgreSQL when a pool is configured,
/// otherwise process memory.
fn build_identity_store(config: &ServerConfig) -> Arc<dyn IdentityStore> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselIdentityStore::new(pool.clone())),
        None => {
            info!("no database configured; identities are held in memory");
            Arc::new(InMemoryIdentityStore::new())
        }
    }
}

/// Select the ledger engine: the HTTP gateway when a URL is configured,
/// otherwise the in-process engine.
fn build_ledger_store(config: &ServerConfig) -> Result<Arc<dyn LedgerStore>, LedgerClientBuildError> {
    match &config.ledger {
        Some(endpoint) => Ok(Arc::new(HttpLedgerEngine::new(
            endpoint.base_url.clone(),
            endpoint.timeout,
        )?)),
        None => {
            info!("no ledger engine configured; accounts are held in memory");
            Ok(Arc::new(InMemoryLedgerEngine::new(Arc::new(DefaultClock))))
        }
    }
}

/// Build the shared HTTP state from the configured adapters.
///
/// # Errors
///
/// Returns [`LedgerClientBuildError`] when the ledger HTTP client cannot be
/// constructed.
pub(super) fn build_http_state(
    config: &ServerConfig,
) -> Result<web::Data<HttpState>, LedgerClientBuildError> {
    let identities = build_identity_store(config);
    let ledger = build_ledger_store(config)?;
    let deriver = CredentialDeriver::new(Arc::new(Argon2Digester::default()));
    let retry = config.retry;

    let ports = HttpStatePorts {
        provisioning: Arc::new(
            ProvisioningService::new(identities.clone(), ledger.clone(), deriver)
                .with_step_timeout(config.request_timeout),
        ),
        profiles: Arc::new(ProfileService::new(
            identities.clone(),
            ledger.clone(),
            retry,
        )),
        accounts: Arc::new(LedgerAccountService::new(ledger.clone(), retry)),
        reconciliation: Arc::new(OrphanScanService::new(identities, ledger, retry)),
    };

    Ok(web::Data::new(HttpState::new(ports, config.request_timeout)))
}
