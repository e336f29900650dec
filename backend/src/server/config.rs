//! Process settings loaded via OrthoConfig and the validated server
//! configuration built from them.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use karma_backend::domain::RetryPolicy;
use karma_backend::outbound::persistence::{DbPool, PoolConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_LEDGER_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_STORE_RETRY_ATTEMPTS: u32 = 1;
const DEFAULT_STORE_RETRY_BACKOFF_MS: u64 = 50;

/// Raw settings from CLI flags, `KARMA_*` environment variables and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "KARMA")]
pub struct AppSettings {
    /// Socket address to listen on; `0.0.0.0:8080` when absent.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL for the identity store; in-memory when absent.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub db_pool_max_size: u32,
    /// Base URL of the ledger engine gateway; in-memory when absent.
    pub ledger_url: Option<String>,
    /// HTTP client timeout for ledger calls, in milliseconds.
    #[ortho_config(default = 5000)]
    pub ledger_timeout_ms: u64,
    /// Deadline for each core call made by a handler, in milliseconds.
    #[ortho_config(default = 10000)]
    pub request_timeout_ms: u64,
    /// Attempts for idempotent store reads; 1 disables retry.
    #[ortho_config(default = 1)]
    pub store_retry_attempts: u32,
    /// Linear backoff between read retries, in milliseconds.
    #[ortho_config(default = 50)]
    pub store_retry_backoff_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            database_url: None,
            db_pool_max_size: DEFAULT_DB_POOL_MAX_SIZE,
            ledger_url: None,
            ledger_timeout_ms: DEFAULT_LEDGER_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            store_retry_attempts: DEFAULT_STORE_RETRY_ATTEMPTS,
            store_retry_backoff_ms: DEFAULT_STORE_RETRY_BACKOFF_MS,
        }
    }
}

/// Reasons settings cannot become a [`ServerConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    #[error("invalid ledger url {value:?}: {message}")]
    LedgerUrl { value: String, message: String },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("request_timeout_ms ({request_ms}) must exceed ledger_timeout_ms ({ledger_ms})")]
    DeadlineBelowLedgerTimeout { request_ms: u64, ledger_ms: u64 },
}

/// Ledger gateway location and client timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEndpoint {
    /// Gateway root; `accounts` paths are joined onto it.
    pub base_url: Url,
    /// Per-request HTTP client timeout.
    pub timeout: Duration,
}

/// Validated configuration for creating the HTTP server.
#[derive(Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) database_url: Option<String>,
    pub(crate) db_pool_max_size: u32,
    pub(crate) ledger: Option<LedgerEndpoint>,
    pub(crate) request_timeout: Duration,
    pub(crate) retry: RetryPolicy,
    pub(crate) db_pool: Option<DbPool>,
}

fn non_zero<T: Default + PartialEq>(value: T, field: &'static str) -> Result<T, ConfigError> {
    if value == T::default() {
        Err(ConfigError::Zero { field })
    } else {
        Ok(value)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<AppSettings> for ServerConfig {
    type Error = ConfigError;

    fn try_from(settings: AppSettings) -> Result<Self, Self::Error> {
        let raw_bind = settings
            .bind_addr
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = raw_bind
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::BindAddr {
                message: err.to_string(),
                value: raw_bind.clone(),
            })?;

        let db_pool_max_size = non_zero(settings.db_pool_max_size, "db_pool_max_size")?;
        let ledger_ms = non_zero(settings.ledger_timeout_ms, "ledger_timeout_ms")?;
        let request_ms = non_zero(settings.request_timeout_ms, "request_timeout_ms")?;
        if request_ms <= ledger_ms {
            return Err(ConfigError::DeadlineBelowLedgerTimeout {
                request_ms,
                ledger_ms,
            });
        }
        let ledger_timeout = Duration::from_millis(ledger_ms);
        let request_timeout = Duration::from_millis(request_ms);
        let attempts = non_zero(settings.store_retry_attempts, "store_retry_attempts")?;
        let backoff = Duration::from_millis(settings.store_retry_backoff_ms);

        let ledger = non_blank(settings.ledger_url)
            .map(|raw| {
                Url::parse(&raw)
                    .map(|base_url| LedgerEndpoint {
                        base_url,
                        timeout: ledger_timeout,
                    })
                    .map_err(|err| ConfigError::LedgerUrl {
                        message: err.to_string(),
                        value: raw.clone(),
                    })
            })
            .transpose()?;

        Ok(Self {
            bind_addr,
            database_url: non_blank(settings.database_url),
            db_pool_max_size,
            ledger,
            request_timeout,
            retry: RetryPolicy::new(attempts, backoff),
            db_pool: None,
        })
    }
}

impl ServerConfig {
    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Pool settings for the configured database, if any.
    #[must_use]
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url
            .as_deref()
            .map(|url| PoolConfig::new(url).with_max_size(self.db_pool_max_size))
    }

    /// Attach a database connection pool for the identity store adapter.
    ///
    /// Without a pool the server falls back to the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
