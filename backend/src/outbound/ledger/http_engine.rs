//! Reqwest client for the ledger engine's JSON gateway.
//!
//! `POST {base}/accounts` takes a batch of account records and answers with
//! the failed entries only. `POST {base}/accounts/lookup` takes identifiers
//! and answers with the accounts that exist.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use super::dto::{AccountDto, CreateFailureDto, LookupRequestDto};
use crate::domain::ports::{LedgerRejection, LedgerStore, LedgerStoreError};
use crate::domain::{AccountIdentifier, LedgerAccount};

/// Failure to construct the client.
#[derive(Debug, thiserror::Error)]
pub enum LedgerClientBuildError {
    #[error("invalid ledger base url: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to build ledger http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP adapter implementing [`LedgerStore`].
pub struct HttpLedgerEngine {
    client: Client,
    accounts_url: Url,
    lookup_url: Url,
}

impl HttpLedgerEngine {
    /// Build a client with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerClientBuildError`] when the endpoints cannot be derived
    /// from `base` or the reqwest client cannot be built.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, LedgerClientBuildError> {
        let base = with_trailing_slash(base);
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            accounts_url: base.join("accounts")?,
            lookup_url: base.join("accounts/lookup")?,
        })
    }

    async fn post_json<B: serde::Serialize + Sync + ?Sized>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<Vec<u8>, LedgerStoreError> {
        let response = self
            .client
            .post(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

/// `Url::join` replaces the last segment unless the base ends in `/`.
fn with_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

#[async_trait]
impl LedgerStore for HttpLedgerEngine {
    async fn create(&self, identifier: AccountIdentifier) -> Result<LedgerAccount, LedgerStoreError> {
        let account = LedgerAccount::zeroed(identifier);
        let body = self
            .post_json(&self.accounts_url, &[AccountDto::from(&account)])
            .await?;
        parse_create_failures(&body)?;
        debug!(%identifier, "ledger account created");

        // The engine assigns the timestamp; read it back when possible.
        match self.lookup(&[identifier]).await {
            Ok(found) => Ok(found
                .into_iter()
                .find(|stored| stored.identifier == identifier)
                .unwrap_or_else(|| {
                    warn!(%identifier, "created account missing from read-back");
                    account
                })),
            Err(error) => {
                warn!(%identifier, %error, "created account read-back failed");
                Ok(account)
            }
        }
    }

    async fn lookup(
        &self,
        identifiers: &[AccountIdentifier],
    ) -> Result<Vec<LedgerAccount>, LedgerStoreError> {
        if identifiers.is_empty() {
            return Ok(Vec::new());
        }
        let body = self
            .post_json(&self.lookup_url, &LookupRequestDto::new(identifiers))
            .await?;
        parse_accounts(&body)
    }
}

/// An empty failure list means every entry was created.
fn parse_create_failures(body: &[u8]) -> Result<(), LedgerStoreError> {
    let failures: Vec<CreateFailureDto> = serde_json::from_slice(body).map_err(|error| {
        LedgerStoreError::decode(format!("invalid create response: {error}"))
    })?;
    match failures.into_iter().find(|failure| failure.index == 0) {
        None => Ok(()),
        Some(failure) => Err(LedgerStoreError::rejected(LedgerRejection::from_wire(
            &failure.result,
            failure.code,
        ))),
    }
}

fn parse_accounts(body: &[u8]) -> Result<Vec<LedgerAccount>, LedgerStoreError> {
    let decoded: Vec<AccountDto> = serde_json::from_slice(body).map_err(|error| {
        LedgerStoreError::decode(format!("invalid lookup response: {error}"))
    })?;
    decoded
        .into_iter()
        .map(AccountDto::into_domain)
        .collect::<Result<_, _>>()
        .map_err(LedgerStoreError::decode)
}

fn map_transport_error(error: reqwest::Error) -> LedgerStoreError {
    if error.is_decode() {
        LedgerStoreError::decode(error.to_string())
    } else {
        LedgerStoreError::unavailable(error.to_string())
    }
}

/// Server-side and throttling statuses are worth retrying; any other client
/// error means the gateway did not understand us.
fn map_status_error(status: StatusCode, body: &[u8]) -> LedgerStoreError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            LedgerStoreError::unavailable(message)
        }
        _ if status.is_server_error() => LedgerStoreError::unavailable(message),
        _ => LedgerStoreError::decode(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let mut preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    //! Non-network coverage of the response and status mapping.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://ledger:3001", "http://ledger:3001/accounts")]
    #[case("http://ledger:3001/v1", "http://ledger:3001/v1/accounts")]
    #[case("http://ledger:3001/v1/", "http://ledger:3001/v1/accounts")]
    fn endpoints_extend_the_base_path(#[case] base: &str, #[case] expected: &str) {
        let base = Url::parse(base).expect("url");
        let engine = HttpLedgerEngine::new(base, Duration::from_secs(1)).expect("client");
        assert_eq!(engine.accounts_url.as_str(), expected);
        assert_eq!(engine.lookup_url.as_str(), format!("{expected}/lookup"));
    }

    #[rstest]
    fn empty_failure_list_is_success() {
        assert_eq!(parse_create_failures(b"[]"), Ok(()));
    }

    #[rstest]
    #[case(r#"[{"index":0,"result":"exists"}]"#, LedgerRejection::Exists)]
    #[case(
        r#"[{"index":0,"result":"id_must_not_be_zero"}]"#,
        LedgerRejection::IdMustNotBeZero
    )]
    #[case(
        r#"[{"index":0,"result":"imported_event_expected","code":56}]"#,
        LedgerRejection::Other(56)
    )]
    fn failures_become_rejections(#[case] body: &str, #[case] expected: LedgerRejection) {
        assert_eq!(
            parse_create_failures(body.as_bytes()),
            Err(LedgerStoreError::rejected(expected))
        );
    }

    #[rstest]
    fn garbled_create_response_is_a_decode_error() {
        let err = parse_create_failures(b"<html>").expect_err("not json");
        assert!(matches!(err, LedgerStoreError::Decode { .. }));
    }

    #[rstest]
    fn lookup_response_decodes_accounts() {
        let body = r#"[{
            "id": "5", "debitsPending": "0", "debitsPosted": "0",
            "creditsPending": "0", "creditsPosted": "12",
            "ledger": 1, "code": 718, "flags": 0, "timestamp": "99"
        }]"#;

        let accounts = parse_accounts(body.as_bytes()).expect("decode");
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].identifier, AccountIdentifier::new(5));
        assert_eq!(accounts[0].balances.credits_posted, 12);
        assert_eq!(accounts[0].timestamp, 99);
    }

    #[rstest]
    #[case(StatusCode::SERVICE_UNAVAILABLE, true)]
    #[case(StatusCode::BAD_GATEWAY, true)]
    #[case(StatusCode::TOO_MANY_REQUESTS, true)]
    #[case(StatusCode::REQUEST_TIMEOUT, true)]
    #[case(StatusCode::BAD_REQUEST, false)]
    #[case(StatusCode::NOT_FOUND, false)]
    fn statuses_split_into_transient_and_terminal(
        #[case] status: StatusCode,
        #[case] transient: bool,
    ) {
        let err = map_status_error(status, b"{\"error\": \"cluster unavailable\"}");
        assert_eq!(err.is_transient(), transient);
        assert!(err.to_string().contains(&status.as_u16().to_string()));
    }

    #[rstest]
    fn long_bodies_are_truncated_in_messages() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.len(), 163);
        assert!(preview.ends_with("..."));
    }

    #[tokio::test]
    async fn empty_lookup_makes_no_request() {
        let base = Url::parse("http://127.0.0.1:9").expect("url");
        let engine = HttpLedgerEngine::new(base, Duration::from_millis(10)).expect("client");
        assert_eq!(engine.lookup(&[]).await, Ok(Vec::new()));
    }
}
