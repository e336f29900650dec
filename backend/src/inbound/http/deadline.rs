//! Per-request deadline around calls into the core.
//!
//! A stuck store call must not pin a worker, so read handlers bound their
//! driving-port call. Expiry drops the in-flight future and answers 503
//! `store_unavailable`. Signup is bounded per step inside the coordinator
//! instead, since dropping it between its writes would lose the orphan
//! report.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::store_unavailable_error;

/// Await `call`, failing with `store_unavailable` once `limit` elapses.
pub(crate) async fn within_deadline<T, E, F>(
    limit: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, Error>
where
    F: Future<Output = Result<T, E>>,
    E: Into<Error>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => {
            warn!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "request deadline elapsed"
            );
            Err(store_unavailable_error())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn completed_calls_pass_through() {
        let value = within_deadline(Duration::from_secs(1), "test", async {
            Ok::<_, Error>(7)
        })
        .await
        .expect("in time");
        assert_eq!(value, 7);
    }

    #[rstest]
    #[tokio::test]
    async fn core_errors_are_converted() {
        let err = within_deadline(Duration::from_secs(1), "test", async {
            Err::<(), _>(Error::not_found("missing"))
        })
        .await
        .expect_err("core error");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn stuck_calls_become_store_unavailable() {
        let err = within_deadline(
            Duration::from_millis(20),
            "test",
            std::future::pending::<Result<(), Error>>(),
        )
        .await
        .expect_err("deadline");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(err.reason(), Some("store_unavailable"));
    }
}
