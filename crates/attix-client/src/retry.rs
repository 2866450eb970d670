//! Transport retry for collaborator HTTP calls.
//!
//! An HTTP response of any status is final and goes back to the caller.
//! Only failures to get a response are candidates for a resend, and which
//! of those are safe depends on the call:
//!
//! - [`Resend::AnyTransportFailure`]: reads, and map writes tagged with a
//!   revision. A duplicate delivery of a revision-tagged write is rejected
//!   by the map as stale, so resending never applies an effect twice.
//! - [`Resend::ConnectFailureOnly`]: log appends. Once the request may have
//!   reached the log, a resend could sequence the same payload again, and
//!   the log can never drop it. Only a connect failure proves the log never
//!   saw the request.

use std::time::Duration;

/// Delays before each resend, in order. Their count bounds the resends.
pub(crate) const BACKOFF: [Duration; 3] = [
    Duration::from_millis(200),
    Duration::from_millis(400),
    Duration::from_millis(800),
];

/// Which transport failures a call may be resent after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resend {
    AnyTransportFailure,
    ConnectFailureOnly,
}

impl Resend {
    fn allows(self, err: &reqwest::Error) -> bool {
        match self {
            Resend::AnyTransportFailure => true,
            Resend::ConnectFailureOnly => err.is_connect(),
        }
    }
}

/// Send a request built by `f`, resending per `resend` with [`BACKOFF`].
pub(crate) async fn retry_send<F, Fut>(
    endpoint: &str,
    resend: Resend,
    f: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut delays = BACKOFF.iter();
    loop {
        let err = match f().await {
            Ok(resp) => return Ok(resp),
            Err(e) => e,
        };
        if !resend.allows(&err) {
            tracing::warn!(endpoint, error = %err, "request may have been delivered, not resending");
            return Err(err);
        }
        let Some(delay) = delays.next() else {
            return Err(err);
        };
        tracing::warn!(endpoint, ?delay, error = %err, "collaborator unreachable, resending");
        tokio::time::sleep(*delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    async fn attempts_against_closed_port(resend: Resend) -> u32 {
        let calls = Arc::new(AtomicU32::new(0));
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        let result = retry_send("GET /", resend, || {
            calls.fetch_add(1, Ordering::SeqCst);
            // Port 1 is closed: connection refused.
            http.get("http://127.0.0.1:1/").send()
        })
        .await;

        assert!(result.unwrap_err().is_connect());
        calls.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn connect_failures_exhaust_the_backoff_schedule() {
        let expected = BACKOFF.len() as u32 + 1;
        assert_eq!(attempts_against_closed_port(Resend::AnyTransportFailure).await, expected);
        assert_eq!(attempts_against_closed_port(Resend::ConnectFailureOnly).await, expected);
    }

    #[test]
    fn backoff_doubles() {
        assert_eq!(BACKOFF[0] * 2, BACKOFF[1]);
        assert_eq!(BACKOFF[1] * 2, BACKOFF[2]);
    }
}
