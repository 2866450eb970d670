//! Collaborator client error types.

use crate::config::ConfigError;

/// Errors from log or map service calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error after retries were exhausted.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The call did not complete before its deadline.
    #[error("{endpoint} timed out")]
    Timeout { endpoint: String },
    /// The service returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {reason}")]
    Deserialization { endpoint: String, reason: String },
    /// The requested record does not exist.
    #[error("{endpoint}: not found")]
    NotFound { endpoint: String },
    /// The map rejected a write tagged with an out-of-date revision.
    #[error("map rejected revision {attempted}: {detail}")]
    StaleRevision { attempted: u64, detail: String },
    /// The service is reachable but refused to serve the call.
    #[error("{endpoint} unavailable: {reason}")]
    Unavailable { endpoint: String, reason: String },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Whether the failure is a transport-level problem (as opposed to a
    /// definitive answer from the service).
    pub fn is_transport(&self) -> bool {
        match self {
            ClientError::Http { .. }
            | ClientError::Timeout { .. }
            | ClientError::Unavailable { .. } => true,
            ClientError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn from_transport(endpoint: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ClientError::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else {
            ClientError::Http {
                endpoint: endpoint.to_string(),
                source,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_classification() {
        let timeout = ClientError::Timeout {
            endpoint: "GET /v1/size".into(),
        };
        assert!(timeout.is_transport());

        let server = ClientError::Api {
            endpoint: "GET /v1/root".into(),
            status: 503,
            body: String::new(),
        };
        assert!(server.is_transport());

        let client = ClientError::Api {
            endpoint: "GET /v1/root".into(),
            status: 400,
            body: String::new(),
        };
        assert!(!client.is_transport());

        let stale = ClientError::StaleRevision {
            attempted: 4,
            detail: "current is 5".into(),
        };
        assert!(!stale.is_transport());
    }
}
