//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps collaborator, proof, and signature failures to HTTP status codes
//! with a JSON body carrying a machine-readable code and a message.
//! Internal and upstream transport details are logged, never returned.

use attix_client::ClientError;
use attix_core::{AttixError, CryptoError, ProofError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "PROOF_MISMATCH").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// The entry, digest, or index does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed hex, index, or query string (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The log served an inclusion proof that does not verify (502).
    #[error("inclusion proof mismatch: {0}")]
    ProofMismatch(String),

    /// The map served a root that does not verify under its key (502).
    #[error("map root signature invalid: {0}")]
    SignatureInvalid(String),

    /// Collaborator data is internally inconsistent (502).
    #[error("integrity error: {0}")]
    Integrity(String),

    /// A collaborator is unreachable or timed out (503).
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::ProofMismatch(_) => (StatusCode::BAD_GATEWAY, "PROOF_MISMATCH"),
            Self::SignatureInvalid(_) => (StatusCode::BAD_GATEWAY, "SIGNATURE_INVALID"),
            Self::Integrity(_) => (StatusCode::BAD_GATEWAY, "INTEGRITY_ERROR"),
            Self::UpstreamUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_UNAVAILABLE")
            }
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::UpstreamUnavailable(_) => "An upstream service is unavailable".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::ProofMismatch(_) | Self::SignatureInvalid(_) | Self::Integrity(_) => {
                tracing::error!(error = %self, "collaborator failed verification")
            }
            Self::UpstreamUnavailable(_) => tracing::warn!(error = %self, "upstream unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match &err {
            ClientError::NotFound { .. } => Self::NotFound(err.to_string()),
            e if e.is_transport() => Self::UpstreamUnavailable(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}

impl From<ProofError> for AppError {
    fn from(err: ProofError) -> Self {
        Self::ProofMismatch(err.to_string())
    }
}

impl From<CryptoError> for AppError {
    fn from(err: CryptoError) -> Self {
        match &err {
            CryptoError::SignatureInvalid { .. } | CryptoError::VerificationFailed(_) => {
                Self::SignatureInvalid(err.to_string())
            }
            _ => Self::Internal(err.to_string()),
        }
    }
}

impl From<AttixError> for AppError {
    fn from(err: AttixError) -> Self {
        match err {
            AttixError::Proof(e) => e.into(),
            AttixError::Crypto(e) => e.into(),
            AttixError::Integrity(msg) => Self::Integrity(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_status_code() {
        let (status, code) = AppError::NotFound("digest".into()).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn bad_request_status_code() {
        let (status, code) = AppError::BadRequest("odd hex".into()).status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "BAD_REQUEST");
    }

    #[test]
    fn verification_failures_are_bad_gateway() {
        for (err, expected) in [
            (AppError::ProofMismatch("x".into()), "PROOF_MISMATCH"),
            (AppError::SignatureInvalid("x".into()), "SIGNATURE_INVALID"),
            (AppError::Integrity("x".into()), "INTEGRITY_ERROR"),
        ] {
            let (status, code) = err.status_and_code();
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(code, expected);
        }
    }

    #[test]
    fn client_timeout_maps_to_upstream_unavailable() {
        let err = AppError::from(ClientError::Timeout {
            endpoint: "GET /v1/root".into(),
        });
        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
    }

    #[test]
    fn client_not_found_maps_to_not_found() {
        let err = AppError::from(ClientError::NotFound {
            endpoint: "GET /v1/leaves/9".into(),
        });
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn client_rejection_is_internal() {
        let err = AppError::from(ClientError::Api {
            endpoint: "GET /v1/proof".into(),
            status: 400,
            body: "bad tree size".into(),
        });
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn proof_error_maps_to_proof_mismatch() {
        let err = AppError::from(ProofError::Mismatch {
            leaf_index: 1,
            tree_size: 4,
            reason: "root differs".into(),
        });
        let (_, code) = err.status_and_code();
        assert_eq!(code, "PROOF_MISMATCH");
    }

    #[test]
    fn signature_error_maps_to_signature_invalid() {
        let err = AppError::from(CryptoError::SignatureInvalid {
            revision: 7,
            reason: "bad".into(),
        });
        assert!(matches!(err, AppError::SignatureInvalid(msg) if msg.contains('7')));
    }

    #[test]
    fn integrity_error_keeps_its_message() {
        let err = AppError::from(AttixError::Integrity("map value is not a log index".into()));
        assert!(matches!(err, AppError::Integrity(msg) if msg.contains("log index")));
    }

    // ── into_response tests ──────────────────────────────────────

    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn into_response_not_found() {
        let (status, body) = response_parts(AppError::NotFound("log index 12".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.code, "NOT_FOUND");
        assert!(body.error.message.contains("log index 12"));
        assert!(body.error.details.is_none());
    }

    #[tokio::test]
    async fn into_response_proof_mismatch_is_visible() {
        let (status, body) = response_parts(AppError::ProofMismatch("root differs".into())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.error.code, "PROOF_MISMATCH");
        assert!(body.error.message.contains("root differs"));
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) =
            response_parts(AppError::Internal("signer key unreadable".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert!(!body.error.message.contains("signer"));
        assert_eq!(body.error.message, "An internal error occurred");
    }

    #[tokio::test]
    async fn into_response_upstream_hides_endpoint() {
        let (status, body) = response_parts(AppError::UpstreamUnavailable(
            "http://10.0.0.3:8090/v1/root timed out".into(),
        ))
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.error.code, "UPSTREAM_UNAVAILABLE");
        assert!(!body.error.message.contains("10.0.0.3"));
    }
}
