//! # attix-api: Query and Ingestion Surface
//!
//! Axum service in front of the log and map collaborators.
//!
//! ## Routes
//!
//! - `POST /api/v1/add`: append a raw attestation payload.
//! - `POST /api/v1/get`: find every entry holding a payload, with proofs.
//! - `GET /api/v1/entries/{index}`: one entry, `?proof=true` for a proof.
//! - `GET /api/v1/lookup?hash=<hex>`: artifact digest to attestation.
//! - `GET /api/v1/ping`: `pong!`.
//! - `/health/*`: liveness and readiness checks.
//!
//! ## Crate Policy
//!
//! - No verification logic in route handlers; it lives in [`QueryService`].
//! - All errors map to structured HTTP responses via [`AppError`].
//! - Proof and signature failures are reported as 502, never as success.

pub mod error;
pub mod routes;
pub mod server;
pub mod service;
pub mod state;

pub use error::AppError;
pub use service::{EntryView, QueryService, VerifiedProof};
pub use state::{AppConfig, AppState};

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Largest attestation accepted by `add` and `get`.
pub const MAX_PAYLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::entries::router())
        .merge(routes::lookup::router())
        .route("/api/v1/ping", get(ping))
        .layer(DefaultBodyLimit::max(MAX_PAYLOAD_BYTES))
        .layer(TraceLayer::new_for_http());

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api).with_state(state)
}

async fn ping() -> &'static str {
    "pong!"
}

/// Liveness check: the process is up.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness check: the log collaborator answers.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.query.log().get_sequenced_count().await {
        Ok(_) => (StatusCode::OK, "ready").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "log service unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, "log service unreachable").into_response()
        }
    }
}
