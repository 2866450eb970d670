//! # Digest Lookup
//!
//! `GET /api/v1/lookup?hash=<hex>` returns the raw payload of the log entry
//! the map points the digest at. The log index travels in the
//! `x-attix-log-index` header.

use attix_core::Digest;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderName;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::error::AppError;
use crate::routes::extract_query;
use crate::state::AppState;

/// Response header carrying the resolved log index.
pub const LOG_INDEX_HEADER: HeaderName = HeaderName::from_static("x-attix-log-index");

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/lookup", get(lookup))
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub hash: String,
}

async fn lookup(
    State(state): State<AppState>,
    query: Result<Query<LookupQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let query = extract_query(query)?;
    let digest = Digest::from_hex(&query.hash).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let entry = state.query.lookup_by_hash(&digest).await?;
    Ok((
        [
            (CONTENT_TYPE, "application/octet-stream".to_string()),
            (LOG_INDEX_HEADER, entry.index.to_string()),
        ],
        entry.value,
    )
        .into_response())
}
