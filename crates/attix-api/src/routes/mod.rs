//! # API Route Modules
//!
//! - `entries`: append attestations and fetch them back, by index or by
//!   payload, with verified inclusion proofs.
//! - `lookup`: resolve an artifact digest to the attestation that last
//!   produced it.

pub mod entries;
pub mod lookup;

use axum::extract::rejection::QueryRejection;
use axum::extract::Query;

use crate::error::AppError;

/// Unwrap a query extraction, reporting failures as `BAD_REQUEST` bodies.
pub(crate) fn extract_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(q)| q)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}
