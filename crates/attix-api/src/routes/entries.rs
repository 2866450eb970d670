//! # Entry Routes
//!
//! | Method | Path | Body / Query | Response |
//! |--------|------|--------------|----------|
//! | POST | `/api/v1/add` | raw payload | `201 {"index": n}` |
//! | POST | `/api/v1/get` | raw payload | `{"entries": [...]}` |
//! | GET | `/api/v1/entries/{index}` | `?proof=true` | entry view |

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::routes::extract_query;
use crate::service::EntryView;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/add", post(add))
        .route("/api/v1/get", post(get_by_payload))
        .route("/api/v1/entries/{index}", get(get_entry))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddResponse {
    pub index: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntriesResponse {
    pub entries: Vec<EntryView>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryQuery {
    #[serde(default)]
    pub proof: bool,
}

async fn add(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<AddResponse>), AppError> {
    let index = state.query.add(&body).await?;
    Ok((StatusCode::CREATED, Json(AddResponse { index })))
}

async fn get_by_payload(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<EntriesResponse>, AppError> {
    let entries = state.query.get_by_payload(&body).await?;
    Ok(Json(EntriesResponse { entries }))
}

async fn get_entry(
    State(state): State<AppState>,
    Path(index): Path<String>,
    query: Result<Query<EntryQuery>, QueryRejection>,
) -> Result<Json<EntryView>, AppError> {
    let query = extract_query(query)?;
    let index: i64 = index
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{index:?} is not a log index")))?;
    let view = state.query.get_by_index(index, query.proof).await?;
    Ok(Json(view))
}
