//! HTTP client for the versioned map service.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/v1/maps/{id}/root` | Latest signed root |
//! | POST   | `/v1/maps/{id}/leaves` | Write a revision (409 if stale) |
//! | GET    | `/v1/maps/{id}/leaves/{key}` | Entry by key (404 if absent) |

use async_trait::async_trait;
use attix_core::digest::hex_bytes;
use attix_core::{Digest, MapEntry, SignedMapRoot};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::service::MapService;
use crate::transport::{check_status, decode, join, send};

/// Request body for `POST /v1/maps/{id}/leaves`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SetLeavesRequest {
    pub entries: Vec<MapEntry>,
    #[serde(with = "hex_bytes")]
    pub metadata: Vec<u8>,
    pub revision: u64,
}

/// Client for one map tree.
#[derive(Debug, Clone)]
pub struct HttpMapClient {
    http: reqwest::Client,
    base_url: url::Url,
    map_id: i64,
}

impl HttpMapClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url, map_id: i64) -> Self {
        Self {
            http,
            base_url,
            map_id,
        }
    }

    /// The map tree this client addresses.
    pub fn map_id(&self) -> i64 {
        self.map_id
    }

    fn url(&self, rest: &str) -> String {
        join(&self.base_url, &format!("v1/maps/{}/{rest}", self.map_id))
    }
}

#[async_trait]
impl MapService for HttpMapClient {
    async fn get_latest_revision(&self) -> Result<SignedMapRoot, ClientError> {
        let endpoint = "GET /v1/maps/{id}/root";
        let url = self.url("root");

        let resp = send(endpoint, || self.http.get(&url).send()).await?;
        decode(endpoint, resp).await
    }

    async fn set_leaves(
        &self,
        entries: Vec<MapEntry>,
        metadata: Vec<u8>,
        revision: u64,
    ) -> Result<(), ClientError> {
        let endpoint = "POST /v1/maps/{id}/leaves";
        let url = self.url("leaves");
        let body = SetLeavesRequest {
            entries,
            metadata,
            revision,
        };

        let resp = send(endpoint, || self.http.post(&url).json(&body).send()).await?;
        if resp.status() == reqwest::StatusCode::CONFLICT {
            let detail = resp.text().await.unwrap_or_default();
            return Err(ClientError::StaleRevision {
                attempted: revision,
                detail,
            });
        }
        check_status(endpoint, resp).await?;
        Ok(())
    }

    async fn get_by_key(&self, key: &Digest) -> Result<Option<MapEntry>, ClientError> {
        let endpoint = "GET /v1/maps/{id}/leaves/{key}";
        let url = self.url(&format!("leaves/{key}"));

        let resp = send(endpoint, || self.http.get(&url).send()).await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(endpoint, resp).await.map(Some)
    }
}
