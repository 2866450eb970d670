//! HTTP client for the append-only log service.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/v1/leaves` | Append a leaf |
//! | GET    | `/v1/leaves/{index}` | Entry by index |
//! | GET    | `/v1/leaves?leaf_hash={hex}` | Entries by leaf hash |
//! | GET    | `/v1/root` | Latest published root |
//! | GET    | `/v1/proof?leaf_hash={hex}&tree_size={n}` | Inclusion proof |
//! | GET    | `/v1/size` | Sequenced entry count |
//!
//! Byte fields travel as lowercase hex.

use async_trait::async_trait;
use attix_core::digest::hex_bytes;
use attix_core::{Digest, InclusionProof, LogEntry, LogRoot};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::service::LogService;
use crate::transport::{decode, join, send, send_unrepeatable};

/// Request body for `POST /v1/leaves`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppendRequest {
    #[serde(with = "hex_bytes")]
    pub value: Vec<u8>,
}

/// Response body for `POST /v1/leaves`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppendResponse {
    pub index: i64,
}

/// Response body for `GET /v1/leaves?leaf_hash=`.
#[derive(Debug, Serialize, Deserialize)]
pub struct EntriesResponse {
    #[serde(default)]
    pub entries: Vec<LogEntry>,
}

/// Response body for `GET /v1/size`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SizeResponse {
    pub count: i64,
}

/// Client for the log service.
#[derive(Debug, Clone)]
pub struct HttpLogClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl HttpLogClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl LogService for HttpLogClient {
    async fn append(&self, value: &[u8]) -> Result<i64, ClientError> {
        let endpoint = "POST /v1/leaves";
        let url = join(&self.base_url, "v1/leaves");
        let body = AppendRequest {
            value: value.to_vec(),
        };

        // Never resent once it may have reached the log; see `retry`.
        let resp = send_unrepeatable(endpoint, || self.http.post(&url).json(&body).send()).await?;
        let out: AppendResponse = decode(endpoint, resp).await?;
        tracing::debug!(index = out.index, "leaf queued");
        Ok(out.index)
    }

    async fn get_by_index(&self, index: i64) -> Result<LogEntry, ClientError> {
        let endpoint = format!("GET /v1/leaves/{index}");
        let url = join(&self.base_url, &format!("v1/leaves/{index}"));

        let resp = send(&endpoint, || self.http.get(&url).send()).await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound { endpoint });
        }
        decode(&endpoint, resp).await
    }

    async fn get_by_leaf_hash(&self, leaf_hash: &Digest) -> Result<Vec<LogEntry>, ClientError> {
        let endpoint = "GET /v1/leaves?leaf_hash";
        let url = join(&self.base_url, &format!("v1/leaves?leaf_hash={leaf_hash}"));

        let resp = send(endpoint, || self.http.get(&url).send()).await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let out: EntriesResponse = decode(endpoint, resp).await?;
        Ok(out.entries)
    }

    async fn get_root(&self) -> Result<LogRoot, ClientError> {
        let endpoint = "GET /v1/root";
        let url = join(&self.base_url, "v1/root");

        let resp = send(endpoint, || self.http.get(&url).send()).await?;
        decode(endpoint, resp).await
    }

    async fn get_inclusion_proof(
        &self,
        leaf_hash: &Digest,
        tree_size: i64,
    ) -> Result<InclusionProof, ClientError> {
        let endpoint = "GET /v1/proof";
        let url = join(
            &self.base_url,
            &format!("v1/proof?leaf_hash={leaf_hash}&tree_size={tree_size}"),
        );

        let resp = send(endpoint, || self.http.get(&url).send()).await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                endpoint: endpoint.to_string(),
            });
        }
        decode(endpoint, resp).await
    }

    async fn get_sequenced_count(&self) -> Result<i64, ClientError> {
        let endpoint = "GET /v1/size";
        let url = join(&self.base_url, "v1/size");

        let resp = send(endpoint, || self.http.get(&url).send()).await?;
        let out: SizeResponse = decode(endpoint, resp).await?;
        Ok(out.count)
    }
}
