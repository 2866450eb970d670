//! # attix-client: Log and Map Collaborator Clients
//!
//! attix does not store anything itself. The append-only log and the
//! versioned map are external services, reached through the
//! [`LogService`] and [`MapService`] contracts defined here.
//!
//! - [`HttpLogClient`] / [`HttpMapClient`]: reqwest clients for the JSON
//!   wire protocol. Transport errors are retried with backoff, except that
//!   an append is only resent when the connection was never made. Non-2xx
//!   responses are surfaced immediately.
//! - [`MemoryLog`] / [`MemoryMap`]: in-process implementations used by the
//!   test suites and by `attix dev`.
//!
//! ## Architecture
//!
//! The indexer and the API hold `Arc<dyn LogService>` and
//! `Arc<dyn MapService>`; they never name a concrete client.

pub mod config;
pub mod error;
pub mod log;
pub mod map;
pub mod memory;
pub(crate) mod retry;
pub mod service;
pub(crate) mod transport;

pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use log::HttpLogClient;
pub use map::HttpMapClient;
pub use memory::{LogOp, MapOp, MapWrite, MemoryLog, MemoryMap};
pub use service::{LogService, MapService};

use std::sync::Arc;
use std::time::Duration;

/// HTTP clients for both collaborators, sharing one connection pool.
#[derive(Debug, Clone)]
pub struct HttpCollaborators {
    log: HttpLogClient,
    map: HttpMapClient,
}

impl HttpCollaborators {
    /// Build both clients from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            log: HttpLogClient::new(http.clone(), config.log_url),
            map: HttpMapClient::new(http, config.map_url, config.map_id),
        })
    }

    /// Access the log client.
    pub fn log(&self) -> &HttpLogClient {
        &self.log
    }

    /// Access the map client.
    pub fn map(&self) -> &HttpMapClient {
        &self.map
    }

    /// Split into trait objects for the indexer and the API.
    pub fn into_services(self) -> (Arc<dyn LogService>, Arc<dyn MapService>) {
        (Arc::new(self.log), Arc::new(self.map))
    }
}
