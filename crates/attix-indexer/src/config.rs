//! Indexer timing configuration.

use std::time::Duration;

use attix_client::config::{env_parse, ConfigError};
use attix_crypto::Ed25519PublicKey;

/// Default sleep between cycles once caught up.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
/// Default sleep after a failed cycle.
pub const DEFAULT_RETRY_BACKOFF_SECS: u64 = 10;
/// Default deadline for each collaborator call.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 5;

/// Timing knobs for the synchronization loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexerConfig {
    /// Sleep between cycles when the map is caught up with the log.
    pub poll_interval: Duration,
    /// Sleep before retrying a failed cycle.
    pub retry_backoff: Duration,
    /// Deadline for each individual log or map call.
    pub call_timeout: Duration,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            retry_backoff: Duration::from_secs(DEFAULT_RETRY_BACKOFF_SECS),
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }
}

impl IndexerConfig {
    /// Load from environment variables.
    ///
    /// - `ATTIX_POLL_INTERVAL_SECS` (default: 10)
    /// - `ATTIX_RETRY_BACKOFF_SECS` (default: 10)
    /// - `ATTIX_CALL_TIMEOUT_SECS` (default: 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            poll_interval: Duration::from_secs(env_parse(
                "ATTIX_POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            )?),
            retry_backoff: Duration::from_secs(env_parse(
                "ATTIX_RETRY_BACKOFF_SECS",
                DEFAULT_RETRY_BACKOFF_SECS,
            )?),
            call_timeout: Duration::from_secs(env_parse(
                "ATTIX_CALL_TIMEOUT_SECS",
                DEFAULT_CALL_TIMEOUT_SECS,
            )?),
        })
    }
}

/// Read the map's verification key from `ATTIX_MAP_PUBLIC_KEY` (hex).
pub fn map_public_key_from_env() -> Result<Ed25519PublicKey, ConfigError> {
    let raw = std::env::var("ATTIX_MAP_PUBLIC_KEY")
        .map_err(|_| ConfigError::Missing("ATTIX_MAP_PUBLIC_KEY"))?;
    raw.parse()
        .map_err(|_| ConfigError::Invalid("ATTIX_MAP_PUBLIC_KEY", raw.clone()))
}
