//! Indexer error types.
//!
//! Every variant aborts the current cycle without advancing the watermark.
//! The run loop logs it and retries after `retry_backoff`.

use std::time::Duration;

use attix_client::{ClientError, ConfigError};
use attix_core::{CanonicalizationError, CryptoError, WatermarkError};

/// Errors from a synchronization cycle.
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    /// A collaborator call failed.
    #[error("{op} failed: {source}")]
    Client {
        op: &'static str,
        #[source]
        source: ClientError,
    },

    /// A collaborator call exceeded its deadline.
    #[error("{op} did not complete within {after:?}")]
    Timeout { op: &'static str, after: Duration },

    /// The map root failed authentication. Its metadata was not read.
    #[error("map root rejected: {0}")]
    Authentication(#[from] CryptoError),

    /// The authenticated watermark could not be decoded.
    #[error("watermark unreadable: {0}")]
    Watermark(#[from] WatermarkError),

    /// The log returned data inconsistent with what was asked for.
    #[error("log integrity violation: {0}")]
    Integrity(String),

    /// The new watermark could not be encoded.
    #[error("watermark encoding failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl IndexerError {
    /// Whether the map rejected the write because another writer got there
    /// first.
    pub fn is_stale_revision(&self) -> bool {
        matches!(
            self,
            IndexerError::Client {
                source: ClientError::StaleRevision { .. },
                ..
            }
        )
    }

    /// Whether the failure came from map-root authentication.
    pub fn is_authentication(&self) -> bool {
        matches!(self, IndexerError::Authentication(_))
    }
}
