//! Everything a synchronization cycle needs, passed in explicitly.

use std::sync::Arc;

use attix_client::{LogService, MapService};
use attix_crypto::Ed25519PublicKey;

use crate::config::IndexerConfig;

/// Collaborators, trust anchor, and timing for the indexer.
#[derive(Clone)]
pub struct IndexerContext {
    /// The append-only log being indexed.
    pub log: Arc<dyn LogService>,
    /// The map holding the derived index and the watermark.
    pub map: Arc<dyn MapService>,
    /// Key the map's signed roots must verify under.
    pub map_public_key: Ed25519PublicKey,
    /// Timing knobs.
    pub config: IndexerConfig,
}

impl IndexerContext {
    pub fn new(
        log: Arc<dyn LogService>,
        map: Arc<dyn MapService>,
        map_public_key: Ed25519PublicKey,
        config: IndexerConfig,
    ) -> Self {
        Self {
            log,
            map,
            map_public_key,
            config,
        }
    }
}

impl std::fmt::Debug for IndexerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexerContext")
            .field("map_public_key", &self.map_public_key)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
