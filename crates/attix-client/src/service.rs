//! Collaborator contracts.
//!
//! The indexer and the query surface depend only on these traits. HTTP
//! clients, in-memory doubles, and anything else that speaks the contract
//! are interchangeable behind `Arc<dyn LogService>` / `Arc<dyn MapService>`.

use async_trait::async_trait;
use attix_core::{Digest, InclusionProof, LogEntry, LogRoot, MapEntry, SignedMapRoot};

use crate::error::ClientError;

/// The append-only, Merkle-authenticated log.
#[async_trait]
pub trait LogService: Send + Sync {
    /// Queue `value` for inclusion. Returns the assigned index; acceptance
    /// is not proof of inclusion.
    async fn append(&self, value: &[u8]) -> Result<i64, ClientError>;

    /// Fetch the sequenced entry at `index`.
    async fn get_by_index(&self, index: i64) -> Result<LogEntry, ClientError>;

    /// Fetch every sequenced entry whose leaf hash is `leaf_hash`.
    async fn get_by_leaf_hash(&self, leaf_hash: &Digest) -> Result<Vec<LogEntry>, ClientError>;

    /// The latest published root.
    async fn get_root(&self) -> Result<LogRoot, ClientError>;

    /// Audit path for `leaf_hash` in the tree of `tree_size` leaves.
    async fn get_inclusion_proof(
        &self,
        leaf_hash: &Digest,
        tree_size: i64,
    ) -> Result<InclusionProof, ClientError>;

    /// Number of sequenced entries.
    async fn get_sequenced_count(&self) -> Result<i64, ClientError>;
}

/// The versioned, signed key/value map.
#[async_trait]
pub trait MapService: Send + Sync {
    /// The signed root of the latest revision. Unauthenticated.
    async fn get_latest_revision(&self) -> Result<SignedMapRoot, ClientError>;

    /// Commit `entries` and `metadata` as revision `revision`.
    ///
    /// Rejected with [`ClientError::StaleRevision`] unless `revision` is
    /// exactly one past the map's current revision.
    async fn set_leaves(
        &self,
        entries: Vec<MapEntry>,
        metadata: Vec<u8>,
        revision: u64,
    ) -> Result<(), ClientError>;

    /// Read the entry stored under `key` at the latest revision.
    async fn get_by_key(&self, key: &Digest) -> Result<Option<MapEntry>, ClientError>;
}
