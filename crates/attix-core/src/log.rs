//! # Log Records
//!
//! Records produced by the append-only log collaborator. All are immutable
//! once the log has assigned them.

use serde::{Deserialize, Serialize};

use crate::digest::{hex_bytes, Digest};

/// A sequenced leaf of the append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position assigned monotonically by the log.
    pub index: i64,
    /// The raw attestation payload.
    #[serde(with = "hex_bytes")]
    pub value: Vec<u8>,
    /// Domain-separated leaf hash of `value`.
    pub leaf_hash: Digest,
}

/// A root of the log's Merkle tree at a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRoot {
    /// Number of leaves covered by `root_hash`.
    pub tree_size: i64,
    /// Merkle root over the first `tree_size` leaves.
    pub root_hash: Digest,
}

impl LogRoot {
    /// Whether this root covers the leaf at `index`.
    pub fn covers(&self, index: i64) -> bool {
        index >= 0 && index < self.tree_size
    }
}

/// A Merkle audit path for one leaf in a tree of a stated size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// Index of the proven leaf.
    pub leaf_index: i64,
    /// Size of the tree the path was computed in.
    pub tree_size: i64,
    /// Sibling hashes, leaf level first.
    pub audit_path: Vec<Digest>,
}
