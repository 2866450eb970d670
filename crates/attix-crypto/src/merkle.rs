//! # Merkle Inclusion Proofs
//!
//! Binary Merkle tree over the log's leaves, hashed with domain separation:
//!
//! - Leaf: `SHA256(0x00 || value)`
//! - Node: `SHA256(0x01 || left || right)`
//!
//! The tree is built bottom-up. At each level adjacent nodes are paired
//! left to right; an unpaired last node is carried up to the next level
//! unchanged. This yields the same root as the RFC 6962 recursive split.
//!
//! ## Security Invariant
//!
//! [`verify_inclusion`] folds the entire audit path and rejects leftover or
//! missing entries. The final root comparison is constant-time. A failed
//! proof is a hard error and is never retried by callers.

use attix_core::{Digest, InclusionProof, ProofError};
use sha2::{Digest as _, Sha256};
use subtle::ConstantTimeEq;

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

/// Hash a leaf value: `SHA256(0x00 || value)`.
pub fn leaf_hash(value: &[u8]) -> Digest {
    let mut h = Sha256::new();
    h.update([LEAF_PREFIX]);
    h.update(value);
    Digest::from_bytes(h.finalize().into())
}

/// Hash two children: `SHA256(0x01 || left || right)`.
pub fn node_hash(left: &Digest, right: &Digest) -> Digest {
    let mut h = Sha256::new();
    h.update([NODE_PREFIX]);
    h.update(left.as_bytes());
    h.update(right.as_bytes());
    Digest::from_bytes(h.finalize().into())
}

/// Root over a list of leaf hashes. The empty tree hashes to `SHA256("")`.
pub fn merkle_root(leaf_hashes: &[Digest]) -> Digest {
    if leaf_hashes.is_empty() {
        return Digest::sha256(&[]);
    }
    let mut level = leaf_hashes.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }
    level[0]
}

/// Audit path for `leaf_hashes[index]`, leaf level first.
pub fn inclusion_proof(leaf_hashes: &[Digest], index: usize) -> Result<Vec<Digest>, ProofError> {
    if index >= leaf_hashes.len() {
        return Err(ProofError::InvalidIndex {
            leaf_index: index as i64,
            tree_size: leaf_hashes.len() as i64,
        });
    }
    let mut path = Vec::new();
    let mut level = leaf_hashes.to_vec();
    let mut i = index;
    while level.len() > 1 {
        let sibling = i ^ 1;
        if sibling < level.len() {
            path.push(level[sibling]);
        }
        level = next_level(&level);
        i /= 2;
    }
    Ok(path)
}

fn next_level(level: &[Digest]) -> Vec<Digest> {
    let mut pairs = level.chunks_exact(2);
    let mut next: Vec<Digest> = pairs.by_ref().map(|p| node_hash(&p[0], &p[1])).collect();
    next.extend_from_slice(pairs.remainder());
    next
}

/// Verify that `leaf_value` sits at `proof.leaf_index` in the tree of
/// `tree_size` leaves whose root is `root_hash`.
pub fn verify_inclusion(
    leaf_value: &[u8],
    proof: &InclusionProof,
    tree_size: i64,
    root_hash: &Digest,
) -> Result<(), ProofError> {
    verify_leaf_hash(&leaf_hash(leaf_value), proof, tree_size, root_hash)
}

/// Like [`verify_inclusion`], for a caller that already holds the leaf hash.
pub fn verify_leaf_hash(
    leaf: &Digest,
    proof: &InclusionProof,
    tree_size: i64,
    root_hash: &Digest,
) -> Result<(), ProofError> {
    let leaf_index = proof.leaf_index;
    if tree_size <= 0 || leaf_index < 0 || leaf_index >= tree_size || proof.tree_size != tree_size
    {
        return Err(ProofError::InvalidIndex {
            leaf_index,
            tree_size,
        });
    }
    let mismatch = |reason: &str| ProofError::Mismatch {
        leaf_index,
        tree_size,
        reason: reason.to_string(),
    };

    let mut path = proof.audit_path.iter();
    let mut hash = *leaf;
    let mut i = leaf_index;
    let mut last = tree_size - 1;
    while last > 0 {
        if i % 2 == 1 {
            let sibling = path.next().ok_or_else(|| mismatch("audit path too short"))?;
            hash = node_hash(sibling, &hash);
        } else if i < last {
            let sibling = path.next().ok_or_else(|| mismatch("audit path too short"))?;
            hash = node_hash(&hash, sibling);
        }
        i /= 2;
        last /= 2;
    }
    if path.next().is_some() {
        return Err(mismatch("audit path too long"));
    }
    if bool::from(hash.as_bytes().ct_eq(root_hash.as_bytes())) {
        Ok(())
    } else {
        Err(mismatch("recomputed root differs from claimed root"))
    }
}
