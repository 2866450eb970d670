//! # In-Memory Collaborators
//!
//! `MemoryLog` and `MemoryMap` implement the collaborator contracts entirely
//! in process. They back the test suites and `attix dev`; they are not
//! storage engines. Roots and proofs are recomputed naively over the full
//! leaf list on every call.
//!
//! Both support fault injection per operation, so tests can fail a specific
//! call a given number of times. `MemoryMap` also records every accepted
//! write and can be told to serve a forged root.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::time::Duration;

use async_trait::async_trait;
use attix_core::{Digest, InclusionProof, LogEntry, LogRoot, MapEntry, SignedMapRoot};
use attix_crypto::merkle::{inclusion_proof, leaf_hash, merkle_root};
use attix_crypto::{Ed25519PublicKey, MapRootSigner};
use parking_lot::Mutex;

use crate::error::ClientError;
use crate::service::{LogService, MapService};

/// Log operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogOp {
    Append,
    GetByIndex,
    GetByLeafHash,
    GetRoot,
    GetInclusionProof,
    GetSequencedCount,
}

/// Map operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapOp {
    GetLatestRevision,
    SetLeaves,
    GetByKey,
}

#[derive(Debug)]
struct FaultPlan<K> {
    pending: Mutex<HashMap<K, u32>>,
    latency: Mutex<Option<Duration>>,
}

impl<K> Default for FaultPlan<K> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            latency: Mutex::new(None),
        }
    }
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> FaultPlan<K> {
    fn inject(&self, op: K, times: u32) {
        self.pending.lock().insert(op, times);
    }

    async fn enter(&self, service: &str, op: K) -> Result<(), ClientError> {
        let latency = *self.latency.lock();
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        let mut pending = self.pending.lock();
        match pending.get_mut(&op) {
            Some(n) if *n > 0 => {
                *n -= 1;
                Err(ClientError::Unavailable {
                    endpoint: format!("{service}.{op:?}"),
                    reason: "injected fault".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryLog
// ---------------------------------------------------------------------------

/// An append-only log held in a vector.
///
/// Every appended leaf is sequenced immediately. Duplicate values are
/// allowed and receive distinct indices.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
    pinned_root_size: Mutex<Option<i64>>,
    faults: FaultPlan<LogOp>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` calls of `op` with [`ClientError::Unavailable`].
    pub fn fail_next(&self, op: LogOp, times: u32) {
        self.faults.inject(op, times);
    }

    /// Delay every call by `latency`. `None` removes the delay.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.faults.latency.lock() = latency;
    }

    /// Serve roots for at most `size` leaves, as if publication lagged
    /// behind sequencing. `None` publishes every leaf.
    pub fn pin_root(&self, size: Option<i64>) {
        *self.pinned_root_size.lock() = size;
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn leaf_hashes(entries: &[LogEntry]) -> Vec<Digest> {
        entries.iter().map(|e| e.leaf_hash).collect()
    }
}

#[async_trait]
impl LogService for MemoryLog {
    async fn append(&self, value: &[u8]) -> Result<i64, ClientError> {
        self.faults.enter("log", LogOp::Append).await?;
        let mut entries = self.entries.lock();
        let index = entries.len() as i64;
        entries.push(LogEntry {
            index,
            value: value.to_vec(),
            leaf_hash: leaf_hash(value),
        });
        tracing::debug!(index, "memory log appended leaf");
        Ok(index)
    }

    async fn get_by_index(&self, index: i64) -> Result<LogEntry, ClientError> {
        self.faults.enter("log", LogOp::GetByIndex).await?;
        let entries = self.entries.lock();
        usize::try_from(index)
            .ok()
            .and_then(|i| entries.get(i))
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                endpoint: format!("log.get_by_index({index})"),
            })
    }

    async fn get_by_leaf_hash(&self, leaf_hash: &Digest) -> Result<Vec<LogEntry>, ClientError> {
        self.faults.enter("log", LogOp::GetByLeafHash).await?;
        Ok(self
            .entries
            .lock()
            .iter()
            .filter(|e| &e.leaf_hash == leaf_hash)
            .cloned()
            .collect())
    }

    async fn get_root(&self) -> Result<LogRoot, ClientError> {
        self.faults.enter("log", LogOp::GetRoot).await?;
        let entries = self.entries.lock();
        let mut size = entries.len();
        if let Some(pinned) = *self.pinned_root_size.lock() {
            size = size.min(usize::try_from(pinned).unwrap_or(0));
        }
        Ok(LogRoot {
            tree_size: size as i64,
            root_hash: merkle_root(&Self::leaf_hashes(&entries[..size])),
        })
    }

    async fn get_inclusion_proof(
        &self,
        leaf_hash: &Digest,
        tree_size: i64,
    ) -> Result<InclusionProof, ClientError> {
        self.faults.enter("log", LogOp::GetInclusionProof).await?;
        let entries = self.entries.lock();
        let endpoint = || format!("log.get_inclusion_proof({leaf_hash}, {tree_size})");
        let size = usize::try_from(tree_size)
            .ok()
            .filter(|s| *s > 0 && *s <= entries.len())
            .ok_or_else(|| ClientError::Api {
                endpoint: endpoint(),
                status: 400,
                body: format!("tree_size {tree_size} out of range"),
            })?;

        let hashes = Self::leaf_hashes(&entries[..size]);
        let index = hashes
            .iter()
            .position(|h| h == leaf_hash)
            .ok_or_else(|| ClientError::NotFound { endpoint: endpoint() })?;
        let audit_path = inclusion_proof(&hashes, index).map_err(|e| ClientError::Api {
            endpoint: endpoint(),
            status: 500,
            body: e.to_string(),
        })?;

        Ok(InclusionProof {
            leaf_index: index as i64,
            tree_size,
            audit_path,
        })
    }

    async fn get_sequenced_count(&self) -> Result<i64, ClientError> {
        self.faults.enter("log", LogOp::GetSequencedCount).await?;
        Ok(self.entries.lock().len() as i64)
    }
}

// ---------------------------------------------------------------------------
// MemoryMap
// ---------------------------------------------------------------------------

/// One accepted `set_leaves` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapWrite {
    pub revision: u64,
    pub entries: Vec<MapEntry>,
    pub metadata: Vec<u8>,
}

#[derive(Debug)]
struct MapState {
    leaves: BTreeMap<Digest, Vec<u8>>,
    latest: SignedMapRoot,
    writes: Vec<MapWrite>,
    forged: Option<SignedMapRoot>,
}

/// A versioned key/value map that signs each revision's root.
///
/// Starts at revision 0 with no leaves and empty metadata.
#[derive(Debug)]
pub struct MemoryMap {
    signer: MapRootSigner,
    state: Mutex<MapState>,
    faults: FaultPlan<MapOp>,
}

impl MemoryMap {
    /// Create an empty map signed by `signer`.
    pub fn new(signer: MapRootSigner) -> Result<Self, ClientError> {
        let leaves = BTreeMap::new();
        let latest = sign_root(&signer, 0, &leaves, Vec::new())?;
        Ok(Self {
            signer,
            state: Mutex::new(MapState {
                leaves,
                latest,
                writes: Vec::new(),
                forged: None,
            }),
            faults: FaultPlan::default(),
        })
    }

    /// The key readers must verify roots against.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.signer.public_key()
    }

    /// Fail the next `times` calls of `op` with [`ClientError::Unavailable`].
    pub fn fail_next(&self, op: MapOp, times: u32) {
        self.faults.inject(op, times);
    }

    /// Delay every call by `latency`. `None` removes the delay.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.faults.latency.lock() = latency;
    }

    /// Serve `root` from `get_latest_revision` instead of the genuine one.
    /// `None` restores the genuine root.
    pub fn serve_forged_root(&self, root: Option<SignedMapRoot>) {
        self.state.lock().forged = root;
    }

    /// The genuine latest root.
    pub fn latest_root(&self) -> SignedMapRoot {
        self.state.lock().latest.clone()
    }

    /// Every write accepted so far, oldest first.
    pub fn writes(&self) -> Vec<MapWrite> {
        self.state.lock().writes.clone()
    }

    /// Number of keys currently mapped.
    pub fn key_count(&self) -> usize {
        self.state.lock().leaves.len()
    }
}

fn sign_root(
    signer: &MapRootSigner,
    revision: u64,
    leaves: &BTreeMap<Digest, Vec<u8>>,
    metadata: Vec<u8>,
) -> Result<SignedMapRoot, ClientError> {
    let hashes: Vec<Digest> = leaves
        .iter()
        .map(|(k, v)| {
            let mut leaf = k.as_bytes().to_vec();
            leaf.extend_from_slice(v);
            leaf_hash(&leaf)
        })
        .collect();
    signer
        .sign(revision, merkle_root(&hashes), metadata)
        .map_err(|e| ClientError::Unavailable {
            endpoint: "map.sign_root".to_string(),
            reason: e.to_string(),
        })
}

#[async_trait]
impl MapService for MemoryMap {
    async fn get_latest_revision(&self) -> Result<SignedMapRoot, ClientError> {
        self.faults.enter("map", MapOp::GetLatestRevision).await?;
        let state = self.state.lock();
        Ok(state.forged.clone().unwrap_or_else(|| state.latest.clone()))
    }

    async fn set_leaves(
        &self,
        entries: Vec<MapEntry>,
        metadata: Vec<u8>,
        revision: u64,
    ) -> Result<(), ClientError> {
        self.faults.enter("map", MapOp::SetLeaves).await?;
        let mut state = self.state.lock();
        let current = state.latest.revision;
        if revision != current + 1 {
            return Err(ClientError::StaleRevision {
                attempted: revision,
                detail: format!("current revision is {current}"),
            });
        }

        let mut leaves = state.leaves.clone();
        for entry in &entries {
            leaves.insert(entry.key, entry.value.clone());
        }
        let latest = sign_root(&self.signer, revision, &leaves, metadata.clone())?;

        state.leaves = leaves;
        state.latest = latest;
        state.writes.push(MapWrite {
            revision,
            entries,
            metadata,
        });
        tracing::debug!(revision, "memory map committed revision");
        Ok(())
    }

    async fn get_by_key(&self, key: &Digest) -> Result<Option<MapEntry>, ClientError> {
        self.faults.enter("map", MapOp::GetByKey).await?;
        Ok(self.state.lock().leaves.get(key).map(|value| MapEntry {
            key: *key,
            value: value.clone(),
        }))
    }
}
