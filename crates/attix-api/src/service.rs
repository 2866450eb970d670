//! # Query Service
//!
//! The operations behind the HTTP routes. Handlers stay thin and delegate
//! here; everything a handler returns to a client has been checked against
//! the collaborators' own commitments first.
//!
//! ## Security Invariant
//!
//! An entry is only reported with a proof after the proof verified against
//! the log root fetched in the same request. A digest lookup only trusts a
//! map whose latest root verified under the configured map key, and only
//! returns a payload that actually attests the requested digest.

use std::fmt;
use std::sync::Arc;

use attix_client::{ClientError, LogService, MapService};
use attix_core::{extract_keys, Digest, InclusionProof, LogEntry, LogRoot};
use attix_crypto::{leaf_hash, root, verify_inclusion, Ed25519PublicKey};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A log entry together with its verified inclusion proof, when available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryView {
    pub entry: LogEntry,
    /// Present only after the proof verified against `proof.root`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<VerifiedProof>,
    /// The entry is sequenced but the published root does not cover it yet.
    pub proof_pending: bool,
}

/// An inclusion proof and the root it verified against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedProof {
    pub root: LogRoot,
    pub inclusion: InclusionProof,
}

/// Ingestion and query operations over the log and map collaborators.
#[derive(Clone)]
pub struct QueryService {
    log: Arc<dyn LogService>,
    map: Arc<dyn MapService>,
    map_public_key: Ed25519PublicKey,
}

impl fmt::Debug for QueryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryService")
            .field("map_public_key", &self.map_public_key)
            .finish_non_exhaustive()
    }
}

impl QueryService {
    pub fn new(
        log: Arc<dyn LogService>,
        map: Arc<dyn MapService>,
        map_public_key: Ed25519PublicKey,
    ) -> Self {
        Self {
            log,
            map,
            map_public_key,
        }
    }

    /// The log collaborator, for readiness checks.
    pub fn log(&self) -> &Arc<dyn LogService> {
        &self.log
    }

    /// Append `payload` to the log. Acceptance is not inclusion: the entry
    /// may not be covered by a published root yet.
    pub async fn add(&self, payload: &[u8]) -> Result<i64, AppError> {
        if payload.is_empty() {
            return Err(AppError::BadRequest("payload is empty".to_string()));
        }
        let index = self.log.append(payload).await?;
        tracing::info!(index, bytes = payload.len(), "appended attestation");
        Ok(index)
    }

    /// Fetch the entry at `index`, with a verified proof when `with_proof`.
    pub async fn get_by_index(&self, index: i64, with_proof: bool) -> Result<EntryView, AppError> {
        if index < 0 {
            return Err(AppError::BadRequest(format!("negative log index {index}")));
        }
        let entry = self.log.get_by_index(index).await?;
        check_entry(&entry, index)?;

        if !with_proof {
            return Ok(EntryView {
                entry,
                proof: None,
                proof_pending: false,
            });
        }

        let root = self.log.get_root().await?;
        if !root.covers(index) {
            tracing::debug!(index, tree_size = root.tree_size, "entry not yet covered by root");
            return Ok(EntryView {
                entry,
                proof: None,
                proof_pending: true,
            });
        }
        let proof = self.prove(&entry.value, root).await?;
        Ok(EntryView {
            entry,
            proof: Some(proof),
            proof_pending: false,
        })
    }

    /// Every entry whose value equals `payload`, each proven against the
    /// current root where the root covers it.
    pub async fn get_by_payload(&self, payload: &[u8]) -> Result<Vec<EntryView>, AppError> {
        let hash = leaf_hash(payload);
        let entries = self.log.get_by_leaf_hash(&hash).await?;
        if entries.is_empty() {
            return Err(AppError::NotFound(format!("no entry with leaf hash {hash}")));
        }

        let root = self.log.get_root().await?;
        let mut proof = None;
        let mut views = Vec::with_capacity(entries.len());
        for entry in entries {
            check_entry(&entry, entry.index)?;
            if entry.value != payload {
                return Err(AppError::Integrity(format!(
                    "entry {} returned for leaf hash {hash} holds a different value",
                    entry.index
                )));
            }
            if !root.covers(entry.index) {
                views.push(EntryView {
                    entry,
                    proof: None,
                    proof_pending: true,
                });
                continue;
            }
            // Identical values share a leaf hash, so one proof serves them all.
            if proof.is_none() {
                proof = Some(self.prove(payload, root).await?);
            }
            views.push(EntryView {
                entry,
                proof: proof.clone(),
                proof_pending: false,
            });
        }
        Ok(views)
    }

    /// Resolve an artifact digest to the log entry that last attested it.
    pub async fn lookup_by_hash(&self, digest: &Digest) -> Result<LogEntry, AppError> {
        let signed = self.map.get_latest_revision().await?;
        let revision = root::verify(&signed, &self.map_public_key)?;

        let mapped = self
            .map
            .get_by_key(digest)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("digest {digest} is not indexed")))?;
        if mapped.key != *digest {
            return Err(AppError::Integrity(format!(
                "map answered {digest} with key {}",
                mapped.key
            )));
        }
        let index = mapped.log_index()?;

        let entry = self
            .log
            .get_by_index(index)
            .await
            .map_err(|e| match e {
                ClientError::NotFound { .. } => AppError::Integrity(format!(
                    "map points {digest} at log index {index}, which the log does not hold"
                )),
                other => AppError::from(other),
            })?;
        check_entry(&entry, index)?;
        let attested = extract_keys(&entry.value).map_err(|e| {
            AppError::Integrity(format!("map points {digest} at entry {index}: {e}"))
        })?;
        if !attested.contains(digest) {
            return Err(AppError::Integrity(format!(
                "map points {digest} at entry {index}, which does not attest it"
            )));
        }

        tracing::debug!(%digest, index, revision = revision.revision, "resolved digest");
        Ok(entry)
    }

    async fn prove(&self, value: &[u8], root: LogRoot) -> Result<VerifiedProof, AppError> {
        let inclusion = self
            .log
            .get_inclusion_proof(&leaf_hash(value), root.tree_size)
            .await
            .map_err(|e| match e {
                // Callers only prove entries the root covers.
                ClientError::NotFound { .. } => AppError::Integrity(format!(
                    "log has no inclusion proof at tree size {} for an entry it covers",
                    root.tree_size
                )),
                other => AppError::from(other),
            })?;
        verify_inclusion(value, &inclusion, root.tree_size, &root.root_hash)?;
        Ok(VerifiedProof { root, inclusion })
    }
}

/// The log answered for `index` with a self-consistent record.
fn check_entry(entry: &LogEntry, index: i64) -> Result<(), AppError> {
    if entry.index != index {
        return Err(AppError::Integrity(format!(
            "asked for log index {index}, got {}",
            entry.index
        )));
    }
    if entry.leaf_hash != leaf_hash(&entry.value) {
        return Err(AppError::Integrity(format!(
            "leaf hash of entry {index} does not match its value"
        )));
    }
    Ok(())
}
