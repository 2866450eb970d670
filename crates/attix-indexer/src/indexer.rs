//! # Log → Map Synchronization
//!
//! Each cycle reads the map's signed root, authenticates it, decodes the
//! watermark `L`, reads the log size `N`, and either reports caught-up
//! (`L >= N - 1`) or folds exactly one log entry (`L + 1`) into the map as a
//! new revision whose metadata carries the advanced watermark.
//!
//! ```text
//! Idle ──▶ FetchingState ──▶ CaughtUp ──(poll_interval)──▶ FetchingState
//!                │
//!                └────────▶ Advancing ──────────────────▶ FetchingState
//! ```
//!
//! ## Security Invariant
//!
//! The watermark is read only from a map root that verified under the
//! configured public key. A root that fails verification aborts the cycle
//! before anything in it is used.
//!
//! ## Crash Safety
//!
//! The indexer keeps no durable state of its own. A crash at any point
//! before the map accepts the write leaves the old watermark in place, and
//! the next cycle recomputes the identical mutation. Every write is tagged
//! with the revision it was derived from, so a concurrent writer's update
//! causes a stale-revision rejection rather than a lost update.

use std::collections::BTreeSet;
use std::future::Future;

use attix_client::ClientError;
use attix_core::{extract_keys, Digest, MapEntry, MapRevision, Watermark};
use attix_crypto::{leaf_hash, root};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::context::IndexerContext;
use crate::error::IndexerError;

/// Where the indexer is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexerState {
    /// Not inside a cycle (startup, or backing off after a failure).
    Idle,
    /// Reading the map root and log size.
    FetchingState,
    /// Nothing new; sleeping for `poll_interval`.
    CaughtUp,
    /// Folding one log entry into the map.
    Advancing,
}

/// Result of one successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The map already reflects every sequenced log entry.
    CaughtUp {
        watermark: Watermark,
        log_size: i64,
    },
    /// One log entry was committed as a new map revision.
    Advanced {
        log_index: i64,
        revision: u64,
        keys: usize,
    },
}

/// Counters kept across cycles for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexerStats {
    /// Cycles attempted.
    pub cycles: u64,
    /// Cycles that committed a revision.
    pub advanced: u64,
    /// Cycles that found nothing to do.
    pub caught_up: u64,
    /// Cycles that failed.
    pub failures: u64,
    /// Last authenticated watermark observed.
    pub last_watermark: Option<i64>,
}

/// The synchronization engine.
#[derive(Debug)]
pub struct Indexer {
    ctx: IndexerContext,
    state: IndexerState,
    stats: IndexerStats,
}

impl Indexer {
    pub fn new(ctx: IndexerContext) -> Self {
        Self {
            ctx,
            state: IndexerState::Idle,
            stats: IndexerStats::default(),
        }
    }

    /// Current position in the cycle.
    pub fn state(&self) -> IndexerState {
        self.state
    }

    /// Counters so far.
    pub fn stats(&self) -> IndexerStats {
        self.stats
    }

    /// Run one synchronization cycle.
    pub async fn run_once(&mut self) -> Result<CycleOutcome, IndexerError> {
        self.stats.cycles += 1;
        let result = self.cycle().await;
        match &result {
            Ok(CycleOutcome::Advanced { .. }) => self.stats.advanced += 1,
            Ok(CycleOutcome::CaughtUp { .. }) => self.stats.caught_up += 1,
            Err(_) => {
                self.stats.failures += 1;
                self.state = IndexerState::Idle;
            }
        }
        result
    }

    /// Run cycles until caught up or `max_cycles` have advanced. Returns the
    /// number of log entries folded in. Stops at the first failure.
    pub async fn catch_up(&mut self, max_cycles: usize) -> Result<usize, IndexerError> {
        let mut advanced = 0;
        while advanced < max_cycles {
            match self.run_once().await? {
                CycleOutcome::Advanced { .. } => advanced += 1,
                CycleOutcome::CaughtUp { .. } => break,
            }
        }
        Ok(advanced)
    }

    /// Loop until `shutdown` is cancelled. Cancellation is observed between
    /// cycles and during sleeps, never in the middle of a map write.
    pub async fn run(mut self, shutdown: CancellationToken) -> IndexerStats {
        info!(
            poll_interval = ?self.ctx.config.poll_interval,
            retry_backoff = ?self.ctx.config.retry_backoff,
            "indexer started"
        );

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let pause = match self.run_once().await {
                Ok(CycleOutcome::Advanced { .. }) => None,
                Ok(CycleOutcome::CaughtUp { .. }) => Some(self.ctx.config.poll_interval),
                Err(e) => {
                    if e.is_authentication() {
                        error!(error = %e, "refusing to act on unauthenticated map root");
                    } else {
                        warn!(error = %e, "indexer cycle failed, will retry");
                    }
                    Some(self.ctx.config.retry_backoff)
                }
            };

            if let Some(delay) = pause {
                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    () = shutdown.cancelled() => break,
                }
            }
        }

        self.state = IndexerState::Idle;
        info!(
            cycles = self.stats.cycles,
            advanced = self.stats.advanced,
            failures = self.stats.failures,
            "indexer stopped"
        );
        self.stats
    }

    async fn cycle(&mut self) -> Result<CycleOutcome, IndexerError> {
        self.state = IndexerState::FetchingState;

        let signed = self
            .call("map.get_latest_revision", self.ctx.map.get_latest_revision())
            .await?;
        let revision: MapRevision = root::verify(&signed, &self.ctx.map_public_key)?;
        let watermark = revision.watermark()?;
        self.stats.last_watermark = Some(watermark.last_processed_log_index);

        let log_size = self
            .call("log.get_sequenced_count", self.ctx.log.get_sequenced_count())
            .await?;
        if log_size < 0 {
            return Err(IndexerError::Integrity(format!(
                "log reported a negative size {log_size}"
            )));
        }

        if watermark.is_caught_up(log_size) {
            self.state = IndexerState::CaughtUp;
            debug!(
                watermark = watermark.last_processed_log_index,
                log_size, "map is caught up with log"
            );
            return Ok(CycleOutcome::CaughtUp {
                watermark,
                log_size,
            });
        }

        self.state = IndexerState::Advancing;
        let next = watermark.next_index();
        let entry = self.call("log.get_by_index", self.ctx.log.get_by_index(next)).await?;
        if entry.index != next {
            return Err(IndexerError::Integrity(format!(
                "asked for log index {next}, got {}",
                entry.index
            )));
        }
        if entry.leaf_hash != leaf_hash(&entry.value) {
            return Err(IndexerError::Integrity(format!(
                "leaf hash of entry {next} does not match its value"
            )));
        }

        let keys = keys_for_entry(next, &entry.value);
        let entries: Vec<MapEntry> = keys
            .iter()
            .map(|key| MapEntry::for_log_index(*key, next))
            .collect();
        let metadata = Watermark::at(next).encode()?;
        let new_revision = revision.revision + 1;

        self.call(
            "map.set_leaves",
            self.ctx.map.set_leaves(entries, metadata, new_revision),
        )
        .await?;

        self.stats.last_watermark = Some(next);
        info!(
            log_index = next,
            revision = new_revision,
            keys = keys.len(),
            "indexed log entry"
        );
        Ok(CycleOutcome::Advanced {
            log_index: next,
            revision: new_revision,
            keys: keys.len(),
        })
    }

    async fn call<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, IndexerError> {
        let after = self.ctx.config.call_timeout;
        match tokio::time::timeout(after, fut).await {
            Ok(result) => result.map_err(|source| IndexerError::Client { op, source }),
            Err(_) => Err(IndexerError::Timeout { op, after }),
        }
    }
}

/// Digests to index for one log entry. An unparsable payload is still
/// processed; it just contributes no keys.
fn keys_for_entry(log_index: i64, payload: &[u8]) -> BTreeSet<Digest> {
    match extract_keys(payload) {
        Ok(keys) => keys,
        Err(e) => {
            warn!(log_index, error = %e, "log entry is not an attestation, indexing no keys");
            BTreeSet::new()
        }
    }
}
