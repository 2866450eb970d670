//! # attix-indexer: Log to Map Synchronization Engine
//!
//! Keeps the digest → log-index map in step with the append-only log. One
//! log entry is folded per map revision; the only progress marker is the
//! watermark inside the map's signed metadata.
//!
//! ## Usage
//!
//! ```ignore
//! let ctx = IndexerContext::new(log, map, map_public_key, IndexerConfig::from_env()?);
//! let shutdown = CancellationToken::new();
//! let handle = tokio::spawn(Indexer::new(ctx).run(shutdown.clone()));
//! // ...
//! shutdown.cancel();
//! let stats = handle.await?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod indexer;

pub use config::{map_public_key_from_env, IndexerConfig};
pub use context::IndexerContext;
pub use error::IndexerError;
pub use indexer::{CycleOutcome, Indexer, IndexerState, IndexerStats};
