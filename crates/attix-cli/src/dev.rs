//! # Dev Subcommand
//!
//! Single-process development mode: an in-memory log, an in-memory map
//! signed by a local key, the indexer, and the query API, all sharing one
//! shutdown token. Nothing survives a restart.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use attix_api::server::{serve, shutdown_signal};
use attix_api::{AppConfig, AppState};
use attix_client::{MemoryLog, MemoryMap};
use attix_crypto::{Ed25519KeyPair, MapRootSigner};
use attix_indexer::{Indexer, IndexerConfig, IndexerContext};
use clap::Args;
use tokio_util::sync::CancellationToken;

/// Map id used for the in-memory map.
const DEV_MAP_ID: i64 = 1;

/// Arguments for `attix dev`.
#[derive(Args, Debug)]
pub struct DevArgs {
    /// Port to listen on [env: PORT, default 3000].
    #[arg(long)]
    pub port: Option<u16>,

    /// Hex seed for the map signing key. A fresh key is generated if omitted.
    #[arg(long, env = "ATTIX_DEV_MAP_SEED", hide_env_values = true)]
    pub map_seed: Option<String>,

    /// Milliseconds between indexer cycles once caught up.
    #[arg(long, default_value_t = 500)]
    pub poll_interval_ms: u64,
}

/// The in-process collaborators and their wiring.
pub struct DevStack {
    pub log: Arc<MemoryLog>,
    pub map: Arc<MemoryMap>,
    pub state: AppState,
    pub indexer: Indexer,
}

impl DevStack {
    /// Build the stack around `key`.
    pub fn new(
        key: Ed25519KeyPair,
        config: AppConfig,
        poll_interval: Duration,
    ) -> anyhow::Result<Self> {
        let log = Arc::new(MemoryLog::new());
        let map = MemoryMap::new(MapRootSigner::new(DEV_MAP_ID, key))
            .context("signing genesis map root")?;
        let map = Arc::new(map);
        let public_key = map.public_key();

        let indexer_config = IndexerConfig {
            poll_interval,
            retry_backoff: poll_interval,
            ..IndexerConfig::default()
        };
        let ctx = IndexerContext::new(log.clone(), map.clone(), public_key, indexer_config);
        let state = AppState::with_config(config, log.clone(), map.clone(), public_key);

        Ok(Self {
            log,
            map,
            state,
            indexer: Indexer::new(ctx),
        })
    }
}

pub async fn run_dev(args: &DevArgs) -> anyhow::Result<u8> {
    let key = match &args.map_seed {
        Some(seed) => Ed25519KeyPair::from_seed_hex(seed).context("parsing --map-seed")?,
        None => Ed25519KeyPair::generate(),
    };
    let mut config = AppConfig::from_env().context("loading API configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    let stack = DevStack::new(key, config, Duration::from_millis(args.poll_interval_ms))?;
    tracing::info!(
        map_public_key = %stack.map.public_key(),
        "dev mode: in-memory log and map"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));
    let indexer = tokio::spawn(stack.indexer.run(shutdown.clone()));

    let served = serve(attix_api::app(stack.state), addr, shutdown.clone()).await;
    shutdown.cancel();
    let stats = indexer.await.context("indexer task panicked")?;
    tracing::info!(
        entries = stack.log.len(),
        keys = stack.map.key_count(),
        advanced = stats.advanced,
        "dev mode stopped"
    );

    served.with_context(|| format!("serving on {addr}"))?;
    Ok(0)
}
