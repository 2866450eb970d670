//! # Mapper Subcommand
//!
//! Runs the log-to-map indexer against remote services. With `--once` it
//! folds entries until the map is caught up and exits; otherwise it polls
//! until CTRL+C or SIGTERM.

use std::time::Duration;

use anyhow::Context;
use attix_api::server::shutdown_signal;
use attix_indexer::{Indexer, IndexerConfig, IndexerContext};
use clap::Args;
use tokio_util::sync::CancellationToken;

use crate::collaborators::CollaboratorArgs;

/// Arguments for `attix mapper`.
#[derive(Args, Debug)]
pub struct MapperArgs {
    /// Catch up with the log, then exit.
    #[arg(long)]
    pub once: bool,

    /// Seconds between cycles once caught up [env: ATTIX_POLL_INTERVAL_SECS].
    #[arg(long)]
    pub poll_interval_secs: Option<u64>,

    /// Seconds to wait after a failed cycle [env: ATTIX_RETRY_BACKOFF_SECS].
    #[arg(long)]
    pub retry_backoff_secs: Option<u64>,

    /// Deadline in seconds for each collaborator call [env: ATTIX_CALL_TIMEOUT_SECS].
    #[arg(long)]
    pub call_timeout_secs: Option<u64>,

    #[command(flatten)]
    pub collaborators: CollaboratorArgs,
}

impl MapperArgs {
    /// Environment timing with flag overrides applied.
    pub fn indexer_config(&self) -> anyhow::Result<IndexerConfig> {
        let mut config = IndexerConfig::from_env().context("loading indexer configuration")?;
        if let Some(secs) = self.poll_interval_secs {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.retry_backoff_secs {
            config.retry_backoff = Duration::from_secs(secs);
        }
        if let Some(secs) = self.call_timeout_secs {
            config.call_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

pub async fn run_mapper(args: &MapperArgs) -> anyhow::Result<u8> {
    let (log, map) = args.collaborators.services()?;
    let key = args.collaborators.map_public_key()?;
    let ctx = IndexerContext::new(log, map, key, args.indexer_config()?);
    let mut indexer = Indexer::new(ctx);

    if args.once {
        let advanced = indexer
            .catch_up(usize::MAX)
            .await
            .context("indexer cycle failed")?;
        tracing::info!(advanced, "map caught up with log");
        return Ok(0);
    }

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));
    let stats = indexer.run(shutdown).await;
    tracing::info!(
        advanced = stats.advanced,
        failures = stats.failures,
        "mapper exiting"
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_timing() {
        let args = MapperArgs {
            once: true,
            poll_interval_secs: Some(1),
            retry_backoff_secs: None,
            call_timeout_secs: Some(3),
            collaborators: CollaboratorArgs::default(),
        };
        let config = args.indexer_config().unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.call_timeout, Duration::from_secs(3));
    }
}
