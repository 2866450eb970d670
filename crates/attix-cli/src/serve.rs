//! # Serve Subcommand
//!
//! Runs the query API against remote log and map services until CTRL+C or
//! SIGTERM.

use std::net::SocketAddr;

use anyhow::Context;
use attix_api::server::{serve, shutdown_signal};
use attix_api::{AppConfig, AppState};
use clap::Args;
use tokio_util::sync::CancellationToken;

use crate::collaborators::CollaboratorArgs;

/// Arguments for `attix serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on [env: PORT, default 3000].
    #[arg(long)]
    pub port: Option<u16>,

    #[command(flatten)]
    pub collaborators: CollaboratorArgs,
}

pub async fn run_serve(args: &ServeArgs) -> anyhow::Result<u8> {
    let mut config = AppConfig::from_env().context("loading API configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }

    let (log, map) = args.collaborators.services()?;
    let key = args.collaborators.map_public_key()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::with_config(config, log, map, key);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    serve(attix_api::app(state), addr, shutdown)
        .await
        .with_context(|| format!("serving on {addr}"))?;
    Ok(0)
}
