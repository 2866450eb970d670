//! # attix CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, and
//! dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use attix_cli::dev::{run_dev, DevArgs};
use attix_cli::keygen::{run_keygen, KeygenArgs};
use attix_cli::mapper::{run_mapper, MapperArgs};
use attix_cli::serve::{run_serve, ServeArgs};
use attix_cli::telemetry::{self, LogFormat};

/// attix: a verifiable attestation log with a digest index.
#[derive(Parser, Debug)]
#[command(name = "attix", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the query API.
    Serve(ServeArgs),

    /// Run the log-to-map indexer.
    Mapper(MapperArgs),

    /// Run the API and indexer in one process over in-memory services.
    Dev(DevArgs),

    /// Generate a map signing key.
    Keygen(KeygenArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init(cli.verbose, LogFormat::from_env());

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "attix starting");

    let result = match &cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Mapper(args) => run_mapper(args).await,
        Commands::Dev(args) => run_dev(args).await,
        Commands::Keygen(args) => run_keygen(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
