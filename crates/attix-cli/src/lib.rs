//! # attix-cli: The `attix` Command
//!
//! ## Subcommands
//!
//! - `attix serve`: query API against remote log and map services.
//! - `attix mapper`: log-to-map indexer (`--once` to catch up and exit).
//! - `attix dev`: API and indexer in one process over in-memory services.
//! - `attix keygen`: Ed25519 key for signing map roots.
//!
//! ```bash
//! ATTIX_MAP_ID=1 ATTIX_MAP_PUBLIC_KEY=... attix mapper --once
//! attix serve --port 8080 --map-id 1 --map-public-key ...
//! ```

pub mod collaborators;
pub mod dev;
pub mod keygen;
pub mod mapper;
pub mod serve;
pub mod telemetry;
