//! # Application State
//!
//! Shared state for the Axum application: the query service over the
//! collaborator clients, plus listener configuration.

use std::sync::Arc;

use attix_client::config::env_parse;
use attix_client::{ConfigError, LogService, MapService};
use attix_crypto::Ed25519PublicKey;

use crate::service::QueryService;

/// Default listen port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP listener on.
    pub port: u16,
}

impl AppConfig {
    /// Load from the environment (`PORT`, default 3000).
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: env_parse("PORT", DEFAULT_PORT)?,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Shared application state passed to all route handlers.
///
/// Cheap to clone: the collaborator clients sit behind `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub query: QueryService,
    pub config: AppConfig,
}

impl AppState {
    /// Create state over the given collaborators with the default config.
    pub fn new(
        log: Arc<dyn LogService>,
        map: Arc<dyn MapService>,
        map_public_key: Ed25519PublicKey,
    ) -> Self {
        Self::with_config(AppConfig::default(), log, map, map_public_key)
    }

    pub fn with_config(
        config: AppConfig,
        log: Arc<dyn LogService>,
        map: Arc<dyn MapService>,
        map_public_key: Ed25519PublicKey,
    ) -> Self {
        Self {
            query: QueryService::new(log, map, map_public_key),
            config,
        }
    }
}
