//! Flags shared by every subcommand that talks to the log and map services.
//!
//! Environment variables are read first; a flag given on the command line
//! overrides the corresponding variable.

use std::sync::Arc;

use anyhow::Context;
use attix_client::{ClientConfig, HttpCollaborators, LogService, MapService};
use attix_crypto::Ed25519PublicKey;
use attix_indexer::map_public_key_from_env;
use clap::Args;
use url::Url;

#[derive(Args, Debug, Clone, Default)]
pub struct CollaboratorArgs {
    /// Base URL of the log service [env: ATTIX_LOG_URL].
    #[arg(long)]
    pub log_url: Option<Url>,

    /// Base URL of the map service [env: ATTIX_MAP_URL].
    #[arg(long)]
    pub map_url: Option<Url>,

    /// Map tree identifier [env: ATTIX_MAP_ID].
    #[arg(long)]
    pub map_id: Option<i64>,

    /// Hex Ed25519 key the map's roots are signed with [env: ATTIX_MAP_PUBLIC_KEY].
    #[arg(long)]
    pub map_public_key: Option<Ed25519PublicKey>,

    /// Per-request timeout in seconds [env: ATTIX_TIMEOUT_SECS].
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl CollaboratorArgs {
    /// Environment configuration with flag overrides applied.
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = ClientConfig::from_env_with_map_id(self.map_id)
            .context("loading collaborator configuration")?;
        if let Some(url) = &self.log_url {
            config.log_url = url.clone();
        }
        if let Some(url) = &self.map_url {
            config.map_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        Ok(config)
    }

    /// The key map roots must verify under.
    pub fn map_public_key(&self) -> anyhow::Result<Ed25519PublicKey> {
        match self.map_public_key {
            Some(key) => Ok(key),
            None => map_public_key_from_env().context("loading map public key"),
        }
    }

    /// HTTP clients for both collaborators.
    pub fn services(&self) -> anyhow::Result<(Arc<dyn LogService>, Arc<dyn MapService>)> {
        let config = self.client_config()?;
        tracing::info!(
            log_url = %config.log_url,
            map_url = %config.map_url,
            map_id = config.map_id,
            "connecting to collaborators"
        );
        let clients = HttpCollaborators::new(config).context("building HTTP clients")?;
        Ok(clients.into_services())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_environment() {
        let args = CollaboratorArgs {
            log_url: Some(Url::parse("http://log.internal:7000").unwrap()),
            map_url: None,
            map_id: Some(9),
            map_public_key: None,
            timeout_secs: Some(2),
        };
        let config = args.client_config().unwrap();
        assert_eq!(config.log_url.as_str(), "http://log.internal:7000/");
        assert_eq!(config.map_id, 9);
        assert_eq!(config.timeout_secs, 2);
    }

    #[test]
    fn explicit_key_skips_environment() {
        let key = attix_crypto::Ed25519KeyPair::from_seed(&[3u8; 32]).public_key();
        let args = CollaboratorArgs {
            map_public_key: Some(key),
            ..CollaboratorArgs::default()
        };
        assert_eq!(args.map_public_key().unwrap(), key);
    }
}
