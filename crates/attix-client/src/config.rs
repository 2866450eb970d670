//! Collaborator client configuration.
//!
//! Base URLs for the log and map services, the map tree identifier, and the
//! per-request timeout. Loaded from the environment; any field can be
//! overridden after loading.

use url::Url;

/// Default log service URL when `ATTIX_LOG_URL` is unset.
pub const DEFAULT_LOG_URL: &str = "http://127.0.0.1:8090";
/// Default map service URL when `ATTIX_MAP_URL` is unset.
pub const DEFAULT_MAP_URL: &str = "http://127.0.0.1:8091";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the log and map services.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the append-only log service.
    pub log_url: Url,
    /// Base URL of the versioned map service.
    pub map_url: Url,
    /// Identifier of the map tree.
    pub map_id: i64,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ATTIX_LOG_URL` (default: `http://127.0.0.1:8090`)
    /// - `ATTIX_MAP_URL` (default: `http://127.0.0.1:8091`)
    /// - `ATTIX_MAP_ID` (required)
    /// - `ATTIX_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_map_id(None)
    }

    /// Like [`ClientConfig::from_env`], but an explicit `map_id` wins over
    /// `ATTIX_MAP_ID`, which is then no longer required.
    pub fn from_env_with_map_id(map_id: Option<i64>) -> Result<Self, ConfigError> {
        let map_id = match map_id {
            Some(id) => id,
            None => {
                let raw = std::env::var("ATTIX_MAP_ID")
                    .map_err(|_| ConfigError::Missing("ATTIX_MAP_ID"))?;
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("ATTIX_MAP_ID", raw.clone()))?
            }
        };

        Ok(Self {
            log_url: env_url("ATTIX_LOG_URL", DEFAULT_LOG_URL)?,
            map_url: env_url("ATTIX_MAP_URL", DEFAULT_MAP_URL)?,
            map_id,
            timeout_secs: env_parse("ATTIX_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        })
    }

    /// Configuration pointing both services at local ports (for testing).
    pub fn local(log_port: u16, map_port: u16, map_id: i64) -> Result<Self, ConfigError> {
        let make_url = |port: u16| -> Result<Url, ConfigError> {
            Url::parse(&format!("http://127.0.0.1:{port}"))
                .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))
        };
        Ok(Self {
            log_url: make_url(log_port)?,
            map_url: make_url(map_port)?,
            map_id,
            timeout_secs: 5,
        })
    }
}

/// Read a URL from `var`, falling back to `default`.
pub fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Parse `var` if set, falling back to `default`. A set but unparsable
/// value is an error rather than a silent default.
pub fn env_parse<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(var, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
