//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set. Otherwise the level follows the `-v` count:
//! none is `info`, `-v` is `debug`, `-vv` and beyond is `trace`. Output is
//! human-readable unless `ATTIX_LOG_FORMAT=json`.

use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Read `ATTIX_LOG_FORMAT`; anything other than `json` is text.
    pub fn from_env() -> Self {
        match std::env::var("ATTIX_LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Filter directive for a verbosity count.
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
pub fn init(verbose: u8, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbose)));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init(),
    }
}
