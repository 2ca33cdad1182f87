//! Logging setup using `tracing` and `tracing-subscriber`
//!
//! # Log Levels
//!
//! - `warn`: default; unreadable config files and similar
//! - `info`: workspace created, project submitted
//! - `debug`: every dispatched action, ingestion normalization
//! - `trace`: cascade decisions and URL resolution
//!
//! `PRODCFG_LOG` takes an `EnvFilter` directive and overrides `-v`. Logs go
//! to stderr so stdout stays pipeable.

use std::io;

use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Environment variable holding a filter directive
pub const LOG_ENV: &str = "PRODCFG_LOG";

/// Configuration for logging behavior
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    /// Include the module path in each line
    pub with_target: bool,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_target: false,
            with_ansi: console::colors_enabled_stderr(),
        }
    }
}

impl LogConfig {
    /// Map the `-v` count to a level
    ///
    /// - 0: warn
    /// - 1 (`-v`): info
    /// - 2 (`-vv`): debug
    /// - 3+ (`-vvv`): trace
    ///
    /// `--quiet` drops to errors only.
    #[must_use]
    pub fn from_verbosity(verbosity: u8, quiet: bool) -> Self {
        let level = match (quiet, verbosity) {
            (true, _) => Level::ERROR,
            (false, 0) => Level::WARN,
            (false, 1) => Level::INFO,
            (false, 2) => Level::DEBUG,
            (false, _) => Level::TRACE,
        };
        Self {
            level,
            with_target: verbosity >= 2,
            ..Default::default()
        }
    }
}

/// Install the global subscriber; fails if one is already set
pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target)
        .without_time();

    tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .try_init()
}

/// `PRODCFG_LOG` wins; otherwise our crate logs at `level`, others at warn
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,prodcfg={level}",
            level = level.as_str().to_lowercase()
        ))
    })
}
