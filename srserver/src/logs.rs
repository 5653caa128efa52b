//! Logging initialisation
//!
//! Installs a `tracing_subscriber` registry with an [`EnvFilter`] and, when
//! enabled, a console `fmt` layer. `RUST_LOG` takes precedence over the
//! configured minimum level.

use srconfig::Config;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
    /// Minimum level (`ERROR`, `WARN`, `INFO`, `DEBUG`, `TRACE`) or a full
    /// filter directive such as `srradio=debug,info`
    pub min_level: String,
    /// Log to stdout
    pub enable_console: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            min_level: srconfig::DEFAULT_LOG_MIN_LEVEL.to_string(),
            enable_console: srconfig::DEFAULT_LOG_ENABLE_CONSOLE,
        }
    }
}

impl LoggingOptions {
    /// Reads `host.logger.*`, falling back to the defaults on invalid values
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            min_level: config.get_log_min_level().unwrap_or(defaults.min_level),
            enable_console: config
                .get_log_enable_console()
                .unwrap_or(defaults.enable_console),
        }
    }

    /// Filter built from `RUST_LOG`, else from `min_level`
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| self.configured_filter())
    }

    /// Filter built from `min_level` only
    pub fn configured_filter(&self) -> EnvFilter {
        EnvFilter::try_new(self.min_level.trim().to_lowercase())
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Installs the global subscriber
///
/// Returns `false` when a subscriber was already installed, in which case
/// nothing changes.
pub fn init_logging(options: LoggingOptions) -> bool {
    let console = options.enable_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
    });

    tracing_subscriber::registry()
        .with(options.env_filter())
        .with(console)
        .try_init()
        .is_ok()
}
