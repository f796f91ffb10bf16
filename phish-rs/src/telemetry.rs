//! Logging setup shared by the CLI and the server

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{PhishError, Result};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`. Calling this twice
/// returns an error instead of replacing the first subscriber.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| PhishError::Config(format!("invalid log level '{}': {}", config.level, e)))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format.as_str() {
        "json" => registry.with(fmt::layer().json()).try_init(),
        _ => registry.with(fmt::layer()).try_init(),
    };

    installed.map_err(|e| PhishError::Config(format!("failed to install logger: {}", e)))
}
