//! Tracing initialisation.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Failure to install the global subscriber (usually: one is already set).
#[derive(Debug, thiserror::Error)]
#[error("failed to initialize tracing subscriber: {0}")]
pub struct TelemetryError(String);

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this twice returns an
/// error rather than panicking.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| TelemetryError(e.to_string()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json {
        builder
            .json()
            .try_init()
            .map_err(|e| TelemetryError(e.to_string()))
    } else {
        builder
            .with_target(false)
            .try_init()
            .map_err(|e| TelemetryError(e.to_string()))
    }
}
