//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events; binaries embedding AllSee call
//! [`init_tracing`] once at startup. `RUST_LOG` takes precedence over the
//! configured level.

use allsee_domain::{AllSeeError, LogFormat, LoggingConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber
///
/// # Errors
/// Returns `AllSeeError::Config` if the configured level is not a valid
/// filter directive, or `AllSeeError::Internal` if a global subscriber is
/// already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), AllSeeError> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Json => registry.with(fmt::layer().json().with_current_span(false)).try_init(),
        LogFormat::Text => {
            registry.with(fmt::layer().with_target(true).with_line_number(true)).try_init()
        }
    };

    result.map_err(|e| AllSeeError::Internal(format!("Failed to install tracing subscriber: {e}")))
}

fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, AllSeeError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            AllSeeError::Config(format!("Invalid log level '{}': {e}", config.level))
        }),
    }
}
