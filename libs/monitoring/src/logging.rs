//! Subscriber setup for binaries embedding the monitoring facade

use anyhow::{Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered at `level`; `RUST_LOG` overrides it
///
/// Safe to call more than once: later calls keep the first subscriber.
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{}'", level))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = installed {
        debug!("Logging already initialised: {}", e);
    }
    Ok(())
}
