//! Monitoring Configuration Module
//!
//! Loads [`MonitoringConfig`] from an optional TOML file with environment
//! variable overrides layered on top.

use crate::defaults;
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Settings read by the monitoring facade
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MonitoringConfig {
    /// When false every pathway context is a no-op and every report is dropped
    pub enabled: bool,

    /// Stamped on config and schema reports
    pub service: String,

    pub env: Option<String>,

    pub inbox_capacity: usize,

    pub schema_sampling_interval_ms: u64,

    /// When false `track_transaction` does nothing
    pub transaction_tracking: bool,

    /// Default filter for `init_logging`; `RUST_LOG` takes precedence
    pub log_level: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service: defaults::SERVICE_NAME.to_string(),
            env: None,
            inbox_capacity: defaults::INBOX_CAPACITY,
            schema_sampling_interval_ms: defaults::SCHEMA_SAMPLING_INTERVAL_MS,
            transaction_tracking: true,
            log_level: defaults::LOG_LEVEL.to_string(),
        }
    }
}

impl MonitoringConfig {
    /// Load from `path` (if any) with `PATHWAY_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, defaults::ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading monitoring config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator(defaults::ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build monitoring configuration")?
            .try_deserialize()
            .context("Failed to deserialize monitoring configuration")?;

        config.validate()?;
        debug!("Monitoring config loaded: {:?}", config);
        Ok(config)
    }

    /// Parse an in-memory TOML document; missing keys take their defaults
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(document).context("Failed to parse monitoring configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.inbox_capacity == 0 {
            bail!("inbox_capacity must be greater than zero");
        }
        if self.schema_sampling_interval_ms == 0 {
            bail!("schema_sampling_interval_ms must be greater than zero");
        }
        Ok(())
    }
}

/// Convenience function to load configuration from an optional file
pub fn load_config(path: Option<&Path>) -> Result<MonitoringConfig> {
    MonitoringConfig::load(path)
}
