//! # Pathway Monitoring Configuration
//!
//! Central place for the knobs the monitoring facade reads at startup and the
//! defaults it falls back to.
//!
//! ## Usage
//!
//! ```rust
//! use pathway_config::{defaults, MonitoringConfig};
//!
//! let config = MonitoringConfig::from_toml_str("service = \"checkout\"").unwrap();
//! assert_eq!(config.service, "checkout");
//! assert_eq!(config.inbox_capacity, defaults::INBOX_CAPACITY);
//! ```

pub mod defaults;
pub mod monitoring_config;

pub use monitoring_config::{load_config, MonitoringConfig};
