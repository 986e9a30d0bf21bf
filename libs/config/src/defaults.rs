//! Default values shared by the config loader and the facade

/// Service name used when none is configured
pub const SERVICE_NAME: &str = "unnamed-service";

/// Bounded queue size between instrumentation and aggregation
pub const INBOX_CAPACITY: usize = 1024;

/// Minimum gap between two sampled schema reports for one topic (milliseconds)
pub const SCHEMA_SAMPLING_INTERVAL_MS: u64 = 30_000;

pub const LOG_LEVEL: &str = "info";

/// Environment variable prefix, e.g. `PATHWAY_INBOX_CAPACITY=4096`
pub const ENV_PREFIX: &str = "PATHWAY";

/// Nesting separator inside environment variable names
pub const ENV_SEPARATOR: &str = "__";
