//! # Auxiliary Reports
//!
//! Records that travel through the same inbox as stats points but never take
//! part in pathway hashing: backlog depth, client configuration snapshots and
//! schema-registry usage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Approximate queue depth correlated with an edge (offsets, lag, pending count)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backlog {
    /// Rendered `key:value` tags in caller order
    pub tags: Vec<String>,
    pub value: i64,
    pub timestamp_ns: u64,
}

impl Backlog {
    /// Render ordered `(key, value)` pairs; pairs with an empty key or value are skipped
    pub fn new<'a, I>(sorted_tags: I, value: i64, timestamp_ns: u64) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let tags = sorted_tags
            .into_iter()
            .filter(|(key, value)| !key.is_empty() && !value.is_empty())
            .map(|(key, value)| format!("{key}:{value}"))
            .collect();
        Self {
            tags,
            value,
            timestamp_ns,
        }
    }
}

/// Snapshot of a messaging client's effective configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigReport {
    /// e.g. `kafka_producer`, `sqs_consumer`
    pub client_type: String,
    pub service: String,
    pub env: Option<String>,
    pub settings: BTreeMap<String, String>,
    pub timestamp_ns: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaOperation {
    Serialization,
    Deserialization,
}

/// One observed use of a registry schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaUsage {
    pub topic: String,
    pub cluster_id: Option<String>,
    pub schema_id: i32,
    pub is_success: bool,
    /// Schema applied to the record key rather than the value
    pub is_key: bool,
    pub operation: SchemaOperation,
    /// Number of uses this report stands for (set by the sampler)
    pub weight: u32,
    pub timestamp_ns: u64,
}

impl SchemaUsage {
    pub fn new(
        topic: impl Into<String>,
        schema_id: i32,
        operation: SchemaOperation,
        is_success: bool,
    ) -> Self {
        Self {
            topic: topic.into(),
            cluster_id: None,
            schema_id,
            is_success,
            is_key: false,
            operation,
            weight: 1,
            timestamp_ns: 0,
        }
    }

    pub fn with_cluster_id(mut self, cluster_id: impl Into<String>) -> Self {
        self.cluster_id = Some(cluster_id.into());
        self
    }

    pub fn for_key(mut self) -> Self {
        self.is_key = true;
        self
    }
}
