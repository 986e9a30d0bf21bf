//! Stats point emitted by every pathway checkpoint

use crate::tags::TagSet;
use serde::Serialize;
use std::sync::Arc;

/// Immutable snapshot of one checkpoint
///
/// Latencies are in nanoseconds; `timestamp_ns` is epoch nanoseconds at the
/// moment the checkpoint ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsPoint {
    tags: Arc<TagSet>,
    hash: u64,
    parent_hash: u64,
    aggregation_hash: u64,
    timestamp_ns: u64,
    pathway_latency_ns: u64,
    edge_latency_ns: u64,
    payload_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_name_override: Option<Arc<str>>,
}

impl StatsPoint {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tags: Arc<TagSet>,
        hash: u64,
        parent_hash: u64,
        aggregation_hash: u64,
        timestamp_ns: u64,
        pathway_latency_ns: u64,
        edge_latency_ns: u64,
        payload_size_bytes: u64,
        service_name_override: Option<Arc<str>>,
    ) -> Self {
        Self {
            tags,
            hash,
            parent_hash,
            aggregation_hash,
            timestamp_ns,
            pathway_latency_ns,
            edge_latency_ns,
            payload_size_bytes,
            service_name_override,
        }
    }

    pub fn tags(&self) -> &Arc<TagSet> {
        &self.tags
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// 0 for the first edge of a pathway
    pub fn parent_hash(&self) -> u64 {
        self.parent_hash
    }

    pub fn aggregation_hash(&self) -> u64 {
        self.aggregation_hash
    }

    pub fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }

    pub fn pathway_latency_ns(&self) -> u64 {
        self.pathway_latency_ns
    }

    pub fn edge_latency_ns(&self) -> u64 {
        self.edge_latency_ns
    }

    pub fn payload_size_bytes(&self) -> u64 {
        self.payload_size_bytes
    }

    pub fn service_name_override(&self) -> Option<&str> {
        self.service_name_override.as_deref()
    }
}
