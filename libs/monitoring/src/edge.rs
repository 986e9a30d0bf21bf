//! Edge descriptor handed to a checkpoint by instrumentation adapters

use pathway_types::TagSet;
use std::sync::Arc;

/// Tags plus per-message extras for one checkpoint
///
/// Adapters build one of these from native message metadata. The tag set is
/// shared so the same edge type can be reused across many checkpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeContext {
    tags: Arc<TagSet>,
    default_timestamp_ms: u64,
    payload_size_bytes: u64,
    send_checkpoint: bool,
}

impl EdgeContext {
    pub fn new(tags: TagSet) -> Self {
        Self::from_shared(Arc::new(tags))
    }

    pub fn from_shared(tags: Arc<TagSet>) -> Self {
        Self {
            tags,
            default_timestamp_ms: 0,
            payload_size_bytes: 0,
            send_checkpoint: true,
        }
    }

    /// Epoch millis used as pathway start when this edge starts a pathway; 0 means "now"
    pub fn with_default_timestamp_ms(mut self, timestamp_ms: u64) -> Self {
        self.default_timestamp_ms = timestamp_ms;
        self
    }

    pub fn with_payload_size(mut self, payload_size_bytes: u64) -> Self {
        self.payload_size_bytes = payload_size_bytes;
        self
    }

    /// Advance the pathway without emitting a stats point
    pub fn without_checkpoint(mut self) -> Self {
        self.send_checkpoint = false;
        self
    }

    pub fn tags(&self) -> &Arc<TagSet> {
        &self.tags
    }

    pub fn default_timestamp_ms(&self) -> u64 {
        self.default_timestamp_ms
    }

    pub fn payload_size_bytes(&self) -> u64 {
        self.payload_size_bytes
    }

    pub fn send_checkpoint(&self) -> bool {
        self.send_checkpoint
    }
}

impl From<TagSet> for EdgeContext {
    fn from(tags: TagSet) -> Self {
        Self::new(tags)
    }
}
