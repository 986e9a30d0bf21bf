//! # Pathway Context - Per-traversal Hash Chain State
//!
//! ## Purpose
//!
//! Follows one unit of data across its hops. Each checkpoint folds the edge's
//! tags into the running hash and emits a [`StatsPoint`] carrying edge and
//! end-to-end latency. When the data leaves the process the context is
//! encoded into a header value, and the next hop decodes it and keeps
//! extending the same chain.
//!
//! ## Lifecycle
//!
//! ```text
//! new (hash 0) ──first checkpoint──► started ──checkpoint──► started ...
//!                                       │
//!                                    encode ──► header ──► decode (next hop)
//! ```
//!
//! ## Ownership
//!
//! A context has exactly one owner at a time and no internal locking. Moving
//! it to another thread is an explicit transfer (`Box<dyn PathwayContext>` is
//! `Send`), never shared mutation.

use crate::edge::EdgeContext;
use crate::service_name::current_service_name;
use crate::sink::{SinkError, StatsSink};
use crate::time::{TimeSource, NANOS_PER_MILLI};
use pathway_codec::{CodecError, CodecResult, EncodedPathway};
use pathway_types::{continue_hash, pathway_hash, StatsPoint, FNV_OFFSET_BASIS};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, trace};

/// Operations every pathway context supports, real or no-op
pub trait PathwayContext: Send + Debug {
    /// True once the first checkpoint has run
    fn is_started(&self) -> bool;

    /// Running hash, 0 while unstarted
    fn hash(&self) -> u64;

    /// Epoch millis of the first checkpoint, 0 while unstarted
    fn pathway_start_ms(&self) -> u64;

    /// Record one edge and hand the resulting point to `sink`
    ///
    /// An edge built with [`EdgeContext::without_checkpoint`] still advances
    /// the context but never reaches `sink`. On a sink error the context is
    /// left exactly as it was.
    fn set_checkpoint(
        &mut self,
        edge: &EdgeContext,
        sink: &dyn StatsSink,
    ) -> Result<(), SinkError>;

    /// Header value a downstream hop can [`DefaultPathwayContext::decode`]
    ///
    /// Fails with [`CodecError::PathwayNotStarted`] before the first checkpoint.
    fn encode(&self) -> CodecResult<String>;

    /// Last point this context emitted
    fn saved_stats(&self) -> Option<&StatsPoint>;
}

/// Pathway context used while monitoring is enabled
#[derive(Debug, Clone)]
pub struct DefaultPathwayContext {
    time_source: Arc<dyn TimeSource>,
    base_hash: u64,
    hash: u64,
    pathway_start_ns: u64,
    edge_start_ns: u64,
    saved_stats: Option<StatsPoint>,
}

impl DefaultPathwayContext {
    pub fn new(time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            time_source,
            base_hash: FNV_OFFSET_BASIS,
            hash: 0,
            pathway_start_ns: 0,
            edge_start_ns: 0,
            saved_stats: None,
        }
    }

    /// Resume a chain from an upstream header value
    pub fn decode(time_source: Arc<dyn TimeSource>, header_value: &str) -> CodecResult<Self> {
        let encoded = EncodedPathway::from_header_value(header_value)?;
        Ok(Self::from_encoded(time_source, encoded))
    }

    pub fn from_encoded(time_source: Arc<dyn TimeSource>, encoded: EncodedPathway) -> Self {
        Self {
            time_source,
            base_hash: FNV_OFFSET_BASIS,
            hash: encoded.hash,
            pathway_start_ns: encoded.pathway_start_ns,
            edge_start_ns: encoded.edge_start_ns,
            saved_stats: None,
        }
    }

    /// Seed node hashes with the reporting process identity
    ///
    /// See [`pathway_types::base_hash`]. Defaults to the bare offset basis.
    pub fn with_base_hash(mut self, base_hash: u64) -> Self {
        self.base_hash = base_hash;
        self
    }

    pub fn pathway_start_ns(&self) -> u64 {
        self.pathway_start_ns
    }

    pub fn edge_start_ns(&self) -> u64 {
        self.edge_start_ns
    }

    /// Binary state without the base64 wrapping
    pub fn to_encoded(&self) -> CodecResult<EncodedPathway> {
        if !self.is_started() {
            return Err(CodecError::PathwayNotStarted);
        }
        Ok(EncodedPathway::new(
            self.hash,
            self.pathway_start_ns,
            self.edge_start_ns,
        ))
    }
}

impl PathwayContext for DefaultPathwayContext {
    fn is_started(&self) -> bool {
        self.hash != 0
    }

    fn hash(&self) -> u64 {
        self.hash
    }

    fn pathway_start_ms(&self) -> u64 {
        self.pathway_start_ns / NANOS_PER_MILLI
    }

    fn set_checkpoint(
        &mut self,
        edge: &EdgeContext,
        sink: &dyn StatsSink,
    ) -> Result<(), SinkError> {
        let now_ns = self.time_source.now_ns();
        let started = self.is_started();
        let (parent_hash, pathway_start_ns, edge_start_ns) = if started {
            (self.hash, self.pathway_start_ns, self.edge_start_ns)
        } else {
            let start_ns = match edge.default_timestamp_ms() {
                0 => now_ns,
                millis => millis.saturating_mul(NANOS_PER_MILLI),
            };
            (0, start_ns, start_ns)
        };

        let tags = edge.tags();
        let service_name = current_service_name();
        let seed = match service_name.as_deref() {
            Some(service) => continue_hash(self.base_hash, service),
            None => self.base_hash,
        };
        let hashes = tags.hashes_from(seed);
        let new_hash = pathway_hash(parent_hash, hashes.hash);

        let point = StatsPoint::new(
            Arc::clone(tags),
            new_hash,
            parent_hash,
            hashes.aggregation_hash,
            now_ns,
            now_ns.saturating_sub(pathway_start_ns),
            now_ns.saturating_sub(edge_start_ns),
            edge.payload_size_bytes(),
            service_name,
        );

        if !edge.send_checkpoint() {
            trace!("Stats point for {} suppressed", tags);
        } else if let Err(e) = sink.accept(point.clone()) {
            debug!("Stats point for {} not accepted: {}", tags, e);
            return Err(e);
        }

        // A default timestamp ahead of the local clock must not leave the edge
        // starting before the pathway.
        self.hash = new_hash;
        self.pathway_start_ns = pathway_start_ns;
        self.edge_start_ns = now_ns.max(pathway_start_ns);
        self.saved_stats = Some(point);
        trace!("Checkpoint {} -> {} for {}", parent_hash, new_hash, tags);
        Ok(())
    }

    fn encode(&self) -> CodecResult<String> {
        Ok(self.to_encoded()?.to_header_value())
    }

    fn saved_stats(&self) -> Option<&StatsPoint> {
        self.saved_stats.as_ref()
    }
}

/// Context handed out while monitoring is disabled; permanently unstarted
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPathwayContext;

impl PathwayContext for NoopPathwayContext {
    fn is_started(&self) -> bool {
        false
    }

    fn hash(&self) -> u64 {
        0
    }

    fn pathway_start_ms(&self) -> u64 {
        0
    }

    fn set_checkpoint(
        &mut self,
        _edge: &EdgeContext,
        _sink: &dyn StatsSink,
    ) -> Result<(), SinkError> {
        Ok(())
    }

    fn encode(&self) -> CodecResult<String> {
        Err(CodecError::PathwayNotStarted)
    }

    fn saved_stats(&self) -> Option<&StatsPoint> {
        None
    }
}
