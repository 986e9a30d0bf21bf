//! # Data Streams Monitoring Facade
//!
//! ## Purpose
//!
//! Single entry point for instrumentation adapters. It hands out pathway
//! contexts, runs checkpoints against them, propagates contexts through
//! transport headers and queues every stats point and auxiliary report on a
//! bounded inbox drained by the aggregation layer.
//!
//! ## Failure Model
//!
//! Nothing here returns an error to instrumented code. A corrupt upstream
//! header yields a fresh context, a full inbox drops the item and bumps a
//! counter, and a disabled facade turns every call into a no-op.
//!
//! ## Architecture Role
//!
//! ```text
//! Adapters ──► [DataStreamsMonitoring] ──► Inbox ──► aggregation / reporter
//!                │         ▲
//!                ▼         │
//!        PathwayContext   Carrier (headers)
//! ```

use crate::context::{DefaultPathwayContext, NoopPathwayContext, PathwayContext};
use crate::edge::EdgeContext;
use crate::inbox::{Inbox, InboxItem, InboxStats};
use crate::logging;
use crate::schema::SchemaSamplers;
use crate::service_name::{self, ServiceNameGuard};
use crate::sink::SinkError;
use crate::time::{SystemTimeSource, TimeSource};
use crossbeam_channel::Receiver;
use pathway_codec::{CheckpointRegistry, TransactionInfo, PATHWAY_HEADER_KEY};
use pathway_config::MonitoringConfig;
use pathway_types::{
    base_hash, Backlog, ConfigReport, Direction, SchemaUsage, StatsPoint, TagSet,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Read/write access to a transport's headers
pub trait Carrier {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

impl Carrier for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }
}

impl Carrier for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }
}

/// The monitoring facade
#[derive(Debug)]
pub struct DataStreamsMonitoring {
    config: MonitoringConfig,
    time_source: Arc<dyn TimeSource>,
    base_hash: u64,
    inbox: Inbox,
    schema_samplers: SchemaSamplers,
}

impl DataStreamsMonitoring {
    pub fn new(config: MonitoringConfig) -> Self {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(config: MonitoringConfig, time_source: Arc<dyn TimeSource>) -> Self {
        info!(
            "Data streams monitoring for '{}' ({})",
            config.service,
            if config.enabled { "enabled" } else { "disabled" }
        );
        Self {
            base_hash: base_hash(&config.service, config.env.as_deref()),
            inbox: Inbox::new(config.inbox_capacity.max(1)),
            schema_samplers: SchemaSamplers::new(config.schema_sampling_interval_ms),
            time_source,
            config,
        }
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.config
    }

    /// Install the fmt subscriber at the configured `log_level`
    pub fn init_logging(&self, json: bool) -> anyhow::Result<()> {
        logging::init_logging(&self.config.log_level, json)
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Seed every node hash of this process starts from
    pub fn base_hash(&self) -> u64 {
        self.base_hash
    }

    /// Receiving end for the aggregation layer
    pub fn inbox(&self) -> Receiver<InboxItem> {
        self.inbox.receiver()
    }

    pub fn stats(&self) -> InboxStats {
        self.inbox.stats()
    }

    /// Fresh context, or the no-op context while disabled
    pub fn new_pathway_context(&self) -> Box<dyn PathwayContext> {
        if self.config.enabled {
            Box::new(
                DefaultPathwayContext::new(Arc::clone(&self.time_source))
                    .with_base_hash(self.base_hash),
            )
        } else {
            Box::new(NoopPathwayContext)
        }
    }

    /// Run a checkpoint on `context`, queueing the resulting stats point
    pub fn set_checkpoint(&self, context: &mut dyn PathwayContext, edge: &EdgeContext) {
        if !self.config.enabled {
            return;
        }
        let sink = |point: StatsPoint| -> Result<(), SinkError> {
            self.inbox.offer(InboxItem::StatsPoint(point))
        };
        // Dropped points are already counted and logged by the inbox
        let _ = context.set_checkpoint(edge, &sink);
    }

    /// Write `context` into `carrier`; unstarted contexts write nothing
    pub fn inject(&self, context: &dyn PathwayContext, carrier: &mut dyn Carrier) {
        if !context.is_started() {
            return;
        }
        match context.encode() {
            Ok(value) => carrier.set(PATHWAY_HEADER_KEY, value),
            Err(e) => debug!("Pathway context not injected: {}", e),
        }
    }

    /// Resume the upstream pathway carried by `carrier`
    ///
    /// A missing or corrupt header yields an unstarted context.
    pub fn extract(&self, carrier: &dyn Carrier) -> Box<dyn PathwayContext> {
        if !self.config.enabled {
            return Box::new(NoopPathwayContext);
        }
        let Some(value) = carrier.get(PATHWAY_HEADER_KEY) else {
            return self.new_pathway_context();
        };
        match DefaultPathwayContext::decode(Arc::clone(&self.time_source), &value) {
            Ok(context) => Box::new(context.with_base_hash(self.base_hash)),
            Err(e) => {
                debug!("Discarding unreadable pathway header: {}", e);
                self.new_pathway_context()
            }
        }
    }

    /// Manual produce checkpoint: `direction:out`, `topic:<target>`, then inject
    pub fn set_produce_checkpoint(
        &self,
        context: &mut dyn PathwayContext,
        edge_type: &str,
        target: &str,
        carrier: &mut dyn Carrier,
    ) {
        if edge_type.is_empty() || target.is_empty() {
            warn!("set_produce_checkpoint should be called with non-empty type and target");
            return;
        }
        let edge = EdgeContext::new(TagSet::manual(edge_type, Direction::Outbound, target));
        self.set_checkpoint(context, &edge);
        self.inject(context, carrier);
    }

    /// Manual consume checkpoint: extract, then `direction:in`, `topic:<source>`
    ///
    /// Returns the context so the caller can keep extending the pathway.
    pub fn set_consume_checkpoint(
        &self,
        edge_type: &str,
        source: &str,
        carrier: &dyn Carrier,
    ) -> Box<dyn PathwayContext> {
        if edge_type.is_empty() || source.is_empty() {
            warn!("set_consume_checkpoint should be called with non-empty type and source");
            return self.new_pathway_context();
        }
        let mut context = self.extract(carrier);
        let edge = EdgeContext::new(TagSet::manual(edge_type, Direction::Inbound, source));
        self.set_checkpoint(context.as_mut(), &edge);
        context
    }

    /// Queue a backlog value; pairs with an empty key or value are skipped
    pub fn track_backlog<'a, I>(&self, sorted_tags: I, value: i64)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        if !self.config.enabled {
            return;
        }
        let backlog = Backlog::new(sorted_tags, value, self.time_source.now_ns());
        let _ = self.inbox.offer(InboxItem::Backlog(backlog));
    }

    pub fn report_config(&self, client_type: &str, settings: BTreeMap<String, String>) {
        if !self.config.enabled {
            return;
        }
        let report = ConfigReport {
            client_type: client_type.to_string(),
            service: self.config.service.clone(),
            env: self.config.env.clone(),
            settings,
            timestamp_ns: self.time_source.now_ns(),
        };
        let _ = self.inbox.offer(InboxItem::ConfigReport(report));
    }

    /// Queue a schema usage report, stamping its timestamp
    ///
    /// Callers normally gate this on [`DataStreamsMonitoring::try_sample_schema`]
    /// and put the returned weight in the report.
    pub fn report_schema(&self, mut usage: SchemaUsage) {
        if !self.config.enabled {
            return;
        }
        usage.timestamp_ns = self.time_source.now_ns();
        let _ = self.inbox.offer(InboxItem::SchemaUsage(usage));
    }

    pub fn try_sample_schema(&self, topic: &str) -> u32 {
        if !self.config.enabled {
            return 0;
        }
        self.schema_samplers
            .try_sample(topic, self.time_source.now_ms())
    }

    pub fn can_sample_schema(&self, topic: &str) -> bool {
        self.config.enabled
            && self
                .schema_samplers
                .can_sample(topic, self.time_source.now_ms())
    }

    /// Correlate `transaction_id` with `checkpoint_name` at the current time
    pub fn track_transaction(&self, transaction_id: &str, checkpoint_name: &str) {
        if !self.config.enabled || !self.config.transaction_tracking {
            return;
        }
        // Register eagerly so the map is complete before the record is encoded
        CheckpointRegistry::global().checkpoint_id(checkpoint_name);
        let info = TransactionInfo::new(
            transaction_id,
            self.time_source.now_ns(),
            checkpoint_name,
        );
        let _ = self.inbox.offer(InboxItem::Transaction(info));
    }

    /// Checkpoint id → name map for encoded transaction records
    pub fn checkpoint_map(&self) -> Arc<Vec<u8>> {
        CheckpointRegistry::global().snapshot()
    }

    /// Override the service name on this thread until the guard drops
    pub fn set_service_name(&self, name: &str) -> ServiceNameGuard {
        service_name::set_service_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualTimeSource;

    fn monitoring() -> DataStreamsMonitoring {
        DataStreamsMonitoring::with_time_source(
            MonitoringConfig::default(),
            Arc::new(ManualTimeSource::new(1_000_000_000)),
        )
    }

    #[test]
    fn test_configured_log_level_is_applied() {
        let dsm = DataStreamsMonitoring::new(MonitoringConfig {
            log_level: "debug".to_string(),
            ..MonitoringConfig::default()
        });
        assert!(dsm.init_logging(false).is_ok());

        let bad = DataStreamsMonitoring::new(MonitoringConfig {
            log_level: "not=a=level".to_string(),
            ..MonitoringConfig::default()
        });
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(bad.init_logging(false).is_err());
        }
    }

    #[test]
    fn test_checkpoint_lands_in_inbox() {
        let dsm = monitoring();
        let mut ctx = dsm.new_pathway_context();
        let edge = EdgeContext::new(TagSet::with_topic(
            "kafka",
            Some(Direction::Outbound),
            Some("orders"),
        ));
        dsm.set_checkpoint(ctx.as_mut(), &edge);

        match dsm.inbox().try_recv().unwrap() {
            InboxItem::StatsPoint(point) => assert_eq!(point.hash(), ctx.hash()),
            other => panic!("unexpected item {other:?}"),
        }
        assert_eq!(dsm.stats().enqueued, 1);
    }

    #[test]
    fn test_inject_skips_unstarted_context() {
        let dsm = monitoring();
        let ctx = dsm.new_pathway_context();
        let mut headers: HashMap<String, String> = HashMap::new();
        dsm.inject(ctx.as_ref(), &mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_empty_manual_arguments_are_ignored() {
        let dsm = monitoring();
        let mut ctx = dsm.new_pathway_context();
        let mut headers: HashMap<String, String> = HashMap::new();
        dsm.set_produce_checkpoint(ctx.as_mut(), "", "orders", &mut headers);
        dsm.set_produce_checkpoint(ctx.as_mut(), "kafka", "", &mut headers);
        let consumed = dsm.set_consume_checkpoint("kafka", "", &headers);

        assert!(!ctx.is_started());
        assert!(!consumed.is_started());
        assert!(headers.is_empty());
        assert_eq!(dsm.stats().enqueued, 0);
    }

    #[test]
    fn test_config_report_is_stamped_with_service() {
        let config = MonitoringConfig {
            service: "checkout".to_string(),
            env: Some("prod".to_string()),
            ..MonitoringConfig::default()
        };
        let dsm = DataStreamsMonitoring::with_time_source(
            config,
            Arc::new(ManualTimeSource::new(42)),
        );
        let mut settings = BTreeMap::new();
        settings.insert("acks".to_string(), "all".to_string());
        dsm.report_config("kafka_producer", settings.clone());

        let expected = ConfigReport {
            client_type: "kafka_producer".to_string(),
            service: "checkout".to_string(),
            env: Some("prod".to_string()),
            settings,
            timestamp_ns: 42,
        };
        assert_eq!(
            dsm.inbox().try_recv().unwrap(),
            InboxItem::ConfigReport(expected)
        );
    }
}
