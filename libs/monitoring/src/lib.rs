//! # Pathway Monitoring
//!
//! Pathway contexts and the facade instrumentation calls into.
//!
//! ## Quick Start
//!
//! ```rust
//! use pathway_config::MonitoringConfig;
//! use pathway_monitoring::{DataStreamsMonitoring, EdgeContext};
//! use pathway_types::{Direction, TagSet};
//! use std::collections::HashMap;
//!
//! let dsm = DataStreamsMonitoring::new(MonitoringConfig::default());
//!
//! // Producer side
//! let mut ctx = dsm.new_pathway_context();
//! let edge = EdgeContext::new(TagSet::with_topic("kafka", Some(Direction::Outbound), Some("orders")));
//! dsm.set_checkpoint(ctx.as_mut(), &edge);
//! let mut headers: HashMap<String, String> = HashMap::new();
//! dsm.inject(ctx.as_ref(), &mut headers);
//!
//! // Consumer side
//! let mut resumed = dsm.extract(&headers);
//! assert_eq!(resumed.hash(), ctx.hash());
//! let edge = EdgeContext::new(TagSet::with_topic("kafka", Some(Direction::Inbound), Some("orders")));
//! dsm.set_checkpoint(resumed.as_mut(), &edge);
//! ```

pub mod context;
pub mod edge;
pub mod inbox;
pub mod logging;
pub mod monitoring;
pub mod schema;
pub mod service_name;
pub mod sink;
pub mod time;

pub use context::{DefaultPathwayContext, NoopPathwayContext, PathwayContext};
pub use edge::EdgeContext;
pub use inbox::{InboxItem, InboxStats};
pub use logging::init_logging;
pub use monitoring::{Carrier, DataStreamsMonitoring};
pub use schema::{SchemaSampler, SchemaSamplers};
pub use service_name::{current_service_name, set_service_name, ServiceNameGuard};
pub use sink::{DiscardSink, SinkError, StatsSink};
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
