//! Bounded queue between instrumentation threads and the aggregation layer

use crate::sink::SinkError;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use pathway_codec::TransactionInfo;
use pathway_types::{Backlog, ConfigReport, SchemaUsage, StatsPoint};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Everything the facade emits, in one queue
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboxItem {
    StatsPoint(StatsPoint),
    Backlog(Backlog),
    ConfigReport(ConfigReport),
    SchemaUsage(SchemaUsage),
    Transaction(TransactionInfo),
}

impl InboxItem {
    pub fn kind(&self) -> &'static str {
        match self {
            InboxItem::StatsPoint(_) => "stats_point",
            InboxItem::Backlog(_) => "backlog",
            InboxItem::ConfigReport(_) => "config_report",
            InboxItem::SchemaUsage(_) => "schema_usage",
            InboxItem::Transaction(_) => "transaction",
        }
    }
}

/// Counters of what went through the inbox
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InboxStats {
    pub enqueued: u64,
    pub dropped: u64,
}

/// Producer side; never blocks
#[derive(Debug)]
pub(crate) struct Inbox {
    sender: Sender<InboxItem>,
    receiver: Receiver<InboxItem>,
    enqueued: AtomicU64,
    dropped: AtomicU64,
}

impl Inbox {
    pub(crate) fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            enqueued: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    pub(crate) fn receiver(&self) -> Receiver<InboxItem> {
        self.receiver.clone()
    }

    /// Enqueue without blocking; a full inbox drops the item
    pub(crate) fn offer(&self, item: InboxItem) -> Result<(), SinkError> {
        match self.sender.try_send(item) {
            Ok(()) => {
                self.enqueued.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(item)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("Inbox full, dropping {}", item.kind());
                Err(SinkError::Full)
            }
            Err(TrySendError::Disconnected(item)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("Inbox disconnected, dropping {}", item.kind());
                Err(SinkError::Closed)
            }
        }
    }

    pub(crate) fn stats(&self) -> InboxStats {
        InboxStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}
