//! Destination for stats points produced by checkpoints

use pathway_types::StatsPoint;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("Sink closed")]
    Closed,

    #[error("Sink full, stats point dropped")]
    Full,

    #[error("Stats point rejected: {0}")]
    Rejected(String),
}

/// Receives every stats point a checkpoint emits
///
/// A checkpoint only advances its pathway once the sink accepted the point.
pub trait StatsSink {
    fn accept(&self, point: StatsPoint) -> Result<(), SinkError>;
}

impl<F> StatsSink for F
where
    F: Fn(StatsPoint) -> Result<(), SinkError>,
{
    fn accept(&self, point: StatsPoint) -> Result<(), SinkError> {
        self(point)
    }
}

/// Sink that accepts and discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl StatsSink for DiscardSink {
    fn accept(&self, _point: StatsPoint) -> Result<(), SinkError> {
        Ok(())
    }
}
