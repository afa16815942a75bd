//! Metrics collection and exposition.

mod collector;
mod exporter;

pub use collector::{GateOutcome, LookupResult, MetricsCollector};
pub use exporter::{exporter_handler, render_metrics, OPENMETRICS_CONTENT_TYPE};
