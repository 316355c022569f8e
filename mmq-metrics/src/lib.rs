//! Metrics and observability for queue replays
//!
//! This crate turns the customer records of a completed replay into
//! congestion statistics (`L`, `Lq`, `W`, `Wq`, blocking probability), an
//! occupancy series for charting, JSON/CSV exports, and publishing through
//! the `metrics` facade.

pub mod aggregate;
pub mod error;
pub mod export;
pub mod occupancy;
pub mod recorder;

pub use aggregate::{MetricsAggregator, QueueMetrics};
pub use error::MetricsError;
pub use export::{export_csv, export_json, ExportBundle, RunExporter};
pub use occupancy::{OccupancyPoint, OccupancySampler};
pub use recorder::{with_run_recorder, RecordedMetrics, RunRecorder};
