//! Export of run results
//!
//! Writes the customer records, metrics and occupancy series of a run in
//! formats external tools can load. Service fields that do not apply to a
//! customer (blocked) are left out of the JSON object or written as an empty
//! CSV cell, never as zero.

pub mod csv;
pub mod json;

use crate::aggregate::QueueMetrics;
use crate::error::MetricsError;
use crate::occupancy::OccupancyPoint;
use mmq_components::CustomerRecord;
use mmq_core::QueueModel;
use serde::Serialize;
use std::path::Path;

/// Borrowed view of everything a run produced
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExportBundle<'a> {
    pub model: &'a QueueModel,
    pub metrics: &'a QueueMetrics,
    pub records: &'a [CustomerRecord],
    pub occupancy: &'a [OccupancyPoint],
}

/// Trait for run exporters
pub trait RunExporter {
    /// Export the bundle to the configured destination
    fn export(&self, bundle: &ExportBundle<'_>) -> Result<(), MetricsError>;
}

/// Export a run as a single JSON document
pub fn export_json(
    bundle: &ExportBundle<'_>,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), MetricsError> {
    json::JsonExporter::new(path.as_ref(), pretty).export(bundle)
}

/// Export a run as CSV files next to `path`
///
/// See [`csv::CsvExporter`] for the files written.
pub fn export_csv(bundle: &ExportBundle<'_>, path: impl AsRef<Path>) -> Result<(), MetricsError> {
    csv::CsvExporter::new(path.as_ref()).export(bundle)
}
