//! CSV export for run results
//!
//! Creates separate CSV files for the different parts of a run:
//! - `{base}_customers.csv` - one row per customer
//! - `{base}_metrics.csv` - metric name/value pairs
//! - `{base}_occupancy.csv` - the occupancy series

use crate::error::MetricsError;
use crate::export::{ExportBundle, RunExporter};
use mmq_components::CustomerRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// CSV exporter for run results
#[derive(Debug)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    /// Create a new CSV exporter
    ///
    /// # Arguments
    /// * `path` - Base output file path (will create multiple files with suffixes)
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Get the path for a specific CSV file
    pub fn path_for(&self, suffix: &str) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("run");
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        parent.join(format!("{stem}_{suffix}.csv"))
    }

    fn create(&self, suffix: &str) -> Result<BufWriter<File>, MetricsError> {
        let path = self.path_for(suffix);
        File::create(&path)
            .map(BufWriter::new)
            .map_err(|e| MetricsError::ExportError(format!("Failed to create {}: {e}", path.display())))
    }

    fn export_customers(&self, records: &[CustomerRecord]) -> Result<(), MetricsError> {
        let mut file = self.create("customers")?;
        writeln!(
            file,
            "customer,interarrival_time,arrival_time,service_time,status,server_index,service_begin,service_end,waiting_time,time_in_system,server_idle_time"
        )?;

        for record in records {
            let service = record.service();
            writeln!(
                file,
                "{},{},{},{},{},{},{},{},{},{},{}",
                record.id,
                record.interarrival_time,
                record.arrival_time,
                record.service_time,
                record.status(),
                optional(service.map(|s| s.server_index)),
                optional(service.map(|s| s.service_begin)),
                optional(service.map(|s| s.service_end)),
                optional(service.map(|s| s.waiting_time)),
                optional(service.map(|s| s.time_in_system)),
                optional(service.map(|s| s.server_idle_time)),
            )?;
        }
        file.flush()?;
        Ok(())
    }

    fn export_metrics(&self, bundle: &ExportBundle<'_>) -> Result<(), MetricsError> {
        let m = bundle.metrics;
        let mut file = self.create("metrics")?;
        writeln!(file, "metric,value")?;
        writeln!(file, "model,{}", escape_csv(&bundle.model.to_string()))?;

        let rows: [(&str, String); 13] = [
            ("simulation_horizon", m.simulation_horizon.to_string()),
            ("L", m.l.to_string()),
            ("Lq", m.lq.to_string()),
            ("W", m.w.to_string()),
            ("Wq", m.wq.to_string()),
            ("blocking_probability", optional(m.blocking_probability)),
            ("total_customers", m.total_customers.to_string()),
            ("served_count", m.served_count.to_string()),
            ("queued_count", m.queued_count.to_string()),
            ("blocked_count", m.blocked_count.to_string()),
            ("throughput", m.throughput.to_string()),
            ("effective_arrival_rate", m.effective_arrival_rate.to_string()),
            ("mean_server_utilization", m.mean_server_utilization.to_string()),
        ];
        for (name, value) in rows {
            writeln!(file, "{name},{value}")?;
        }
        file.flush()?;
        Ok(())
    }

    fn export_occupancy(&self, bundle: &ExportBundle<'_>) -> Result<(), MetricsError> {
        let mut file = self.create("occupancy")?;
        writeln!(file, "time,customers")?;
        for point in bundle.occupancy {
            writeln!(file, "{},{}", point.time, point.customers)?;
        }
        file.flush()?;
        Ok(())
    }
}

impl RunExporter for CsvExporter {
    fn export(&self, bundle: &ExportBundle<'_>) -> Result<(), MetricsError> {
        self.export_customers(bundle.records)?;
        self.export_metrics(bundle)?;
        self.export_occupancy(bundle)?;
        tracing::debug!(base = %self.path.display(), "Exported run as CSV");
        Ok(())
    }
}

/// Empty cell for values that do not apply
fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Escape CSV special characters
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::MetricsAggregator;
    use crate::occupancy::OccupancySampler;
    use mmq_components::replay;
    use mmq_core::{ArrivalTimeline, QueueModel};

    #[test]
    fn test_csv_export() {
        let model = QueueModel::Mm1k { capacity: 0 };
        let records = replay(model, &ArrivalTimeline::from_interarrivals(&[0.0, 1.0, 1.0]), &[1.5; 3])
            .unwrap()
            .records;
        let metrics = MetricsAggregator::new(model, 1.0).aggregate(&records);
        let occupancy = OccupancySampler::sample(&records);
        let bundle = ExportBundle {
            model: &model,
            metrics: &metrics,
            records: &records,
            occupancy: &occupancy,
        };

        let temp_dir = std::env::temp_dir();
        let exporter = CsvExporter::new(&temp_dir.join("mmq_test_run.csv"));
        exporter.export(&bundle).unwrap();

        let customers = std::fs::read_to_string(exporter.path_for("customers")).unwrap();
        let lines: Vec<&str> = customers.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("1,0,0,1.5,served,1,0,1.5,0,1.5,0"));
        // Blocked customer: service columns are empty, not zero.
        assert_eq!(lines[2], "2,1,1,1.5,blocked,,,,,,");

        let metrics_csv = std::fs::read_to_string(exporter.path_for("metrics")).unwrap();
        assert!(metrics_csv.contains("model,M/M/1/0"));
        assert!(metrics_csv.contains("blocked_count,1"));

        assert!(exporter.path_for("occupancy").exists());

        for suffix in ["customers", "metrics", "occupancy"] {
            std::fs::remove_file(exporter.path_for(suffix)).ok();
        }
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
