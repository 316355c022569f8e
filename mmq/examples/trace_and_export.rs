//! Traces a short M/M/2/1 replay customer by customer, then exports the run.
//!
//! Run with: cargo run --package mmq --example trace_and_export
//! The JSON and CSV files are written to the system temp directory.

use mmq::core::init_simulation_logging_with_level;
use mmq::prelude::*;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_simulation_logging_with_level("trace");

    let config = SimulationConfig::new(QueueModel::Mmck { servers: 2, capacity: 1 }, 2.0, 0.8, 12)
        .with_seed(7);
    let report = simulate(&config)?;

    for record in &report.records {
        match record.service() {
            Some(s) => info!(
                id = record.id,
                arrival = record.arrival_time,
                server = s.server_index,
                begin = s.service_begin,
                end = s.service_end,
                "served"
            ),
            None => info!(id = record.id, arrival = record.arrival_time, "blocked"),
        }
    }

    let dir = std::env::temp_dir();
    let json_path = dir.join("mmq_trace.json");
    report.export_json(&json_path, true)?;
    report.export_csv(dir.join("mmq_trace.csv"))?;
    info!(path = %json_path.display(), "Exported run");

    Ok(())
}
