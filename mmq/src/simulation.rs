//! End-to-end replay pipeline
//!
//! validate -> draw variates -> arrival timeline -> admission replay ->
//! metrics + occupancy series.

use mmq_components::{replay, CustomerRecord, ServerState};
use mmq_core::{ArrivalTimeline, RandomProvider, SimError, SimulationConfig, VariateGenerator};
use mmq_metrics::{
    export_csv, export_json, ExportBundle, MetricsAggregator, MetricsError, OccupancyPoint,
    OccupancySampler, QueueMetrics,
};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Everything one run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub config: SimulationConfig,
    /// Seed that generated the variates, when known. Entropy-seeded runs
    /// report the seed that was picked so they can be reproduced.
    pub seed: Option<u64>,
    /// One record per arrival, in arrival order
    pub records: Vec<CustomerRecord>,
    pub metrics: QueueMetrics,
    /// Cumulative served-customer count at each arrival instant
    pub occupancy: Vec<OccupancyPoint>,
    pub servers: Vec<ServerState>,
    /// Longest the waiting room ever was
    pub peak_queue_len: usize,
}

impl SimulationReport {
    /// Borrowed view used by the exporters
    pub fn bundle(&self) -> ExportBundle<'_> {
        ExportBundle {
            model: &self.config.model,
            metrics: &self.metrics,
            records: &self.records,
            occupancy: &self.occupancy,
        }
    }

    pub fn export_json(&self, path: impl AsRef<Path>, pretty: bool) -> Result<(), MetricsError> {
        export_json(&self.bundle(), path, pretty)
    }

    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<(), MetricsError> {
        export_csv(&self.bundle(), path)
    }

    /// Report the headline metrics through the `metrics` facade
    pub fn publish_metrics(&self) {
        self.metrics.publish(&self.config.model);
    }
}

/// Run one simulation described by `config`.
///
/// The variates come from a ChaCha8 generator seeded with `config.seed`, or
/// from entropy when no seed is given.
///
/// # Errors
///
/// `InvalidConfiguration` listing every bad field, before anything is drawn.
pub fn simulate(config: &SimulationConfig) -> Result<SimulationReport, SimError> {
    config.ensure_valid()?;
    let mut generator = VariateGenerator::seeded(config.seed);
    let seed = generator.seed();
    run_with_generator(config, &mut generator, Some(seed))
}

/// Run one simulation drawing uniforms from an injected provider
pub fn simulate_with_provider<P: RandomProvider>(
    config: &SimulationConfig,
    provider: P,
) -> Result<SimulationReport, SimError> {
    config.ensure_valid()?;
    let mut generator = VariateGenerator::new(provider);
    run_with_generator(config, &mut generator, config.seed)
}

fn run_with_generator<P: RandomProvider>(
    config: &SimulationConfig,
    generator: &mut VariateGenerator<P>,
    seed: Option<u64>,
) -> Result<SimulationReport, SimError> {
    let variates = generator.draw_run(config.arrival_rate, config.service_rate, config.num_customers)?;
    let mut report = replay_durations(config, &variates.interarrival, &variates.service)?;
    report.seed = seed;
    Ok(report)
}

/// Run one simulation with explicit duration sequences instead of random
/// draws. `interarrival[0]` is ignored: the first customer arrives at 0.
///
/// # Errors
///
/// `InvalidConfiguration` for a bad config; `InvalidParameter` when either
/// sequence does not hold exactly `num_customers` finite, non-negative values.
pub fn replay_durations(
    config: &SimulationConfig,
    interarrival: &[f64],
    service: &[f64],
) -> Result<SimulationReport, SimError> {
    config.ensure_valid()?;
    check_durations("interarrival", interarrival, config.num_customers)?;
    check_durations("service", service, config.num_customers)?;

    let timeline = ArrivalTimeline::from_interarrivals(interarrival);
    let outcome = replay(config.model, &timeline, service)?;

    let metrics = MetricsAggregator::new(config.model, config.arrival_rate).aggregate(&outcome.records);
    let occupancy = OccupancySampler::sample(&outcome.records);

    info!(
        model = %config.model,
        customers = config.num_customers,
        served = metrics.served_count,
        blocked = metrics.blocked_count,
        l = metrics.l,
        w = metrics.w,
        "Simulation completed"
    );

    Ok(SimulationReport {
        config: config.clone(),
        seed: config.seed,
        records: outcome.records,
        metrics,
        occupancy,
        servers: outcome.servers,
        peak_queue_len: outcome.peak_queue_len,
    })
}

fn check_durations(field: &str, values: &[f64], expected: usize) -> Result<(), SimError> {
    if values.len() != expected {
        return Err(SimError::invalid_parameter(
            field,
            format!("expected {expected} durations, got {}", values.len()),
        ));
    }
    if let Some((i, bad)) = values
        .iter()
        .enumerate()
        .find(|(_, v)| !(v.is_finite() && **v >= 0.0))
    {
        return Err(SimError::invalid_parameter(
            field,
            format!("duration {} is {bad}, expected a finite non-negative number", i + 1),
        ));
    }
    Ok(())
}
