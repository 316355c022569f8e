//! Runs the four queue variants with the same rates and prints their headline
//! metrics side by side.
//!
//! Run with: cargo run --package mmq --example basic_usage
//! Set RUST_LOG=mmq=debug to see per-customer events.

use mmq::prelude::*;

fn main() -> Result<(), SimError> {
    init_simulation_logging();

    let (lambda, mu, customers, seed) = (1.0, 0.6, 2_000, 42);
    let models = [
        QueueModel::Mm1,
        QueueModel::Mm1k { capacity: 5 },
        QueueModel::Mmc { servers: 3 },
        QueueModel::Mmck { servers: 3, capacity: 5 },
    ];

    println!("lambda = {lambda}, mu = {mu}, customers = {customers}, seed = {seed}\n");
    println!(
        "{:<10} {:>10} {:>8} {:>8} {:>8} {:>8} {:>9} {:>8}",
        "model", "horizon", "L", "Lq", "W", "Wq", "P(block)", "util"
    );

    for model in models {
        let config = SimulationConfig::new(model, lambda, mu, customers).with_seed(seed);
        let report = simulate(&config)?;
        let m = &report.metrics;
        let blocking = m
            .blocking_probability
            .map(|p| format!("{p:.4}"))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<10} {:>10.2} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>9} {:>8.3}",
            model.to_string(),
            m.simulation_horizon,
            m.l,
            m.lq,
            m.w,
            m.wq,
            blocking,
            m.mean_server_utilization,
        );
    }

    // A single-server run with rho = lambda / mu > 1 never settles; the
    // queue keeps growing with the number of customers.
    let unstable = SimulationConfig::new(QueueModel::Mm1, lambda, mu, customers).with_seed(seed);
    let report = simulate(&unstable)?;
    println!(
        "\nM/M/1 with rho = {:.2}: peak queue length {}",
        unstable.traffic_intensity(),
        report.peak_queue_len
    );

    Ok(())
}
