//! # mmq - queue replays for M/M/1, M/M/1/K, M/M/C and M/M/C/K
//!
//! mmq draws exponential inter-arrival and service times, replays a fixed
//! number of customers through one of the four classical queue variants, and
//! reports per-customer timelines plus congestion metrics.
//!
//! ## Quick Start
//!
//! ```rust
//! use mmq::prelude::*;
//!
//! let config = SimulationConfig::new(QueueModel::Mmck { servers: 2, capacity: 3 }, 1.0, 0.6, 500)
//!     .with_seed(42);
//! let report = simulate(&config).unwrap();
//!
//! let m = &report.metrics;
//! assert_eq!(m.served_count + m.blocked_count, 500);
//! println!("L = {:.2}, W = {:.2}, P(block) = {:?}", m.l, m.w, m.blocking_probability);
//! ```
//!
//! ## Crates
//!
//! - [`core`]: configuration, variates, arrival timeline, logging
//! - [`components`]: server pool, waiting room, admission engine
//! - [`metrics`]: aggregation, occupancy series, export

pub use mmq_components as components;
pub use mmq_core as core;
pub use mmq_metrics as metrics;

pub mod simulation;

pub use simulation::{replay_durations, simulate, simulate_with_provider, SimulationReport};

// Convenience re-exports of commonly used items
pub mod prelude {
    //! Commonly used types and functions

    pub use mmq_core::{
        init_simulation_logging, ModelKind, QueueModel, RandomProvider, SeededProvider, SimError,
        SimulationConfig, Validate,
    };

    pub use mmq_components::{CustomerOutcome, CustomerRecord, CustomerStatus, ServiceRecord};

    pub use mmq_metrics::{OccupancyPoint, OccupancySampler, QueueMetrics};

    pub use crate::simulation::{replay_durations, simulate, simulate_with_provider, SimulationReport};
}
