//! Core building blocks for M/M/c/K queue replays.
//!
//! This crate holds everything that happens before a replay starts:
//! validated run configuration, reproducible exponential variates, and the
//! arrival timeline built from them.
//!
//! # Basic Usage
//!
//! ```rust
//! use mmq_core::{ArrivalTimeline, QueueModel, SimulationConfig, VariateGenerator};
//!
//! let config = SimulationConfig::new(QueueModel::Mmc { servers: 2 }, 1.0, 0.8, 100).with_seed(7);
//! config.ensure_valid().unwrap();
//!
//! let mut generator = VariateGenerator::seeded(config.seed);
//! let variates = generator
//!     .draw_run(config.arrival_rate, config.service_rate, config.num_customers)
//!     .unwrap();
//! let timeline = ArrivalTimeline::from_interarrivals(&variates.interarrival);
//! assert_eq!(timeline.len(), 100);
//! ```
//!
//! # Time Model
//!
//! Times are plain `f64` values in the same unit as the rates: with rates in
//! customers per minute, every instant and duration is in minutes.

pub mod config;
pub mod dists;
pub mod error;
pub mod logging;
pub mod randomness;
pub mod time;

pub use config::{validate_positive, validate_rate, ModelKind, QueueModel, SimulationConfig, Validate};
pub use dists::{exponential_quantile, RunVariates, VariateGenerator};
pub use error::{SimError, ValidationError, ValidationErrors};
pub use logging::{init_simulation_logging, init_simulation_logging_with_level, simulation_span};
pub use randomness::{DrawSite, RandomProvider, SeededProvider, INTERARRIVAL_SITE, SERVICE_SITE};
pub use time::{Arrival, ArrivalTimeline};

/// Result alias used across the workspace
pub type SimResult<T> = Result<T, SimError>;
