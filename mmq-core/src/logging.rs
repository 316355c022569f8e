//! Structured logging for queue replays
//!
//! Replays log through `tracing`. Nothing is printed unless a subscriber is
//! installed, either by the embedding application or by one of the helpers
//! below.
//!
//! # Controlling output
//!
//! ```rust,no_run
//! use mmq_core::logging::init_simulation_logging_with_level;
//!
//! init_simulation_logging_with_level("debug");
//! ```
//!
//! `RUST_LOG` takes precedence over the level passed in:
//!
//! ```bash
//! RUST_LOG=mmq_components::engine=trace cargo run --example basic_usage
//! ```
//!
//! Level guidelines:
//! - **TRACE**: every admission decision (served, queued, drained, blocked)
//! - **DEBUG**: run start/end, variate draws, final flush
//! - **INFO**: one line per completed run with headline metrics
//! - **ERROR**: invariant violations (always a defect)

use tracing::{debug, error, info, trace, Span};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging at `info` level
pub fn init_simulation_logging() -> bool {
    init_simulation_logging_with_level("info")
}

/// Initialize logging with a specific level
///
/// Returns `false` when a global subscriber was already installed, in which
/// case the existing one is left in place.
///
/// # Arguments
/// * `level` - Log level: "trace", "debug", "info", "warn", or "error"
pub fn init_simulation_logging_with_level(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("mmq={level},mmq_core={level},mmq_components={level},mmq_metrics={level}").into()
    });

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Simulation logging initialized at level: {}", level);
    }
    installed
}

/// Span covering one replay
pub fn simulation_span(model: &str, num_customers: usize) -> Span {
    tracing::info_span!("simulation", model = model, customers = num_customers)
}

/// Logging helpers for replay events
pub mod events {
    use super::*;

    pub fn run_started(model: &str, servers: usize, capacity: Option<usize>, num_customers: usize) {
        debug!(
            model = model,
            servers = servers,
            capacity = ?capacity,
            customers = num_customers,
            "Replay started"
        );
    }

    pub fn customer_served(id: usize, server: usize, arrival: f64, begin: f64) {
        trace!(
            customer = id,
            server = server,
            arrival = arrival,
            begin = begin,
            "Customer entered service"
        );
    }

    pub fn customer_queued(id: usize, arrival: f64, queue_len: usize) {
        trace!(customer = id, arrival = arrival, queue_len = queue_len, "Customer queued");
    }

    pub fn customer_blocked(id: usize, arrival: f64, queue_len: usize) {
        trace!(customer = id, arrival = arrival, queue_len = queue_len, "Customer blocked");
    }

    pub fn run_completed(served: usize, blocked: usize, peak_queue_len: usize, horizon: f64) {
        debug!(
            served = served,
            blocked = blocked,
            peak_queue_len = peak_queue_len,
            horizon = horizon,
            "Replay completed"
        );
    }
}

/// Logging helpers for conditions that indicate a defect
pub mod diagnostics {
    use super::*;

    pub fn invariant_violation(description: &str, expected: &str, actual: &str) {
        error!(
            description = description,
            expected = expected,
            actual = actual,
            "Replay invariant violated"
        );
    }
}
