//! Congestion metrics derived from a completed replay
//!
//! Time averages (`L`, `Lq`) divide the total customer-time by the
//! simulation horizon: the area under the number-in-system curve equals the
//! sum of every customer's time in system. Per-customer averages (`W`, `Wq`)
//! divide the same totals by the number served, for every queue variant.

use mmq_components::CustomerRecord;
use mmq_core::QueueModel;
use serde::{Deserialize, Serialize};

/// Headline figures for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMetrics {
    /// Latest service completion over served customers
    pub simulation_horizon: f64,
    /// Time-average number in system
    #[serde(rename = "L")]
    pub l: f64,
    /// Time-average number waiting
    #[serde(rename = "Lq")]
    pub lq: f64,
    /// Mean time in system per served customer
    #[serde(rename = "W")]
    pub w: f64,
    /// Mean waiting time per served customer
    #[serde(rename = "Wq")]
    pub wq: f64,
    /// Fraction of arrivals turned away; `None` for unbounded variants
    pub blocking_probability: Option<f64>,
    pub total_customers: usize,
    pub served_count: usize,
    /// Customers that had to wait before service
    pub queued_count: usize,
    pub blocked_count: usize,
    /// Served customers per time unit over the horizon
    pub throughput: f64,
    /// `lambda * (1 - blocking_probability)`
    pub effective_arrival_rate: f64,
    /// Busy fraction averaged over all servers
    pub mean_server_utilization: f64,
}

/// Computes [`QueueMetrics`] from customer records
#[derive(Debug, Clone, Copy)]
pub struct MetricsAggregator {
    model: QueueModel,
    arrival_rate: f64,
}

impl MetricsAggregator {
    pub fn new(model: QueueModel, arrival_rate: f64) -> Self {
        Self { model, arrival_rate }
    }

    /// Aggregate a completed record sequence.
    ///
    /// Every ratio is 0 when nobody was served, rather than NaN.
    pub fn aggregate(&self, records: &[CustomerRecord]) -> QueueMetrics {
        let mut horizon: f64 = 0.0;
        let mut total_system = 0.0;
        let mut total_wait = 0.0;
        let mut total_service = 0.0;
        let mut served_count = 0;
        let mut queued_count = 0;
        let mut blocked_count = 0;

        for record in records {
            if record.is_blocked() {
                blocked_count += 1;
            }
            let Some(service) = record.service() else {
                continue;
            };
            served_count += 1;
            horizon = horizon.max(service.service_end);
            total_system += service.time_in_system;
            total_wait += service.waiting_time.max(0.0);
            total_service += record.service_time;
            if service.waiting_time > 0.0 {
                queued_count += 1;
            }
        }

        let per_horizon = |total: f64| ratio(total, horizon);
        let per_customer = |total: f64| ratio(total, served_count as f64);

        let total_customers = records.len();
        let blocking_probability = self
            .model
            .is_bounded()
            .then(|| ratio(blocked_count as f64, total_customers as f64));
        let servers = self.model.servers() as f64;

        QueueMetrics {
            simulation_horizon: horizon,
            l: per_horizon(total_system),
            lq: per_horizon(total_wait),
            w: per_customer(total_system),
            wq: per_customer(total_wait),
            blocking_probability,
            total_customers,
            served_count,
            queued_count,
            blocked_count,
            throughput: per_horizon(served_count as f64),
            effective_arrival_rate: self.arrival_rate * (1.0 - blocking_probability.unwrap_or(0.0)),
            mean_server_utilization: ratio(total_service, servers * horizon),
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

impl QueueMetrics {
    /// Publish the run's figures through the `metrics` facade.
    ///
    /// This is a no-op unless the embedding application installed a recorder.
    pub fn publish(&self, model: &QueueModel) {
        let label = model.kind().as_str();

        metrics::counter!("mmq_customers_total", "model" => label).increment(self.total_customers as u64);
        metrics::counter!("mmq_customers_served_total", "model" => label).increment(self.served_count as u64);
        metrics::counter!("mmq_customers_blocked_total", "model" => label).increment(self.blocked_count as u64);

        metrics::gauge!("mmq_avg_in_system", "model" => label).set(self.l);
        metrics::gauge!("mmq_avg_in_queue", "model" => label).set(self.lq);
        metrics::gauge!("mmq_avg_time_in_system", "model" => label).set(self.w);
        metrics::gauge!("mmq_avg_wait", "model" => label).set(self.wq);
        metrics::gauge!("mmq_server_utilization", "model" => label).set(self.mean_server_utilization);
        if let Some(p) = self.blocking_probability {
            metrics::gauge!("mmq_blocking_probability", "model" => label).set(p);
        }
    }
}
