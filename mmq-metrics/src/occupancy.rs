//! Occupancy series for charting
//!
//! These series are derived purely from completed records; they never touch
//! replay state and can be recomputed at any time.

use mmq_components::CustomerRecord;
use serde::{Deserialize, Serialize};

/// Series data point: a customer count at an arrival instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OccupancyPoint {
    pub time: f64,
    pub customers: usize,
}

/// Builds occupancy series from customer records
pub struct OccupancySampler;

impl OccupancySampler {
    /// For each arrival instant `t_i` (blocked customers included), the number
    /// of served customers that had arrived by `t_i`.
    ///
    /// The series is cumulative and non-decreasing.
    pub fn sample(records: &[CustomerRecord]) -> Vec<OccupancyPoint> {
        let served_arrivals: Vec<f64> = records
            .iter()
            .filter(|r| r.is_served())
            .map(|r| r.arrival_time)
            .collect();

        records
            .iter()
            .map(|r| OccupancyPoint {
                time: r.arrival_time,
                customers: served_arrivals.partition_point(|&a| a <= r.arrival_time),
            })
            .collect()
    }

    /// For each arrival instant, the number of customers present in the
    /// system (waiting or in service) just after that arrival.
    pub fn in_system(records: &[CustomerRecord]) -> Vec<OccupancyPoint> {
        records
            .iter()
            .map(|r| OccupancyPoint {
                time: r.arrival_time,
                customers: Self::present_at(records, r.arrival_time),
            })
            .collect()
    }

    /// Number of served customers with `arrival <= t < service_end`
    pub fn present_at(records: &[CustomerRecord], t: f64) -> usize {
        records
            .iter()
            .filter_map(|r| r.service_end().map(|end| (r.arrival_time, end)))
            .filter(|&(arrival, end)| arrival <= t && t < end)
            .count()
    }

    /// Number of customers in service at `t` (`service_begin <= t < service_end`)
    pub fn in_service_at(records: &[CustomerRecord], t: f64) -> usize {
        records
            .iter()
            .filter_map(CustomerRecord::service)
            .filter(|s| s.service_begin <= t && t < s.service_end)
            .count()
    }
}
