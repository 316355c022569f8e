//! Arrival timelines
//!
//! Converts inter-arrival durations into absolute arrival instants. The first
//! customer always arrives at time zero; its drawn inter-arrival duration is
//! discarded and reported as zero.

use serde::{Deserialize, Serialize};

/// One customer's position on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arrival {
    /// 1-based customer id
    pub id: usize,
    /// Duration since the previous arrival (0 for the first customer)
    pub interarrival_time: f64,
    /// Absolute arrival instant
    pub arrival_time: f64,
}

/// Non-decreasing sequence of arrival instants, in id order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrivalTimeline {
    arrivals: Vec<Arrival>,
}

impl ArrivalTimeline {
    /// Build the timeline from one inter-arrival duration per customer
    pub fn from_interarrivals(interarrivals: &[f64]) -> Self {
        let mut clock = 0.0;
        let arrivals = interarrivals
            .iter()
            .enumerate()
            .map(|(i, &gap)| {
                let gap = if i == 0 { 0.0 } else { gap };
                clock += gap;
                Arrival {
                    id: i + 1,
                    interarrival_time: gap,
                    arrival_time: clock,
                }
            })
            .collect();
        Self { arrivals }
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    pub fn arrivals(&self) -> &[Arrival] {
        &self.arrivals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arrival> {
        self.arrivals.iter()
    }

    /// Absolute instants only
    pub fn instants(&self) -> Vec<f64> {
        self.arrivals.iter().map(|a| a.arrival_time).collect()
    }

    /// Instant of the final arrival, 0 for an empty timeline
    pub fn last_arrival(&self) -> f64 {
        self.arrivals.last().map(|a| a.arrival_time).unwrap_or(0.0)
    }
}

impl<'a> IntoIterator for &'a ArrivalTimeline {
    type Item = &'a Arrival;
    type IntoIter = std::slice::Iter<'a, Arrival>;

    fn into_iter(self) -> Self::IntoIter {
        self.arrivals.iter()
    }
}
