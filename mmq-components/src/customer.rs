//! Per-customer records produced by a replay
//!
//! Every arrival attempt yields exactly one [`CustomerRecord`]. What happened
//! to the customer is carried by [`CustomerOutcome`]: service fields exist
//! only on the `Served` variant, so a blocked customer can never be mistaken
//! for one that was served instantly.

use mmq_core::Arrival;
use serde::{Deserialize, Serialize};

/// Timing of a customer's service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Which server handled the customer, 1-based
    pub server_index: usize,
    pub service_begin: f64,
    pub service_end: f64,
    /// `service_begin - arrival_time`
    pub waiting_time: f64,
    /// `waiting_time + service_time`
    pub time_in_system: f64,
    /// How long the server sat idle right before this service began
    pub server_idle_time: f64,
}

/// What happened to a customer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum CustomerOutcome {
    Served(ServiceRecord),
    /// Admitted to the waiting room but not yet served. Never present once a
    /// replay has completed.
    QueuedPending,
    /// Rejected on arrival because the waiting room was full
    Blocked,
}

/// Short status label for a customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerStatus {
    Served,
    QueuedPending,
    Blocked,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Served => "served",
            CustomerStatus::QueuedPending => "queued-pending",
            CustomerStatus::Blocked => "blocked",
        }
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One arrival attempt and its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// 1-based arrival sequence number
    pub id: usize,
    pub interarrival_time: f64,
    pub arrival_time: f64,
    /// Required service duration, drawn before the replay
    pub service_time: f64,
    #[serde(flatten)]
    pub outcome: CustomerOutcome,
}

impl CustomerRecord {
    /// Record for a customer that has arrived but not been placed yet
    pub fn arrived(arrival: &Arrival, service_time: f64) -> Self {
        Self {
            id: arrival.id,
            interarrival_time: arrival.interarrival_time,
            arrival_time: arrival.arrival_time,
            service_time,
            outcome: CustomerOutcome::QueuedPending,
        }
    }

    /// Mark the customer served by `server_index` starting at `service_begin`.
    ///
    /// `server_available_at` is when that server finished its previous
    /// customer; the gap up to `service_begin` is recorded as idle time.
    pub fn serve(&mut self, server_index: usize, service_begin: f64, server_available_at: f64) -> ServiceRecord {
        let waiting_time = service_begin - self.arrival_time;
        let service = ServiceRecord {
            server_index,
            service_begin,
            service_end: service_begin + self.service_time,
            waiting_time,
            time_in_system: waiting_time + self.service_time,
            server_idle_time: (service_begin - server_available_at).max(0.0),
        };
        self.outcome = CustomerOutcome::Served(service);
        service
    }

    pub fn block(&mut self) {
        self.outcome = CustomerOutcome::Blocked;
    }

    pub fn status(&self) -> CustomerStatus {
        match self.outcome {
            CustomerOutcome::Served(_) => CustomerStatus::Served,
            CustomerOutcome::QueuedPending => CustomerStatus::QueuedPending,
            CustomerOutcome::Blocked => CustomerStatus::Blocked,
        }
    }

    /// Service timing, `None` unless the customer was served
    pub fn service(&self) -> Option<&ServiceRecord> {
        match &self.outcome {
            CustomerOutcome::Served(service) => Some(service),
            _ => None,
        }
    }

    pub fn is_served(&self) -> bool {
        matches!(self.outcome, CustomerOutcome::Served(_))
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self.outcome, CustomerOutcome::Blocked)
    }

    pub fn service_begin(&self) -> Option<f64> {
        self.service().map(|s| s.service_begin)
    }

    pub fn service_end(&self) -> Option<f64> {
        self.service().map(|s| s.service_end)
    }

    pub fn waiting_time(&self) -> Option<f64> {
        self.service().map(|s| s.waiting_time)
    }

    pub fn time_in_system(&self) -> Option<f64> {
        self.service().map(|s| s.time_in_system)
    }

    pub fn server_index(&self) -> Option<usize> {
        self.service().map(|s| s.server_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrival(id: usize, at: f64) -> Arrival {
        Arrival {
            id,
            interarrival_time: 0.5,
            arrival_time: at,
        }
    }

    #[test]
    fn test_new_record_is_pending() {
        let record = CustomerRecord::arrived(&arrival(2, 0.5), 0.6);
        assert_eq!(record.status(), CustomerStatus::QueuedPending);
        assert!(record.service().is_none());
        assert_eq!(record.service_begin(), None);
    }

    #[test]
    fn test_serve_fills_timing() {
        let mut record = CustomerRecord::arrived(&arrival(2, 0.5), 0.6);
        let service = record.serve(1, 0.5, 0.4);

        assert_eq!(service.service_end, 0.5 + 0.6);
        assert_eq!(service.waiting_time, 0.0);
        assert_eq!(service.time_in_system, 0.6);
        assert!((service.server_idle_time - 0.1).abs() < 1e-12);
        assert_eq!(record.server_index(), Some(1));
        assert!(record.is_served());
    }

    #[test]
    fn test_waiting_customer_has_no_idle_gap() {
        let mut record = CustomerRecord::arrived(&arrival(3, 0.8), 0.2);
        let service = record.serve(1, 1.1, 1.1);
        assert!((service.waiting_time - 0.3).abs() < 1e-12);
        assert_eq!(service.server_idle_time, 0.0);
        assert_eq!(service.time_in_system, service.waiting_time + 0.2);
    }

    #[test]
    fn test_blocked_record_has_no_service_fields() {
        let mut record = CustomerRecord::arrived(&arrival(4, 1.0), 0.3);
        record.block();
        assert!(record.is_blocked());
        assert_eq!(record.waiting_time(), None);
        assert_eq!(record.time_in_system(), None);
        assert_eq!(record.status().to_string(), "blocked");
    }
}
