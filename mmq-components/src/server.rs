//! Server pool
//!
//! A replay never schedules completion events. Each server instead remembers
//! the instant it next becomes free, and a server counts as idle at time `t`
//! exactly when that instant is at or before `t`.

use mmq_core::SimError;
use mmq_core::logging::diagnostics;
use serde::{Deserialize, Serialize};

/// State of one server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerState {
    /// 1-based server number
    pub index: usize,
    /// Instant the server finishes its current customer. Never decreases.
    pub next_available_time: f64,
    /// Total time spent serving
    pub busy_time: f64,
    pub customers_served: usize,
}

impl ServerState {
    fn new(index: usize) -> Self {
        Self {
            index,
            next_available_time: 0.0,
            busy_time: 0.0,
            customers_served: 0,
        }
    }

    /// Fraction of `horizon` this server spent busy, 0 for an empty horizon
    pub fn utilization(&self, horizon: f64) -> f64 {
        if horizon > 0.0 {
            self.busy_time / horizon
        } else {
            0.0
        }
    }
}

/// Result of assigning a customer to a server
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    /// 1-based server number
    pub server_index: usize,
    /// When the server finished its previous customer
    pub previously_available: f64,
    pub service_end: f64,
}

/// Fixed set of `c` servers, all free at time zero.
///
/// Slots passed to and returned from the pool are 0-based; [`ServerState::index`]
/// and [`Assignment::server_index`] are the 1-based numbers shown to users.
#[derive(Debug, Clone)]
pub struct ServerPool {
    servers: Vec<ServerState>,
}

impl ServerPool {
    /// Create a pool of `count` idle servers
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when `count` is zero.
    pub fn new(count: usize) -> Result<Self, SimError> {
        if count == 0 {
            return Err(SimError::invalid_parameter("servers", "at least one server is required"));
        }
        Ok(Self {
            servers: (1..=count).map(ServerState::new).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Lowest-numbered server that is free at or before `at`
    pub fn earliest_free_server(&self, at: f64) -> Option<usize> {
        self.servers.iter().position(|s| s.next_available_time <= at)
    }

    /// Server that becomes free first, with its availability instant.
    /// Ties go to the lowest-numbered server.
    pub fn soonest_available(&self) -> (usize, f64) {
        let mut best = 0;
        for (slot, server) in self.servers.iter().enumerate().skip(1) {
            if server.next_available_time < self.servers[best].next_available_time {
                best = slot;
            }
        }
        (best, self.servers[best].next_available_time)
    }

    /// Occupy server `slot` from `begin` for `duration`.
    ///
    /// # Errors
    ///
    /// `InternalInvariantViolation` when the slot does not exist, the duration
    /// is negative or not finite, or `begin` is earlier than the server's
    /// recorded availability. Any of these means the caller has a defect.
    pub fn assign(&mut self, slot: usize, begin: f64, duration: f64) -> Result<Assignment, SimError> {
        let count = self.servers.len();
        let server = self.servers.get_mut(slot).ok_or_else(|| {
            SimError::invariant(format!("server slot {slot} out of range for a pool of {count}"))
        })?;

        if !(duration.is_finite() && duration >= 0.0) {
            return Err(SimError::invariant(format!(
                "service duration {duration} for server {} is not a finite non-negative number",
                server.index
            )));
        }

        if begin < server.next_available_time {
            diagnostics::invariant_violation(
                "service begins before server is free",
                &format!("begin >= {}", server.next_available_time),
                &format!("begin = {begin}"),
            );
            return Err(SimError::invariant(format!(
                "server {} assigned at {begin} but busy until {}",
                server.index, server.next_available_time
            )));
        }

        let previously_available = server.next_available_time;
        let service_end = begin + duration;
        server.next_available_time = service_end;
        server.busy_time += duration;
        server.customers_served += 1;

        Ok(Assignment {
            server_index: server.index,
            previously_available,
            service_end,
        })
    }

    pub fn servers(&self) -> &[ServerState] {
        &self.servers
    }

    pub fn into_servers(self) -> Vec<ServerState> {
        self.servers
    }
}
