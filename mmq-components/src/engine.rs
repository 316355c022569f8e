//! Admission engine
//!
//! Replays a fixed stream of arrivals against a [`ServerPool`] and a
//! [`WaitQueue`]. Arrivals are processed strictly in id order. Before each
//! arrival is placed, the waiting room is drained into every server that has
//! freed up by the arrival instant; the new customer is then served
//! immediately, queued, or blocked.
//!
//! Servers only change state when a customer is assigned, so re-checking the
//! pool at every arrival is enough to account for completions that happened
//! in between; no completion events are needed.
//!
//! After the last arrival a final flush drains the waiting room with the
//! clock at infinity, so every admitted customer ends up served.

use crate::customer::CustomerRecord;
use crate::queue::{WaitQueue, WaitingCustomer};
use crate::server::{ServerPool, ServerState};
use mmq_core::logging::{events, simulation_span};
use mmq_core::{Arrival, ArrivalTimeline, QueueModel, SimError};

/// Everything a completed replay produced
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub model: QueueModel,
    /// One record per arrival, in id order
    pub records: Vec<CustomerRecord>,
    /// Final server states, including busy time
    pub servers: Vec<ServerState>,
    pub blocked_count: usize,
    /// Longest the waiting room ever was
    pub peak_queue_len: usize,
}

impl ReplayOutcome {
    pub fn served_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_served()).count()
    }

    /// Latest service completion, 0 when nobody was served
    pub fn horizon(&self) -> f64 {
        self.records
            .iter()
            .filter_map(CustomerRecord::service_end)
            .fold(0.0, f64::max)
    }
}

/// Replay `timeline` under `model`, with `service_times[i]` belonging to the
/// customer with id `i + 1`.
///
/// M/M/1 uses the closed-form single-server recurrence; the other variants go
/// through [`AdmissionEngine`].
///
/// # Errors
///
/// `InvalidParameter` when the model has no servers, the two sequences
/// differ in length, or an arrival instant or service duration is not a
/// finite non-negative number. `InternalInvariantViolation` indicates a defect.
pub fn replay(
    model: QueueModel,
    timeline: &ArrivalTimeline,
    service_times: &[f64],
) -> Result<ReplayOutcome, SimError> {
    if timeline.len() != service_times.len() {
        return Err(SimError::invalid_parameter(
            "service_times",
            format!(
                "expected {} service durations, got {}",
                timeline.len(),
                service_times.len()
            ),
        ));
    }

    let span = simulation_span(model.kind().as_str(), timeline.len());
    let _guard = span.enter();
    events::run_started(
        model.kind().as_str(),
        model.servers(),
        model.capacity(),
        timeline.len(),
    );

    let outcome = match model {
        QueueModel::Mm1 => replay_single_server(timeline, service_times)?,
        _ => {
            let mut engine = AdmissionEngine::new(model)?;
            for (arrival, &service_time) in timeline.iter().zip(service_times) {
                engine.admit(arrival, service_time)?;
            }
            engine.finish()?
        }
    };

    events::run_completed(
        outcome.served_count(),
        outcome.blocked_count,
        outcome.peak_queue_len,
        outcome.horizon(),
    );
    Ok(outcome)
}

/// Closed-form M/M/1 replay: each customer begins at the later of its arrival
/// and the previous customer's completion. Nobody is ever blocked.
pub fn replay_single_server(
    timeline: &ArrivalTimeline,
    service_times: &[f64],
) -> Result<ReplayOutcome, SimError> {
    let mut pool = ServerPool::new(1)?;
    let mut records = Vec::with_capacity(timeline.len());

    for (arrival, &service_time) in timeline.iter().zip(service_times) {
        check_arrival(arrival, service_time)?;
        let previous_end = pool.servers()[0].next_available_time;
        let begin = arrival.arrival_time.max(previous_end);

        let assignment = pool.assign(0, begin, service_time)?;
        let mut record = CustomerRecord::arrived(arrival, service_time);
        record.serve(assignment.server_index, begin, assignment.previously_available);
        events::customer_served(record.id, assignment.server_index, arrival.arrival_time, begin);
        records.push(record);
    }

    Ok(ReplayOutcome {
        model: QueueModel::Mm1,
        peak_queue_len: peak_waiting_at_arrivals(&records),
        records,
        servers: pool.into_servers(),
        blocked_count: 0,
    })
}

/// Largest number of customers waiting right after an arrival, for a single
/// FIFO server whose service begins are non-decreasing in id order.
///
/// After customer `i` arrives at `t`, the ones still waiting are exactly the
/// customers `j <= i` with `begin_j > t`, which form a suffix of `1..=i`.
fn peak_waiting_at_arrivals(records: &[CustomerRecord]) -> usize {
    let begins: Vec<f64> = records
        .iter()
        .map(|r| r.service_begin().unwrap_or(r.arrival_time))
        .collect();

    let mut first_waiting = 0;
    let mut peak = 0;
    for (i, record) in records.iter().enumerate() {
        while first_waiting <= i && begins[first_waiting] <= record.arrival_time {
            first_waiting += 1;
        }
        peak = peak.max(i + 1 - first_waiting);
    }
    peak
}

/// Rejects instants and durations the ordering checks cannot see, such as NaN
fn check_arrival(arrival: &Arrival, service_time: f64) -> Result<(), SimError> {
    if !arrival.arrival_time.is_finite() {
        return Err(SimError::invalid_parameter(
            "arrival_time",
            format!("customer {} arrives at {}", arrival.id, arrival.arrival_time),
        ));
    }
    if !(service_time.is_finite() && service_time >= 0.0) {
        return Err(SimError::invalid_parameter(
            "service_time",
            format!("customer {} needs {service_time}", arrival.id),
        ));
    }
    Ok(())
}

/// Per-run state machine for the queue variants with admission control or
/// more than one server.
///
/// All state is owned by the engine and discarded with it, so independent
/// replays never share anything.
#[derive(Debug)]
pub struct AdmissionEngine {
    model: QueueModel,
    pool: ServerPool,
    queue: WaitQueue,
    records: Vec<CustomerRecord>,
    blocked_count: usize,
    last_arrival: f64,
}

impl AdmissionEngine {
    pub fn new(model: QueueModel) -> Result<Self, SimError> {
        Ok(Self {
            model,
            pool: ServerPool::new(model.servers())?,
            queue: WaitQueue::new(model.capacity()),
            records: Vec::new(),
            blocked_count: 0,
            last_arrival: 0.0,
        })
    }

    /// Place the next arrival.
    ///
    /// Arrivals must come in id order (1, 2, 3, ...) with non-decreasing
    /// instants.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when the arrival instant is not finite or the
    /// service duration is not finite and non-negative.
    pub fn admit(&mut self, arrival: &Arrival, service_time: f64) -> Result<(), SimError> {
        check_arrival(arrival, service_time)?;
        let expected_id = self.records.len() + 1;
        if arrival.id != expected_id || arrival.arrival_time < self.last_arrival {
            return Err(SimError::invariant(format!(
                "arrival {} at {} out of order (expected id {expected_id} at or after {})",
                arrival.id, arrival.arrival_time, self.last_arrival
            )));
        }
        self.last_arrival = arrival.arrival_time;

        let now = arrival.arrival_time;
        self.drain(now)?;

        self.records.push(CustomerRecord::arrived(arrival, service_time));

        if let Some(slot) = self.pool.earliest_free_server(now) {
            self.start_service(slot, arrival.id, now)?;
        } else if !self.queue.is_full() {
            self.queue
                .enqueue(WaitingCustomer {
                    id: arrival.id,
                    arrival_time: now,
                    service_time,
                })
                .map_err(|e| SimError::invariant(format!("enqueue after capacity check: {e}")))?;
            events::customer_queued(arrival.id, now, self.queue.len());
        } else {
            self.blocked_count += 1;
            self.record_mut(arrival.id)?.block();
            events::customer_blocked(arrival.id, now, self.queue.len());
        }

        Ok(())
    }

    /// Move waiting customers into service while some server is free at or
    /// before `now`. Each goes to the server that freed up first.
    fn drain(&mut self, now: f64) -> Result<(), SimError> {
        while let Some(&head) = self.queue.peek() {
            let (slot, available_at) = self.pool.soonest_available();
            if available_at > now {
                break;
            }
            self.queue.dequeue();
            self.start_service(slot, head.id, head.arrival_time.max(available_at))?;
        }
        Ok(())
    }

    fn start_service(&mut self, slot: usize, id: usize, begin: f64) -> Result<(), SimError> {
        let service_time = self.record_mut(id)?.service_time;
        let assignment = self.pool.assign(slot, begin, service_time)?;
        let record = self.record_mut(id)?;
        record.serve(assignment.server_index, begin, assignment.previously_available);
        events::customer_served(id, assignment.server_index, record.arrival_time, begin);
        Ok(())
    }

    fn record_mut(&mut self, id: usize) -> Result<&mut CustomerRecord, SimError> {
        id.checked_sub(1)
            .and_then(|i| self.records.get_mut(i))
            .ok_or_else(|| SimError::invariant(format!("no record for customer {id}")))
    }

    /// Flush the waiting room and return the completed replay.
    ///
    /// # Errors
    ///
    /// `InternalInvariantViolation` if any customer is still pending after
    /// the flush.
    pub fn finish(mut self) -> Result<ReplayOutcome, SimError> {
        tracing::debug!(waiting = self.queue.len(), "Final flush");
        self.drain(f64::INFINITY)?;

        if let Some(pending) = self.records.iter().find(|r| !r.is_served() && !r.is_blocked()) {
            return Err(SimError::invariant(format!(
                "customer {} still pending after final flush",
                pending.id
            )));
        }

        Ok(ReplayOutcome {
            model: self.model,
            peak_queue_len: self.queue.peak_len(),
            blocked_count: self.blocked_count,
            servers: self.pool.into_servers(),
            records: self.records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::CustomerStatus;

    const EPS: f64 = 1e-9;

    fn timeline(gaps: &[f64]) -> ArrivalTimeline {
        ArrivalTimeline::from_interarrivals(gaps)
    }

    fn statuses(outcome: &ReplayOutcome) -> Vec<CustomerStatus> {
        outcome.records.iter().map(CustomerRecord::status).collect()
    }

    #[test]
    fn test_single_server_worked_example() {
        let outcome = replay(QueueModel::Mm1, &timeline(&[0.0, 0.5, 0.3]), &[0.4, 0.6, 0.2]).unwrap();
        let begins: Vec<f64> = outcome.records.iter().filter_map(|r| r.service_begin()).collect();
        let ends: Vec<f64> = outcome.records.iter().filter_map(|r| r.service_end()).collect();

        assert!((begins[0] - 0.0).abs() < EPS);
        assert!((begins[1] - 0.5).abs() < EPS);
        assert!((begins[2] - 1.1).abs() < EPS);
        assert!((ends[2] - 1.3).abs() < EPS);
        assert!((outcome.horizon() - 1.3).abs() < EPS);
        assert_eq!(outcome.blocked_count, 0);
        assert_eq!(outcome.peak_queue_len, 1);

        let third = outcome.records[2].service().unwrap();
        assert!((third.waiting_time - 0.3).abs() < EPS);
        assert_eq!(third.server_idle_time, 0.0);
        let second = outcome.records[1].service().unwrap();
        assert!((second.server_idle_time - 0.1).abs() < EPS);
    }

    #[test]
    fn test_closed_form_matches_general_engine() {
        let gaps = [0.0, 0.3, 0.1, 0.05, 2.0, 0.0, 0.0, 0.7, 0.2, 0.4];
        let services = [0.5, 0.2, 0.9, 0.1, 0.3, 0.3, 0.6, 0.1, 1.2, 0.05];
        let arrivals = timeline(&gaps);

        let closed = replay(QueueModel::Mm1, &arrivals, &services).unwrap();
        let general = replay(QueueModel::Mmc { servers: 1 }, &arrivals, &services).unwrap();

        assert_eq!(closed.records, general.records);
        assert_eq!(closed.servers, general.servers);
        assert_eq!(closed.peak_queue_len, general.peak_queue_len);
    }

    #[test]
    fn test_zero_buffer_blocks_arrivals_finding_server_busy() {
        let outcome = replay(
            QueueModel::Mm1k { capacity: 0 },
            &timeline(&[0.0, 1.0, 1.0, 1.0]),
            &[1.5, 1.5, 1.5, 1.5],
        )
        .unwrap();

        assert_eq!(
            statuses(&outcome),
            vec![
                CustomerStatus::Served,
                CustomerStatus::Blocked,
                CustomerStatus::Served,
                CustomerStatus::Blocked,
            ]
        );
        assert_eq!(outcome.blocked_count, 2);
        assert_eq!(outcome.peak_queue_len, 0);
        assert_eq!(outcome.records[2].service_begin(), Some(2.0));
    }

    #[test]
    fn test_finite_buffer_blocks_when_full_and_flushes() {
        let outcome = replay(
            QueueModel::Mm1k { capacity: 1 },
            &timeline(&[0.0, 0.1, 0.1, 0.1]),
            &[1.0, 1.0, 1.0, 1.0],
        )
        .unwrap();

        assert_eq!(
            statuses(&outcome),
            vec![
                CustomerStatus::Served,
                CustomerStatus::Served,
                CustomerStatus::Blocked,
                CustomerStatus::Blocked,
            ]
        );
        // Customer 2 waited in the buffer and was served by the final flush.
        let second = outcome.records[1].service().unwrap();
        assert_eq!(second.service_begin, 1.0);
        assert_eq!(second.service_end, 2.0);
        assert!((second.waiting_time - 0.9).abs() < EPS);
        assert_eq!(outcome.served_count() + outcome.blocked_count, 4);
        assert_eq!(outcome.peak_queue_len, 1);
    }

    #[test]
    fn test_waiting_customer_goes_to_soonest_free_server() {
        // Server 1 is busy until 4, server 2 until 2. Customer 3 waits from
        // t=1 and must start at 2 on server 2 even though both are idle by
        // the time customer 4 arrives.
        let outcome = replay(
            QueueModel::Mmc { servers: 2 },
            &timeline(&[0.0, 0.0, 1.0, 4.0]),
            &[4.0, 2.0, 1.0, 1.0],
        )
        .unwrap();

        let third = outcome.records[2].service().unwrap();
        assert_eq!(third.server_index, 2);
        assert_eq!(third.service_begin, 2.0);
        assert_eq!(third.waiting_time, 1.0);

        let fourth = outcome.records[3].service().unwrap();
        assert_eq!(fourth.server_index, 1);
        assert_eq!(fourth.service_begin, 5.0);
        assert_eq!(fourth.waiting_time, 0.0);
    }

    #[test]
    fn test_multi_server_immediate_service_uses_lowest_index() {
        let outcome = replay(
            QueueModel::Mmc { servers: 3 },
            &timeline(&[0.0, 0.0, 0.0, 10.0]),
            &[1.0, 1.0, 1.0, 1.0],
        )
        .unwrap();

        let servers: Vec<usize> = outcome.records.iter().filter_map(|r| r.server_index()).collect();
        assert_eq!(servers, vec![1, 2, 3, 1]);
        assert_eq!(outcome.servers[0].customers_served, 2);
    }

    #[test]
    fn test_simultaneous_arrivals_fill_servers_then_buffer() {
        let outcome = replay(
            QueueModel::Mmck { servers: 2, capacity: 1 },
            &timeline(&[0.0, 0.0, 0.0, 0.0]),
            &[1.0, 2.0, 1.0, 1.0],
        )
        .unwrap();

        assert_eq!(
            statuses(&outcome),
            vec![
                CustomerStatus::Served,
                CustomerStatus::Served,
                CustomerStatus::Served,
                CustomerStatus::Blocked,
            ]
        );
        let third = outcome.records[2].service().unwrap();
        assert_eq!(third.server_index, 1);
        assert_eq!(third.service_begin, 1.0);
        assert_eq!(outcome.blocked_count, 1);
    }

    #[test]
    fn test_unbounded_multi_server_flush_serves_everyone() {
        let outcome = replay(
            QueueModel::Mmc { servers: 2 },
            &timeline(&[0.0, 0.1, 0.1, 0.1, 0.1, 0.1]),
            &[3.0; 6],
        )
        .unwrap();

        assert_eq!(outcome.served_count(), 6);
        assert_eq!(outcome.blocked_count, 0);
        assert_eq!(outcome.peak_queue_len, 4);
        assert!((outcome.horizon() - 9.1).abs() < EPS);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let result = replay(QueueModel::Mm1, &timeline(&[0.0, 1.0]), &[1.0]);
        assert!(matches!(result, Err(SimError::InvalidParameter { .. })));
    }

    #[test]
    fn test_out_of_order_arrival_is_invariant_violation() {
        let mut engine = AdmissionEngine::new(QueueModel::Mmc { servers: 1 }).unwrap();
        let arrivals = timeline(&[0.0, 1.0]);
        let second = arrivals.arrivals()[1];

        assert!(matches!(
            engine.admit(&second, 1.0),
            Err(SimError::InternalInvariantViolation(_))
        ));
    }

    #[test]
    fn test_engine_state_is_per_instance() {
        let arrivals = timeline(&[0.0, 0.1, 0.1]);
        let services = [1.0, 1.0, 1.0];
        let model = QueueModel::Mmck { servers: 1, capacity: 1 };

        let first = replay(model, &arrivals, &services).unwrap();
        let second = replay(model, &arrivals, &services).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.blocked_count, 1);
    }

    #[test]
    fn test_non_finite_arrival_rejected() {
        let arrivals = timeline(&[0.0, f64::NAN, 1.0]);
        for model in [QueueModel::Mm1, QueueModel::Mmck { servers: 2, capacity: 1 }] {
            let result = replay(model, &arrivals, &[1.0, 1.0, 1.0]);
            assert!(
                matches!(result, Err(SimError::InvalidParameter { ref field, .. }) if field == "arrival_time"),
                "{model}: {result:?}"
            );
        }

        let mut engine = AdmissionEngine::new(QueueModel::Mmc { servers: 1 }).unwrap();
        let first = Arrival {
            id: 1,
            interarrival_time: 0.0,
            arrival_time: f64::INFINITY,
        };
        assert!(matches!(engine.admit(&first, 1.0), Err(SimError::InvalidParameter { .. })));
    }

    #[test]
    fn test_non_finite_service_rejected_even_when_blocked() {
        let arrivals = timeline(&[0.0, 0.0]);
        let result = replay(QueueModel::Mm1k { capacity: 0 }, &arrivals, &[1.0, f64::NAN]);
        assert!(matches!(result, Err(SimError::InvalidParameter { ref field, .. }) if field == "service_time"));
    }
}
