//! FIFO waiting room
//!
//! Holds customers that arrived while every server was busy. The capacity
//! bounds customers *waiting*, not those in service; `None` means unbounded.

use crate::error::QueueError;
use std::collections::VecDeque;

/// A customer waiting for a server
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitingCustomer {
    pub id: usize,
    pub arrival_time: f64,
    pub service_time: f64,
}

/// First-In-First-Out waiting room with optional capacity
///
/// # Examples
///
/// ```
/// use mmq_components::queue::{WaitQueue, WaitingCustomer};
///
/// let mut queue = WaitQueue::bounded(1);
/// let customer = WaitingCustomer { id: 1, arrival_time: 0.0, service_time: 1.0 };
/// queue.enqueue(customer).unwrap();
/// assert!(queue.is_full());
/// assert!(queue.enqueue(customer).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct WaitQueue {
    items: VecDeque<WaitingCustomer>,
    capacity: Option<usize>,
    total_enqueued: u64,
    total_dequeued: u64,
    peak_len: usize,
}

impl WaitQueue {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            items: VecDeque::new(),
            capacity,
            total_enqueued: 0,
            total_dequeued: 0,
            peak_len: 0,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn bounded(capacity: usize) -> Self {
        Self::new(Some(capacity))
    }

    /// Append a customer at the tail
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Full` if the queue is at capacity.
    pub fn enqueue(&mut self, customer: WaitingCustomer) -> Result<(), QueueError> {
        if self.is_full() {
            return Err(QueueError::Full {
                capacity: self.capacity.unwrap_or_default(),
            });
        }

        self.items.push_back(customer);
        self.total_enqueued += 1;
        self.peak_len = self.peak_len.max(self.items.len());
        Ok(())
    }

    /// Remove the customer at the head
    pub fn dequeue(&mut self) -> Option<WaitingCustomer> {
        let customer = self.items.pop_front();
        if customer.is_some() {
            self.total_dequeued += 1;
        }
        customer
    }

    pub fn peek(&self) -> Option<&WaitingCustomer> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|cap| self.items.len() >= cap)
    }

    /// Longest the queue has ever been
    pub fn peak_len(&self) -> usize {
        self.peak_len
    }

    pub fn total_enqueued(&self) -> u64 {
        self.total_enqueued
    }

    pub fn total_dequeued(&self) -> u64 {
        self.total_dequeued
    }
}
