//! Replay components for M/M/c/K queues
//!
//! This crate turns an arrival timeline and a list of service durations into
//! per-customer records: which server served each customer and when, or that
//! the customer was turned away because the waiting room was full.

pub mod customer;
pub mod engine;
pub mod error;
pub mod queue;
pub mod server;

pub use customer::{CustomerOutcome, CustomerRecord, CustomerStatus, ServiceRecord};
pub use engine::{replay, replay_single_server, AdmissionEngine, ReplayOutcome};
pub use error::QueueError;
pub use queue::{WaitQueue, WaitingCustomer};
pub use server::{Assignment, ServerPool, ServerState};
