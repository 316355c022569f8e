//! Exponential variate generation
//!
//! Inter-arrival and service durations are drawn by inverse-transform
//! sampling: for `U` uniform in `[0, 1)`, `-ln(1 - U) / rate` is exponential
//! with the given rate.

use crate::error::SimError;
use crate::randomness::{DrawSite, RandomProvider, SeededProvider, INTERARRIVAL_SITE, SERVICE_SITE};
use tracing::debug;

/// Inverse CDF of the exponential distribution.
///
/// `u` must lie in `[0, 1)`; the result is finite and non-negative.
pub fn exponential_quantile(u: f64, rate: f64) -> f64 {
    -(1.0 - u).ln() / rate
}

/// Duration sequences for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunVariates {
    /// One inter-arrival duration per customer
    pub interarrival: Vec<f64>,
    /// One service duration per customer
    pub service: Vec<f64>,
}

/// Draws exponential durations from an owned [`RandomProvider`]
pub struct VariateGenerator<P = SeededProvider> {
    provider: P,
    draws: u64,
}

impl VariateGenerator<SeededProvider> {
    /// Generator over a [`SeededProvider`]; entropy-seeded when `seed` is `None`
    pub fn seeded(seed: Option<u64>) -> Self {
        Self::new(SeededProvider::from_optional_seed(seed))
    }

    /// The seed actually in use
    pub fn seed(&self) -> u64 {
        self.provider.seed()
    }
}

impl<P: RandomProvider> VariateGenerator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider, draws: 0 }
    }

    /// Draw one exponential duration with the given rate.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when `rate` is not a finite positive number. The
    /// provider is not advanced in that case.
    pub fn draw(&mut self, site: DrawSite, rate: f64) -> Result<f64, SimError> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(SimError::invalid_parameter(
                site.tag,
                format!("rate must be a finite positive number (got {rate})"),
            ));
        }
        let u = self.provider.sample_uniform(site);
        self.draws += 1;
        Ok(exponential_quantile(u, rate))
    }

    /// Draw `count` durations from the same stream
    pub fn draw_many(&mut self, site: DrawSite, rate: f64, count: usize) -> Result<Vec<f64>, SimError> {
        (0..count).map(|_| self.draw(site, rate)).collect()
    }

    /// Draw the inter-arrival sequence (rate `arrival_rate`) followed by the
    /// service sequence (rate `service_rate`), `count` values each.
    pub fn draw_run(
        &mut self,
        arrival_rate: f64,
        service_rate: f64,
        count: usize,
    ) -> Result<RunVariates, SimError> {
        let interarrival = self.draw_many(INTERARRIVAL_SITE, arrival_rate, count)?;
        let service = self.draw_many(SERVICE_SITE, service_rate, count)?;
        debug!(count, arrival_rate, service_rate, "Drew run variates");
        Ok(RunVariates { interarrival, service })
    }

    /// Total number of successful draws
    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn into_provider(self) -> P {
        self.provider
    }
}
