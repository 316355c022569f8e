//! Run configuration and validation
//!
//! A [`SimulationConfig`] fully describes one replay: the queue variant, the
//! arrival and service rates, how many customers arrive, and an optional seed.
//! Validation collects every failing field so callers can report them all at
//! once; nothing is drawn or replayed until a configuration validates.
//!
//! Rates are used exactly as given for every variant.

use crate::error::{SimError, ValidationError, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result type for single-field checks
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validating a configuration
pub trait Validate {
    /// Check every field, returning all violations found
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// The four supported queue variants in Kendall notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum QueueModel {
    /// Single server, unbounded waiting room
    Mm1,
    /// Single server, at most `capacity` customers waiting
    Mm1k { capacity: usize },
    /// `servers` parallel servers, unbounded waiting room
    Mmc { servers: usize },
    /// `servers` parallel servers, at most `capacity` customers waiting
    Mmck { servers: usize, capacity: usize },
}

impl QueueModel {
    /// Build a model from its short name plus the optional server count and
    /// buffer capacity supplied by an input form or command line.
    ///
    /// `servers` is required for MMC/MMCK and ignored otherwise; `capacity`
    /// is required for MM1K/MMCK and ignored otherwise.
    pub fn from_parts(
        name: &str,
        servers: Option<i64>,
        capacity: Option<i64>,
    ) -> Result<Self, ValidationErrors> {
        let kind: ModelKind = name
            .parse()
            .map_err(|e| ValidationErrors(vec![e]))?;

        let mut errors = Vec::new();
        let mut required = |field: &str, value: Option<i64>, min: i64| -> usize {
            match value {
                None => {
                    errors.push(ValidationError::InvalidValue {
                        field: field.to_string(),
                        reason: format!("required for the {kind} model"),
                    });
                    0
                }
                Some(v) if v < min => {
                    errors.push(ValidationError::ConstraintViolation {
                        field: field.to_string(),
                        constraint: format!("at least {min}"),
                    });
                    0
                }
                Some(v) => v as usize,
            }
        };

        let model = match kind {
            ModelKind::Mm1 => QueueModel::Mm1,
            ModelKind::Mm1k => QueueModel::Mm1k {
                capacity: required("capacity", capacity, 0),
            },
            ModelKind::Mmc => QueueModel::Mmc {
                servers: required("servers", servers, 1),
            },
            ModelKind::Mmck => QueueModel::Mmck {
                servers: required("servers", servers, 1),
                capacity: required("capacity", capacity, 0),
            },
        };

        if errors.is_empty() {
            Ok(model)
        } else {
            Err(ValidationErrors(errors))
        }
    }

    /// Number of parallel servers (1 for the single-server variants)
    pub fn servers(&self) -> usize {
        match *self {
            QueueModel::Mm1 | QueueModel::Mm1k { .. } => 1,
            QueueModel::Mmc { servers } | QueueModel::Mmck { servers, .. } => servers,
        }
    }

    /// Waiting-room capacity, `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        match *self {
            QueueModel::Mm1 | QueueModel::Mmc { .. } => None,
            QueueModel::Mm1k { capacity } | QueueModel::Mmck { capacity, .. } => Some(capacity),
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.capacity().is_some()
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            QueueModel::Mm1 => ModelKind::Mm1,
            QueueModel::Mm1k { .. } => ModelKind::Mm1k,
            QueueModel::Mmc { .. } => ModelKind::Mmc,
            QueueModel::Mmck { .. } => ModelKind::Mmck,
        }
    }
}

impl fmt::Display for QueueModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            QueueModel::Mm1 => write!(f, "M/M/1"),
            QueueModel::Mm1k { capacity } => write!(f, "M/M/1/{capacity}"),
            QueueModel::Mmc { servers } => write!(f, "M/M/{servers}"),
            QueueModel::Mmck { servers, capacity } => write!(f, "M/M/{servers}/{capacity}"),
        }
    }
}

/// Model names without their parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    Mm1,
    Mm1k,
    Mmc,
    Mmck,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Mm1 => "MM1",
            ModelKind::Mm1k => "MM1K",
            ModelKind::Mmc => "MMC",
            ModelKind::Mmck => "MMCK",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MM1" => Ok(ModelKind::Mm1),
            "MM1K" => Ok(ModelKind::Mm1k),
            "MMC" => Ok(ModelKind::Mmc),
            "MMCK" => Ok(ModelKind::Mmck),
            other => Err(ValidationError::InvalidValue {
                field: "model".to_string(),
                reason: format!("unknown model '{other}', expected one of MM1, MM1K, MMC, MMCK"),
            }),
        }
    }
}

/// Complete description of one replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Arrival rate (lambda), customers per time unit
    pub arrival_rate: f64,
    /// Service rate per server (mu), customers per time unit
    pub service_rate: f64,
    /// Number of arrivals to replay
    pub num_customers: usize,
    pub model: QueueModel,
    /// Seed for the variate streams; entropy-seeded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SimulationConfig {
    pub fn new(model: QueueModel, arrival_rate: f64, service_rate: f64, num_customers: usize) -> Self {
        Self {
            arrival_rate,
            service_rate,
            num_customers,
            model,
            seed: None,
        }
    }

    /// Fix the seed so the run is reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Offered load per server, lambda / (c * mu)
    pub fn traffic_intensity(&self) -> f64 {
        self.arrival_rate / (self.model.servers() as f64 * self.service_rate)
    }

    /// Validate and convert the collected violations into a [`SimError`]
    pub fn ensure_valid(&self) -> Result<(), SimError> {
        self.validate().map_err(SimError::from)
    }
}

impl Validate for SimulationConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let checks = [
            validate_rate("arrival_rate", self.arrival_rate),
            validate_rate("service_rate", self.service_rate),
            validate_positive("num_customers", self.num_customers),
            validate_positive("servers", self.model.servers()),
        ];

        let errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// Helper for validating that a value is positive
pub fn validate_positive<T: PartialOrd + Default + fmt::Display>(
    field: &str,
    value: T,
) -> ValidationResult<()> {
    if value <= T::default() {
        Err(ValidationError::ConstraintViolation {
            field: field.to_string(),
            constraint: format!("positive (got {value})"),
        })
    } else {
        Ok(())
    }
}

/// Helper for validating a rate: finite and strictly positive
pub fn validate_rate(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be a finite number (got {value})"),
        });
    }
    validate_positive(field, value)
}
