//! Error types for queue replays

use thiserror::Error;

/// Top-level error type for simulation operations
///
/// Bad caller input comes in two shapes. A run configuration with a
/// non-positive or non-finite rate, zero customers or zero servers is
/// reported as `InvalidConfiguration`, listing every offending field at once.
/// A single bad argument to a lower-level call (a rate passed to a draw, a
/// duration sequence of the wrong length) is an `InvalidParameter`. Use
/// [`SimError::is_invalid_input`] to treat both alike.
#[derive(Debug, Error)]
pub enum SimError {
    /// One or more configuration fields failed validation. Reported before
    /// any variate is drawn.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(ValidationErrors),

    #[error("Invalid parameter '{field}': {reason}")]
    InvalidParameter { field: String, reason: String },

    /// A replay reached a state that valid inputs can never produce.
    #[error("Internal invariant violated: {0}")]
    InternalInvariantViolation(String),
}

impl SimError {
    pub fn invalid_parameter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        SimError::InternalInvariantViolation(message.into())
    }

    /// True for errors caused by the caller's input rather than a defect
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            SimError::InvalidConfiguration(_) | SimError::InvalidParameter { .. }
        )
    }

    /// Fields named by an input error, empty for invariant violations
    pub fn invalid_fields(&self) -> Vec<&str> {
        match self {
            SimError::InvalidConfiguration(errors) => errors.fields(),
            SimError::InvalidParameter { field, .. } => vec![field.as_str()],
            SimError::InternalInvariantViolation(_) => Vec::new(),
        }
    }
}

/// Errors that can occur while validating a configuration field
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Field '{field}' must be {constraint}")]
    ConstraintViolation { field: String, constraint: String },
}

impl ValidationError {
    /// Name of the field that failed
    pub fn field(&self) -> &str {
        match self {
            ValidationError::InvalidValue { field, .. } => field,
            ValidationError::ConstraintViolation { field, .. } => field,
        }
    }
}

/// Every field violation found in one validation pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Field names in the order they were checked
    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(ValidationError::field).collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl From<ValidationErrors> for SimError {
    fn from(errors: ValidationErrors) -> Self {
        SimError::InvalidConfiguration(errors)
    }
}
