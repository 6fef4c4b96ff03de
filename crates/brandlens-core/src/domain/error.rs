//! Domain-level error taxonomy for BrandLens.

use serde::{Deserialize, Serialize};

use super::step::StepId;

/// One request field that failed pre-run validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldViolation {
    /// Wire name of the offending field, e.g. `brandContext.companyName`.
    pub field: String,
    pub message: String,
}

/// Malformed initial request. Raised before any step starts.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid request: {}", .violations.iter().map(|v| v.field.as_str()).collect::<Vec<_>>().join(", "))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// Whether a given wire field is among the violations.
    pub fn names_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

/// Errors produced while normalizing a raw collaborator response.
///
/// Only surfaced under the strict normalization policy; the lenient policy
/// converts these situations into declared defaults plus warnings.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("field {field} has unusable value: {reason}")]
    UnusableField { field: String, reason: String },

    #[error("response is not a JSON object")]
    NotAnObject,
}

/// Failure modes of one outbound collaborator call.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    /// The collaborator answered with a non-success status. `detail` carries
    /// its reported message when one was available.
    #[error("collaborator returned status {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unusable response body: {0}")]
    Body(#[from] serde_json::Error),
}

/// BrandLens workflow errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A step's external call returned non-success or its response could not
    /// be normalized. Terminal for the run.
    #[error("step {step} failed: {message}")]
    Execution { step: StepId, message: String },

    /// A step could not start because an upstream dependency did not reach
    /// success. Logged but not surfaced separately; the run halts failed.
    #[error("step {step} cannot start: upstream {upstream} did not succeed")]
    DependencyUnmet { step: StepId, upstream: StepId },
}

/// Result type for BrandLens workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;
