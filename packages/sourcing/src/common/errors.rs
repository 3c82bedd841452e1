use thiserror::Error;

use super::{ProductId, RequirementId};

/// Rejections caused by malformed or missing caller input.
///
/// These are returned to the caller as-is and are never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Malformed identity for {field}: {value:?}")]
    MalformedIdentity { field: &'static str, value: String },

    #[error("Unknown robot category: {0}")]
    UnknownCategory(String),

    #[error("Candidate {0} appears more than once")]
    DuplicateCandidate(ProductId),

    #[error("Unknown recommendation algorithm: {0}")]
    UnknownAlgorithm(String),
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Error taxonomy surfaced by the intake and recommendation activities.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Data unavailable: {0:#}")]
    DataUnavailable(#[source] anyhow::Error),

    #[error("Failed to persist matches: {0:#}")]
    Persistence(#[source] anyhow::Error),

    #[error("Requirement not found: {0}")]
    NotFound(RequirementId),

    #[error("Requirement {id} is {status}, expected pending")]
    InvalidState { id: RequirementId, status: String },
}

impl CoreError {
    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DataUnavailable(_) | Self::Persistence(_))
    }
}
