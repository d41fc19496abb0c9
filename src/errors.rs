// Copyright 2025 Cowboy AI, LLC.

//! Error types for criteria composition and specification shaping

use thiserror::Error;

/// Errors that can occur while composing criteria or shaping a specification
///
/// Every variant describes a programming-time contract violation. None of
/// them is ever coerced into an "always true" or "always false" filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaError {
    /// A group callback added no predicates
    #[error("Invalid group: Group cannot be empty")]
    EmptyGroup,

    /// A specification operand carries no criteria tree
    #[error("Invalid composition: specification must have criteria ({operand})")]
    MissingCriteria {
        /// Which operand was unconstrained (`left`, `right` or `operand`)
        operand: String,
    },

    /// A required argument was absent or blank
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// The root handed to a replace is no longer the specification's root
    #[error("Stale root: the replaced node is not the specification's current root")]
    StaleRoot,

    /// Paging parameters out of range
    #[error("Invalid paging: {reason}")]
    InvalidPaging {
        /// Why the paging request was rejected
        reason: String,
    },

    /// Ordering directives applied out of sequence
    #[error("Invalid ordering: {reason}")]
    InvalidOrdering {
        /// Why the ordering request was rejected
        reason: String,
    },

    /// Evaluator configuration could not be parsed or validated
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for criteria operations
pub type CriteriaResult<T> = Result<T, CriteriaError>;

impl From<serde_json::Error> for CriteriaError {
    fn from(err: serde_json::Error) -> Self {
        CriteriaError::Configuration(err.to_string())
    }
}

impl CriteriaError {
    /// Create a missing-criteria error for the named operand
    pub fn missing_criteria(operand: impl Into<String>) -> Self {
        CriteriaError::MissingCriteria {
            operand: operand.into(),
        }
    }

    /// Check if this error rejects the shape of a composition
    pub fn is_composition_error(&self) -> bool {
        matches!(
            self,
            CriteriaError::EmptyGroup
                | CriteriaError::MissingCriteria { .. }
                | CriteriaError::StaleRoot
        )
    }

    /// Check if this error rejects an argument value
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            CriteriaError::MissingArgument(_)
                | CriteriaError::InvalidPaging { .. }
                | CriteriaError::InvalidOrdering { .. }
        )
    }
}
