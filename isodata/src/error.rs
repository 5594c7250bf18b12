//! Error types for ISODATA classification

use thiserror::Error;

/// Errors raised while configuring or running an ISODATA classification
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IsodataError {
    /// A parameter is outside its valid domain, or an init method is unknown
    #[error("Invalid configuration: {name} = {value} ({reason})")]
    Configuration {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Cluster records disagree with each other; signals a logic defect
    #[error("Internal consistency violated in {step}: {reason}")]
    InternalConsistency { step: &'static str, reason: String },

    /// A cluster without members reached a step that averages its members
    #[error("Cluster {cluster_id} has no members in {step}")]
    DegenerateInput {
        step: &'static str,
        cluster_id: usize,
    },

    #[error("Every cluster was discarded at iteration {iteration}")]
    AllClustersDiscarded { iteration: usize },

    #[error("Empty sample matrix: {samples} samples x {features} features")]
    EmptyInput { samples: usize, features: usize },

    #[error("Non-finite value at sample {row}, feature {column}")]
    NonFiniteSample { row: usize, column: usize },

    #[error("Shape error: {0}")]
    Shape(String),
}

impl From<ndarray::ShapeError> for IsodataError {
    fn from(e: ndarray::ShapeError) -> Self {
        IsodataError::Shape(e.to_string())
    }
}

impl IsodataError {
    pub(crate) fn configuration(name: &'static str, value: impl ToString, reason: &str) -> Self {
        IsodataError::Configuration {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for ISODATA operations
pub type Result<T> = std::result::Result<T, IsodataError>;
