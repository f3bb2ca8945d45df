//! Error types for distance computation and metric parameter parsing.

use std::error::Error;

/// Errors from distance computation, metric lookup, and parameter validation.
#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    /// Returned when a sequence has no observed values left to compare
    /// (empty input, or nothing but NaN padding).
    #[error("sequence must contain at least one observed value")]
    EmptySequence,

    /// Returned by pointwise metrics when the two sequences differ in length.
    #[error("sequence lengths differ: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first sequence.
        left: usize,
        /// Length of the second sequence.
        right: usize,
    },

    /// Returned when a metric name is not registered.
    #[error("unknown metric \"{name}\"")]
    UnknownMetric {
        /// The name that failed to resolve.
        name: String,
    },

    /// Returned when a metric parameter has the wrong type or an out-of-range value.
    #[error("invalid metric parameter \"{name}\": {reason}")]
    InvalidParam {
        /// Parameter name.
        name: String,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// A failure raised by a user-supplied distance function, passed through untouched.
    #[error(transparent)]
    Custom(Box<dyn Error + Send + Sync>),
}

impl MetricError {
    /// Wrap an arbitrary error raised inside a user-supplied distance function.
    pub fn custom(err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Custom(err.into())
    }

    pub(crate) fn invalid_param(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParam {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
