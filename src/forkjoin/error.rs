//! Error types for the fork/join executor.

use std::time::Duration;
use thiserror::Error;

/// A failure inside a domain computation.
///
/// Raised by [`Divisible::compute`](super::Divisible::compute) and
/// propagated unchanged to the top-level caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ComputeError {
    message: String,
}

impl ComputeError {
    /// Creates a new compute error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that can occur during a fork/join execution.
///
/// All variants are fatal to the single computation that raised them;
/// partial results already joined are discarded.
#[derive(Debug, Error)]
pub enum ForkJoinError {
    /// A non-direct unit split into fewer than two sub-units.
    ///
    /// `is_direct()` should have returned true for such a unit. This is a
    /// contract violation by the domain type, not a retryable condition.
    #[error("precondition violated: split() produced {count} sub-units (is_direct should be true)")]
    PreconditionViolation { count: usize },

    /// A split produced a different number of sub-units than configured.
    #[error("split arity mismatch: expected {expected} sub-units, got {actual}")]
    SplitArity { expected: usize, actual: usize },

    /// The domain computation failed.
    #[error("compute failed: {0}")]
    Compute(#[from] ComputeError),

    /// A forked sub-computation panicked.
    #[error("forked sub-computation panicked")]
    Panicked,

    /// The execution was cancelled before completing.
    #[error("execution cancelled")]
    Cancelled,

    /// The top-level execution exceeded its deadline.
    #[error("execution timed out after {0:?}")]
    Timeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_error_display() {
        let err = ComputeError::new("division by zero");
        assert_eq!(format!("{}", err), "division by zero");
        assert_eq!(err.message(), "division by zero");
    }

    #[test]
    fn test_forkjoin_error_display() {
        let err = ForkJoinError::SplitArity {
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            format!("{}", err),
            "split arity mismatch: expected 2 sub-units, got 3"
        );

        let err = ForkJoinError::Timeout(Duration::from_secs(5));
        assert_eq!(format!("{}", err), "execution timed out after 5s");
    }

    #[test]
    fn test_compute_error_converts() {
        let err: ForkJoinError = ComputeError::new("bad input").into();
        assert!(matches!(err, ForkJoinError::Compute(_)));
    }
}
