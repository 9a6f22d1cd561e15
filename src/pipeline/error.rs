//! Error types for pipeline submission.
//!
//! Submission failures are surfaced synchronously to the submitter and are
//! distinct from execution errors, which travel back through the result
//! sender as error-tagged envelopes.

use crate::codec::CodecError;
use thiserror::Error;

/// Errors returned by `SubmitHandle::submit`.
///
/// In every case nothing was queued and no result will be sent.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The bounded work queue is at capacity.
    #[error("work queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    /// The pipeline is shutting down and rejects new work.
    #[error("pipeline is shutting down")]
    ShuttingDown,

    /// The incoming bytes did not decode to a command.
    #[error(transparent)]
    Decode(#[from] CodecError),
}
