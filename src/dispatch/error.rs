//! Error types for command dispatch.
//!
//! Dispatch failures are scoped to a single command. They are returned as
//! error-tagged results to the submitter, never propagated into a pipeline
//! worker.

use thiserror::Error;

/// Errors that can occur while resolving or invoking a handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No handler is registered under this id.
    #[error("unknown handler '{0}'")]
    UnknownHandler(String),

    /// The handler raised a domain error; wrapped here with its id for
    /// context.
    #[error("handler '{handler_id}' failed: {message}")]
    HandlerFailed {
        handler_id: String,
        message: String,
    },

    /// The dispatch was cancelled or timed out before the handler finished.
    #[error("dispatch of handler '{0}' was cancelled")]
    Cancelled(String),
}

impl DispatchError {
    /// Returns the handler id this error is associated with.
    pub fn handler_id(&self) -> &str {
        match self {
            Self::UnknownHandler(id) => id,
            Self::HandlerFailed { handler_id, .. } => handler_id,
            Self::Cancelled(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::UnknownHandler("missing".to_string());
        assert_eq!(format!("{}", err), "unknown handler 'missing'");

        let err = DispatchError::HandlerFailed {
            handler_id: "sort".to_string(),
            message: "bad argument".to_string(),
        };
        assert_eq!(format!("{}", err), "handler 'sort' failed: bad argument");
    }

    #[test]
    fn test_handler_id_accessor() {
        assert_eq!(
            DispatchError::Cancelled("slow".to_string()).handler_id(),
            "slow"
        );
        assert_eq!(
            DispatchError::UnknownHandler("x".to_string()).handler_id(),
            "x"
        );
    }
}
