//! Command and executor types.
//!
//! A [`Command`] pairs a handler id with positional, opaque argument values.
//! Domain logic lives behind the [`CommandExecutor`] trait; the library never
//! inspects argument payloads beyond decoding them from the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// A decoded command: which handler to run, with which arguments.
///
/// The handler id selects exactly one registered executor; arguments are
/// positional and opaque to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Identifier of the registered handler.
    pub handler_id: String,

    /// Positional argument payloads.
    pub args: Vec<Value>,
}

impl Command {
    /// Creates a new command.
    pub fn new(handler_id: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            handler_id: handler_id.into(),
            args,
        }
    }
}

/// A domain-specific failure raised inside a command executor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ExecutorError {
    message: String,
}

impl ExecutorError {
    /// Creates a new executor error with the given message.
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

/// Domain logic invoked by command identifier.
///
/// Implementations may use the fork/join executor internally for
/// decomposable work. Executors are shared singletons; they must not keep
/// mutable state across invocations without their own synchronization.
pub trait CommandExecutor: Send + Sync {
    /// Executes the command with the given positional arguments.
    fn execute<'a>(
        &'a self,
        args: &'a [Value],
    ) -> Pin<Box<dyn Future<Output = Result<Value, ExecutorError>> + Send + 'a>>;
}

impl std::fmt::Debug for dyn CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CommandExecutor")
    }
}

/// Constructs a [`CommandExecutor`] on first reference to its handler id.
///
/// Registered at startup; invoked at most once per id by the registry.
/// Any `Fn() -> Arc<dyn CommandExecutor>` closure qualifies.
pub trait HandlerFactory: Send + Sync {
    /// Creates the executor instance for this handler.
    fn create(&self) -> Arc<dyn CommandExecutor>;
}

impl<F> HandlerFactory for F
where
    F: Fn() -> Arc<dyn CommandExecutor> + Send + Sync,
{
    fn create(&self) -> Arc<dyn CommandExecutor> {
        (self)()
    }
}
