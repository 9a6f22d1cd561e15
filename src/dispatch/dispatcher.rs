//! Command dispatcher.
//!
//! Resolves a command's handler through the registry and invokes it,
//! converting any failure into an error-tagged outcome for the submitter.

use super::command::Command;
use super::error::DispatchError;
use super::registry::CommandRegistry;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Resolves and invokes command handlers.
///
/// Cloneable; all clones share the same registry.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher over the given registry.
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// Dispatches a command to its handler and returns the result payload.
    ///
    /// Handler failures are caught and wrapped with the handler id; they are
    /// returned as an error outcome, never propagated, so a bad command
    /// cannot take down the worker running it.
    pub async fn dispatch(&self, command: &Command) -> Result<Value, DispatchError> {
        let executor = self.registry.resolve(&command.handler_id)?;

        executor.execute(&command.args).await.map_err(|err| {
            warn!(
                handler = %command.handler_id,
                error = %err,
                "Handler execution failed"
            );
            DispatchError::HandlerFailed {
                handler_id: command.handler_id.clone(),
                message: err.to_string(),
            }
        })
    }

    /// Returns the underlying registry.
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{CommandExecutor, ExecutorError, RegistryBuilder};
    use serde_json::json;
    use std::future::Future;
    use std::pin::Pin;

    struct Doubler;

    impl CommandExecutor for Doubler {
        fn execute<'a>(
            &'a self,
            args: &'a [Value],
        ) -> Pin<Box<dyn Future<Output = Result<Value, ExecutorError>> + Send + 'a>> {
            Box::pin(async move {
                let n = args
                    .first()
                    .and_then(Value::as_i64)
                    .ok_or_else(|| ExecutorError::new("expected an integer argument"))?;
                Ok(json!(n * 2))
            })
        }
    }

    fn test_dispatcher() -> Dispatcher {
        let registry = RegistryBuilder::new()
            .register("double", || Arc::new(Doubler) as Arc<dyn CommandExecutor>)
            .unwrap()
            .build();
        Dispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let dispatcher = test_dispatcher();
        let command = Command::new("double", vec![json!(21)]);
        let result = dispatcher.dispatch(&command).await.unwrap();
        assert_eq!(result, json!(42));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_handler() {
        let dispatcher = test_dispatcher();
        let command = Command::new("halve", vec![json!(10)]);
        let err = dispatcher.dispatch(&command).await.unwrap_err();
        assert_eq!(err, DispatchError::UnknownHandler("halve".to_string()));
    }

    #[tokio::test]
    async fn test_dispatch_wraps_handler_failure_with_id() {
        let dispatcher = test_dispatcher();
        let command = Command::new("double", vec![json!("not a number")]);
        let err = dispatcher.dispatch(&command).await.unwrap_err();
        match err {
            DispatchError::HandlerFailed {
                handler_id,
                message,
            } => {
                assert_eq!(handler_id, "double");
                assert!(message.contains("integer"));
            }
            other => panic!("expected HandlerFailed, got {other:?}"),
        }
    }
}
