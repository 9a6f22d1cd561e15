//! Handler registry with single-flight instance construction.
//!
//! The registry caches one executor instance per handler id. Reads are
//! lock-free; a cache miss takes only the per-shard write lock of the
//! concurrent map while the factory runs, so concurrent first access for the
//! same id constructs exactly one instance and every caller receives it.

use super::command::{CommandExecutor, HandlerFactory};
use super::error::DispatchError;
use crate::config::ConfigError;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Builder for the startup handler table.
///
/// Registration errors (duplicate ids) are configuration errors and are
/// surfaced before the registry exists, keeping them process-fatal at
/// startup rather than visible at dispatch time.
#[derive(Default)]
pub struct RegistryBuilder {
    factories: HashMap<String, Arc<dyn HandlerFactory>>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory for the given handler id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateHandler`] if the id is already taken.
    pub fn register(
        mut self,
        handler_id: impl Into<String>,
        factory: impl HandlerFactory + 'static,
    ) -> Result<Self, ConfigError> {
        let handler_id = handler_id.into();
        if self.factories.contains_key(&handler_id) {
            return Err(ConfigError::DuplicateHandler(handler_id));
        }
        self.factories.insert(handler_id, Arc::new(factory));
        Ok(self)
    }

    /// Returns the number of registered handler ids.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Builds the registry.
    pub fn build(self) -> CommandRegistry {
        CommandRegistry {
            factories: self.factories,
            cache: DashMap::new(),
        }
    }
}

/// Process-wide mapping of handler ids to singleton executor instances.
pub struct CommandRegistry {
    /// Startup-registered factories, immutable after build.
    factories: HashMap<String, Arc<dyn HandlerFactory>>,

    /// Lazily-populated executor cache. The entry API gives single-flight
    /// construction: the shard lock is held while the factory runs.
    cache: DashMap<String, Arc<dyn CommandExecutor>>,
}

impl CommandRegistry {
    /// Resolves a handler id to its singleton executor instance.
    ///
    /// The first access for an id constructs the executor via its registered
    /// factory; all later accesses (and all concurrent racers) receive the
    /// same instance.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownHandler`] if no factory is registered
    /// under the id. This is fatal for the command, not for the process.
    pub fn resolve(&self, handler_id: &str) -> Result<Arc<dyn CommandExecutor>, DispatchError> {
        if let Some(hit) = self.cache.get(handler_id) {
            return Ok(Arc::clone(&hit));
        }

        let factory = self
            .factories
            .get(handler_id)
            .ok_or_else(|| DispatchError::UnknownHandler(handler_id.to_string()))?;

        let executor = self
            .cache
            .entry(handler_id.to_string())
            .or_insert_with(|| {
                debug!(handler = handler_id, "Constructing handler instance");
                factory.create()
            });
        Ok(Arc::clone(&executor))
    }

    /// Returns true if a factory is registered under the id.
    pub fn contains(&self, handler_id: &str) -> bool {
        self.factories.contains_key(handler_id)
    }

    /// Returns the number of handler instances constructed so far.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("registered", &self.factories.len())
            .field("cached", &self.cache.len())
            .finish()
    }
}
