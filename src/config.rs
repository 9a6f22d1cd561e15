//! Static startup configuration.
//!
//! All tunables (worker pool size, queue capacity, split arity) are supplied
//! as plain configuration objects at startup. There is no configuration file
//! or runtime reconfiguration; malformed configuration is rejected before
//! any worker starts.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Configuration Constants
// =============================================================================

/// Default number of pipeline worker tasks.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Default bounded work queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default number of sub-units a split must produce.
pub const DEFAULT_SPLIT_ARITY: usize = 2;

// =============================================================================
// Pipeline Configuration
// =============================================================================

/// Configuration for the work pipeline.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Number of worker tasks pulling from the work queue.
    pub worker_count: usize,

    /// Capacity of the bounded work queue. When the queue is full,
    /// `submit` fails fast with `QueueFull`.
    pub queue_capacity: usize,

    /// Optional per-item dispatch timeout. An item exceeding it is failed
    /// with a cancellation outcome and still receives a response.
    pub dispatch_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            dispatch_timeout: None,
        }
    }
}

impl PipelineConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the worker count or queue capacity is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidQueueCapacity);
        }
        Ok(())
    }
}

// =============================================================================
// Fork/Join Configuration
// =============================================================================

/// Configuration for the fork/join executor.
#[derive(Clone, Copy, Debug)]
pub struct ForkJoinConfig {
    /// Number of sub-units each `split()` must produce. A split returning
    /// any other count is a usage error reported immediately.
    pub split_arity: usize,
}

impl Default for ForkJoinConfig {
    fn default() -> Self {
        Self {
            split_arity: DEFAULT_SPLIT_ARITY,
        }
    }
}

impl ForkJoinConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the split arity is below two.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.split_arity < 2 {
            return Err(ConfigError::InvalidSplitArity {
                arity: self.split_arity,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors raised while validating startup configuration.
///
/// These are the only process-fatal errors in the system; everything that
/// happens after startup is scoped to a single command or computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Worker count must be at least one.
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    /// Queue capacity must be at least one.
    #[error("queue capacity must be at least 1")]
    InvalidQueueCapacity,

    /// Split arity must be at least two.
    #[error("split arity must be at least 2, got {arity}")]
    InvalidSplitArity { arity: usize },

    /// A handler id was registered twice.
    #[error("handler '{0}' is already registered")]
    DuplicateHandler(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_default_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.worker_count, DEFAULT_WORKER_COUNT);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert!(config.dispatch_timeout.is_none());
    }

    #[test]
    fn test_pipeline_config_rejects_zero_workers() {
        let config = PipelineConfig {
            worker_count: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidWorkerCount));
    }

    #[test]
    fn test_pipeline_config_rejects_zero_capacity() {
        let config = PipelineConfig {
            queue_capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidQueueCapacity));
    }

    #[test]
    fn test_forkjoin_config_default_is_valid() {
        let config = ForkJoinConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.split_arity, DEFAULT_SPLIT_ARITY);
    }

    #[test]
    fn test_forkjoin_config_rejects_unary_split() {
        let config = ForkJoinConfig { split_arity: 1 };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidSplitArity { arity: 1 })
        );
    }
}
