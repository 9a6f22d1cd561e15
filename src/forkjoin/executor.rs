//! Fork/join execution engine.
//!
//! The [`ForkJoinPool`] recursively forks sub-units onto the Tokio runtime,
//! computes the last sub-unit on the calling task, and joins forked results
//! in fork order so that composition is deterministic regardless of which
//! branch completes first.

use super::error::ForkJoinError;
use super::traits::{Composable, Divisible};
use crate::config::{ConfigError, ForkJoinConfig};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Recursive divide-and-conquer executor.
///
/// Forked sub-computations are spawned as Tokio tasks, so each fork is
/// eligible to run on a different runtime worker. The calling invocation
/// always computes the last sub-unit itself so at least one branch makes
/// progress without waiting for the scheduler.
#[derive(Clone, Debug)]
pub struct ForkJoinPool {
    config: ForkJoinConfig,
}

impl ForkJoinPool {
    /// Creates a new pool with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configured split arity is below two.
    pub fn new(config: ForkJoinConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Executes a unit to completion, returning its composed result.
    ///
    /// Any compute failure or contract violation in a sub-computation
    /// propagates here; partial results already joined are discarded.
    pub async fn execute<U: Divisible>(&self, unit: U) -> Result<U::Output, ForkJoinError> {
        execute_node(unit, self.config.split_arity, CancellationToken::new()).await
    }

    /// Executes a unit, observing the given cancellation token.
    ///
    /// Cancellation is best effort: forks that have not started are aborted
    /// and the call returns [`ForkJoinError::Cancelled`], but sub-computations
    /// already inside `compute()` run to completion.
    pub async fn execute_with_cancellation<U: Divisible>(
        &self,
        unit: U,
        token: CancellationToken,
    ) -> Result<U::Output, ForkJoinError> {
        execute_node(unit, self.config.split_arity, token).await
    }

    /// Executes a unit with a deadline on the top-level call.
    ///
    /// On timeout the internal token is cancelled so outstanding forks stop
    /// at their next cancellation check, and [`ForkJoinError::Timeout`] is
    /// returned.
    pub async fn execute_with_timeout<U: Divisible>(
        &self,
        unit: U,
        limit: Duration,
    ) -> Result<U::Output, ForkJoinError> {
        let token = CancellationToken::new();
        let execution = execute_node(unit, self.config.split_arity, token.clone());
        match tokio::time::timeout(limit, execution).await {
            Ok(result) => result,
            Err(_) => {
                token.cancel();
                Err(ForkJoinError::Timeout(limit))
            }
        }
    }
}

impl Default for ForkJoinPool {
    fn default() -> Self {
        Self::new(ForkJoinConfig::default()).expect("default fork/join configuration is valid")
    }
}

/// Executes one node of the recursion tree.
///
/// Returns a boxed future because the recursion would otherwise produce an
/// infinitely-sized type, and forks must be `'static` to be spawned.
fn execute_node<U: Divisible>(
    unit: U,
    arity: usize,
    token: CancellationToken,
) -> Pin<Box<dyn Future<Output = Result<U::Output, ForkJoinError>> + Send>> {
    Box::pin(async move {
        if token.is_cancelled() {
            return Err(ForkJoinError::Cancelled);
        }

        if unit.is_direct() {
            return Ok(unit.compute()?);
        }

        let mut subs = unit.split();
        if subs.len() < 2 {
            return Err(ForkJoinError::PreconditionViolation { count: subs.len() });
        }
        if subs.len() != arity {
            return Err(ForkJoinError::SplitArity {
                expected: arity,
                actual: subs.len(),
            });
        }

        // Fork the first N-1 sub-units in split order; the caller keeps the
        // last one for itself so no worker sits idle waiting.
        let last = subs.pop().expect("split arity checked above");
        let mut forks: Vec<JoinHandle<Result<U::Output, ForkJoinError>>> =
            Vec::with_capacity(subs.len());
        for sub in subs {
            forks.push(tokio::spawn(execute_node(sub, arity, token.clone())));
        }

        let mut accumulated = match execute_node(last, arity, token.clone()).await {
            Ok(result) => result,
            Err(err) => {
                abort_all(forks.into_iter());
                return Err(err);
            }
        };

        // Join in fork order. Completion timing never changes the merge
        // order: each earlier-forked result is composed onto the accumulator.
        let mut pending = forks.into_iter();
        while let Some(mut fork) = pending.next() {
            let joined = tokio::select! {
                biased;

                _ = token.cancelled() => None,

                joined = &mut fork => Some(joined),
            };

            let Some(join_result) = joined else {
                fork.abort();
                abort_all(pending);
                return Err(ForkJoinError::Cancelled);
            };

            match join_result {
                Ok(Ok(earlier)) => accumulated = earlier.compose(accumulated),
                Ok(Err(err)) => {
                    abort_all(pending);
                    return Err(err);
                }
                Err(join_err) => {
                    abort_all(pending);
                    let err = if join_err.is_cancelled() {
                        ForkJoinError::Cancelled
                    } else {
                        ForkJoinError::Panicked
                    };
                    return Err(err);
                }
            }
        }

        Ok(accumulated)
    })
}

/// Aborts every still-pending fork.
fn abort_all<T>(forks: impl Iterator<Item = JoinHandle<T>>) {
    for fork in forks {
        fork.abort();
    }
}
