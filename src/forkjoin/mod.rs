//! Fork/Join Executor
//!
//! Recursive divide-and-conquer execution on the Tokio runtime.
//!
//! # Architecture
//!
//! ```text
//! execute(unit)
//!    │
//!    ├─ direct? ──────────────► compute(unit)            (base case)
//!    │
//!    └─ split() -> [u0 .. uN-1]
//!         ├─ fork u0 .. uN-2   (tokio::spawn, in order)
//!         ├─ compute uN-1      (on the calling task)
//!         └─ join forks in fork order, composing each
//!            earlier-forked result onto the accumulator
//! ```
//!
//! # Compose Order
//!
//! The merge order is a contract, not an implementation detail. The calling
//! invocation seeds the accumulator with its own (last) sub-result, then
//! joins each fork in the order it was forked and applies
//! `accumulated = joined.compose(accumulated)`. For a binary split this
//! always produces `left.compose(right)`, regardless of which branch
//! finishes first. Compose functions therefore need not be commutative,
//! only correct for the split order.
//!
//! # Cancellation
//!
//! Cancellation is best effort: pending forks observe the token before they
//! start and are aborted when a join fails, but a sub-computation that has
//! already entered `compute()` runs to completion.

mod error;
mod executor;
mod traits;

pub use error::{ComputeError, ForkJoinError};
pub use executor::ForkJoinPool;
pub use traits::{Composable, Divisible};
