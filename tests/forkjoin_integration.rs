//! Integration tests for the fork/join executor.
//!
//! These tests verify the full divide-and-conquer protocol:
//! - Equivalence with a sequential reference computation
//! - Deterministic compose order under skewed branch timing
//! - The merge-sort scenario
//! - Cancellation and timeout behavior

use forkline::forkjoin::{Composable, ComputeError, Divisible, ForkJoinError, ForkJoinPool};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// =============================================================================
// Test Units
// =============================================================================

/// Ordered concatenation. Not commutative, so any deviation from the
/// documented compose order scrambles the output.
#[derive(Debug)]
struct Run(Vec<i32>);

impl Composable for Run {
    fn compose(self, later: Self) -> Self {
        let mut values = self.0;
        values.extend(later.0);
        Run(values)
    }
}

/// A list that splits in half until it is at most two elements, and whose
/// direct computation is the identity.
struct ListUnit(Vec<i32>);

impl Divisible for ListUnit {
    type Output = Run;

    fn is_direct(&self) -> bool {
        self.0.len() <= 2
    }

    fn split(self) -> Vec<Self> {
        let mut left = self.0;
        let right = left.split_off(left.len() / 2);
        vec![ListUnit(left), ListUnit(right)]
    }

    fn compute(self) -> Result<Run, ComputeError> {
        Ok(Run(self.0))
    }
}

/// Like `ListUnit`, but a leaf containing the marker value stalls before
/// producing its result, skewing completion timing between branches.
struct SkewedUnit {
    values: Vec<i32>,
    slow_marker: i32,
    delay: Duration,
}

impl Divisible for SkewedUnit {
    type Output = Run;

    fn is_direct(&self) -> bool {
        self.values.len() <= 2
    }

    fn split(self) -> Vec<Self> {
        let mut left = self.values;
        let right = left.split_off(left.len() / 2);
        vec![
            SkewedUnit {
                values: left,
                slow_marker: self.slow_marker,
                delay: self.delay,
            },
            SkewedUnit {
                values: right,
                slow_marker: self.slow_marker,
                delay: self.delay,
            },
        ]
    }

    fn compute(self) -> Result<Run, ComputeError> {
        if self.values.contains(&self.slow_marker) {
            std::thread::sleep(self.delay);
        }
        Ok(Run(self.values))
    }
}

/// Merge sort: leaves sort directly, compose merges two sorted runs.
struct SortUnit(Vec<i32>);

struct SortedRun(Vec<i32>);

impl Composable for SortedRun {
    fn compose(self, later: Self) -> Self {
        let mut merged = Vec::with_capacity(self.0.len() + later.0.len());
        let mut left = self.0.into_iter().peekable();
        let mut right = later.0.into_iter().peekable();

        loop {
            match (left.peek(), right.peek()) {
                (Some(l), Some(r)) => {
                    if l <= r {
                        merged.extend(left.next());
                    } else {
                        merged.extend(right.next());
                    }
                }
                (Some(_), None) => merged.extend(&mut left),
                (None, Some(_)) => merged.extend(&mut right),
                (None, None) => break,
            }
        }

        SortedRun(merged)
    }
}

impl Divisible for SortUnit {
    type Output = SortedRun;

    fn is_direct(&self) -> bool {
        self.0.len() <= 2
    }

    fn split(self) -> Vec<Self> {
        let mut left = self.0;
        let right = left.split_off(left.len() / 2);
        vec![SortUnit(left), SortUnit(right)]
    }

    fn compute(self) -> Result<SortedRun, ComputeError> {
        let mut values = self.0;
        values.sort_unstable();
        Ok(SortedRun(values))
    }
}

// =============================================================================
// Sequential Equivalence
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_matches_sequential_reference_across_sizes() {
    let pool = ForkJoinPool::default();

    for size in [1usize, 2, 3, 17, 1000] {
        let input: Vec<i32> = (0..size as i32).collect();
        let expected = input.clone();

        let result = pool
            .execute(ListUnit(input))
            .await
            .unwrap_or_else(|e| panic!("size {size} failed: {e}"));

        assert_eq!(result.0, expected, "size {size} diverged from reference");
    }
}

// =============================================================================
// Compose Order
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_compose_order_holds_when_forked_branch_is_slow() {
    let pool = ForkJoinPool::default();

    // The first (forked) branch finishes last; output order must not change.
    let unit = SkewedUnit {
        values: vec![1, 2, 3, 4, 5, 6, 7, 8],
        slow_marker: 1,
        delay: Duration::from_millis(100),
    };
    let result = pool.execute(unit).await.unwrap();
    assert_eq!(result.0, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_compose_order_holds_when_local_branch_is_slow() {
    let pool = ForkJoinPool::default();

    // The last (locally computed) branch finishes last instead.
    let unit = SkewedUnit {
        values: vec![1, 2, 3, 4, 5, 6, 7, 8],
        slow_marker: 8,
        delay: Duration::from_millis(100),
    };
    let result = pool.execute(unit).await.unwrap();
    assert_eq!(result.0, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

// =============================================================================
// Merge Sort Scenario
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_merge_sort_example() {
    let pool = ForkJoinPool::default();
    let result = pool
        .execute(SortUnit(vec![5, 3, 8, 1, 9, 2, 7, 4]))
        .await
        .unwrap();
    assert_eq!(result.0, vec![1, 2, 3, 4, 5, 7, 8, 9]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_merge_sort_larger_input() {
    let pool = ForkJoinPool::default();
    let input: Vec<i32> = (0..500).rev().collect();
    let expected: Vec<i32> = (0..500).collect();

    let result = pool.execute(SortUnit(input)).await.unwrap();
    assert_eq!(result.0, expected);
}

// =============================================================================
// Cancellation and Timeout
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_timeout_interrupts_pending_join() {
    let pool = ForkJoinPool::default();

    // The forked branch stalls well past the deadline while the local branch
    // finishes quickly, so the caller times out waiting on the join.
    let unit = SkewedUnit {
        values: vec![1, 2, 3, 4],
        slow_marker: 1,
        delay: Duration::from_millis(500),
    };

    let err = pool
        .execute_with_timeout(unit, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, ForkJoinError::Timeout(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancellation_interrupts_pending_join() {
    let pool = ForkJoinPool::default();
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let unit = SkewedUnit {
        values: vec![1, 2, 3, 4],
        slow_marker: 1,
        delay: Duration::from_millis(500),
    };

    let err = pool
        .execute_with_cancellation(unit, token)
        .await
        .unwrap_err();
    assert!(matches!(err, ForkJoinError::Cancelled));
}
