//! Core fork/join capabilities.
//!
//! The executor is polymorphic over two traits rather than a class
//! hierarchy: [`Divisible`] for the input side (can this work run directly,
//! or how does it split?) and [`Composable`] for the output side (how do two
//! partial results merge?).

use super::error::ComputeError;

/// A unit of work that can be recursively decomposed.
///
/// Implementations must guarantee that recursion terminates: every call to
/// [`split`](Divisible::split) strictly reduces some size measure, and units
/// at or below the direct-computation threshold report
/// [`is_direct`](Divisible::is_direct) as `true`.
///
/// # Example
///
/// ```ignore
/// struct SortUnit(Vec<i32>);
///
/// impl Divisible for SortUnit {
///     type Output = SortedRun;
///
///     fn is_direct(&self) -> bool {
///         self.0.len() <= 2
///     }
///
///     fn split(self) -> Vec<Self> {
///         let mut left = self.0;
///         let right = left.split_off(left.len() / 2);
///         vec![SortUnit(left), SortUnit(right)]
///     }
///
///     fn compute(self) -> Result<SortedRun, ComputeError> {
///         let mut values = self.0;
///         values.sort_unstable();
///         Ok(SortedRun(values))
///     }
/// }
/// ```
pub trait Divisible: Send + Sized + 'static {
    /// The partial result this unit produces.
    type Output: Composable;

    /// Returns true if this unit is small enough to compute directly.
    ///
    /// When this returns true, [`split`](Divisible::split) is never called.
    fn is_direct(&self) -> bool;

    /// Splits this unit into an ordered sequence of sub-units.
    ///
    /// Only called when [`is_direct`](Divisible::is_direct) returned false.
    /// The returned count must match the executor's configured split arity.
    fn split(self) -> Vec<Self>;

    /// Performs the domain computation on a direct unit.
    ///
    /// This is the recursion base case and the only place the domain
    /// computation touches the raw input.
    fn compute(self) -> Result<Self::Output, ComputeError>;
}

/// A partial result that can merge with another partial result.
pub trait Composable: Send + Sized + 'static {
    /// Composes `later` onto this result.
    ///
    /// `self` is the partial result for the earlier sub-unit in split order;
    /// `later` covers the sub-units after it. The operation must be correct
    /// for the fixed split-order traversal; it does not need to be
    /// commutative.
    fn compose(self, later: Self) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Concatenation preserves split order, so it exercises the
    /// non-commutative contract.
    struct Label(String);

    impl Composable for Label {
        fn compose(self, later: Self) -> Self {
            Label(format!("{}{}", self.0, later.0))
        }
    }

    #[test]
    fn test_compose_is_ordered() {
        let left = Label("left:".to_string());
        let right = Label("right".to_string());
        assert_eq!(left.compose(right).0, "left:right");
    }

    struct Range(std::ops::Range<u32>);

    impl Divisible for Range {
        type Output = Label;

        fn is_direct(&self) -> bool {
            self.0.len() <= 1
        }

        fn split(self) -> Vec<Self> {
            let mid = self.0.start + (self.0.len() as u32) / 2;
            vec![Range(self.0.start..mid), Range(mid..self.0.end)]
        }

        fn compute(self) -> Result<Label, ComputeError> {
            Ok(Label(format!("[{}]", self.0.start)))
        }
    }

    #[test]
    fn test_split_halves_preserve_order() {
        let subs = Range(0..4).split();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].0, 0..2);
        assert_eq!(subs[1].0, 2..4);
    }

    #[test]
    fn test_direct_threshold() {
        assert!(Range(0..1).is_direct());
        assert!(Range(0..0).is_direct());
        assert!(!Range(0..2).is_direct());
    }
}
