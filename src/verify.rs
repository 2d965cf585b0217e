//! Element-wise comparison of factorization results.
//!
//! The parallel eliminator performs the same operations in the same order as
//! the serial one, so results are compared exactly, never with a tolerance.

use crate::Matrix;

/// Returns `true` if both matrices have the same shape and every pair of
/// entries compares equal under IEEE `==`.
///
/// A NaN anywhere makes the result `false`; use [`bitwise_equal`] to compare
/// degenerate factorizations.
pub fn equal(a: &Matrix, b: &Matrix) -> bool {
    same_shape(a, b) && a.as_slice().iter().zip(b.as_slice()).all(|(x, y)| x == y)
}

/// Returns `true` if both matrices have the same shape and identical bit
/// patterns in every entry.
pub fn bitwise_equal(a: &Matrix, b: &Matrix) -> bool {
    same_shape(a, b)
        && a.as_slice()
            .iter()
            .zip(b.as_slice())
            .all(|(x, y)| x.to_bits() == y.to_bits())
}

/// Position of the first entry where `a` and `b` differ under `==`.
///
/// Returns `None` when the shapes differ, since no position is shared by
/// both; check [`equal`] first to tell that case from a match.
pub fn first_mismatch(a: &Matrix, b: &Matrix) -> Option<(usize, usize)> {
    if !same_shape(a, b) {
        return None;
    }
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .position(|(x, y)| x != y)
        .map(|idx| (idx / a.cols(), idx % a.cols()))
}

fn same_shape(a: &Matrix, b: &Matrix) -> bool {
    a.rows() == b.rows() && a.cols() == b.cols()
}
