//! Single-threaded reference factorizations.
//!
//! [`eliminate`] is the baseline every parallel run is checked against. It
//! reduces a matrix in place into the combined L/U form:
//!
//! ```text
//!         u u u u u
//!         l u u u u
//!   mtx = l l u u u
//!         l l l u u
//!         l l l l u
//! ```
//!
//! The unit diagonal of L is implicit. No pivoting is performed, so a zero
//! pivot yields infinities or NaNs rather than an error.

use crate::{Error, Matrix};

/// Eliminates column `k` from `target` using `pivot` and stores the
/// multiplier in `target[k]`.
///
/// Only columns `k + 1..` are updated; column `k` is overwritten by the
/// multiplier. The parallel workers call this same function so both paths
/// perform identical floating-point operations.
pub fn eliminate_row(pivot: &[f64], target: &mut [f64], k: usize) {
    let l = target[k] / pivot[k];
    for (t, p) in target[k + 1..].iter_mut().zip(&pivot[k + 1..]) {
        *t -= l * p;
    }
    target[k] = l;
}

/// Reduces `matrix` in place into combined L/U form.
pub fn eliminate(matrix: &mut Matrix) -> Result<(), Error> {
    ensure_square(matrix)?;
    let n = matrix.rows();

    for k in 0..n.saturating_sub(1) {
        for i in k + 1..n {
            let (pivot, target) = matrix.pivot_and_target(k, i);
            eliminate_row(pivot, target, k);
        }
    }

    Ok(())
}

/// Splits a combined L/U matrix into a unit lower triangular L and an
/// upper triangular U.
pub fn split_lu(combined: &Matrix) -> Result<(Matrix, Matrix), Error> {
    ensure_square(combined)?;
    let n = combined.rows();
    let mut lower = Matrix::identity(n);
    let mut upper = Matrix::zeros(n, n);

    for i in 0..n {
        for j in 0..i {
            lower[(i, j)] = combined[(i, j)];
        }
        for j in i..n {
            upper[(i, j)] = combined[(i, j)];
        }
    }

    Ok((lower, upper))
}

/// Doolittle factorization into separate L and U matrices.
///
/// Computes the same factors as [`eliminate`] by inner products instead of
/// row updates, which makes it a useful independent cross-check. Results
/// agree with elimination up to rounding, not bit for bit.
pub fn doolittle(matrix: &Matrix) -> Result<(Matrix, Matrix), Error> {
    ensure_square(matrix)?;
    let n = matrix.rows();
    let mut lower = Matrix::identity(n);
    let mut upper = Matrix::zeros(n, n);

    for i in 0..n {
        for k in i..n {
            let sum: f64 = (0..i).map(|j| lower[(i, j)] * upper[(j, k)]).sum();
            upper[(i, k)] = matrix[(i, k)] - sum;
        }
        for k in i + 1..n {
            let sum: f64 = (0..i).map(|j| lower[(k, j)] * upper[(j, i)]).sum();
            lower[(k, i)] = (matrix[(k, i)] - sum) / upper[(i, i)];
        }
    }

    Ok((lower, upper))
}

pub(crate) fn ensure_square(matrix: &Matrix) -> Result<(), Error> {
    if !matrix.is_square() {
        return Err(Error::NotSquare {
            rows: matrix.rows(),
            cols: matrix.cols(),
        });
    }
    Ok(())
}
