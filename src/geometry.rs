#![allow(non_snake_case)]
use nalgebra::{Dim, Matrix, Matrix2, Rotation2, Storage};

use crate::error::PlateError;
use crate::Float;

/// Fail with [`PlateError::InvalidCoordinate`] if any entry of `x` is NaN or infinite.
pub(crate) fn ensure_finite<F, R, C, S>(
    x: &Matrix<F, R, C, S>,
    what: &'static str,
) -> Result<(), PlateError>
where
    F: Float,
    R: Dim,
    C: Dim,
    S: Storage<F, R, C>,
{
    if x.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(PlateError::InvalidCoordinate(what))
    }
}

/// Permutation `[0, 1; 1, 0]` swapping the two axes.
pub(crate) fn axis_flip<F: Float>() -> Matrix2<F> {
    Matrix2::new(F::zero(), F::one(), F::one(), F::zero())
}

/// Rotation matrix by `angle` (radians, counter-clockwise).
pub(crate) fn rotation<F: Float>(angle: F) -> Matrix2<F> {
    let R = Rotation2::new(angle);
    R.into_inner()
}

/// Sum of absolute values of the largest column.
pub(crate) fn norm_1<F, R, C, S>(x: &Matrix<F, R, C, S>) -> F
where
    F: Float,
    R: Dim,
    C: Dim,
    S: Storage<F, R, C>,
{
    x.column_iter()
        .map(|c| c.iter().fold(F::zero(), |acc, v| acc + v.abs()))
        .fold(F::zero(), |acc, s| acc.max(s))
}
