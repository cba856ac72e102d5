//! `ndarray` and `nalgebra` interop for point lists,
//! inspired by [`nshare`](https://github.com/rust-cv/nshare).

use itertools::Itertools;
use nalgebra::{Dim, Matrix, Scalar, Storage, Vector2};
use ndarray::{Array2, ArrayView2, Axis};

use crate::Float;

/// Conversion of a point list into an `(n_points, 2)` array.
pub trait IntoNdarray2 {
    /// Element type.
    type Out;

    /// Convert into an owned `ndarray` array.
    fn into_ndarray2(self) -> Self::Out;
}

impl<N: Scalar> IntoNdarray2 for Array2<N> {
    type Out = Array2<N>;

    fn into_ndarray2(self) -> Self::Out {
        self
    }
}

impl<N: Scalar> IntoNdarray2 for ArrayView2<'_, N> {
    type Out = Array2<N>;

    fn into_ndarray2(self) -> Self::Out {
        self.to_owned()
    }
}

impl<N: Scalar, R: Dim, C: Dim, S: Storage<N, R, C>> IntoNdarray2 for Matrix<N, R, C, S> {
    type Out = Array2<N>;

    fn into_ndarray2(self) -> Self::Out {
        Array2::from_shape_fn(self.shape(), |(i, j)| self[(i, j)].clone())
    }
}

/// Read the rows of an `(n_points, 2)` array as points.
///
/// Returns `None` if the array does not have exactly two columns.
pub(crate) fn rows_to_points<F: Float>(arr: ArrayView2<F>) -> Option<Vec<Vector2<F>>> {
    if arr.ncols() != 2 {
        return None;
    }
    Some(
        arr.axis_iter(Axis(0))
            .map(|r| Vector2::new(r[0], r[1]))
            .collect_vec(),
    )
}
