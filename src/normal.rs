//! Least-squares normal equations of the polynomial model.

use nalgebra::{DMatrix, DVector, SMatrix, SVector};

use crate::basis::{CubicTerms, Degree, LinearTerms, Monomials, QuadraticTerms};
use crate::error::PlateError;
use crate::observation::ObservationSet;
use crate::Float;

/// `M = Σ b·bᵀ` and `rₓ = Σ p.x·b`, `rᵧ = Σ p.y·b` over all observations,
/// where `b` is the basis at the image point and `p` the reference point.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NormalEquations<F: Float, const N: usize> {
    pub(crate) matrix: SMatrix<F, N, N>,
    pub(crate) rhs_x: SVector<F, N>,
    pub(crate) rhs_y: SVector<F, N>,
}

impl<F: Float, const N: usize> NormalEquations<F, N> {
    pub(crate) fn accumulate<M: Monomials<F, N>>(observations: &ObservationSet<F>) -> Self {
        let mut matrix = SMatrix::<F, N, N>::zeros();
        let mut rhs_x = SVector::<F, N>::zeros();
        let mut rhs_y = SVector::<F, N>::zeros();

        for observation in observations {
            let b = M::basis(&observation.image);
            matrix += b * b.transpose();
            rhs_x += b * observation.reference.x;
            rhs_y += b * observation.reference.y;
        }

        Self {
            matrix,
            rhs_x,
            rhs_y,
        }
    }

    fn into_dynamic(self) -> (DMatrix<F>, DVector<F>, DVector<F>) {
        (
            DMatrix::from_column_slice(N, N, self.matrix.as_slice()),
            DVector::from_column_slice(self.rhs_x.as_slice()),
            DVector::from_column_slice(self.rhs_y.as_slice()),
        )
    }
}

/// Accumulate the normal matrix and the two right-hand sides for a fit of `degree`.
///
/// All matrices have [`Degree::n_terms`] rows.
pub fn accumulate<F: Float>(
    observations: &ObservationSet<F>,
    degree: Degree,
) -> Result<(DMatrix<F>, DVector<F>, DVector<F>), PlateError> {
    observations.validate()?;
    let sums = match degree {
        Degree::Linear => NormalEquations::accumulate::<LinearTerms>(observations).into_dynamic(),
        Degree::Quadratic => {
            NormalEquations::accumulate::<QuadraticTerms>(observations).into_dynamic()
        }
        Degree::Cubic => NormalEquations::accumulate::<CubicTerms>(observations).into_dynamic(),
    };
    Ok(sums)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use nalgebra::{matrix, vector, Vector2};

    use super::*;

    fn scenario() -> ObservationSet<f64> {
        ObservationSet::from_pairs([
            (Vector2::new(0., 0.), Vector2::new(0., 0.)),
            (Vector2::new(1., 0.), Vector2::new(2., 0.)),
            (Vector2::new(0., 1.), Vector2::new(0., 3.)),
        ])
    }

    #[test]
    fn linear_sums() {
        let (m, rx, ry) = accumulate(&scenario(), Degree::Linear).unwrap();
        assert_eq!(
            m,
            DMatrix::from_column_slice(3, 3, matrix![
                4., 0., 2.;
                0., 9., 3.;
                2., 3., 3.
            ].as_slice())
        );
        assert_eq!(rx, DVector::from_column_slice(vector![2., 0., 1.].as_slice()));
        assert_eq!(ry, DVector::from_column_slice(vector![0., 3., 1.].as_slice()));
    }

    #[test]
    fn symmetric() {
        let observations = ObservationSet::from_pairs(
            (0..10).map(|i| {
                let t = i as f64;
                (Vector2::new(t, -t), Vector2::new(t.sin() * 5., t.cos() * 3.))
            }),
        );
        for degree in Degree::ALL {
            let (m, rx, _) = accumulate(&observations, degree).unwrap();
            assert_eq!(m.nrows(), degree.n_terms());
            assert_eq!(rx.len(), degree.n_terms());
            assert_abs_diff_eq!(m, m.transpose(), epsilon = 1e-12);
        }
    }

    #[test]
    fn order_independent() {
        let mut observations = scenario();
        let forward = NormalEquations::<f64, 6>::accumulate::<QuadraticTerms>(&observations);
        let first = observations.remove(0).unwrap();
        observations.push(first);
        let backward = NormalEquations::<f64, 6>::accumulate::<QuadraticTerms>(&observations);
        assert_abs_diff_eq!(forward.matrix, backward.matrix, epsilon = 1e-12);
    }

    #[test]
    fn rejects_non_finite() {
        let mut observations = scenario();
        observations.set_image(1, Vector2::new(f64::INFINITY, 0.));
        assert_eq!(
            accumulate(&observations, Degree::Cubic),
            Err(PlateError::InvalidCoordinate("image point"))
        );
    }
}
