//! Dense LU solution of the normal equations.

use log::debug;
use nalgebra::{Const, DimMin, SMatrix, SVector};

use crate::geometry::norm_1;
use crate::Float;

/// Default upper bound on the condition number of the equilibrated normal matrix.
///
/// A condition number `κ` loses about `log10(κ)` digits, so this keeps the relative error
/// of the coefficients near one percent.
pub fn default_max_condition<F: Float>() -> F {
    nalgebra::convert::<f64, F>(1e-2) / F::default_epsilon()
}

/// Solve `M·cₓ = rₓ` and `M·cᵧ = rᵧ` with one LU factorisation.
///
/// The system is first scaled to unit diagonal, `(S·M·S)·(S⁻¹·c) = S·r` with
/// `S = diag(1/√Mᵢᵢ)`, so that the condition estimate does not depend on the pixel
/// units of the basis terms. Returns `None` if a diagonal entry vanishes, the
/// factorisation fails, or the 1-norm condition number exceeds `max_condition`.
pub(crate) fn solve<F, const N: usize>(
    matrix: &SMatrix<F, N, N>,
    rhs_x: &SVector<F, N>,
    rhs_y: &SVector<F, N>,
    max_condition: F,
) -> Option<(SVector<F, N>, SVector<F, N>)>
where
    F: Float,
    Const<N>: DimMin<Const<N>, Output = Const<N>>,
{
    let mut scale = SVector::<F, N>::zeros();
    for (s, d) in scale.iter_mut().zip(matrix.diagonal().iter()) {
        if *d <= F::zero() || !d.is_finite() {
            debug!("Normal matrix has a non-positive diagonal entry.");
            return None;
        }
        *s = F::one() / d.sqrt();
    }

    let scaled = SMatrix::<F, N, N>::from_fn(|i, j| scale[i] * matrix[(i, j)] * scale[j]);
    let lu = scaled.lu();
    let inverse = lu.try_inverse()?;

    let condition = norm_1(&scaled) * norm_1(&inverse);
    debug!("Condition number of the equilibrated normal matrix: {condition}");
    if !condition.is_finite() || condition > max_condition {
        return None;
    }

    let coeff_x = lu.solve(&rhs_x.component_mul(&scale))?;
    let coeff_y = lu.solve(&rhs_y.component_mul(&scale))?;
    Some((coeff_x.component_mul(&scale), coeff_y.component_mul(&scale)))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use nalgebra::{matrix, vector};

    use super::*;

    #[test]
    fn well_posed() {
        let m = matrix![
            4., 0., 2.;
            0., 9., 3.;
            2., 3., 3.
        ];
        let (cx, cy) = solve(&m, &vector![2., 0., 1.], &vector![0., 3., 1.], 1e12).unwrap();
        assert_abs_diff_eq!(cx, vector![0.5, 0., 0.], epsilon = 1e-12);
        assert_abs_diff_eq!(cy, vector![0., 1. / 3., 0.], epsilon = 1e-12);
    }

    #[test]
    fn badly_scaled_but_regular() {
        let m = matrix![
            1e12, 0.;
            0., 1e-6
        ];
        let (cx, _) = solve(&m, &vector![1e12, 1e-6], &vector![0., 0.], 10.).unwrap();
        assert_abs_diff_eq!(cx, vector![1., 1.], epsilon = 1e-9);
    }

    #[test]
    fn singular() {
        // x and y collinear
        let m = matrix![
            1., 2., 1.;
            2., 4., 2.;
            1., 2., 3.
        ];
        assert!(solve(&m, &vector![1., 2., 3.], &vector![1., 2., 3.], 1e12).is_none());
    }

    #[test]
    fn zero_diagonal() {
        let m = matrix![
            0., 0.;
            0., 1.
        ];
        assert!(solve(&m, &vector![0., 1.], &vector![0., 1.], 1e12).is_none());
    }

    #[test]
    fn default_threshold() {
        assert!(default_max_condition::<f64>() > 1e13);
        assert!(default_max_condition::<f32>() > 1e4);
    }
}
