//! Polynomial degrees and their monomial bases.
//!
//! Each degree has a fixed term ordering. Coefficient vectors align positionally with it,
//! and the explicit polynomials in [`Monomials::polynomial`] follow the same ordering.

use std::fmt;

use nalgebra::{DVector, SVector, Vector2, Vector3, Vector6};

use crate::error::PlateError;
use crate::geometry::ensure_finite;
use crate::Float;

/// Degree of the polynomial mapping from image to reference pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Degree {
    /// `[x, y, 1]`
    #[default]
    Linear,
    /// `[1, x, y, xy, x², y²]`
    Quadratic,
    /// `[x³, y³, x², y², x, y, 1]`
    Cubic,
}

impl Degree {
    /// All supported degrees, lowest first.
    pub const ALL: [Degree; 3] = [Degree::Linear, Degree::Quadratic, Degree::Cubic];

    /// Number of monomials in the basis, which is also the minimum number of observations.
    pub fn n_terms(self) -> usize {
        match self {
            Degree::Linear => 3,
            Degree::Quadratic => 6,
            Degree::Cubic => 7,
        }
    }
}

impl TryFrom<u8> for Degree {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Degree::Linear),
            2 => Ok(Degree::Quadratic),
            3 => Ok(Degree::Cubic),
            other => Err(other),
        }
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Degree::Linear => "linear",
            Degree::Quadratic => "quadratic",
            Degree::Cubic => "cubic",
        };
        f.write_str(name)
    }
}

/// A fixed-size monomial basis with `N` terms.
pub(crate) trait Monomials<F: Float, const N: usize> {
    const DEGREE: Degree;

    /// Evaluate every monomial at `point`.
    fn basis(point: &Vector2<F>) -> SVector<F, N>;

    /// The polynomial `Σ cᵢ·termᵢ`, written out term by term.
    fn polynomial(coeff: &SVector<F, N>, point: &Vector2<F>) -> F;

    /// Map `point` with one coefficient vector per output axis.
    fn evaluate(
        coeff_x: &SVector<F, N>,
        coeff_y: &SVector<F, N>,
        point: &Vector2<F>,
    ) -> Vector2<F> {
        Vector2::new(
            Self::polynomial(coeff_x, point),
            Self::polynomial(coeff_y, point),
        )
    }
}

pub(crate) struct LinearTerms;
pub(crate) struct QuadraticTerms;
pub(crate) struct CubicTerms;

impl<F: Float> Monomials<F, 3> for LinearTerms {
    const DEGREE: Degree = Degree::Linear;

    fn basis(p: &Vector2<F>) -> Vector3<F> {
        Vector3::new(p.x, p.y, F::one())
    }

    fn polynomial(c: &Vector3<F>, p: &Vector2<F>) -> F {
        c[0] * p.x + c[1] * p.y + c[2]
    }
}

impl<F: Float> Monomials<F, 6> for QuadraticTerms {
    const DEGREE: Degree = Degree::Quadratic;

    fn basis(p: &Vector2<F>) -> Vector6<F> {
        Vector6::new(F::one(), p.x, p.y, p.x * p.y, p.x * p.x, p.y * p.y)
    }

    fn polynomial(c: &Vector6<F>, p: &Vector2<F>) -> F {
        c[0] + c[1] * p.x + c[2] * p.y + c[3] * p.x * p.y + c[4] * p.x * p.x + c[5] * p.y * p.y
    }
}

impl<F: Float> Monomials<F, 7> for CubicTerms {
    const DEGREE: Degree = Degree::Cubic;

    fn basis(p: &Vector2<F>) -> SVector<F, 7> {
        let (x2, y2) = (p.x * p.x, p.y * p.y);
        SVector::<F, 7>::from([x2 * p.x, y2 * p.y, x2, y2, p.x, p.y, F::one()])
    }

    fn polynomial(c: &SVector<F, 7>, p: &Vector2<F>) -> F {
        let (x2, y2) = (p.x * p.x, p.y * p.y);
        c[0] * x2 * p.x + c[1] * y2 * p.y + c[2] * x2 + c[3] * y2 + c[4] * p.x + c[5] * p.y + c[6]
    }
}

/// Evaluate the monomial basis of `degree` at `point`.
///
/// The returned vector has exactly [`Degree::n_terms`] entries.
///
/// # Example:
/// ```
/// # use nalgebra::Vector2;
/// # use platefit::{basis, Degree};
/// let b = basis(Degree::Quadratic, &Vector2::new(2., 3.)).unwrap();
/// assert_eq!(b.as_slice(), &[1., 2., 3., 6., 4., 9.]);
/// ```
pub fn basis<F: Float>(degree: Degree, point: &Vector2<F>) -> Result<DVector<F>, PlateError> {
    ensure_finite(point, "basis point")?;
    let terms = match degree {
        Degree::Linear => DVector::from_column_slice(LinearTerms::basis(point).as_slice()),
        Degree::Quadratic => DVector::from_column_slice(QuadraticTerms::basis(point).as_slice()),
        Degree::Cubic => DVector::from_column_slice(CubicTerms::basis(point).as_slice()),
    };
    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_counts() {
        for degree in Degree::ALL {
            let b = basis(degree, &Vector2::new(1.5, -0.5)).unwrap();
            assert_eq!(b.len(), degree.n_terms());
        }
    }

    #[test]
    fn linear_ordering() {
        let b = basis(Degree::Linear, &Vector2::new(2., 3.)).unwrap();
        assert_eq!(b.as_slice(), &[2., 3., 1.]);
    }

    #[test]
    fn cubic_ordering() {
        let b = basis(Degree::Cubic, &Vector2::new(2., 3.)).unwrap();
        assert_eq!(b.as_slice(), &[8., 27., 4., 9., 2., 3., 1.]);
    }

    #[test]
    fn polynomial_is_dot_product() {
        let p = Vector2::new(0.7, -1.3);
        let c = SVector::<f64, 7>::from([1., -2., 3., 0.5, -0.25, 4., 9.]);
        let dot = c.dot(&CubicTerms::basis(&p));
        assert!((CubicTerms::polynomial(&c, &p) - dot).abs() < 1e-12);

        let c = Vector6::new(1., -2., 3., 0.5, -0.25, 4.);
        let dot = c.dot(&QuadraticTerms::basis(&p));
        assert!((QuadraticTerms::polynomial(&c, &p) - dot).abs() < 1e-12);
    }

    #[test]
    fn non_finite_point() {
        let err = basis(Degree::Linear, &Vector2::new(f64::NAN, 0.)).unwrap_err();
        assert_eq!(err, PlateError::InvalidCoordinate("basis point"));
    }

    #[test]
    fn degree_from_integer() {
        assert_eq!(Degree::try_from(1u8), Ok(Degree::Linear));
        assert_eq!(Degree::try_from(3u8), Ok(Degree::Cubic));
        assert_eq!(Degree::try_from(4u8), Err(4));
    }
}
