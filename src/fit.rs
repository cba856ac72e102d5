//! Plate solution: fitting, evaluation and residuals, and the main interface.

use log::{debug, info, warn};
use nalgebra::{Const, DimMin, Matrix2, SVector, Vector2, Vector3, Vector6};

use crate::basis::{CubicTerms, Degree, LinearTerms, Monomials, QuadraticTerms};
use crate::error::PlateError;
use crate::geometry::ensure_finite;
use crate::normal::NormalEquations;
use crate::observation::ObservationSet;
use crate::solver;
use crate::wcs::ReferenceWcs;
use crate::Float;

/// Fitted coefficients, one fixed-size vector per output axis.
#[derive(Clone, Debug, PartialEq)]
enum Coefficients<F: Float> {
    Linear { x: Vector3<F>, y: Vector3<F> },
    Quadratic { x: Vector6<F>, y: Vector6<F> },
    Cubic { x: SVector<F, 7>, y: SVector<F, 7> },
}

impl<F: Float> Coefficients<F> {
    fn from_slices(coeff_x: &[F], coeff_y: &[F], degree: Degree) -> Result<Self, PlateError> {
        let coefficients = match degree {
            Degree::Linear => Coefficients::Linear {
                x: fixed(coeff_x, degree)?,
                y: fixed(coeff_y, degree)?,
            },
            Degree::Quadratic => Coefficients::Quadratic {
                x: fixed(coeff_x, degree)?,
                y: fixed(coeff_y, degree)?,
            },
            Degree::Cubic => Coefficients::Cubic {
                x: fixed(coeff_x, degree)?,
                y: fixed(coeff_y, degree)?,
            },
        };
        Ok(coefficients)
    }

    fn degree(&self) -> Degree {
        match self {
            Coefficients::Linear { .. } => Degree::Linear,
            Coefficients::Quadratic { .. } => Degree::Quadratic,
            Coefficients::Cubic { .. } => Degree::Cubic,
        }
    }

    fn x(&self) -> &[F] {
        match self {
            Coefficients::Linear { x, .. } => x.as_slice(),
            Coefficients::Quadratic { x, .. } => x.as_slice(),
            Coefficients::Cubic { x, .. } => x.as_slice(),
        }
    }

    fn y(&self) -> &[F] {
        match self {
            Coefficients::Linear { y, .. } => y.as_slice(),
            Coefficients::Quadratic { y, .. } => y.as_slice(),
            Coefficients::Cubic { y, .. } => y.as_slice(),
        }
    }

    fn evaluate(&self, point: &Vector2<F>) -> Vector2<F> {
        match self {
            Coefficients::Linear { x, y } => {
                <LinearTerms as Monomials<F, 3>>::evaluate(x, y, point)
            }
            Coefficients::Quadratic { x, y } => {
                <QuadraticTerms as Monomials<F, 6>>::evaluate(x, y, point)
            }
            Coefficients::Cubic { x, y } => <CubicTerms as Monomials<F, 7>>::evaluate(x, y, point),
        }
    }
}

fn fixed<F: Float, const N: usize>(coeff: &[F], degree: Degree) -> Result<SVector<F, N>, PlateError> {
    if coeff.len() != N {
        return Err(PlateError::CoefficientCount {
            degree,
            expected: N,
            found: coeff.len(),
        });
    }
    Ok(SVector::from_column_slice(coeff))
}

/// Result of a plate solution.
///
/// Maps image pixels onto reference pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct FitResult<F: Float> {
    coefficients: Coefficients<F>,
    rms: Vector2<F>,
    n_observations: usize,
}

impl<F: Float> FitResult<F> {
    /// Degree of the fitted polynomial.
    pub fn degree(&self) -> Degree {
        self.coefficients.degree()
    }

    /// Coefficients of the reference x coordinate, ordered like [`basis`](crate::basis()).
    pub fn coeff_x(&self) -> &[F] {
        self.coefficients.x()
    }

    /// Coefficients of the reference y coordinate, ordered like [`basis`](crate::basis()).
    pub fn coeff_y(&self) -> &[F] {
        self.coefficients.y()
    }

    /// Root-mean-square residual per axis, in reference pixels.
    pub fn rms(&self) -> Vector2<F> {
        self.rms
    }

    /// Number of observations the solution was fitted to.
    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    /// Map an image pixel to the reference frame.
    pub fn evaluate(&self, point: &Vector2<F>) -> Result<Vector2<F>, PlateError> {
        ensure_finite(point, "evaluation point")?;
        Ok(self.coefficients.evaluate(point))
    }

    /// Map an image pixel to intermediate world coordinates of the reference WCS.
    pub fn to_intermediate_world(
        &self,
        wcs: &ReferenceWcs<F>,
        pixel: &Vector2<F>,
    ) -> Result<Vector2<F>, PlateError> {
        wcs.to_intermediate_world(&self.evaluate(pixel)?)
    }

    /// Linear WCS of the image itself, obtained by composing a linear solution with `reference`.
    ///
    /// # Returns
    /// A WCS that projects image pixels exactly like
    /// [`to_intermediate_world`](FitResult::to_intermediate_world()).\
    /// Fails with [`PlateError::NotAffine`] for quadratic and cubic solutions, and with
    /// [`PlateError::SingularTransform`] if the solution collapses the image onto a line.
    pub fn target_wcs(&self, reference: &ReferenceWcs<F>) -> Result<ReferenceWcs<F>, PlateError> {
        match &self.coefficients {
            Coefficients::Linear { x, y } => {
                let a = Matrix2::new(x[0], x[1], y[0], y[1]);
                let t = Vector2::new(x[2], y[2]);
                reference.compose_affine(&a, &t)
            }
            other => Err(PlateError::NotAffine(other.degree())),
        }
    }
}

/// Builder for plate solutions over a borrowed observation set.
///
/// Use `with_` functions to set parameters.
///
/// Example:
/// ```rust
/// # use nalgebra::Vector2;
/// # use platefit::{Degree, ObservationSet, PlateSolver};
/// let observations = ObservationSet::from_pairs([
///     (Vector2::new(0., 0.), Vector2::new(0., 0.)),
///     (Vector2::new(1., 0.), Vector2::new(2., 0.)),
///     (Vector2::new(0., 1.), Vector2::new(0., 3.)),
/// ]);
/// let fit = PlateSolver::new(&observations)
///     .with_degree(Degree::Linear)
///     .solve()
///     .unwrap();
/// let reference = fit.evaluate(&Vector2::new(2., 0.)).unwrap();
/// assert!((reference - Vector2::new(1., 0.)).norm() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct PlateSolver<'a, F: Float> {
    /// Point pairs to fit.
    observations: &'a ObservationSet<F>,
    /// Polynomial degree.
    degree: Degree,
    /// Largest accepted condition number of the equilibrated normal matrix.
    max_condition: F,
}

impl<'a, F: Float> PlateSolver<'a, F> {
    /// Create a new instance using default options: linear degree and
    /// [`default_max_condition`](crate::default_max_condition).
    pub fn new(observations: &'a ObservationSet<F>) -> Self {
        Self {
            observations,
            degree: Degree::default(),
            max_condition: solver::default_max_condition(),
        }
    }

    /// Set the polynomial degree.
    pub fn with_degree(mut self, degree: Degree) -> Self {
        self.degree = degree;
        self
    }

    /// Set the largest accepted condition number.
    pub fn with_max_condition(mut self, max_condition: F) -> Self {
        self.max_condition = max_condition;
        self
    }

    /// Accumulate the normal equations, solve them, and compute the residuals.
    pub fn solve(&self) -> Result<FitResult<F>, PlateError> {
        self.solve_degree(self.degree)
    }

    fn solve_degree(&self, degree: Degree) -> Result<FitResult<F>, PlateError> {
        let found = self.observations.len();
        let required = degree.n_terms();
        if found < required {
            warn!("A {degree} fit needs {required} observations, only {found} given.");
            return Err(PlateError::InsufficientObservations {
                degree,
                required,
                found,
            });
        }
        self.observations.validate()?;

        info!("Computing {degree} plate solution from {found} observations.");
        let coefficients = match degree {
            Degree::Linear => {
                let (x, y) = self.solve_fixed::<LinearTerms, 3>()?;
                Coefficients::Linear { x, y }
            }
            Degree::Quadratic => {
                let (x, y) = self.solve_fixed::<QuadraticTerms, 6>()?;
                Coefficients::Quadratic { x, y }
            }
            Degree::Cubic => {
                let (x, y) = self.solve_fixed::<CubicTerms, 7>()?;
                Coefficients::Cubic { x, y }
            }
        };

        let rms = rms(self.observations, |p| coefficients.evaluate(p))?;
        debug!("RMS residuals: x = {}, y = {}", rms.x, rms.y);
        info!("Calculated {degree} plate solution.");

        Ok(FitResult {
            coefficients,
            rms,
            n_observations: found,
        })
    }

    fn solve_fixed<M, const N: usize>(&self) -> Result<(SVector<F, N>, SVector<F, N>), PlateError>
    where
        M: Monomials<F, N>,
        Const<N>: DimMin<Const<N>, Output = Const<N>>,
    {
        let sums = NormalEquations::<F, N>::accumulate::<M>(self.observations);
        solver::solve(&sums.matrix, &sums.rhs_x, &sums.rhs_y, self.max_condition).ok_or_else(|| {
            warn!("Normal matrix of the {} fit is singular or ill-conditioned.", M::DEGREE);
            PlateError::DegenerateFit {
                degree: M::DEGREE,
                observations: self.observations.len(),
            }
        })
    }
}

#[cfg(feature = "parallel")]
mod parallel {
    use rayon::prelude::*;

    use super::*;

    impl<F: Float> PlateSolver<'_, F> {
        /// Solve for several degrees at once, in parallel.
        ///
        /// The configured degree is ignored; results are returned in the order of `degrees`.
        pub fn solve_degrees_par(&self, degrees: &[Degree]) -> Vec<Result<FitResult<F>, PlateError>> {
            degrees
                .par_iter()
                .map(|degree| self.solve_degree(*degree))
                .collect()
        }
    }
}

/// Fit a polynomial of `degree` mapping image points onto reference points.
///
/// Shorthand for [`PlateSolver`] with default options.
pub fn fit<F: Float>(
    observations: &ObservationSet<F>,
    degree: Degree,
) -> Result<FitResult<F>, PlateError> {
    PlateSolver::new(observations).with_degree(degree).solve()
}

/// Map `point` with the polynomial of `degree` given by `coeff_x` and `coeff_y`.
///
/// Both coefficient slices must have [`Degree::n_terms`] entries.
pub fn evaluate<F: Float>(
    coeff_x: &[F],
    coeff_y: &[F],
    degree: Degree,
    point: &Vector2<F>,
) -> Result<Vector2<F>, PlateError> {
    ensure_finite(point, "evaluation point")?;
    Ok(Coefficients::from_slices(coeff_x, coeff_y, degree)?.evaluate(point))
}

/// Root-mean-square residual per axis of a polynomial over the observations.
pub fn residuals<F: Float>(
    observations: &ObservationSet<F>,
    coeff_x: &[F],
    coeff_y: &[F],
    degree: Degree,
) -> Result<Vector2<F>, PlateError> {
    observations.validate()?;
    let coefficients = Coefficients::from_slices(coeff_x, coeff_y, degree)?;
    rms(observations, |p| coefficients.evaluate(p))
}

fn rms<F, M>(observations: &ObservationSet<F>, map: M) -> Result<Vector2<F>, PlateError>
where
    F: Float,
    M: Fn(&Vector2<F>) -> Vector2<F>,
{
    if observations.is_empty() {
        return Err(PlateError::EmptyObservationSet);
    }

    let sum_sq = observations
        .iter()
        .map(|o| (o.reference - map(&o.image)).map(|d| d * d))
        .fold(Vector2::zeros(), |acc, sq| acc + sq);
    let n: F = nalgebra::convert(observations.len() as f64);

    Ok((sum_sq / n).map(|s| s.sqrt()))
}
