//! Failure modes of the plate solution.

use crate::basis::Degree;

/// Errors returned by fitting, evaluation and projection.
///
/// Every operation surfaces its failures through this type;
/// nothing is silently replaced by a default value.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PlateError {
    /// Fewer observations than basis terms for the requested degree.
    #[error("{degree} fit needs at least {required} observations, got {found}")]
    InsufficientObservations {
        /// Requested degree.
        degree: Degree,
        /// Number of basis terms of `degree`.
        required: usize,
        /// Number of observations supplied.
        found: usize,
    },

    /// The normal matrix is singular or too badly conditioned to be trusted.
    ///
    /// Usually the image points are collinear or coincident.
    #[error("{degree} fit over {observations} observations is degenerate")]
    DegenerateFit {
        /// Requested degree.
        degree: Degree,
        /// Number of observations used.
        observations: usize,
    },

    /// A NaN or infinite value was passed in. The payload names the input.
    #[error("non-finite coordinate in {0}")]
    InvalidCoordinate(&'static str),

    /// Residuals were requested for zero observations.
    #[error("observation set is empty")]
    EmptyObservationSet,

    /// A coefficient vector does not match the term count of its degree.
    #[error("{degree} polynomial needs {expected} coefficients, got {found}")]
    CoefficientCount {
        /// Degree the coefficients were evaluated with.
        degree: Degree,
        /// Number of basis terms of `degree`.
        expected: usize,
        /// Length of the offending vector.
        found: usize,
    },

    /// Reference and image arrays do not describe the same number of 2D points.
    #[error("cannot pair reference points of shape {references:?} with image points of shape {images:?}")]
    ShapeMismatch {
        /// Shape of the reference array.
        references: [usize; 2],
        /// Shape of the image array.
        images: [usize; 2],
    },

    /// A linear transform that has to be inverted is singular.
    #[error("linear transform is not invertible")]
    SingularTransform,

    /// A linear WCS can only be derived from an affine fit.
    #[error("cannot derive a linear WCS from a {0} fit")]
    NotAffine(Degree),
}
