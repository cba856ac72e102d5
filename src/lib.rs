#![warn(missing_docs)]

//! Polynomial plate solutions between the pixels of a rendered image and the linear
//! World Coordinate System of an astronomical reference image. \
//! A handful of point pairs, identified by hand in both images, are fitted with a linear,
//! quadratic or cubic polynomial by least squares. The polynomial maps image pixels onto
//! reference pixels, which the linear part of the reference WCS turns into intermediate
//! world coordinates. No sky projection is performed.
//!
//! ## Interface
//! The central struct of this library is [`PlateSolver`]. It borrows an [`ObservationSet`],
//! chooses the [`Degree`] and the conditioning threshold, and computes a [`FitResult`].
//! For the defaults, [`fit()`] is a shorthand.
//!
//! Example:
//! ```rust
//! # use nalgebra::{Matrix2, Vector2};
//! # use platefit::{Degree, ObservationSet, PlateSolver, ReferenceWcs};
//! let observations = ObservationSet::from_pairs([
//!     (Vector2::new(100., 100.), Vector2::new(10., 10.)),
//!     (Vector2::new(300., 120.), Vector2::new(210., 30.)),
//!     (Vector2::new(140., 400.), Vector2::new(50., 310.)),
//! ]);
//! let fit = PlateSolver::new(&observations)
//!     .with_degree(Degree::Linear)
//!     .solve()
//!     .unwrap();
//!
//! let reference = ReferenceWcs::new(
//!     Vector2::new(256., 256.),
//!     Vector2::new(83.8, -5.4),
//!     Vector2::new(-0.0002, 0.0002),
//!     Matrix2::identity(),
//! );
//! let world = fit.to_intermediate_world(&reference, &Vector2::new(166., 166.)).unwrap();
//! assert!(world.norm() < 1e-9);
//! ```
//!
//! After solving, there are two options:
//! - Map single pixels with [`FitResult::evaluate`] or [`FitResult::to_intermediate_world`].
//! - Derive the linear WCS of the image itself with [`FitResult::target_wcs`],
//!   whose [`ReferenceWcs::header_cards`] can be written into a FITS header.
//!
//! Several degrees can also be solved in parallel with `PlateSolver::solve_degrees_par`
//! (feature `parallel`).
//!
//! ## Parameters
//! - `degree`: Polynomial degree. The number of observations must be at least the number
//!     of basis terms: 3 for linear, 6 for quadratic and 7 for cubic.
//! - `max_condition`: Largest accepted condition number of the equilibrated normal matrix.
//!     Larger values accept nearly collinear observations at the cost of accuracy.
//!
//! Every operation reports failures through [`PlateError`].

pub(crate) mod basis;
pub mod error;
pub(crate) mod fit;
pub(crate) mod geometry;
pub(crate) mod ndarray_utils;
pub(crate) mod normal;
pub(crate) mod observation;
pub(crate) mod solver;
pub mod wcs;

pub use basis::{basis, Degree};
pub use error::PlateError;
pub use fit::{evaluate, fit, residuals, FitResult, PlateSolver};
pub use ndarray_utils::IntoNdarray2;
pub use normal::accumulate;
pub use observation::{Observation, ObservationSet};
pub use solver::default_max_condition;
pub use wcs::{to_intermediate_world, ReferenceWcs};

/// A generic float trait such that the plate solution is generic over `f32`/`f64`.
///
/// This trait is automatically implemented for all types implementing the supertraits.
/// Particularly, this includes `f32` and `f64`.
/// [`num_traits::Float`] is not a supertrait as the need to specify the provider of the redundant definitions of the basic math functions would clutter the code.
pub trait Float: Copy + Default + nalgebra::RealField + num_traits::FromPrimitive {}

impl<F> Float for F where F: Copy + Default + nalgebra::RealField + num_traits::FromPrimitive {}
