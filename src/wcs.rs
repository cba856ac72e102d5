//! Linear part of the World Coordinate System standard.
//!
//! Only the translation, rotation/skew, scale and axis order are applied here.
//! The results are intermediate world coordinates; any sky projection happens downstream.

use nalgebra::{Matrix2, Vector2};

use crate::error::PlateError;
use crate::geometry::{axis_flip, ensure_finite, rotation};
use crate::Float;

const ORIGIN: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));
const PROVENANCE: &str = "WCS derived from a polynomial plate solution against a reference image";

/// Linear WCS of a reference image, as read from its FITS header.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceWcs<F: Float> {
    /// Reference pixel.
    pub crpix: Vector2<F>,
    /// Coordinate value at `crpix`.
    pub crval: Vector2<F>,
    /// Pixel scale per axis.
    pub cdelt: Vector2<F>,
    /// Rotation/skew matrix.
    pub pc: Matrix2<F>,
    /// Whether the world axes are stored in swapped order (latitude first).
    pub axis_flip: bool,
    /// Equinox of the celestial system in years.
    pub equinox: F,
    /// Reference frame, e.g. `ICRS` or `FK5`.
    pub radesys: String,
    /// Axis types, e.g. `RA---TAN`.
    pub ctype: [String; 2],
    /// Unit of `crval` and `cdelt`.
    pub cunit: String,
}

impl<F: Float> ReferenceWcs<F> {
    /// Create a new instance for an ICRS tangent plane at equinox 2000 without axis flip.
    /// Use `with_` functions to set the remaining parameters.
    pub fn new(crpix: Vector2<F>, crval: Vector2<F>, cdelt: Vector2<F>, pc: Matrix2<F>) -> Self {
        Self {
            crpix,
            crval,
            cdelt,
            pc,
            axis_flip: false,
            equinox: nalgebra::convert(2000.0_f64),
            radesys: "ICRS".to_owned(),
            ctype: ["RA---TAN".to_owned(), "DEC--TAN".to_owned()],
            cunit: "deg".to_owned(),
        }
    }

    /// Create a new instance whose `pc` matrix is a pure rotation by `angle` radians (`CROTA2`).
    pub fn from_rotation(crpix: Vector2<F>, crval: Vector2<F>, cdelt: Vector2<F>, angle: F) -> Self {
        Self::new(crpix, crval, cdelt, rotation(angle))
    }

    /// Set whether the two world axes are swapped.
    pub fn with_axis_flip(mut self, axis_flip: bool) -> Self {
        self.axis_flip = axis_flip;
        self
    }

    /// Set the equinox.
    pub fn with_equinox(mut self, equinox: F) -> Self {
        self.equinox = equinox;
        self
    }

    /// Set the reference frame name.
    pub fn with_radesys(mut self, radesys: impl Into<String>) -> Self {
        self.radesys = radesys.into();
        self
    }

    /// Set the axis types.
    pub fn with_ctype(mut self, ctype1: impl Into<String>, ctype2: impl Into<String>) -> Self {
        self.ctype = [ctype1.into(), ctype2.into()];
        self
    }

    /// Combined linear transformation matrix, `P · diag(cdelt) · pc`,
    /// where `P` swaps the axes if they are flipped.
    pub fn cd(&self) -> Matrix2<F> {
        let cd = Matrix2::from_diagonal(&self.cdelt) * self.pc;
        if self.axis_flip {
            axis_flip::<F>() * cd
        } else {
            cd
        }
    }

    /// Transforms from pixel to intermediate world coordinates.
    ///
    /// # Example:
    /// ```
    /// # use nalgebra::{Matrix2, Vector2};
    /// # use platefit::ReferenceWcs;
    /// let wcs = ReferenceWcs::new(
    ///     Vector2::new(512f64, 512.),
    ///     Vector2::new(83.8, -5.4),
    ///     Vector2::new(-0.0002, 0.0002),
    ///     Matrix2::identity(),
    /// );
    /// let world = wcs.to_intermediate_world(&Vector2::new(522., 512.)).unwrap();
    /// assert!((world.x + 0.002).abs() < 1e-12);
    /// ```
    pub fn to_intermediate_world(&self, pixel: &Vector2<F>) -> Result<Vector2<F>, PlateError> {
        ensure_finite(pixel, "pixel")?;
        self.validate()?;

        let intermediate = (self.pc * (pixel - self.crpix)).component_mul(&self.cdelt);
        if self.axis_flip {
            Ok(axis_flip::<F>() * intermediate)
        } else {
            Ok(intermediate)
        }
    }

    /// Transforms from intermediate world coordinates to pixel.
    pub fn intermediate_world_to_pixel(&self, world: &Vector2<F>) -> Result<Vector2<F>, PlateError> {
        ensure_finite(world, "intermediate world coordinate")?;
        self.validate()?;

        let world = if self.axis_flip {
            axis_flip::<F>() * world
        } else {
            *world
        };
        if self.cdelt.iter().any(|d| *d == F::zero()) {
            return Err(PlateError::SingularTransform);
        }
        let pc_inv = self.pc.try_inverse().ok_or(PlateError::SingularTransform)?;

        Ok(self.crpix + pc_inv * world.component_div(&self.cdelt))
    }

    /// WCS of an image whose pixels map onto this reference frame by `reference = a · image + t`.
    pub(crate) fn compose_affine(&self, a: &Matrix2<F>, t: &Vector2<F>) -> Result<Self, PlateError> {
        ensure_finite(a, "affine matrix")?;
        ensure_finite(t, "affine offset")?;
        self.validate()?;

        let a_inv = a.try_inverse().ok_or(PlateError::SingularTransform)?;
        Ok(Self {
            crpix: a_inv * (self.crpix - t),
            pc: self.pc * a,
            ..self.clone()
        })
    }

    /// Header keywords and values describing this WCS, in writing order.
    ///
    /// Reference values and the CD matrix are written with eleven decimals, the equinox with one.
    /// `ORIGIN` names this crate and a closing `COMMENT` card records how the solution was made.
    pub fn header_cards(&self) -> Vec<(&'static str, String)> {
        let cd = self.cd();
        vec![
            ("ORIGIN", ORIGIN.to_owned()),
            ("WCSAXES", "2".to_owned()),
            ("WCSNAME", "Primary WCS".to_owned()),
            ("EQUINOX", format!("{:.1}", self.equinox)),
            ("RADESYS", self.radesys.clone()),
            ("CTYPE1", self.ctype[0].clone()),
            ("CRPIX1", format!("{:.11}", self.crpix.x)),
            ("CRVAL1", format!("{:.11}", self.crval.x)),
            ("CUNIT1", self.cunit.clone()),
            ("CTYPE2", self.ctype[1].clone()),
            ("CRPIX2", format!("{:.11}", self.crpix.y)),
            ("CRVAL2", format!("{:.11}", self.crval.y)),
            ("CUNIT2", self.cunit.clone()),
            ("CD1_1", format!("{:.11}", cd.m11)),
            ("CD1_2", format!("{:.11}", cd.m12)),
            ("CD2_1", format!("{:.11}", cd.m21)),
            ("CD2_2", format!("{:.11}", cd.m22)),
            ("COMMENT", PROVENANCE.to_owned()),
        ]
    }

    fn validate(&self) -> Result<(), PlateError> {
        ensure_finite(&self.crpix, "crpix")?;
        ensure_finite(&self.cdelt, "cdelt")?;
        ensure_finite(&self.pc, "pc")
    }
}

/// Transforms `pixel` to intermediate world coordinates of `wcs`.
///
/// Same as [`ReferenceWcs::to_intermediate_world`].
pub fn to_intermediate_world<F: Float>(
    wcs: &ReferenceWcs<F>,
    pixel: &Vector2<F>,
) -> Result<Vector2<F>, PlateError> {
    wcs.to_intermediate_world(pixel)
}
