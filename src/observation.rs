//! Point pairs identified between the reference frame and the image.

use std::ops::Index;
use std::slice;

use itertools::Itertools;
use nalgebra::Vector2;

use crate::error::PlateError;
use crate::geometry::ensure_finite;
use crate::ndarray_utils::{rows_to_points, IntoNdarray2};
use crate::Float;

/// One identified correspondence.
///
/// The image point is the independent variable of the fit,
/// the reference point the value it should be mapped onto.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation<F: Float> {
    /// Pixel in the reference frame.
    pub reference: Vector2<F>,
    /// Pixel in the rendered image.
    pub image: Vector2<F>,
}

impl<F: Float> Observation<F> {
    /// Create a new pair.
    pub fn new(reference: Vector2<F>, image: Vector2<F>) -> Self {
        Self { reference, image }
    }
}

/// Ordered list of observations, as edited in a point list.
///
/// Fitting only borrows the set, so it can stay owned by the editor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObservationSet<F: Float> {
    pairs: Vec<Observation<F>>,
}

impl<F: Float> ObservationSet<F> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Build from `(reference, image)` tuples.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Vector2<F>, Vector2<F>)>,
    {
        pairs
            .into_iter()
            .map(|(reference, image)| Observation::new(reference, image))
            .collect()
    }

    /// Build from two point lists of shape `(n_points, 2)`, paired row by row.
    ///
    /// # Example:
    /// ```
    /// # use ndarray::array;
    /// # use platefit::ObservationSet;
    /// let references = array![[0., 0.], [1., 0.], [0., 1.]];
    /// let images = array![[0., 0.], [2., 0.], [0., 3.]];
    /// let observations = ObservationSet::from_arrays(references, images).unwrap();
    /// assert_eq!(observations.len(), 3);
    /// ```
    pub fn from_arrays<A>(references: A, images: A) -> Result<Self, PlateError>
    where
        A: IntoNdarray2<Out = ndarray::Array2<F>>,
    {
        let references = references.into_ndarray2();
        let images = images.into_ndarray2();
        let mismatch = || PlateError::ShapeMismatch {
            references: [references.nrows(), references.ncols()],
            images: [images.nrows(), images.ncols()],
        };
        if references.nrows() != images.nrows() {
            return Err(mismatch());
        }
        let reference_points = rows_to_points(references.view()).ok_or_else(mismatch)?;
        let image_points = rows_to_points(images.view()).ok_or_else(mismatch)?;

        Ok(Self::from_pairs(
            reference_points.into_iter().zip_eq(image_points),
        ))
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Append a pair.
    pub fn push(&mut self, observation: Observation<F>) {
        self.pairs.push(observation);
    }

    /// Insert a pair at `row`, shifting later rows down.
    ///
    /// # Panics
    /// If `row > len`.
    pub fn insert(&mut self, row: usize, observation: Observation<F>) {
        self.pairs.insert(row, observation);
    }

    /// Remove and return the pair at `row`, if it exists.
    pub fn remove(&mut self, row: usize) -> Option<Observation<F>> {
        (row < self.pairs.len()).then(|| self.pairs.remove(row))
    }

    /// Pair at `row`.
    pub fn get(&self, row: usize) -> Option<&Observation<F>> {
        self.pairs.get(row)
    }

    /// Replace the reference point of `row`. Returns the previous value.
    pub fn set_reference(&mut self, row: usize, point: Vector2<F>) -> Option<Vector2<F>> {
        self.pairs
            .get_mut(row)
            .map(|o| std::mem::replace(&mut o.reference, point))
    }

    /// Replace the image point of `row`. Returns the previous value.
    pub fn set_image(&mut self, row: usize, point: Vector2<F>) -> Option<Vector2<F>> {
        self.pairs
            .get_mut(row)
            .map(|o| std::mem::replace(&mut o.image, point))
    }

    /// Iterate over the pairs in order.
    pub fn iter(&self) -> slice::Iter<'_, Observation<F>> {
        self.pairs.iter()
    }

    /// The pairs as a slice.
    pub fn as_slice(&self) -> &[Observation<F>] {
        &self.pairs
    }

    /// Check that every coordinate is finite.
    pub fn validate(&self) -> Result<(), PlateError> {
        self.pairs.iter().try_for_each(|o| {
            ensure_finite(&o.reference, "reference point")?;
            ensure_finite(&o.image, "image point")
        })
    }
}

impl<F: Float> Index<usize> for ObservationSet<F> {
    type Output = Observation<F>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.pairs[index]
    }
}

impl<F: Float> FromIterator<Observation<F>> for ObservationSet<F> {
    fn from_iter<I: IntoIterator<Item = Observation<F>>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl<F: Float> Extend<Observation<F>> for ObservationSet<F> {
    fn extend<I: IntoIterator<Item = Observation<F>>>(&mut self, iter: I) {
        self.pairs.extend(iter);
    }
}

impl<'a, F: Float> IntoIterator for &'a ObservationSet<F> {
    type Item = &'a Observation<F>;
    type IntoIter = slice::Iter<'a, Observation<F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl<F: Float> IntoIterator for ObservationSet<F> {
    type Item = Observation<F>;
    type IntoIter = std::vec::IntoIter<Observation<F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::matrix;
    use ndarray::array;

    use super::*;

    fn pair(rx: f64, ry: f64, ix: f64, iy: f64) -> Observation<f64> {
        Observation::new(Vector2::new(rx, ry), Vector2::new(ix, iy))
    }

    #[test]
    fn table_edits() {
        let mut set = ObservationSet::new();
        set.push(pair(0., 0., 0., 0.));
        set.push(pair(2., 2., 4., 4.));
        set.insert(1, pair(1., 1., 2., 2.));
        assert_eq!(set.len(), 3);
        assert_eq!(set[1], pair(1., 1., 2., 2.));

        let old = set.set_image(2, Vector2::new(5., 5.));
        assert_eq!(old, Some(Vector2::new(4., 4.)));
        assert_eq!(set[2].image, Vector2::new(5., 5.));
        assert_eq!(set.set_reference(7, Vector2::zeros()), None);

        assert_eq!(set.remove(0), Some(pair(0., 0., 0., 0.)));
        assert_eq!(set.remove(5), None);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn from_ndarray_and_nalgebra() {
        let set = ObservationSet::from_arrays(
            array![[0., 0.], [1., 0.]],
            array![[0., 0.], [2., 0.]],
        )
        .unwrap();
        assert_eq!(set[1], pair(1., 0., 2., 0.));

        let set = ObservationSet::from_arrays(matrix![0., 1.; 2., 3.], matrix![4., 5.; 6., 7.])
            .unwrap();
        assert_eq!(set[0], pair(0., 1., 4., 5.));
    }

    #[test]
    fn mismatched_shapes() {
        let err = ObservationSet::from_arrays(
            array![[0., 0.], [1., 0.]],
            array![[0., 0.]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            PlateError::ShapeMismatch {
                references: [2, 2],
                images: [1, 2]
            }
        );

        let err =
            ObservationSet::from_arrays(array![[0., 0., 0.]], array![[0., 0., 0.]]).unwrap_err();
        assert!(matches!(err, PlateError::ShapeMismatch { .. }));
    }

    #[test]
    fn validation() {
        let mut set = ObservationSet::from_pairs([(Vector2::new(0., 0.), Vector2::new(1., 1.))]);
        assert!(set.validate().is_ok());
        set.push(pair(0., f64::NAN, 0., 0.));
        assert_eq!(
            set.validate(),
            Err(PlateError::InvalidCoordinate("reference point"))
        );
    }
}
