use std::iter::FusedIterator;

use itertools::izip;

use crate::{
    array::{ravel_indices, ArrayIndices},
    region::{IncompatibleRegionAndShapeError, Region},
};

/// Iterates over element indices in a region, in row-major order.
///
/// A zero-dimensional region yields exactly one (empty) index, and an empty region yields nothing.
pub struct IndicesIterator {
    region: Region,
    index: u64,
    num_elements: u64,
}

impl IndicesIterator {
    /// Create a new indices iterator.
    #[must_use]
    pub fn new(region: Region) -> Self {
        let num_elements = region.num_elements();
        Self {
            region,
            index: 0,
            num_elements,
        }
    }

    /// Create an indices iterator which yields nothing.
    #[must_use]
    pub fn new_empty() -> Self {
        Self {
            region: Region::default(),
            index: 0,
            num_elements: 0,
        }
    }
}

impl Iterator for IndicesIterator {
    type Item = ArrayIndices;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.num_elements {
            return None;
        }
        let mut current = self.index;
        let mut indices = vec![0; self.region.dimensionality()];
        for (out, &start, &size) in izip!(
            indices.iter_mut().rev(),
            self.region.start().iter().rev(),
            self.region.shape().iter().rev(),
        ) {
            *out = current % size + start;
            current /= size;
        }
        self.index += 1;
        Some(indices)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.num_elements - self.index).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for IndicesIterator {}

impl FusedIterator for IndicesIterator {}

/// Iterates over contiguous linearised element indices of a region within an array.
///
/// Trailing dimensions that the region fully spans are merged with the nearest preceding dimension into a single run.
/// The iterator item is a tuple: (linearised index, # contiguous elements).
pub struct ContiguousLinearisedIndicesIterator {
    inner: IndicesIterator,
    array_shape: Vec<u64>,
    contiguous_elements: u64,
}

impl ContiguousLinearisedIndicesIterator {
    /// Create a new contiguous linearised indices iterator.
    ///
    /// # Errors
    /// Returns [`IncompatibleRegionAndShapeError`] if `array_shape` does not encapsulate `region`.
    pub fn new(
        region: &Region,
        array_shape: &[u64],
    ) -> Result<Self, IncompatibleRegionAndShapeError> {
        if !region.inbounds(array_shape) {
            return Err(IncompatibleRegionAndShapeError::new(
                region.clone(),
                array_shape.to_vec(),
            ));
        }

        let mut contiguous = true;
        let mut contiguous_elements = 1;
        let mut shape_out = vec![0; array_shape.len()];
        for (&start, &size, &array_size, shape_out_i) in izip!(
            region.start().iter().rev(),
            region.shape().iter().rev(),
            array_shape.iter().rev(),
            shape_out.iter_mut().rev(),
        ) {
            if contiguous {
                contiguous_elements *= size;
                *shape_out_i = 1;
                contiguous = start == 0 && size == array_size;
            } else {
                *shape_out_i = size;
            }
        }
        let inner = if region.is_empty() {
            Region::new_with_shape(vec![0; array_shape.len()]).indices()
        } else {
            Region::new_with_start_shape(region.start().to_vec(), shape_out)
                .map_err(|_| {
                    IncompatibleRegionAndShapeError::new(region.clone(), array_shape.to_vec())
                })?
                .indices()
        };
        Ok(Self {
            inner,
            array_shape: array_shape.to_vec(),
            contiguous_elements,
        })
    }

    /// Return the number of contiguous elements (fixed on each iteration).
    #[must_use]
    pub fn contiguous_elements(&self) -> u64 {
        self.contiguous_elements
    }
}

impl Iterator for ContiguousLinearisedIndicesIterator {
    type Item = (u64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|indices| {
            (
                ravel_indices(&indices, &self.array_shape),
                self.contiguous_elements,
            )
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ContiguousLinearisedIndicesIterator {}

impl FusedIterator for ContiguousLinearisedIndicesIterator {}

#[cfg(test)]
mod tests {
    use crate::region::Region;

    #[test]
    fn region_indices() {
        let region = Region::new_with_ranges(&[1..3, 1..3]);
        let mut iter = region.indices();
        assert_eq!(iter.size_hint(), (4, Some(4)));
        assert_eq!(iter.next(), Some(vec![1, 1]));
        assert_eq!(iter.next(), Some(vec![1, 2]));
        assert_eq!(iter.next(), Some(vec![2, 1]));
        assert_eq!(iter.next(), Some(vec![2, 2]));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn region_indices_degenerate() {
        let mut iter = Region::new_with_shape(vec![]).indices();
        assert_eq!(iter.next(), Some(vec![]));
        assert_eq!(iter.next(), None);

        let mut iter = Region::new_with_ranges(&[0..2, 3..3]).indices();
        assert_eq!(iter.size_hint(), (0, Some(0)));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn region_contiguous_linearised_indices() {
        //  0  1  2  3
        //  4  5  6  7
        //  8  9 10 11
        // 12 13 14 15
        let region = Region::new_with_ranges(&[1..3, 1..3]);
        assert!(region.contiguous_linearised_indices(&[4, 4, 4]).is_err());
        assert!(region.contiguous_linearised_indices(&[2, 2]).is_err());
        let mut iter = region.contiguous_linearised_indices(&[4, 4]).unwrap();
        assert_eq!(iter.size_hint(), (2, Some(2)));
        assert_eq!(iter.next(), Some((5, 2)));
        assert_eq!(iter.next(), Some((9, 2)));
        assert_eq!(iter.next(), None);

        let region = Region::new_with_ranges(&[1..3, 0..4]);
        let mut iter = region.contiguous_linearised_indices(&[4, 4]).unwrap();
        assert_eq!(iter.contiguous_elements(), 8);
        assert_eq!(iter.next(), Some((4, 8)));
        assert_eq!(iter.next(), None);

        let region = Region::new_with_ranges(&[1..3, 0..1, 0..2, 0..2]);
        let mut iter = region.contiguous_linearised_indices(&[3, 1, 2, 2]).unwrap();
        assert_eq!(iter.next(), Some((4, 8)));
        assert_eq!(iter.next(), None);
    }
}
