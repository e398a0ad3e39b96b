//! The decomposition of a region into contiguous byte ranges.
//!
//! A region of a row-major array is split at a dimension `split` into
//!  - outer dimensions `[0, split)`, iterated one index at a time (each such index is a **cell**), and
//!  - inner dimensions `[split, N)`, the **inner run**, which is a single contiguous span of the array for every cell.
//!
//! Every cell maps to one byte range of the flattened array and one byte range of the row-major output.
//! The cells of a decomposition are disjoint and together cover the region exactly.

use crate::{
    byte_range::ByteRange,
    region::{is_full_span, IncompatibleDimensionalityError, IndicesIterator, Region},
};

use super::{ravel_indices, unravel_index, ArrayIndices, ArrayShape};

/// The policy for choosing the split between the outer and inner dimensions of a [`Decomposition`].
///
/// Let `p` be the last dimension which the region does not fully span.
/// If the region fully spans every dimension, both policies decompose it into a single cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SplitPolicy {
    /// The inner run includes dimension `p` and every following dimension.
    ///
    /// The requested sub-range of dimension `p` is contiguous for a fixed index of every preceding dimension, so this produces the fewest and longest byte ranges.
    #[default]
    MergeBoundary,
    /// The inner run includes only the dimensions following `p`, all of which are fully spanned.
    ///
    /// Dimension `p` is iterated as an outer dimension. If the region does not fully span the last dimension, every cell is a single element.
    TrailingFullSpan,
}

/// The decomposition of a region of an array into cells and an inner run.
///
/// The region is clamped to the array shape on creation.
#[derive(Clone, Debug)]
pub struct Decomposition {
    array_shape: ArrayShape,
    region: Region,
    element_size: usize,
    split: usize,
    outer: Region,
    inner_run: Region,
}

impl Decomposition {
    /// Decompose `region` of an array with `array_shape` and elements of `element_size` bytes.
    ///
    /// Out-of-bounds starts and stops of `region` are clamped to `array_shape`.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if the dimensionality of `region` does not match `array_shape`.
    pub fn new(
        region: &Region,
        array_shape: &[u64],
        element_size: usize,
        split_policy: SplitPolicy,
    ) -> Result<Self, IncompatibleDimensionalityError> {
        let region = region.bound(array_shape)?;
        let full_span = is_full_span(&region, array_shape)?;
        let split = match full_span.iter().rposition(|full_span| !full_span) {
            None => 0,
            Some(last_partial) => match split_policy {
                SplitPolicy::MergeBoundary => last_partial,
                SplitPolicy::TrailingFullSpan => last_partial + 1,
            },
        };

        let (outer_start, inner_start) = region.start().split_at(split);
        let (outer_shape, inner_shape) = region.shape().split_at(split);
        let outer = Region::new_with_start_shape(outer_start.to_vec(), outer_shape.to_vec())?;
        let inner_run = Region::new_with_start_shape(inner_start.to_vec(), inner_shape.to_vec())?;

        let decomposition = Self {
            array_shape: array_shape.to_vec(),
            region,
            element_size,
            split,
            outer,
            inner_run,
        };
        log::debug!(
            "decomposed region {} of array {:?} into {} cells of {} elements (split {split}, {split_policy:?})",
            decomposition.region,
            decomposition.array_shape,
            decomposition.num_cells(),
            decomposition.inner_run.num_elements(),
        );
        Ok(decomposition)
    }

    /// Return the array shape.
    #[must_use]
    pub fn array_shape(&self) -> &[u64] {
        &self.array_shape
    }

    /// Return the clamped region.
    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Return the element size in bytes.
    #[must_use]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Return the number of outer dimensions.
    #[must_use]
    pub fn split(&self) -> usize {
        self.split
    }

    /// Return the inner run, the requested bounds of the inner dimensions.
    #[must_use]
    pub fn inner_run(&self) -> &Region {
        &self.inner_run
    }

    /// Returns true if the region is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// Return the number of cells.
    ///
    /// This is the number of byte range requests of a cell-wise read. It is zero if the region is empty.
    #[must_use]
    pub fn num_cells(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.outer.num_elements()
        }
    }

    /// Return the size in bytes of the byte range of each cell.
    #[must_use]
    pub fn cell_size(&self) -> u64 {
        self.inner_run.num_elements() * self.element_size as u64
    }

    /// Return the size in bytes of the row-major output of the region.
    #[must_use]
    pub fn output_size(&self) -> u64 {
        self.region.num_elements() * self.element_size as u64
    }

    /// Returns an iterator over the cells of the decomposition in row-major order.
    ///
    /// A cell is the indices of the outer dimensions. With no outer dimensions there is exactly one cell with empty indices.
    #[must_use]
    pub fn cells(&self) -> IndicesIterator {
        if self.is_empty() {
            IndicesIterator::new_empty()
        } else {
            self.outer.indices()
        }
    }

    /// Return the cell at `cell_index`, its position in [`cells`](Decomposition::cells).
    ///
    /// `cell_index` must be less than [`num_cells`](Decomposition::num_cells).
    #[must_use]
    pub fn cell(&self, cell_index: u64) -> ArrayIndices {
        std::iter::zip(
            unravel_index(cell_index, self.outer.shape()),
            self.outer.start(),
        )
        .map(|(index, start)| index + start)
        .collect()
    }

    /// Return the region of the array covered by `cell`.
    #[must_use]
    pub fn cell_region(&self, cell: &[u64]) -> Region {
        let mut start = cell.to_vec();
        start.extend_from_slice(self.inner_run.start());
        let mut shape = vec![1; cell.len()];
        shape.extend_from_slice(self.inner_run.shape());
        Region::new_with_ranges(
            &std::iter::zip(start, shape)
                .map(|(start, size)| start..start + size)
                .collect::<Vec<_>>(),
        )
    }

    /// Return the byte range of `cell` in the flattened array.
    ///
    /// The byte range begins at the first element of the inner run and ends after the last (inclusive) element of the inner run.
    #[must_use]
    pub fn byte_range(&self, cell: &[u64]) -> ByteRange {
        let element_size = self.element_size as u64;
        let low = cell
            .iter()
            .chain(self.inner_run.start())
            .copied()
            .collect::<Vec<_>>();
        let high = cell
            .iter()
            .copied()
            .chain(
                std::iter::zip(self.inner_run.start(), self.inner_run.shape())
                    .map(|(start, size)| start + size.saturating_sub(1)),
            )
            .collect::<Vec<_>>();
        let begin = ravel_indices(&low, &self.array_shape) * element_size;
        let end = (ravel_indices(&high, &self.array_shape) + 1) * element_size;
        ByteRange::from(begin..end)
    }

    /// Return the byte range of `cell` in the row-major output of the region.
    ///
    /// The inner run is contiguous in the output as well as in the array, since the inner dimensions after the split dimension are fully spanned.
    #[must_use]
    pub fn output_byte_range(&self, cell: &[u64]) -> ByteRange {
        let mut placement = std::iter::zip(cell, self.region.start())
            .map(|(index, start)| index - start)
            .collect::<Vec<_>>();
        placement.resize(self.region.dimensionality(), 0);
        let begin = ravel_indices(&placement, self.region.shape()) * self.element_size as u64;
        ByteRange::new_with_length(begin, self.cell_size())
    }

    /// Return the smallest byte range of the flattened array covering the whole region.
    ///
    /// It spans from the first to the last (inclusive) element of the region, so includes any gaps between cells.
    /// The byte range is empty if the region is empty.
    #[must_use]
    pub fn bounding_byte_range(&self) -> ByteRange {
        match self.region.end_inc() {
            Some(end_inc) => {
                let element_size = self.element_size as u64;
                let begin = ravel_indices(self.region.start(), &self.array_shape) * element_size;
                let end = (ravel_indices(&end_inc, &self.array_shape) + 1) * element_size;
                ByteRange::from(begin..end)
            }
            None => ByteRange::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use itertools::Itertools;

    use super::*;

    fn byte_ranges(decomposition: &Decomposition) -> Vec<ByteRange> {
        decomposition
            .cells()
            .map(|cell| decomposition.byte_range(&cell))
            .collect()
    }

    #[test]
    fn decomposition_rows() {
        // shape (4,4), element size 8, rows 1..3
        let region = Region::new_with_ranges(&[1..3, 0..4]);
        let decomposition =
            Decomposition::new(&region, &[4, 4], 8, SplitPolicy::MergeBoundary).unwrap();
        assert_eq!(decomposition.split(), 0);
        assert_eq!(decomposition.num_cells(), 1);
        assert_eq!(byte_ranges(&decomposition), vec![ByteRange::new(32, 96).unwrap()]);
        assert_eq!(
            decomposition.bounding_byte_range(),
            ByteRange::new(32, 96).unwrap()
        );

        let decomposition =
            Decomposition::new(&region, &[4, 4], 8, SplitPolicy::TrailingFullSpan).unwrap();
        assert_eq!(decomposition.split(), 1);
        assert_eq!(decomposition.num_cells(), 2);
        assert_eq!(decomposition.inner_run().shape(), &[4]);
        assert_eq!(
            byte_ranges(&decomposition),
            vec![
                ByteRange::new(32, 64).unwrap(),
                ByteRange::new(64, 96).unwrap()
            ]
        );
        assert_eq!(
            decomposition.output_byte_range(&[2]),
            ByteRange::new(32, 64).unwrap()
        );
    }

    #[test]
    fn decomposition_full_span() {
        let region = Region::new_with_shape(vec![3, 4, 5]);
        for split_policy in [SplitPolicy::MergeBoundary, SplitPolicy::TrailingFullSpan] {
            let decomposition = Decomposition::new(&region, &[3, 4, 5], 2, split_policy).unwrap();
            assert_eq!(decomposition.split(), 0);
            assert_eq!(decomposition.num_cells(), 1);
            assert_eq!(decomposition.cells().collect_vec(), vec![Vec::<u64>::new()]);
            assert_eq!(
                byte_ranges(&decomposition),
                vec![ByteRange::new(0, 120).unwrap()]
            );
        }
    }

    #[test]
    fn decomposition_no_full_span() {
        // every dimension is partial
        let region = Region::new_with_ranges(&[1..3, 1..3]);
        let decomposition =
            Decomposition::new(&region, &[4, 4], 1, SplitPolicy::MergeBoundary).unwrap();
        assert_eq!(decomposition.num_cells(), 2);
        assert_eq!(
            byte_ranges(&decomposition),
            vec![ByteRange::new(5, 7).unwrap(), ByteRange::new(9, 11).unwrap()]
        );

        let decomposition =
            Decomposition::new(&region, &[4, 4], 1, SplitPolicy::TrailingFullSpan).unwrap();
        assert_eq!(decomposition.split(), 2);
        assert_eq!(decomposition.num_cells(), 4);
        assert_eq!(decomposition.cell_size(), 1);
        assert_eq!(
            byte_ranges(&decomposition),
            vec![
                ByteRange::new(5, 6).unwrap(),
                ByteRange::new(6, 7).unwrap(),
                ByteRange::new(9, 10).unwrap(),
                ByteRange::new(10, 11).unwrap()
            ]
        );
        assert_eq!(
            decomposition.bounding_byte_range(),
            ByteRange::new(5, 11).unwrap()
        );
    }

    #[test]
    fn decomposition_first_dimension_partial() {
        let region = Region::new_with_ranges(&[2..5, 0..4, 0..6]);
        let decomposition =
            Decomposition::new(&region, &[8, 4, 6], 4, SplitPolicy::TrailingFullSpan).unwrap();
        assert_eq!(decomposition.num_cells(), 3);
        assert_eq!(decomposition.cell_size(), 24 * 4);
    }

    #[test]
    fn decomposition_clamped() {
        let region = Region::new_with_ranges(&[2..10, 3..4]);
        let decomposition =
            Decomposition::new(&region, &[4, 4], 1, SplitPolicy::MergeBoundary).unwrap();
        assert_eq!(decomposition.region(), &Region::new_with_ranges(&[2..4, 3..4]));
        assert_eq!(decomposition.num_cells(), 2);

        let region = Region::new_with_ranges(&[5..10, 0..4]);
        let decomposition =
            Decomposition::new(&region, &[4, 4], 1, SplitPolicy::MergeBoundary).unwrap();
        assert!(decomposition.is_empty());
        assert_eq!(decomposition.num_cells(), 0);
        assert_eq!(decomposition.cells().count(), 0);
        assert_eq!(decomposition.output_size(), 0);
        assert!(decomposition.bounding_byte_range().is_empty());
    }

    #[test]
    fn decomposition_incompatible_dimensionality() {
        let region = Region::new_with_ranges(&[0..1]);
        assert!(Decomposition::new(&region, &[4, 4], 1, SplitPolicy::MergeBoundary).is_err());
    }

    #[test]
    fn decomposition_zero_dimensional() {
        let decomposition =
            Decomposition::new(&Region::default(), &[], 8, SplitPolicy::MergeBoundary).unwrap();
        assert_eq!(decomposition.num_cells(), 1);
        assert_eq!(byte_ranges(&decomposition), vec![ByteRange::new(0, 8).unwrap()]);
    }

    #[test]
    fn decomposition_cell_index() {
        let region = Region::new_with_ranges(&[1..3, 2..5, 0..2]);
        let decomposition =
            Decomposition::new(&region, &[4, 6, 2], 1, SplitPolicy::TrailingFullSpan).unwrap();
        assert_eq!(decomposition.num_cells(), 6);
        for (cell_index, cell) in decomposition.cells().enumerate() {
            assert_eq!(decomposition.cell(cell_index as u64), cell);
        }
    }

    #[test]
    fn decomposition_matches_contiguous_runs() {
        // the merge boundary policy yields the contiguous runs of the region
        let array_shape = [5, 4, 3];
        for region in [
            Region::new_with_ranges(&[1..4, 0..4, 0..3]),
            Region::new_with_ranges(&[1..4, 1..3, 0..3]),
            Region::new_with_ranges(&[0..5, 1..3, 1..2]),
            Region::new_with_ranges(&[0..5, 0..4, 0..3]),
        ] {
            let decomposition =
                Decomposition::new(&region, &array_shape, 1, SplitPolicy::MergeBoundary).unwrap();
            let runs = region
                .contiguous_linearised_indices(&array_shape)
                .unwrap()
                .map(|(index, elements)| ByteRange::new_with_length(index, elements))
                .collect_vec();
            assert_eq!(byte_ranges(&decomposition), runs);
        }
    }

    #[test]
    fn decomposition_covers_region() {
        // the cells cover the region exactly, with no overlap, in the array and in the output
        let array_shape = [4, 3, 5];
        let regions = [
            Region::new_with_ranges(&[0..4, 0..3, 0..5]),
            Region::new_with_ranges(&[1..3, 0..3, 0..5]),
            Region::new_with_ranges(&[1..3, 1..2, 0..5]),
            Region::new_with_ranges(&[0..4, 1..3, 2..4]),
            Region::new_with_ranges(&[3..4, 2..3, 4..5]),
        ];
        for region in regions {
            for split_policy in [SplitPolicy::MergeBoundary, SplitPolicy::TrailingFullSpan] {
                let decomposition =
                    Decomposition::new(&region, &array_shape, 1, split_policy).unwrap();
                let expected: HashSet<u64> = region
                    .indices()
                    .map(|indices| ravel_indices(&indices, &array_shape))
                    .collect();
                let mut covered = HashSet::new();
                let mut covered_output = HashSet::new();
                for cell in decomposition.cells() {
                    let byte_range = decomposition.byte_range(&cell);
                    for offset in byte_range.to_range() {
                        assert!(covered.insert(offset), "overlap at {offset}");
                    }
                    let output_byte_range = decomposition.output_byte_range(&cell);
                    assert_eq!(output_byte_range.length(), byte_range.length());
                    for offset in output_byte_range.to_range() {
                        assert!(covered_output.insert(offset), "overlap at {offset}");
                    }
                    assert_eq!(
                        decomposition.cell_region(&cell).num_elements(),
                        byte_range.length()
                    );
                }
                assert_eq!(covered, expected);
                assert_eq!(covered_output, (0..region.num_elements()).collect());
            }
        }
    }
}
