//! Array regions.
//!
//! A [`Region`] is a hyper-rectangular sub-range of an array, with a `[start, stop)` interval and unit step in each dimension.
//! It is the unit of every read in this crate.
//!
//! This module provides:
//!  - [clamping](Region::bound) a region to the domain of an array,
//!  - identifying the dimensions a region [fully spans](is_full_span),
//!  - iterators over the [indices](Region::indices) of a region, and
//!  - iterators over the [contiguous linearised runs](Region::contiguous_linearised_indices) of a region within an array.

mod region_iterators;

pub use region_iterators::{ContiguousLinearisedIndicesIterator, IndicesIterator};

use std::ops::Range;

use derive_more::Display;
use itertools::izip;
use thiserror::Error;

use crate::array::{ArrayIndices, ArrayShape};

/// An array region.
///
/// Stored as a start and a shape, so an empty region is representable in any dimension.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Default)]
#[display("start {start:?} shape {shape:?}")]
pub struct Region {
    /// The start of the region.
    start: ArrayIndices,
    /// The shape of the region.
    shape: ArrayShape,
}

/// A region creation error.
#[derive(Clone, Debug, Error)]
pub enum RegionCreateError {
    /// A dimension was requested with a step other than one.
    #[error("unsupported step {1} in dimension {0}, only unit steps are supported")]
    UnsupportedStep(usize, u64),
    /// Incompatible dimensionality.
    #[error(transparent)]
    IncompatibleDimensionality(#[from] IncompatibleDimensionalityError),
}

impl Region {
    /// Create a new region with `shape` starting at the origin.
    #[must_use]
    pub fn new_with_shape(shape: ArrayShape) -> Self {
        Self {
            start: vec![0; shape.len()],
            shape,
        }
    }

    /// Create a new region from a start and shape.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if the lengths of `start` and `shape` do not match.
    pub fn new_with_start_shape(
        start: ArrayIndices,
        shape: ArrayShape,
    ) -> Result<Self, IncompatibleDimensionalityError> {
        if start.len() == shape.len() {
            Ok(Self { start, shape })
        } else {
            Err(IncompatibleDimensionalityError::new(
                start.len(),
                shape.len(),
            ))
        }
    }

    /// Create a new region from `start..stop` ranges, one per dimension.
    ///
    /// An inverted range (`stop < start`) is empty.
    #[must_use]
    pub fn new_with_ranges(ranges: &[Range<u64>]) -> Self {
        let start = ranges.iter().map(|range| range.start).collect();
        let shape = ranges
            .iter()
            .map(|range| range.end.saturating_sub(range.start))
            .collect();
        Self { start, shape }
    }

    /// Create a new region from `(start..stop, step)` pairs, one per dimension.
    ///
    /// # Errors
    /// Returns [`RegionCreateError::UnsupportedStep`] if any step is not one.
    pub fn new_with_stepped_ranges(ranges: &[(Range<u64>, u64)]) -> Result<Self, RegionCreateError> {
        if let Some((dimension, (_, step))) = ranges
            .iter()
            .enumerate()
            .find(|(_, (_, step))| *step != 1)
        {
            return Err(RegionCreateError::UnsupportedStep(dimension, *step));
        }
        Ok(Self::new_with_ranges(
            &ranges
                .iter()
                .map(|(range, _)| range.clone())
                .collect::<Vec<_>>(),
        ))
    }

    /// Return the start of the region.
    #[must_use]
    pub fn start(&self) -> &[u64] {
        &self.start
    }

    /// Return the shape of the region.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Return the dimensionality of the region.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.start.len()
    }

    /// Return the end (exclusive) of the region.
    ///
    /// Saturates at [`u64::MAX`].
    #[must_use]
    pub fn end_exc(&self) -> ArrayIndices {
        std::iter::zip(&self.start, &self.shape)
            .map(|(start, size)| start.saturating_add(*size))
            .collect()
    }

    /// Return the end (inclusive) of the region.
    ///
    /// Returns [`None`] if the region is empty.
    #[must_use]
    pub fn end_inc(&self) -> Option<ArrayIndices> {
        if self.is_empty() {
            None
        } else {
            Some(
                std::iter::zip(&self.start, &self.shape)
                    .map(|(start, size)| start.saturating_add(size - 1))
                    .collect(),
            )
        }
    }

    /// Return the number of elements of the region.
    ///
    /// Equal to the product of the components of its shape.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.shape.iter().product()
    }

    /// Returns true if the region contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shape.contains(&0)
    }

    /// Clamp the region to the domain `[0, array_shape)`.
    ///
    /// Out-of-bounds starts and stops are truncated, so the result may be empty.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if `array_shape` does not match the region dimensionality.
    pub fn bound(&self, array_shape: &[u64]) -> Result<Self, IncompatibleDimensionalityError> {
        if array_shape.len() != self.dimensionality() {
            return Err(IncompatibleDimensionalityError::new(
                array_shape.len(),
                self.dimensionality(),
            ));
        }
        let start: ArrayIndices = std::iter::zip(&self.start, array_shape)
            .map(|(&start, &size)| std::cmp::min(start, size))
            .collect();
        let shape = izip!(&start, self.end_exc(), array_shape)
            .map(|(&start, end, &size)| std::cmp::min(end, size).saturating_sub(start))
            .collect();
        Ok(Self { start, shape })
    }

    /// Returns true if the region is within the bounds of `array_shape`.
    #[must_use]
    pub fn inbounds(&self, array_shape: &[u64]) -> bool {
        self.dimensionality() == array_shape.len()
            && izip!(&self.start, &self.shape, array_shape)
                .all(|(start, size, array_size)| {
                    start
                        .checked_add(*size)
                        .is_some_and(|end| end <= *array_size)
                })
    }

    /// Returns an iterator over the indices of elements within the region, in row-major order.
    #[must_use]
    pub fn indices(&self) -> IndicesIterator {
        IndicesIterator::new(self.clone())
    }

    /// Returns an iterator over the contiguous runs of this region within an array of `array_shape`.
    ///
    /// The iterator item is a tuple: (linearised index of the run start, # contiguous elements).
    ///
    /// # Errors
    /// Returns [`IncompatibleRegionAndShapeError`] if `array_shape` does not encapsulate this region.
    pub fn contiguous_linearised_indices(
        &self,
        array_shape: &[u64],
    ) -> Result<ContiguousLinearisedIndicesIterator, IncompatibleRegionAndShapeError> {
        ContiguousLinearisedIndicesIterator::new(self, array_shape)
    }
}

/// Return one flag per dimension: true if the region covers `[0, array_shape[d])` in that dimension.
///
/// # Errors
/// Returns [`IncompatibleDimensionalityError`] if `array_shape` does not match the region dimensionality.
pub fn is_full_span(
    region: &Region,
    array_shape: &[u64],
) -> Result<Vec<bool>, IncompatibleDimensionalityError> {
    if array_shape.len() == region.dimensionality() {
        Ok(izip!(region.start(), region.shape(), array_shape)
            .map(|(&start, &size, &array_size)| start == 0 && size == array_size)
            .collect())
    } else {
        Err(IncompatibleDimensionalityError::new(
            array_shape.len(),
            region.dimensionality(),
        ))
    }
}

/// An incompatible dimensionality error.
#[derive(Copy, Clone, Debug, Error)]
#[error("incompatible dimensionality {0}, expected {1}")]
pub struct IncompatibleDimensionalityError(usize, usize);

impl IncompatibleDimensionalityError {
    /// Create a new incompatible dimensionality error.
    #[must_use]
    pub const fn new(got: usize, expected: usize) -> Self {
        Self(got, expected)
    }
}

/// An incompatible region and array shape error.
#[derive(Clone, Debug, Error)]
#[error("region {0} is incompatible with array of shape {1:?}")]
pub struct IncompatibleRegionAndShapeError(Region, ArrayShape);

impl IncompatibleRegionAndShapeError {
    /// Create a new incompatible region and array shape error.
    #[must_use]
    pub fn new(region: Region, array_shape: ArrayShape) -> Self {
        Self(region, array_shape)
    }
}
