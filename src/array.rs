//! Flat N-dimensional arrays held in byte-range addressable storage.
//!
//! A [`FlatArray`] is an N-dimensional array of fixed-size elements flattened in row-major (C) order into a single binary object.
//! The object is located by a [`StoreKey`](crate::storage::StoreKey) in a [readable store](crate::storage::ReadableStorageTraits), and an arbitrary [`Region`](crate::region::Region) of it is read by
//!  - [decomposing](Decomposition) the region into cells, each a single contiguous byte range of the object,
//!  - fetching the byte ranges, and
//!  - assembling the fetched bytes into a row-major [`RegionArray`].
//!
//! Three read strategies are supported, all returning identical results:
//!  - [serial](FlatArray::read_region): one fetch per cell on the calling thread,
//!  - [parallel](FlatArray::read_region_parallel): one fetch per cell dispatched on a [`rayon`] pool, each writing into a disjoint part of a shared output, and
//!  - [bounding box](FlatArray::read_region_bbox): one covering fetch (split into parallel segments if large) that is sliced in memory.
//!
//! [`ravel_indices`] and [`unravel_index`] map between N-dimensional indices and row-major linearised indices.

mod array_errors;
mod concurrency;
mod decomposition;
mod element_type;
mod flat_array;
mod flat_array_sync_readable;
mod options;
mod output_buffer;
mod region_array;
mod unsafe_cell_slice;

pub use self::{
    array_errors::ReadError,
    concurrency::build_thread_pool,
    decomposition::{Decomposition, SplitPolicy},
    element_type::{Element, ElementType, UnsupportedElementTypeError},
    flat_array::{FlatArray, ReadStrategy},
    flat_array_sync_readable::{read_region, read_region_bbox, read_region_parallel},
    options::{ReadOptions, ReadOptionsBuilder},
    region_array::RegionArray,
};

pub(crate) use self::{output_buffer::OutputBuffer, unsafe_cell_slice::UnsafeCellSlice};

/// An array shape. Dimensions may be zero.
pub type ArrayShape = Vec<u64>;

/// An ND index to an element in an array.
pub type ArrayIndices = Vec<u64>;

/// Unravel a linearised index to ND indices.
///
/// The inverse of [`ravel_indices`]. `index` must be less than the number of elements of `shape`.
#[must_use]
pub fn unravel_index(mut index: u64, shape: &[u64]) -> ArrayIndices {
    let mut indices = vec![0; shape.len()];
    for (indices_i, &dim) in std::iter::zip(indices.iter_mut().rev(), shape.iter().rev()) {
        if dim != 0 {
            *indices_i = index % dim;
            index /= dim;
        }
    }
    indices
}

/// Ravel ND indices to a linearised index.
///
/// Row-major: the last dimension varies fastest.
#[must_use]
pub fn ravel_indices(indices: &[u64], shape: &[u64]) -> u64 {
    let mut index: u64 = 0;
    let mut count = 1;
    for (i, s) in std::iter::zip(indices, shape).rev() {
        index += i * count;
        count *= s;
    }
    index
}

/// Ravel ND indices to a linearised index, checking that `indices` are within the bounds of `shape`.
///
/// Returns [`None`] if the dimensionality does not match or any index is out of bounds.
#[must_use]
pub fn ravel_indices_checked(indices: &[u64], shape: &[u64]) -> Option<u64> {
    if indices.len() == shape.len() && std::iter::zip(indices, shape).all(|(i, s)| i < s) {
        Some(ravel_indices(indices, shape))
    } else {
        None
    }
}

#[cfg(feature = "ndarray")]
fn iter_u64_to_usize<'a, I: Iterator<Item = &'a u64>>(
    iter: I,
) -> Result<Vec<usize>, std::num::TryFromIntError> {
    iter.map(|v| usize::try_from(*v)).collect()
}
