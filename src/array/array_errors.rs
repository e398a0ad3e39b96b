use thiserror::Error;

use crate::{region::IncompatibleDimensionalityError, storage::StorageError};

use super::{ArrayIndices, ArrayShape, ElementType};

/// A read error.
///
/// A read either returns a complete array or fails with one of these errors. Partial output is never returned.
#[derive(Debug, Error)]
pub enum ReadError {
    /// A store error. Any failure of a byte range fetch aborts the read.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// A fetched payload length is not a multiple of the element size.
    #[error("got {0} bytes, which is not a multiple of the element size {1}")]
    TypeMismatch(u64, usize),
    /// A fetched payload is a multiple of the element size, but not the expected length.
    #[error("got {0} bytes, expected {1}")]
    InvalidBytesLength(u64, u64),
    /// An element type is incompatible with the element type of an array.
    #[error("element of size {0} is incompatible with element type {1}")]
    IncompatibleElementType(usize, ElementType),
    /// Incompatible dimensionality.
    #[error(transparent)]
    IncompatibleDimensionality(#[from] IncompatibleDimensionalityError),
    /// The output buffer or a worker pool could not be created.
    #[error("concurrency resource error: {0}")]
    ConcurrencyResource(String),
    /// The output was not fully populated.
    #[error("output is incomplete, {0} of {1} bytes were written")]
    IncompleteOutput(usize, usize),
    /// Array indices are out of bounds of the array shape.
    #[error("array indices {0:?} are invalid for array of shape {1:?}")]
    InvalidArrayIndices(ArrayIndices, ArrayShape),
}
