use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::byte_range::{concat_byte_segments, ByteLength, ByteRange};

use super::{validate_range_bytes, Bytes, StorageError, StoreKey};

/// Readable storage traits.
///
/// This is the byte-range transport consumed by the read engine.
pub trait ReadableStorageTraits: Send + Sync {
    /// Retrieve the bytes of `byte_range` in the value associated with `key`.
    ///
    /// Exactly `byte_range.length()` bytes are returned.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the key does not exist, the byte range is not available, or there is an underlying storage error.
    fn get_byte_range(&self, key: &StoreKey, byte_range: &ByteRange)
        -> Result<Bytes, StorageError>;

    /// Retrieve the bytes of multiple byte ranges in the value associated with `key`.
    ///
    /// The output is in the order of `byte_ranges`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if any byte range cannot be retrieved.
    fn get_byte_ranges(
        &self,
        key: &StoreKey,
        byte_ranges: &[ByteRange],
    ) -> Result<Vec<Bytes>, StorageError> {
        byte_ranges
            .iter()
            .map(|byte_range| self.get_byte_range(key, byte_range))
            .collect()
    }

    /// Retrieve the bytes of `byte_range` as segments of at most `segment_size` bytes retrieved in parallel.
    ///
    /// The segments are concatenated in order, so the output is identical to [`get_byte_range`](ReadableStorageTraits::get_byte_range).
    ///
    /// # Errors
    /// Returns a [`StorageError`] if any segment cannot be retrieved or a segment has an unexpected length.
    fn get_byte_range_parallel(
        &self,
        key: &StoreKey,
        byte_range: &ByteRange,
        segment_size: ByteLength,
    ) -> Result<Bytes, StorageError> {
        let segments = byte_range.split(segment_size);
        let segments = segments
            .into_par_iter()
            .map(|segment| {
                let bytes = self.get_byte_range(key, &segment)?;
                validate_range_bytes(&segment, &bytes)?;
                Ok(bytes)
            })
            .collect::<Result<Vec<_>, StorageError>>()?;
        Ok(concat_byte_segments(segments))
    }

    /// Return the size in bytes of the value at `key`.
    ///
    /// Returns [`None`] if the key is not found.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError>;
}

/// Writable storage traits.
pub trait WritableStorageTraits: Send + Sync {
    /// Store bytes at a [`StoreKey`], replacing any existing value.
    ///
    /// # Errors
    /// Returns a [`StorageError`] on failure to store.
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError>;

    /// Erase a [`StoreKey`].
    ///
    /// Returns true if the key exists and was erased, or false if the key does not exist.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn erase(&self, key: &StoreKey) -> Result<bool, StorageError>;
}

/// A supertrait of [`ReadableStorageTraits`] and [`WritableStorageTraits`].
pub trait ReadableWritableStorageTraits: ReadableStorageTraits + WritableStorageTraits {}

impl<T> ReadableWritableStorageTraits for T where T: ReadableStorageTraits + WritableStorageTraits {}
