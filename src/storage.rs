//! Byte-range storage ([stores](store) and [storage adapters](storage_adapter)).
//!
//! A store holds flat binary objects addressed by a [`StoreKey`] (the object locator) and serves arbitrary byte ranges of them.
//! For example: a filesystem, an in-memory map, or a remote object store behind an HTTP range API.
//!
//! The read engine only consumes the [`ReadableStorageTraits`] interface:
//!  - [`get_byte_range`](ReadableStorageTraits::get_byte_range) returns exactly the requested bytes or fails, and
//!  - [`get_byte_range_parallel`](ReadableStorageTraits::get_byte_range_parallel) has the same contract, but internally splits the range into fixed-size segments that are retrieved in parallel and concatenated in order.
//!
//! Connection handling, retries and credentials are the responsibility of a store implementation.
//! Errors from a store are propagated to the caller unchanged.
//!
//! A storage adapter wraps a store and has the same interface as a store.

pub mod storage_adapter;
mod storage_sync;
pub mod store;
mod store_key;

use std::sync::Arc;

use thiserror::Error;

use crate::byte_range::{ByteLength, ByteRange, InvalidByteRangeError};

pub use store_key::{StoreKey, StoreKeyError};

pub use self::storage_sync::{
    ReadableStorageTraits, ReadableWritableStorageTraits, WritableStorageTraits,
};

/// The type for bytes used in store methods.
pub type Bytes = bytes::Bytes;

/// [`Arc`] wrapped readable storage.
pub type ReadableStorage = Arc<dyn ReadableStorageTraits>;

/// [`Arc`] wrapped writable storage.
pub type WritableStorage = Arc<dyn WritableStorageTraits>;

/// [`Arc`] wrapped readable and writable storage.
pub type ReadableWritableStorage = Arc<dyn ReadableWritableStorageTraits>;

/// A storage error.
///
/// Any storage error is a transport failure from the perspective of a read.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A write operation was attempted on a read only store.
    #[error("a write operation was attempted on a read only store")]
    ReadOnly,
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// The key does not exist in the store.
    #[error("key {0} does not exist")]
    MissingKey(StoreKey),
    /// An invalid store key.
    #[error("invalid store key {0}")]
    InvalidStoreKey(#[from] StoreKeyError),
    /// An invalid byte range.
    #[error("invalid byte range {0}")]
    InvalidByteRangeError(#[from] InvalidByteRangeError),
    /// A store returned a different number of bytes than requested.
    #[error("expected {1} bytes for byte range {0}, got {2}")]
    UnexpectedLength(ByteRange, ByteLength, u64),
    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for StorageError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

/// Check that `bytes` holds exactly the bytes of `byte_range`.
///
/// # Errors
/// Returns [`StorageError::UnexpectedLength`] if the length of `bytes` differs from the length of `byte_range`.
pub fn validate_range_bytes(byte_range: &ByteRange, bytes: &Bytes) -> Result<(), StorageError> {
    if bytes.len() as u64 == byte_range.length() {
        Ok(())
    } else {
        Err(StorageError::UnexpectedLength(
            *byte_range,
            byte_range.length(),
            bytes.len() as u64,
        ))
    }
}

#[cfg(test)]
mod tests {
    use rayon::prelude::*;

    use self::{
        storage_adapter::performance_metrics::PerformanceMetricsStorageAdapter,
        store::MemoryStore,
    };

    use super::*;

    #[test]
    fn adapters_multithreaded() {
        let store = Arc::new(MemoryStore::default());
        let store = Arc::new(PerformanceMetricsStorageAdapter::new(store));

        (0..10u8).into_par_iter().for_each(|i| {
            store
                .set(
                    &StoreKey::new(i.to_string()).unwrap(),
                    Bytes::from(vec![i; 5]),
                )
                .unwrap();
        });

        (0..10u8).into_par_iter().for_each(|i| {
            let bytes = store
                .get_byte_range(
                    &StoreKey::new(i.to_string()).unwrap(),
                    &ByteRange::new(1, 3).unwrap(),
                )
                .unwrap();
            assert_eq!(bytes, Bytes::from(vec![i; 2]));
        });

        assert_eq!(store.writes(), 10);
        assert_eq!(store.bytes_written(), 50);
        assert_eq!(store.reads(), 10);
        assert_eq!(store.bytes_read(), 20);
    }

    #[test]
    fn range_bytes_validation() {
        let byte_range = ByteRange::new(8, 16).unwrap();
        assert!(validate_range_bytes(&byte_range, &Bytes::from(vec![0u8; 8])).is_ok());
        let err = validate_range_bytes(&byte_range, &Bytes::from(vec![0u8; 7])).unwrap_err();
        assert_eq!(err.to_string(), "expected 8 bytes for byte range 8..16, got 7");
    }
}
