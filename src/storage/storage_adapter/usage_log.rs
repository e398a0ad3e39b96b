//! A storage adapter which logs function calls.

use std::sync::Arc;

use itertools::Itertools;

use crate::{
    byte_range::{ByteLength, ByteRange},
    storage::{Bytes, ReadableStorageTraits, StorageError, StoreKey, WritableStorageTraits},
};

/// The usage log storage adapter. Logs storage method calls with the [`log`] crate.
///
/// It is intended to aid in debugging and optimising performance by revealing storage access patterns.
/// Records are emitted at the `debug` level with the `slabio::usage_log` target.
///
/// ### Example
/// ```rust
/// # use std::sync::Arc;
/// # use slabio::storage::store::MemoryStore;
/// # use slabio::storage::storage_adapter::usage_log::UsageLogStorageAdapter;
/// let store = Arc::new(MemoryStore::new());
/// let store = Arc::new(UsageLogStorageAdapter::new(store));
/// ```
///
/// Reading a region through the above [`UsageLogStorageAdapter`] logs records like:
/// ```text
/// get_byte_range(grid.bin, 32..64) -> len=Ok(32)
/// get_byte_range(grid.bin, 64..96) -> len=Ok(32)
/// get_byte_range_parallel(grid.bin, 0..12582912, 5242880) -> len=Ok(12582912)
/// ```
pub struct UsageLogStorageAdapter<TStorage: ?Sized> {
    storage: Arc<TStorage>,
}

impl<TStorage: ?Sized> core::fmt::Debug for UsageLogStorageAdapter<TStorage> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        writeln!(f, "usage log")
    }
}

impl<TStorage: ?Sized> UsageLogStorageAdapter<TStorage> {
    /// Create a new usage log storage adapter.
    pub fn new(storage: Arc<TStorage>) -> Self {
        Self { storage }
    }
}

const TARGET: &str = "slabio::usage_log";

impl<TStorage: ?Sized + ReadableStorageTraits> ReadableStorageTraits
    for UsageLogStorageAdapter<TStorage>
{
    fn get_byte_range(
        &self,
        key: &StoreKey,
        byte_range: &ByteRange,
    ) -> Result<Bytes, StorageError> {
        let result = self.storage.get_byte_range(key, byte_range);
        log::debug!(
            target: TARGET,
            "get_byte_range({key}, {byte_range}) -> len={:?}",
            result.as_ref().map(Bytes::len)
        );
        result
    }

    fn get_byte_ranges(
        &self,
        key: &StoreKey,
        byte_ranges: &[ByteRange],
    ) -> Result<Vec<Bytes>, StorageError> {
        let result = self.storage.get_byte_ranges(key, byte_ranges);
        log::debug!(
            target: TARGET,
            "get_byte_ranges({key}, [{}]) -> len={:?}",
            byte_ranges.iter().format(", "),
            result
                .as_ref()
                .map(|v| v.iter().map(Bytes::len).collect_vec())
        );
        result
    }

    fn get_byte_range_parallel(
        &self,
        key: &StoreKey,
        byte_range: &ByteRange,
        segment_size: ByteLength,
    ) -> Result<Bytes, StorageError> {
        let result = self
            .storage
            .get_byte_range_parallel(key, byte_range, segment_size);
        log::debug!(
            target: TARGET,
            "get_byte_range_parallel({key}, {byte_range}, {segment_size}) -> len={:?}",
            result.as_ref().map(Bytes::len)
        );
        result
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        let result = self.storage.size_key(key);
        log::debug!(target: TARGET, "size_key({key}) -> {result:?}");
        result
    }
}

impl<TStorage: ?Sized + WritableStorageTraits> WritableStorageTraits
    for UsageLogStorageAdapter<TStorage>
{
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        let len = value.len();
        let result = self.storage.set(key, value);
        log::debug!(target: TARGET, "set({key}, len={len}) -> {result:?}");
        result
    }

    fn erase(&self, key: &StoreKey) -> Result<bool, StorageError> {
        let result = self.storage.erase(key);
        log::debug!(target: TARGET, "erase({key}) -> {result:?}");
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::store::MemoryStore;

    use super::*;

    #[test]
    fn usage_log_passthrough() -> Result<(), Box<dyn std::error::Error>> {
        let _ = env_logger::builder().is_test(true).try_init();
        let store = UsageLogStorageAdapter::new(Arc::new(MemoryStore::new()));
        let key = StoreKey::new("object")?;
        store.set(&key, Bytes::from((0u8..8).collect::<Vec<_>>()))?;
        assert_eq!(store.size_key(&key)?, Some(8));
        assert_eq!(
            store.get_byte_range(&key, &ByteRange::new(2, 4)?)?,
            Bytes::from(vec![2u8, 3])
        );
        assert_eq!(
            store.get_byte_ranges(&key, &[ByteRange::new(0, 1)?, ByteRange::new(7, 8)?])?,
            vec![Bytes::from(vec![0u8]), Bytes::from(vec![7u8])]
        );
        assert_eq!(
            store.get_byte_range_parallel(&key, &ByteRange::new(0, 8)?, 3)?,
            Bytes::from((0u8..8).collect::<Vec<_>>())
        );
        assert!(store.erase(&key)?);
        Ok(())
    }
}
