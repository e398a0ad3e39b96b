//! An in-memory store.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::{
    byte_range::{ByteRange, InvalidByteRangeError},
    storage::{Bytes, ReadableStorageTraits, StorageError, StoreKey, WritableStorageTraits},
};

/// An in-memory store.
///
/// Values are held as [`Bytes`], so retrieving a byte range does not copy.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data_map: RwLock<BTreeMap<StoreKey, Bytes>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadableStorageTraits for MemoryStore {
    fn get_byte_range(
        &self,
        key: &StoreKey,
        byte_range: &ByteRange,
    ) -> Result<Bytes, StorageError> {
        let data = self
            .data_map
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::MissingKey(key.clone()))?;
        if byte_range.end() > data.len() as u64 {
            return Err(InvalidByteRangeError::new(*byte_range, data.len() as u64).into());
        }
        // Validated against data.len(), which is a usize
        #[allow(clippy::cast_possible_truncation)]
        Ok(data.slice(byte_range.begin() as usize..byte_range.end() as usize))
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        Ok(self
            .data_map
            .read()
            .get(key)
            .map(|data| data.len() as u64))
    }
}

impl WritableStorageTraits for MemoryStore {
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        self.data_map.write().insert(key.clone(), value);
        Ok(())
    }

    fn erase(&self, key: &StoreKey) -> Result<bool, StorageError> {
        Ok(self.data_map.write().remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store() -> Result<(), Box<dyn std::error::Error>> {
        let store = MemoryStore::new();
        let key = StoreKey::new("a/b")?;
        assert_eq!(store.size_key(&key)?, None);
        assert!(matches!(
            store.get_byte_range(&key, &ByteRange::new(0, 1)?),
            Err(StorageError::MissingKey(_))
        ));

        store.set(&key, Bytes::from((0u8..10).collect::<Vec<_>>()))?;
        assert_eq!(store.size_key(&key)?, Some(10));
        assert_eq!(
            store.get_byte_range(&key, &ByteRange::new(2, 5)?)?,
            Bytes::from(vec![2u8, 3, 4])
        );
        assert_eq!(
            store.get_byte_ranges(&key, &[ByteRange::new(0, 1)?, ByteRange::new(9, 10)?])?,
            vec![Bytes::from(vec![0u8]), Bytes::from(vec![9u8])]
        );
        assert_eq!(
            store.get_byte_range_parallel(&key, &ByteRange::new(1, 10)?, 4)?,
            Bytes::from((1u8..10).collect::<Vec<_>>())
        );
        assert!(matches!(
            store.get_byte_range(&key, &ByteRange::new(5, 11)?),
            Err(StorageError::InvalidByteRangeError(_))
        ));

        assert!(store.erase(&key)?);
        assert!(!store.erase(&key)?);
        Ok(())
    }
}
