use std::sync::Arc;

use derive_more::Display;

use crate::{region::Region, storage::StoreKey};

use super::{ArrayShape, Decomposition, ElementType, ReadError, SplitPolicy};

/// A flat N-dimensional array.
///
/// The elements of the array are stored in row-major order as a single binary object at `key` in `storage`.
/// There is no header or metadata in the object: the shape and element type are supplied on creation.
///
/// Regions are read with [`read_region`](FlatArray::read_region), [`read_region_parallel`](FlatArray::read_region_parallel) or [`read_region_bbox`](FlatArray::read_region_bbox).
#[derive(Debug)]
pub struct FlatArray<TStorage: ?Sized> {
    /// The storage holding the binary object.
    pub(super) storage: Arc<TStorage>,
    key: StoreKey,
    shape: ArrayShape,
    element_type: ElementType,
}

/// The strategy for reading a region of a [`FlatArray`].
///
/// Every strategy returns the same result.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Display)]
pub enum ReadStrategy {
    /// Fetch the byte range of each cell in turn on the calling thread.
    #[default]
    #[display("serial")]
    Serial,
    /// Fetch the byte ranges of cells concurrently on a [`rayon`] thread pool.
    #[display("parallel")]
    Parallel,
    /// Fetch one byte range covering the whole region and slice the cells from it in memory.
    ///
    /// Reads the gaps between cells as well, in exchange for a single request (or parallel segments of one range, if large).
    #[display("bbox")]
    BoundingBox,
}

impl<TStorage: ?Sized> FlatArray<TStorage> {
    /// Create a flat array of `shape` and `element_type` stored at `key` in `storage`.
    pub fn new(
        storage: Arc<TStorage>,
        key: StoreKey,
        shape: ArrayShape,
        element_type: ElementType,
    ) -> Self {
        Self {
            storage,
            key,
            shape,
            element_type,
        }
    }

    /// Return the underlying storage.
    #[must_use]
    pub fn storage(&self) -> Arc<TStorage> {
        self.storage.clone()
    }

    /// Return the key of the binary object.
    #[must_use]
    pub fn key(&self) -> &StoreKey {
        &self.key
    }

    /// Return the array shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Return the dimensionality of the array.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.shape.len()
    }

    /// Return the element type.
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Return the number of elements of the array.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.shape.iter().product()
    }

    /// Return the size in bytes of the binary object.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.num_elements() * self.element_type.size() as u64
    }

    /// Decompose `region` of the array into cells with `split_policy`.
    ///
    /// # Errors
    /// Returns [`ReadError::IncompatibleDimensionality`] if the dimensionality of `region` does not match the array.
    pub fn decompose(
        &self,
        region: &Region,
        split_policy: SplitPolicy,
    ) -> Result<Decomposition, ReadError> {
        Ok(Decomposition::new(
            region,
            &self.shape,
            self.element_type.size(),
            split_policy,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::store::MemoryStore;

    use super::*;

    #[test]
    fn flat_array_properties() -> Result<(), Box<dyn std::error::Error>> {
        let array = FlatArray::new(
            Arc::new(MemoryStore::new()),
            StoreKey::new("grid.bin")?,
            vec![4, 4],
            ElementType::Float64,
        );
        assert_eq!(array.key().as_str(), "grid.bin");
        assert_eq!(array.shape(), &[4, 4]);
        assert_eq!(array.dimensionality(), 2);
        assert_eq!(array.element_type(), ElementType::Float64);
        assert_eq!(array.num_elements(), 16);
        assert_eq!(array.size(), 128);

        let decomposition =
            array.decompose(&Region::new_with_ranges(&[1..3, 0..4]), SplitPolicy::TrailingFullSpan)?;
        assert_eq!(decomposition.num_cells(), 2);
        assert!(matches!(
            array.decompose(&Region::new_with_ranges(&[1..3]), SplitPolicy::default()),
            Err(ReadError::IncompatibleDimensionality(_))
        ));
        Ok(())
    }

    #[test]
    fn read_strategy_display() {
        assert_eq!(ReadStrategy::default(), ReadStrategy::Serial);
        assert_eq!(ReadStrategy::Parallel.to_string(), "parallel");
        assert_eq!(ReadStrategy::BoundingBox.to_string(), "bbox");
    }
}
