use std::sync::Arc;

use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

use crate::{
    byte_range::{extract_byte_ranges, ByteRange, InvalidByteRangeError},
    region::Region,
    storage::{validate_range_bytes, ReadableStorageTraits, StorageError, StoreKey},
};

use super::{
    concurrency::{install, uniform_block_size},
    output_buffer::OutputWriter,
    ravel_indices_checked,
    region_array::validate_element_bytes,
    Decomposition, Element, ElementType, FlatArray, OutputBuffer, ReadError, ReadOptions,
    ReadStrategy, RegionArray,
};

impl<TStorage: ?Sized + ReadableStorageTraits> FlatArray<TStorage> {
    /// Read the element at `indices`.
    ///
    /// Returns the raw bytes of the element.
    ///
    /// # Errors
    /// Returns [`ReadError::InvalidArrayIndices`] if `indices` are not within the array, or a [`ReadError`] if the fetch fails.
    pub fn read_point(&self, indices: &[u64]) -> Result<Vec<u8>, ReadError> {
        let index = ravel_indices_checked(indices, self.shape())
            .ok_or_else(|| ReadError::InvalidArrayIndices(indices.to_vec(), self.shape().to_vec()))?;
        let element_size = self.element_type().size() as u64;
        let byte_range = ByteRange::new_with_length(index * element_size, element_size);
        let bytes = self.storage.get_byte_range(self.key(), &byte_range)?;
        validate_range_bytes(&byte_range, &bytes)?;
        log::trace!("read point {indices:?} of {} at {byte_range}", self.key());
        Ok(bytes.to_vec())
    }

    /// Read the element at `indices` as `T`.
    ///
    /// # Errors
    /// Returns [`ReadError::IncompatibleElementType`] if `T` is not compatible with the element type, otherwise see [`read_point`](FlatArray::read_point).
    pub fn read_point_element<T: Element>(&self, indices: &[u64]) -> Result<T, ReadError> {
        let element = RegionArray::new(vec![], self.element_type(), self.read_point(indices)?)?
            .into_elements::<T>()?;
        element
            .first()
            .copied()
            .ok_or(ReadError::InvalidBytesLength(0, std::mem::size_of::<T>() as u64))
    }

    /// Read `region` of the array, fetching the byte range of each cell in turn.
    ///
    /// Out-of-bounds starts and stops of `region` are clamped to the array shape, so the output shape is that of the clamped region.
    ///
    /// # Errors
    /// Returns a [`ReadError`] if
    ///  - the dimensionality of `region` does not match the array,
    ///  - any fetch fails, or
    ///  - a fetched payload does not hold the expected number of elements.
    pub fn read_region(&self, region: &Region) -> Result<RegionArray, ReadError> {
        self.read_region_opt(region, &ReadOptions::default())
    }

    /// Explicit options version of [`read_region`](FlatArray::read_region).
    #[allow(clippy::missing_errors_doc)]
    pub fn read_region_opt(
        &self,
        region: &Region,
        options: &ReadOptions,
    ) -> Result<RegionArray, ReadError> {
        let decomposition = self.decompose(region, options.split_policy())?;
        let mut output = OutputBuffer::new(output_size(&decomposition)?)?;
        {
            let writer = output.writer();
            for cell in decomposition.cells() {
                self.fetch_cell(&decomposition, &cell, &writer)?;
            }
        }
        self.region_array(&decomposition, output)
    }

    /// Read `region` of the array, fetching the byte ranges of cells concurrently.
    ///
    /// Cells are dispatched in uniform blocks to the thread pool of `options` (or the [`rayon`] global pool).
    /// Each cell is written to a disjoint part of a shared output, so no locking is required.
    /// The first failure is returned once every dispatched fetch has completed.
    ///
    /// # Errors
    /// See [`read_region`](FlatArray::read_region).
    pub fn read_region_parallel(&self, region: &Region) -> Result<RegionArray, ReadError> {
        self.read_region_parallel_opt(region, &ReadOptions::default())
    }

    /// Explicit options version of [`read_region_parallel`](FlatArray::read_region_parallel).
    #[allow(clippy::missing_errors_doc)]
    pub fn read_region_parallel_opt(
        &self,
        region: &Region,
        options: &ReadOptions,
    ) -> Result<RegionArray, ReadError> {
        let decomposition = self.decompose(region, options.split_policy())?;
        let num_cells = usize::try_from(decomposition.num_cells()).map_err(|_| {
            ReadError::ConcurrencyResource(format!(
                "{} cells exceed the address space",
                decomposition.num_cells()
            ))
        })?;
        let mut output = OutputBuffer::new(output_size(&decomposition)?)?;
        {
            let writer = output.writer();
            let fetch_cell = |cell_index: usize| {
                let cell = decomposition.cell(cell_index as u64);
                self.fetch_cell(&decomposition, &cell, &writer)
            };
            let block_size = uniform_block_size(num_cells, options.concurrent_target());
            install(options.thread_pool(), || {
                (0..num_cells)
                    .into_par_iter()
                    .by_uniform_blocks(block_size)
                    .try_for_each(fetch_cell)
            })?;
        }
        self.region_array(&decomposition, output)
    }

    /// Read `region` of the array by fetching one byte range covering the whole region.
    ///
    /// If the covering byte range exceeds the parallel fetch threshold of `options`, it is fetched in parallel segments of the parallel fetch chunk size.
    /// The cells are then sliced from the fetched bytes in memory.
    ///
    /// # Errors
    /// See [`read_region`](FlatArray::read_region).
    pub fn read_region_bbox(&self, region: &Region) -> Result<RegionArray, ReadError> {
        self.read_region_bbox_opt(region, &ReadOptions::default())
    }

    /// Explicit options version of [`read_region_bbox`](FlatArray::read_region_bbox).
    #[allow(clippy::missing_errors_doc)]
    pub fn read_region_bbox_opt(
        &self,
        region: &Region,
        options: &ReadOptions,
    ) -> Result<RegionArray, ReadError> {
        let decomposition = self.decompose(region, options.split_policy())?;
        let mut output = OutputBuffer::new(output_size(&decomposition)?)?;
        if !decomposition.is_empty() {
            let bounding_byte_range = decomposition.bounding_byte_range();
            let bytes = if bounding_byte_range.length() > options.parallel_fetch_threshold() {
                log::debug!(
                    "fetching {bounding_byte_range} of {} in segments of {} bytes",
                    self.key(),
                    options.parallel_fetch_chunk_size()
                );
                install(options.thread_pool(), || {
                    self.storage.get_byte_range_parallel(
                        self.key(),
                        &bounding_byte_range,
                        options.parallel_fetch_chunk_size(),
                    )
                })?
            } else {
                self.storage
                    .get_byte_range(self.key(), &bounding_byte_range)?
            };
            validate_element_bytes(bytes.len(), &self.element_type())?;
            validate_range_bytes(&bounding_byte_range, &bytes)?;

            let cells: Vec<_> = decomposition.cells().collect();
            let byte_ranges = cells
                .iter()
                .map(|cell| {
                    let byte_range = decomposition.byte_range(cell);
                    byte_range
                        .relative_to(bounding_byte_range.begin())
                        .ok_or(InvalidByteRangeError::new(
                            byte_range,
                            bounding_byte_range.end(),
                        ))
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(StorageError::from)?;
            let cell_bytes =
                extract_byte_ranges(&bytes, &byte_ranges).map_err(StorageError::from)?;

            let writer = output.writer();
            for (cell, cell_bytes) in std::iter::zip(&cells, &cell_bytes) {
                // SAFETY: the output byte ranges of cells are disjoint
                unsafe { writer.write(&decomposition.output_byte_range(cell), cell_bytes)? };
            }
        }
        self.region_array(&decomposition, output)
    }

    /// Read `region` of the array with `strategy`.
    ///
    /// # Errors
    /// See [`read_region`](FlatArray::read_region).
    pub fn read_region_with_strategy(
        &self,
        region: &Region,
        strategy: ReadStrategy,
        options: &ReadOptions,
    ) -> Result<RegionArray, ReadError> {
        match strategy {
            ReadStrategy::Serial => self.read_region_opt(region, options),
            ReadStrategy::Parallel => self.read_region_parallel_opt(region, options),
            ReadStrategy::BoundingBox => self.read_region_bbox_opt(region, options),
        }
    }

    /// Read `region` of the array into a vector of `T`.
    ///
    /// # Errors
    /// Returns [`ReadError::IncompatibleElementType`] if `T` is not compatible with the element type, otherwise see [`read_region`](FlatArray::read_region).
    pub fn read_region_elements<T: Element>(&self, region: &Region) -> Result<Vec<T>, ReadError> {
        self.read_region_elements_opt(region, ReadStrategy::default(), &ReadOptions::default())
    }

    /// Explicit strategy and options version of [`read_region_elements`](FlatArray::read_region_elements).
    #[allow(clippy::missing_errors_doc)]
    pub fn read_region_elements_opt<T: Element>(
        &self,
        region: &Region,
        strategy: ReadStrategy,
        options: &ReadOptions,
    ) -> Result<Vec<T>, ReadError> {
        self.read_region_with_strategy(region, strategy, options)?
            .into_elements()
    }

    #[cfg(feature = "ndarray")]
    /// Read `region` of the array into an [`ndarray::ArrayD`].
    ///
    /// # Errors
    /// Returns [`ReadError::IncompatibleElementType`] if `T` is not compatible with the element type, otherwise see [`read_region`](FlatArray::read_region).
    pub fn read_region_ndarray<T: Element>(
        &self,
        region: &Region,
    ) -> Result<ndarray::ArrayD<T>, ReadError> {
        self.read_region_ndarray_opt(region, ReadStrategy::default(), &ReadOptions::default())
    }

    #[cfg(feature = "ndarray")]
    /// Explicit strategy and options version of [`read_region_ndarray`](FlatArray::read_region_ndarray).
    #[allow(clippy::missing_errors_doc)]
    pub fn read_region_ndarray_opt<T: Element>(
        &self,
        region: &Region,
        strategy: ReadStrategy,
        options: &ReadOptions,
    ) -> Result<ndarray::ArrayD<T>, ReadError> {
        self.read_region_with_strategy(region, strategy, options)?
            .into_ndarray()
    }

    /// Fetch the byte range of `cell` and write it to its place in the output.
    fn fetch_cell(
        &self,
        decomposition: &Decomposition,
        cell: &[u64],
        writer: &OutputWriter,
    ) -> Result<(), ReadError> {
        let byte_range = decomposition.byte_range(cell);
        let bytes = self.storage.get_byte_range(self.key(), &byte_range)?;
        log::trace!("fetched cell {cell:?} of {} at {byte_range}", self.key());
        validate_element_bytes(bytes.len(), &self.element_type())?;
        if bytes.len() as u64 != byte_range.length() {
            return Err(ReadError::InvalidBytesLength(
                bytes.len() as u64,
                byte_range.length(),
            ));
        }
        // SAFETY: the output byte ranges of cells are disjoint
        unsafe { writer.write(&decomposition.output_byte_range(cell), &bytes) }
    }

    fn region_array(
        &self,
        decomposition: &Decomposition,
        output: OutputBuffer,
    ) -> Result<RegionArray, ReadError> {
        RegionArray::new(
            decomposition.region().shape().to_vec(),
            self.element_type(),
            output.finish()?,
        )
    }
}

fn output_size(decomposition: &Decomposition) -> Result<usize, ReadError> {
    usize::try_from(decomposition.output_size()).map_err(|_| {
        ReadError::ConcurrencyResource(format!(
            "output of {} bytes exceeds the address space",
            decomposition.output_size()
        ))
    })
}

/// Read `region` of the flat array of `shape` and `element_type` at `key` in `storage`.
///
/// See [`FlatArray::read_region`].
///
/// # Errors
/// See [`FlatArray::read_region`].
pub fn read_region<TStorage: ?Sized + ReadableStorageTraits>(
    storage: Arc<TStorage>,
    key: &StoreKey,
    shape: &[u64],
    element_type: ElementType,
    region: &Region,
) -> Result<RegionArray, ReadError> {
    FlatArray::new(storage, key.clone(), shape.to_vec(), element_type).read_region(region)
}

/// Read `region` of the flat array of `shape` and `element_type` at `key` in `storage`, fetching cells concurrently.
///
/// See [`FlatArray::read_region_parallel`].
///
/// # Errors
/// See [`FlatArray::read_region`].
pub fn read_region_parallel<TStorage: ?Sized + ReadableStorageTraits>(
    storage: Arc<TStorage>,
    key: &StoreKey,
    shape: &[u64],
    element_type: ElementType,
    region: &Region,
) -> Result<RegionArray, ReadError> {
    FlatArray::new(storage, key.clone(), shape.to_vec(), element_type)
        .read_region_parallel(region)
}

/// Read `region` of the flat array of `shape` and `element_type` at `key` in `storage`, with a single covering fetch.
///
/// See [`FlatArray::read_region_bbox`].
///
/// # Errors
/// See [`FlatArray::read_region`].
pub fn read_region_bbox<TStorage: ?Sized + ReadableStorageTraits>(
    storage: Arc<TStorage>,
    key: &StoreKey,
    shape: &[u64],
    element_type: ElementType,
    region: &Region,
) -> Result<RegionArray, ReadError> {
    FlatArray::new(storage, key.clone(), shape.to_vec(), element_type).read_region_bbox(region)
}
