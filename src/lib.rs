//! A rust library for reading rectangular regions of N-dimensional arrays stored as flat row-major binary objects behind a byte-range addressable store.
//!
//! An N-dimensional array flattened in row-major order into a single object (e.g. a file, or an object in an object store) can be read region by region without fetching the whole object.
//! A requested [`Region`](region::Region) is [decomposed](array::Decomposition) into the fewest contiguous byte ranges, which are fetched from a [store](storage) and assembled into a correctly shaped and typed [`RegionArray`](array::RegionArray).
//!
//! ## Getting Started
//! - [`array::FlatArray`] and [`storage`] are good places to start.
//! - A region can be read with one of three strategies, which return identical results:
//!   - [`read_region`](array::FlatArray::read_region): one fetch per cell of the decomposition, in turn,
//!   - [`read_region_parallel`](array::FlatArray::read_region_parallel): one fetch per cell, dispatched concurrently on a [`rayon`] thread pool, or
//!   - [`read_region_bbox`](array::FlatArray::read_region_bbox): one fetch covering the whole region (split into parallel segments if large), sliced in memory.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use slabio::array::{ElementType, FlatArray};
//! use slabio::region::Region;
//! use slabio::storage::{store::MemoryStore, Bytes, StoreKey, WritableStorageTraits};
//!
//! // A 4x4 array of f64 stored as a flat row-major object
//! let store = Arc::new(MemoryStore::new());
//! let key = StoreKey::new("grid.bin")?;
//! let elements: Vec<f64> = (0..16).map(f64::from).collect();
//! store.set(&key, Bytes::copy_from_slice(bytemuck::cast_slice(&elements)))?;
//!
//! let array = FlatArray::new(store, key, vec![4, 4], ElementType::Float64);
//! let region = Region::new_with_ranges(&[1..3, 0..4]);
//! let output = array.read_region_parallel(&region)?;
//! assert_eq!(output.shape(), &[2, 4]);
//! assert_eq!(
//!     output.into_elements::<f64>()?,
//!     vec![4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0]
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//! #### Default
//!  - `ndarray`: [`ndarray`] utility functions for [`FlatArray`](crate::array::FlatArray) and [`RegionArray`](crate::array::RegionArray).
//!
//! ## Logging
//! Decomposition summaries are logged at the `debug` level and individual fetches at the `trace` level with the [`log`] crate.
//! Wrap a store in a [`UsageLogStorageAdapter`](storage::storage_adapter::usage_log::UsageLogStorageAdapter) to log every storage request.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
// #![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod array;
pub mod byte_range;
pub mod config;
pub mod region;
pub mod storage;
