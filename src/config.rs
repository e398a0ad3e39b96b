//! Slabio global configuration options.

use std::sync::OnceLock;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::array::SplitPolicy;

/// Global configuration options for the slabio crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
/// Every option can be overridden for an individual read with [`ReadOptions`](crate::array::ReadOptions).
///
/// ## Concurrent Target
/// > default: [`std::thread::available_parallelism`]`()`
///
/// The default number of concurrent byte range fetches of a [parallel read](crate::array::FlatArray::read_region_parallel).
/// Cells are dispatched to the worker pool in this many uniform blocks.
///
/// ## Parallel Fetch Threshold
/// > default: `5242880` (5 MiB)
///
/// A [bounding box read](crate::array::FlatArray::read_region_bbox) of more than this many bytes is split into segments which are fetched in parallel.
///
/// ## Parallel Fetch Chunk Size
/// > default: `5242880` (5 MiB)
///
/// The size in bytes of the segments of a bounding box read above the parallel fetch threshold.
///
/// ## Split Policy
/// > default: [`SplitPolicy::MergeBoundary`]
///
/// The policy for splitting a region into cells and an inner run.
#[derive(Debug)]
pub struct Config {
    concurrent_target: usize,
    parallel_fetch_threshold: u64,
    parallel_fetch_chunk_size: u64,
    split_policy: SplitPolicy,
}

/// The default parallel fetch threshold and chunk size (5 MiB).
pub const DEFAULT_PARALLEL_FETCH_SIZE: u64 = 5 * 1024 * 1024;

impl Default for Config {
    fn default() -> Self {
        Config {
            concurrent_target: std::thread::available_parallelism().map_or(1, usize::from),
            parallel_fetch_threshold: DEFAULT_PARALLEL_FETCH_SIZE,
            parallel_fetch_chunk_size: DEFAULT_PARALLEL_FETCH_SIZE,
            split_policy: SplitPolicy::default(),
        }
    }
}

impl Config {
    /// Get the [concurrent target](#concurrent-target) configuration.
    #[must_use]
    pub fn concurrent_target(&self) -> usize {
        self.concurrent_target
    }

    /// Set the [concurrent target](#concurrent-target) configuration.
    pub fn set_concurrent_target(&mut self, concurrent_target: usize) {
        self.concurrent_target = concurrent_target;
    }

    /// Get the [parallel fetch threshold](#parallel-fetch-threshold) configuration.
    #[must_use]
    pub fn parallel_fetch_threshold(&self) -> u64 {
        self.parallel_fetch_threshold
    }

    /// Set the [parallel fetch threshold](#parallel-fetch-threshold) configuration.
    pub fn set_parallel_fetch_threshold(&mut self, parallel_fetch_threshold: u64) {
        self.parallel_fetch_threshold = parallel_fetch_threshold;
    }

    /// Get the [parallel fetch chunk size](#parallel-fetch-chunk-size) configuration.
    #[must_use]
    pub fn parallel_fetch_chunk_size(&self) -> u64 {
        self.parallel_fetch_chunk_size
    }

    /// Set the [parallel fetch chunk size](#parallel-fetch-chunk-size) configuration.
    pub fn set_parallel_fetch_chunk_size(&mut self, parallel_fetch_chunk_size: u64) {
        self.parallel_fetch_chunk_size = parallel_fetch_chunk_size;
    }

    /// Get the [split policy](#split-policy) configuration.
    #[must_use]
    pub fn split_policy(&self) -> SplitPolicy {
        self.split_policy
    }

    /// Set the [split policy](#split-policy) configuration.
    pub fn set_split_policy(&mut self, split_policy: SplitPolicy) {
        self.split_policy = split_policy;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global slabio configuration.
///
/// The global configuration must not be held by the current thread when calling [`global_config_mut`], or it will deadlock.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).read()
}

/// Returns a mutable reference to the global slabio configuration.
///
/// The global configuration must not be held by the current thread, or it will deadlock.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).write()
}
