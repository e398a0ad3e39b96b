//! Options for reading regions.

use std::sync::Arc;

use crate::config::global_config;

use super::SplitPolicy;

/// Options for reading a region of a [`FlatArray`](super::FlatArray).
///
/// Defaults are taken from the [global configuration](crate::config::Config).
#[derive(Debug, Clone)]
pub struct ReadOptions {
    concurrent_target: usize,
    thread_pool: Option<Arc<rayon::ThreadPool>>,
    parallel_fetch_threshold: u64,
    parallel_fetch_chunk_size: u64,
    split_policy: SplitPolicy,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptionsBuilder::new().build()
    }
}

impl ReadOptions {
    /// Create a new read options builder.
    #[must_use]
    pub fn builder() -> ReadOptionsBuilder {
        ReadOptionsBuilder::new()
    }

    /// Return the concurrent target.
    #[must_use]
    pub fn concurrent_target(&self) -> usize {
        self.concurrent_target
    }

    /// Set the concurrent target.
    pub fn set_concurrent_target(&mut self, concurrent_target: usize) {
        self.concurrent_target = concurrent_target;
    }

    /// Return the thread pool, if one was supplied.
    ///
    /// Parallel work runs on the [`rayon`] global pool otherwise.
    #[must_use]
    pub fn thread_pool(&self) -> Option<&rayon::ThreadPool> {
        self.thread_pool.as_deref()
    }

    /// Set the thread pool.
    pub fn set_thread_pool(&mut self, thread_pool: Option<Arc<rayon::ThreadPool>>) {
        self.thread_pool = thread_pool;
    }

    /// Return the parallel fetch threshold.
    #[must_use]
    pub fn parallel_fetch_threshold(&self) -> u64 {
        self.parallel_fetch_threshold
    }

    /// Set the parallel fetch threshold.
    pub fn set_parallel_fetch_threshold(&mut self, parallel_fetch_threshold: u64) {
        self.parallel_fetch_threshold = parallel_fetch_threshold;
    }

    /// Return the parallel fetch chunk size.
    #[must_use]
    pub fn parallel_fetch_chunk_size(&self) -> u64 {
        self.parallel_fetch_chunk_size
    }

    /// Set the parallel fetch chunk size.
    pub fn set_parallel_fetch_chunk_size(&mut self, parallel_fetch_chunk_size: u64) {
        self.parallel_fetch_chunk_size = parallel_fetch_chunk_size;
    }

    /// Return the split policy.
    #[must_use]
    pub fn split_policy(&self) -> SplitPolicy {
        self.split_policy
    }

    /// Set the split policy.
    pub fn set_split_policy(&mut self, split_policy: SplitPolicy) {
        self.split_policy = split_policy;
    }
}

/// Builder for [`ReadOptions`].
#[derive(Debug, Clone)]
pub struct ReadOptionsBuilder {
    concurrent_target: usize,
    thread_pool: Option<Arc<rayon::ThreadPool>>,
    parallel_fetch_threshold: u64,
    parallel_fetch_chunk_size: u64,
    split_policy: SplitPolicy,
}

impl Default for ReadOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadOptionsBuilder {
    /// Create a new read options builder.
    #[must_use]
    pub fn new() -> Self {
        let config = global_config();
        Self {
            concurrent_target: config.concurrent_target(),
            thread_pool: None,
            parallel_fetch_threshold: config.parallel_fetch_threshold(),
            parallel_fetch_chunk_size: config.parallel_fetch_chunk_size(),
            split_policy: config.split_policy(),
        }
    }

    /// Build into read options.
    #[must_use]
    pub fn build(&self) -> ReadOptions {
        ReadOptions {
            concurrent_target: self.concurrent_target,
            thread_pool: self.thread_pool.clone(),
            parallel_fetch_threshold: self.parallel_fetch_threshold,
            parallel_fetch_chunk_size: self.parallel_fetch_chunk_size,
            split_policy: self.split_policy,
        }
    }

    /// Set the concurrent target for parallel operations.
    #[must_use]
    pub fn concurrent_target(mut self, concurrent_target: usize) -> Self {
        self.concurrent_target = concurrent_target;
        self
    }

    /// Run parallel operations on `thread_pool` instead of the [`rayon`] global pool.
    #[must_use]
    pub fn thread_pool(mut self, thread_pool: Arc<rayon::ThreadPool>) -> Self {
        self.thread_pool = Some(thread_pool);
        self
    }

    /// Set the size in bytes above which a covering fetch is split into parallel segments.
    #[must_use]
    pub fn parallel_fetch_threshold(mut self, parallel_fetch_threshold: u64) -> Self {
        self.parallel_fetch_threshold = parallel_fetch_threshold;
        self
    }

    /// Set the size in bytes of the segments of a parallel fetch.
    #[must_use]
    pub fn parallel_fetch_chunk_size(mut self, parallel_fetch_chunk_size: u64) -> Self {
        self.parallel_fetch_chunk_size = parallel_fetch_chunk_size;
        self
    }

    /// Set the split policy.
    #[must_use]
    pub fn split_policy(mut self, split_policy: SplitPolicy) -> Self {
        self.split_policy = split_policy;
        self
    }
}
