//! Concurrency utilities for reads.

use std::sync::Arc;

use super::ReadError;

/// Build a [`rayon`] thread pool with `num_threads` threads for use in [`ReadOptions`](super::ReadOptions).
///
/// The pool is owned by the caller and can be shared across reads.
///
/// # Errors
/// Returns [`ReadError::ConcurrencyResource`] if the thread pool cannot be created.
pub fn build_thread_pool(num_threads: usize) -> Result<Arc<rayon::ThreadPool>, ReadError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|index| format!("slabio-{index}"))
        .build()
        .map(Arc::new)
        .map_err(|err| ReadError::ConcurrencyResource(err.to_string()))
}

/// Return the size of the uniform blocks dividing `num_tasks` tasks into `concurrent_target` blocks.
///
/// A concurrent target of zero is treated as one.
pub(crate) fn uniform_block_size(num_tasks: usize, concurrent_target: usize) -> usize {
    num_tasks.div_ceil(concurrent_target.max(1)).max(1)
}

/// Run `op` in `thread_pool`, or in the current (or global) pool if it is [`None`].
pub(crate) fn install<R: Send>(
    thread_pool: Option<&rayon::ThreadPool>,
    op: impl FnOnce() -> R + Send,
) -> R {
    match thread_pool {
        Some(thread_pool) => thread_pool.install(op),
        None => op(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_uniform_block_size() {
        assert_eq!(uniform_block_size(10, 4), 3);
        assert_eq!(uniform_block_size(10, 0), 10);
        assert_eq!(uniform_block_size(2, 8), 1);
        assert_eq!(uniform_block_size(0, 8), 1);
    }

    #[test]
    fn concurrency_thread_pool() -> Result<(), Box<dyn std::error::Error>> {
        let thread_pool = build_thread_pool(2)?;
        assert_eq!(install(Some(thread_pool.as_ref()), rayon::current_num_threads), 2);
        Ok(())
    }
}
