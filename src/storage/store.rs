//! Stores.
//!
//! A [`MemoryStore`] holds objects in memory and a [`FilesystemStore`] serves byte ranges of files with seeks.
//! Remote object stores are expected to implement [`ReadableStorageTraits`](crate::storage::ReadableStorageTraits) outside of this crate.

mod filesystem_store;
mod memory_store;

pub use filesystem_store::{FilesystemStore, FilesystemStoreCreateError};
pub use memory_store::MemoryStore;
