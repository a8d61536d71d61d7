//! Caching layer for confData payloads.
//!
//! Payloads change at most a few times a year, so they are kept for a
//! week per place. The cache is advisory: a broken backend only means
//! every request goes to the source site.

mod backend;
mod disk;
mod memory;
mod store;

pub use backend::{CacheBackend, CacheError};
pub use disk::DiskBackend;
pub use memory::MemoryBackend;
pub use store::{CacheConfig, CacheStore, DEFAULT_TTL};

#[cfg(test)]
pub(crate) use store::testing;
