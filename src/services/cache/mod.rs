pub mod client;
#[cfg(test)]
pub mod memory;
#[cfg(test)]
pub mod unavailable;
pub mod valkey;

pub use client::{CacheClient, CacheError};
#[cfg(test)]
pub use memory::MemoryCacheClient;
#[cfg(test)]
pub use unavailable::UnavailableCacheClient;
pub use valkey::ValkeyClient;
