//! GET response caching with manual eviction and a periodic age sweep.

pub mod response_cache;
pub mod sweeper;

pub use response_cache::{CacheEntry, CacheStats, QueryParams, ResponseCache, DEFAULT_MAX_AGE};
pub use sweeper::{CacheSweeper, DEFAULT_SWEEP_INTERVAL, MIN_SWEEP_INTERVAL};
