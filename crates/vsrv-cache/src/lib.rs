//! Presence and cache-aside storage over a TTL key-value cache.
//!
//! This crate provides:
//! - The `CacheStore` backend seam with Redis and in-memory backends
//! - Typed, namespaced access (`TypedCache`, `CacheKey`)
//! - Entry types for rate limits, watch counts and dedupe markers
//! - Hit/miss metrics

pub mod entries;
pub mod error;
pub mod keys;
pub mod memory;
pub mod metrics;
pub mod redis_cache;
pub mod store;

pub use entries::{RateLimitEntry, WatchCountEntry, WatchDedupeMarker};
pub use error::{CacheError, CacheResult};
pub use keys::{ttl, CacheKey, Namespace};
pub use memory::MemoryCache;
pub use redis_cache::{RedisCache, RedisConfig};
pub use store::{CacheStore, TypedCache};
