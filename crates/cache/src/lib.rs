#![doc = include_str!("../README.md")]

pub mod backend;
pub mod error;
pub mod facade;
pub mod key;
pub mod memory;
pub mod redis_store;
pub mod store;

pub use backend::CacheBackend;
pub use error::ResultCacheError;
pub use facade::{CachedResponse, ResultCache};
pub use key::cache_key;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use store::CacheStore;
