pub mod backend;
pub mod memory;
pub mod redis_cache;
pub mod r#trait;

pub use backend::CacheBackend;
pub use memory::MemoryCache;
pub use r#trait::{CacheError, CacheResult, CacheTrait};
pub use redis_cache::RedisCache;
