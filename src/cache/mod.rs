// file: src/cache/mod.rs
// description: completion cache module exports
// reference: internal module structure

pub mod store;

pub use store::{CacheKey, CachedCompletion, CompletionCache, FileCache, MemoryCache};
