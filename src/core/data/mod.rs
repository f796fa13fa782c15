//! Data layer modules
//!
//! SQLite cache of looked-up records, keyed by provider and word.

pub mod cache_store;

// Re-export main types
pub use cache_store::CacheStore;
